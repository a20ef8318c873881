// crates/rulecfn-core/src/fragments/outputs.rs
// ============================================================================
// Module: Output Fragments
// Description: Template outputs exposed by pub/sub and gateway rules.
// Purpose: Publish endpoints and credentials that callers need after deploy.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Pub/sub rules expose their topic and publisher credentials; gateway rules
//! expose their endpoint URL. Rules with neither trigger yield no outputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use crate::core::Output;
use crate::core::RuleConfig;
use crate::core::names::API_GATEWAY_KEY;
use crate::core::names::topic_access_key_key;
use crate::core::names::topic_key;
use crate::fragments::BuildError;
use crate::fragments::gateway::STAGE_NAME;

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Builds the rule's outputs in declaration order.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn outputs(rule: &RuleConfig) -> Result<Vec<(String, Output)>, BuildError> {
    let name = rule.require_name("outputs")?;
    let mut outputs = Vec::new();
    if rule.sns_rule.is_some() {
        let access_key = topic_access_key_key(name);
        outputs.push((topic_key(name), Output::new(json!({ "Ref": topic_key(name) }))));
        outputs.push((
            format!("{name}SNSUserAccessKey"),
            Output::new(json!({ "Ref": access_key })),
        ));
        outputs.push((
            format!("{name}SNSUserSecretAccessKey"),
            Output::new(json!({ "Fn::GetAtt": [access_key, "SecretAccessKey"] })),
        ));
    }
    if rule.gateway_rule.is_some() {
        outputs.push((
            format!("{name}APIEndpoint"),
            Output::new(json!({
                "Fn::Join": ["", [
                    "https://",
                    { "Ref": API_GATEWAY_KEY },
                    ".execute-api.",
                    { "Ref": "AWS::Region" },
                    format!(".amazonaws.com/{STAGE_NAME}/"),
                    name.to_lowercase()
                ]]
            })),
        ));
    }
    Ok(outputs)
}
