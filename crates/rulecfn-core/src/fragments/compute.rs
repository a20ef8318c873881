// crates/rulecfn-core/src/fragments/compute.rs
// ============================================================================
// Module: Compute Fragments
// Description: Compute unit, invoke permission, and environment descriptor.
// Purpose: Emit the resources every rule contributes regardless of trigger.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Every rule becomes one compute unit whose code location is resolved from
//! the shared code parameters. Sizing hints outside the accepted window fall
//! back to defaults rather than failing the build.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use serde_json::json;

use crate::core::RuleConfig;
use crate::core::Resource;
use crate::core::names::ALARM_TOPIC_KEY;
use crate::core::names::API_GATEWAY_KEY;
use crate::core::names::CODE_BUCKET_PARAMETER;
use crate::core::names::CODE_PREFIX_PARAMETER;
use crate::core::names::REVISION_PARAMETER;
use crate::core::names::ROLE_KEY;
use crate::core::names::SERVICE_TOKEN_PARAMETER;
use crate::core::names::topic_key;
use crate::core::template::ENVIRONMENT_TYPE;
use crate::core::template::FUNCTION_TYPE;
use crate::core::template::PERMISSION_TYPE;
use crate::fragments::BuildError;
use crate::fragments::parameters::parameters;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default execution timeout in seconds.
pub const DEFAULT_TIMEOUT: u32 = 60;
/// Largest accepted execution timeout in seconds.
pub const MAX_TIMEOUT: u32 = 300;
/// Default and smallest memory size in MB.
pub const DEFAULT_MEMORY_SIZE: u32 = 128;
/// Largest accepted memory size in MB.
pub const MAX_MEMORY_SIZE: u32 = 1536;
/// Memory sizes must be a multiple of this step.
const MEMORY_STEP: u32 = 64;
/// Execution runtime used when none is configured.
pub const DEFAULT_RUNTIME: &str = "nodejs";

/// Reads a sizing hint as an unsigned 32-bit integer.
///
/// Negative, fractional, and oversized numbers yield `None`.
fn whole_u32(requested: Option<&Number>) -> Option<u32> {
    requested.and_then(Number::as_u64).and_then(|value| u32::try_from(value).ok())
}

/// Returns the requested timeout when it is a whole number in `1..=300`, else
/// the default.
#[must_use]
pub fn effective_timeout(requested: Option<&Number>) -> u32 {
    whole_u32(requested)
        .filter(|timeout| (1..=MAX_TIMEOUT).contains(timeout))
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Returns the requested memory size when it is a whole number in
/// `128..=1536` and a multiple of 64, else the default.
#[must_use]
pub fn effective_memory_size(requested: Option<&Number>) -> u32 {
    whole_u32(requested)
        .filter(|size| {
            (DEFAULT_MEMORY_SIZE..=MAX_MEMORY_SIZE).contains(size) && size % MEMORY_STEP == 0
        })
        .unwrap_or(DEFAULT_MEMORY_SIZE)
}

// ============================================================================
// SECTION: Compute Unit
// ============================================================================

/// Builds the compute-unit resource for `rule`.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn compute_unit(rule: &RuleConfig, runtime: &str) -> Result<Resource, BuildError> {
    let name = rule.require_name("compute unit")?;
    let mut metadata = Map::new();
    if let Some(source_path) = &rule.source_path {
        metadata.insert("sourcePath".to_string(), Value::String(source_path.clone()));
    }
    let resource = Resource::new(
        FUNCTION_TYPE,
        json!({
            "Code": {
                "S3Bucket": { "Ref": CODE_BUCKET_PARAMETER },
                "S3Key": {
                    "Fn::Join": ["", [
                        { "Ref": CODE_PREFIX_PARAMETER },
                        { "Ref": REVISION_PARAMETER },
                        ".zip"
                    ]]
                }
            },
            "Role": { "Fn::GetAtt": [ROLE_KEY, "Arn"] },
            "Description": { "Ref": "AWS::StackName" },
            "Handler": format!("index.{name}"),
            "MemorySize": effective_memory_size(rule.memory_size.as_ref()),
            "Runtime": runtime,
            "Timeout": effective_timeout(rule.timeout.as_ref()),
        }),
    );
    Ok(resource.with_metadata(Value::Object(metadata)))
}

// ============================================================================
// SECTION: Invoke Permission
// ============================================================================

/// Builds the grant allowing the rule's trigger source to invoke the unit.
///
/// The principal is chosen by trigger: pub/sub first, then gateway, else the
/// event bus (pattern, schedule, or no trigger at all).
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn invoke_permission(rule: &RuleConfig) -> Result<Resource, BuildError> {
    let name = rule.require_name("invoke permission")?;
    let (principal, source_arn) = if rule.sns_rule.is_some() {
        ("sns.amazonaws.com", json!({ "Ref": topic_key(name) }))
    } else if rule.gateway_rule.is_some() {
        (
            "apigateway.amazonaws.com",
            json!({
                "Fn::Join": ["", [
                    "arn:aws:execute-api:",
                    { "Ref": "AWS::Region" },
                    ":",
                    { "Ref": "AWS::AccountId" },
                    ":",
                    { "Ref": API_GATEWAY_KEY },
                    "/*"
                ]]
            }),
        )
    } else {
        (
            "events.amazonaws.com",
            json!({
                "Fn::Join": ["", [
                    "arn:aws:events:",
                    { "Ref": "AWS::Region" },
                    ":",
                    { "Ref": "AWS::AccountId" },
                    ":rule/",
                    { "Ref": "AWS::StackName" },
                    "*"
                ]]
            }),
        )
    };
    Ok(Resource::new(
        PERMISSION_TYPE,
        json!({
            "FunctionName": { "Fn::GetAtt": [name, "Arn"] },
            "Action": "lambda:InvokeFunction",
            "Principal": principal,
            "SourceArn": source_arn,
        }),
    ))
}

// ============================================================================
// SECTION: Environment Descriptor
// ============================================================================

/// Builds the environment-injection resource.
///
/// The descriptor references the service token, the unit itself, every
/// namespaced parameter, and the shared alarm topic.
///
/// # Errors
///
/// Returns [`BuildError`] when the rule has no name or a declared parameter
/// is incomplete.
pub fn environment(rule: &RuleConfig) -> Result<Resource, BuildError> {
    let name = rule.require_name("environment")?;
    let mut properties = Map::new();
    properties.insert("ServiceToken".to_string(), json!({ "Ref": SERVICE_TOKEN_PARAMETER }));
    properties.insert("FunctionName".to_string(), json!({ "Ref": name }));
    for (key, _) in parameters(rule)? {
        properties.insert(key.clone(), json!({ "Ref": key }));
    }
    properties.insert(ALARM_TOPIC_KEY.to_string(), json!({ "Ref": ALARM_TOPIC_KEY }));
    Ok(Resource::new(ENVIRONMENT_TYPE, Value::Object(properties)))
}
