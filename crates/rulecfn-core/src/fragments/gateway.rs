// crates/rulecfn-core/src/fragments/gateway.rs
// ============================================================================
// Module: Gateway Fragments
// Description: Shared HTTP gateway, access key, and stage deployment.
// Purpose: Materialize the gateway once for all rules exposing methods.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! These fragments are template-wide rather than per-rule. The compiler adds
//! the gateway and access key when the first method is folded and adds the
//! deployment after all bundles, depending on every method key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::core::Resource;
use crate::core::names::API_GATEWAY_KEY;
use crate::core::template::API_KEY_TYPE;
use crate::core::template::DEPLOYMENT_TYPE;
use crate::core::template::REST_API_TYPE;

/// Name of the single deployment stage.
pub const STAGE_NAME: &str = "prod";

// ============================================================================
// SECTION: Gateway Resources
// ============================================================================

/// Builds the shared HTTP gateway.
#[must_use]
pub fn rest_api() -> Resource {
    Resource::new(
        REST_API_TYPE,
        json!({ "Name": { "Ref": "AWS::StackName" }, "FailOnWarnings": "true" }),
    )
}

/// Builds the gateway access key bound to the stage created by `deployment_key`.
#[must_use]
pub fn api_key(deployment_key: &str) -> Resource {
    Resource::new(
        API_KEY_TYPE,
        json!({
            "Name": { "Ref": "AWS::StackName" },
            "Enabled": "true",
            "StageKeys": [{ "RestApiId": { "Ref": API_GATEWAY_KEY }, "StageName": STAGE_NAME }],
        }),
    )
    .with_depends_on(Value::String(deployment_key.to_string()))
}

/// Builds the stage deployment depending on every method key.
#[must_use]
pub fn api_deployment(method_keys: &[String]) -> Resource {
    let depends_on = method_keys.iter().cloned().map(Value::String).collect();
    Resource::new(
        DEPLOYMENT_TYPE,
        json!({ "RestApiId": { "Ref": API_GATEWAY_KEY }, "StageName": STAGE_NAME }),
    )
    .with_depends_on(Value::Array(depends_on))
}
