// crates/rulecfn-core/src/fragments/monitoring.rs
// ============================================================================
// Module: Monitoring Fragments
// Description: Per-function and gateway-wide alarms.
// Purpose: Surface failing or silent rules through the shared alarm topic.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Every compute unit gets an error alarm and a no-invocation alarm. A
//! template with a gateway additionally gets latency, client-error and
//! request-count alarms. All alarms notify the shared alarm topic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::core::Resource;
use crate::core::RuleConfig;
use crate::core::names::ALARM_TOPIC_KEY;
use crate::core::names::API_4XX_ALARM_KEY;
use crate::core::names::API_COUNT_ALARM_KEY;
use crate::core::names::API_LATENCY_ALARM_KEY;
use crate::core::names::alarm_key;
use crate::core::template::ALARM_TYPE;
use crate::fragments::BuildError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base URL of the alarm runbook; alarm names are appended as anchors.
pub const ALARM_RUNBOOK_URL: &str = "https://github.com/mapbox/lambda-cfn/blob/master/alarms.md";

/// Per-function alarm definitions: name, metric, comparison.
const FUNCTION_ALARMS: [(&str, &str, &str); 2] = [
    ("Errors", "Errors", "GreaterThanThreshold"),
    ("NoInvocations", "Invocations", "LessThanThreshold"),
];

/// Gateway alarm definitions: key, metric, threshold.
const GATEWAY_ALARMS: [(&str, &str, &str); 3] = [
    (API_LATENCY_ALARM_KEY, "Latency", "4"),
    (API_4XX_ALARM_KEY, "4xxError", "100"),
    (API_COUNT_ALARM_KEY, "Count", "10000"),
];

// ============================================================================
// SECTION: Alarms
// ============================================================================

/// Builds the error and no-invocation alarms for the rule's compute unit.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule has no name.
pub fn alarms(rule: &RuleConfig) -> Result<Vec<(String, Resource)>, BuildError> {
    let name = rule.require_name("alarms")?;
    Ok(FUNCTION_ALARMS
        .iter()
        .map(|(alarm, metric, comparison)| {
            let resource = alarm_resource(
                alarm,
                metric,
                "0",
                comparison,
                "AWS/Lambda",
                json!([{ "Name": "FunctionName", "Value": { "Ref": name } }]),
            );
            (alarm_key(name, alarm), resource)
        })
        .collect())
}

/// Builds the gateway-wide alarms keyed by their fixed identifiers.
#[must_use]
pub fn gateway_alarms() -> Vec<(String, Resource)> {
    GATEWAY_ALARMS
        .iter()
        .map(|(key, metric, threshold)| {
            let resource = alarm_resource(
                key,
                metric,
                threshold,
                "GreaterThanThreshold",
                "AWS/ApiGateway",
                json!([{ "Name": "APIName", "Value": { "Ref": "AWS::StackName" } }]),
            );
            ((*key).to_string(), resource)
        })
        .collect()
}

/// Builds one alarm resource.
fn alarm_resource(
    anchor: &str,
    metric: &str,
    threshold: &str,
    comparison: &str,
    namespace: &str,
    dimensions: Value,
) -> Resource {
    Resource::new(
        ALARM_TYPE,
        json!({
            "EvaluationPeriods": "5",
            "Statistic": "Sum",
            "Threshold": threshold,
            "AlarmDescription": format!("{ALARM_RUNBOOK_URL}#{anchor}"),
            "Period": "60",
            "AlarmActions": [{ "Ref": ALARM_TOPIC_KEY }],
            "Namespace": namespace,
            "Dimensions": dimensions,
            "ComparisonOperator": comparison,
            "MetricName": metric,
        }),
    )
}
