// crates/rulecfn-core/src/fragments/triggers.rs
// ============================================================================
// Module: Trigger Fragments
// Description: Pattern, schedule, and HTTP gateway trigger resources.
// Purpose: Wire a compute unit to the event source that invokes it.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Event triggers (pattern and schedule) share one resource shape and differ
//! only in the matching property. Gateway triggers contribute a route and a
//! method; the method is the only fragment that marks a rule as needing the
//! shared HTTP gateway.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use serde_json::json;

use crate::core::GatewayRule;
use crate::core::Resource;
use crate::core::RuleConfig;
use crate::core::names::API_GATEWAY_KEY;
use crate::core::names::ROLE_KEY;
use crate::core::names::gateway_resource_key;
use crate::core::template::EVENT_RULE_TYPE;
use crate::core::template::METHOD_TYPE;
use crate::core::template::ROUTE_TYPE;
use crate::fragments::BuildError;
use crate::fragments::is_empty_value;

// ============================================================================
// SECTION: Discriminators
// ============================================================================

/// Event trigger flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTriggerKind {
    /// Match events against a pattern.
    Pattern,
    /// Fire on a schedule expression.
    Schedule,
}

impl EventTriggerKind {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "eventRule",
            Self::Schedule => "scheduledRule",
        }
    }
}

impl fmt::Display for EventTriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTriggerKind {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "eventRule" => Ok(Self::Pattern),
            "scheduledRule" => Ok(Self::Schedule),
            other => Err(BuildError::UnknownFragmentKind(other.to_string())),
        }
    }
}

/// Gateway trigger parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPart {
    /// Route under the gateway root.
    Resource,
    /// Method bound to the route.
    Method,
}

impl FromStr for GatewayPart {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "resource" => Ok(Self::Resource),
            "method" => Ok(Self::Method),
            other => Err(BuildError::UnknownFragmentKind(other.to_string())),
        }
    }
}

/// HTTP verbs a gateway method may serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `OPTIONS`
    Options,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Every supported verb.
    pub const ALL: [Self; 7] =
        [Self::Get, Self::Head, Self::Put, Self::Patch, Self::Options, Self::Post, Self::Delete];

    /// Returns the uppercase verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = BuildError;

    /// Parses a verb case-insensitively; surrounding text is not accepted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| BuildError::InvalidHttpMethod(value.to_string()))
    }
}

// ============================================================================
// SECTION: Event Triggers
// ============================================================================

/// Builds a pattern or scheduled trigger targeting the rule's compute unit.
///
/// # Errors
///
/// Returns [`BuildError`] when the rule has no name, a pattern trigger has no
/// (or an empty) pattern, or a scheduled trigger has no expression.
pub fn event_trigger(rule: &RuleConfig, kind: EventTriggerKind) -> Result<Resource, BuildError> {
    let name = rule.require_name("event trigger")?;
    let (property, value) = match kind {
        EventTriggerKind::Pattern => ("EventPattern", event_pattern(rule)?),
        EventTriggerKind::Schedule => ("ScheduleExpression", schedule_expression(rule)?),
    };
    let mut resource = Resource::new(
        EVENT_RULE_TYPE,
        json!({
            "RoleArn": { "Fn::GetAtt": [ROLE_KEY, "Arn"] },
            "State": "ENABLED",
            "Targets": [{ "Arn": { "Fn::GetAtt": [name, "Arn"] }, "Id": name }],
        }),
    );
    resource.properties.insert(property.to_string(), value);
    Ok(resource)
}

/// Returns the rule's non-empty event pattern.
///
/// A blank string, `[]`, or `{}` is rejected as empty.
fn event_pattern(rule: &RuleConfig) -> Result<Value, BuildError> {
    let pattern = rule.event_rule.as_ref().and_then(|event| event.event_pattern.as_ref());
    match pattern {
        None | Some(Value::Null) => Err(BuildError::MissingField {
            context: "eventRule".to_string(),
            field: "eventPattern",
        }),
        Some(pattern) if is_empty_value(pattern) => Err(BuildError::EmptyValue("eventPattern")),
        Some(pattern) => Ok(pattern.clone()),
    }
}

/// Returns the rule's non-blank schedule expression.
fn schedule_expression(rule: &RuleConfig) -> Result<Value, BuildError> {
    match rule.scheduled_rule.as_deref() {
        None => Err(BuildError::MissingField {
            context: "rule".to_string(),
            field: "scheduledRule",
        }),
        Some(expression) if expression.trim().is_empty() => {
            Err(BuildError::EmptyValue("scheduledRule"))
        }
        Some(expression) => Ok(Value::String(expression.to_string())),
    }
}

// ============================================================================
// SECTION: Gateway Triggers
// ============================================================================

/// Builds the route or method of the rule's gateway trigger.
///
/// The HTTP verb is validated for both parts.
///
/// # Errors
///
/// Returns [`BuildError`] when the rule has no name, no gateway trigger, no
/// verb, or a verb outside the supported set.
pub fn gateway_trigger(rule: &RuleConfig, part: GatewayPart) -> Result<Resource, BuildError> {
    let name = rule.require_name("gateway trigger")?;
    let Some(gateway) = &rule.gateway_rule else {
        return Err(BuildError::MissingField {
            context: "rule".to_string(),
            field: "gatewayRule",
        });
    };
    let method = http_method(gateway)?;
    let resource = match part {
        GatewayPart::Resource => Resource::new(
            ROUTE_TYPE,
            json!({
                "ParentId": { "Fn::GetAtt": [API_GATEWAY_KEY, "RootResourceId"] },
                "RestApiId": { "Ref": API_GATEWAY_KEY },
                "PathPart": name.to_lowercase(),
            }),
        ),
        GatewayPart::Method => gateway_method(name, gateway, method),
    };
    Ok(resource)
}

/// Parses the gateway trigger's verb.
fn http_method(gateway: &GatewayRule) -> Result<HttpMethod, BuildError> {
    let Some(method) = gateway.method.as_deref() else {
        return Err(BuildError::MissingField {
            context: "gatewayRule".to_string(),
            field: "method",
        });
    };
    method.parse()
}

/// Builds the method resource with default or custom response mappings.
fn gateway_method(name: &str, gateway: &GatewayRule, method: HttpMethod) -> Resource {
    let method_responses = gateway.method_responses.clone().map_or_else(
        || {
            json!([
                { "StatusCode": "200", "ResponseModels": { "application/json": "Empty" } },
                { "StatusCode": "500", "ResponseModels": { "application/json": "Empty" } }
            ])
        },
        Value::Array,
    );
    let integration_responses = gateway.integration_responses.clone().map_or_else(
        || {
            json!([
                { "StatusCode": "200" },
                { "StatusCode": "500", "SelectionPattern": "^(?i)(error|exception).*" }
            ])
        },
        Value::Array,
    );
    let mut resource = Resource::new(
        METHOD_TYPE,
        json!({
            "RestApiId": { "Ref": API_GATEWAY_KEY },
            "ResourceId": { "Ref": gateway_resource_key(name) },
            "AuthorizationType": "None",
            "HttpMethod": method.as_str(),
            "MethodResponses": method_responses,
            "Integration": {
                "Type": "AWS",
                "IntegrationHttpMethod": "POST",
                "IntegrationResponses": integration_responses,
                "Uri": {
                    "Fn::Join": ["", [
                        "arn:aws:apigateway:",
                        { "Ref": "AWS::Region" },
                        ":lambda:path/2015-03-31/functions/",
                        { "Fn::GetAtt": [name, "Arn"] },
                        "/invocations"
                    ]]
                }
            },
        }),
    );
    if gateway.api_key {
        resource.properties.insert("ApiKeyRequired".to_string(), Value::String("true".to_string()));
    }
    resource
}
