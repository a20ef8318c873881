// crates/rulecfn-core/src/core/rule.rs
// ============================================================================
// Module: Rule Definitions
// Description: Authoring-side rule configuration and its sub-specifications.
// Purpose: Provide the typed input consumed by every fragment builder.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`RuleConfig`] describes one event-driven compute unit: its identity,
//! declared parameters, permission statements, optional triggers and sizing
//! hints. Rule configs are authored externally and are read-only inputs to the
//! builders. Field names follow the camelCase authoring format.
//!
//! The rule `name` is optional at the type level so that a missing identity is
//! reported by the builder that needs it instead of by the decoder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

use crate::fragments::BuildError;

// ============================================================================
// SECTION: Rule Configuration
// ============================================================================

/// Authoring input for a single rule.
///
/// # Invariants
/// - `parameters` keys are unique (enforced by the map type).
/// - `statements` preserve authoring order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Rule identifier; namespaced before building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque locator of the rule's executable logic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// Declared template parameters keyed by parameter name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// Permission statements granted to the shared execution role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<PolicyStatement>>,
    /// Pattern-matching trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_rule: Option<EventRule>,
    /// Schedule expression trigger (`cron(...)` or `rate(...)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_rule: Option<String>,
    /// Pub/sub fan-out marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sns_rule: Option<SnsRule>,
    /// HTTP gateway trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_rule: Option<GatewayRule>,
    /// Requested memory size in MB. Any JSON number is accepted here; values
    /// outside the allowed sizes fall back when the compute unit is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<Number>,
    /// Requested timeout in seconds, validated like `memory_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Number>,
}

impl RuleConfig {
    /// Creates an otherwise empty rule config with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Decodes a rule config from a JSON value, reporting container shape
    /// problems before field-level decoding.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidShape`] when the value or one of its
    /// composite fields has the wrong container type.
    pub fn from_json(value: Value) -> Result<Self, BuildError> {
        let Value::Object(fields) = &value else {
            return Err(BuildError::InvalidShape("rule config must be an object".to_string()));
        };
        if let Some(statements) = fields.get("statements")
            && !statements.is_null()
            && !statements.is_array()
        {
            return Err(BuildError::InvalidShape("statements must be an array".to_string()));
        }
        if let Some(parameters) = fields.get("parameters")
            && !parameters.is_object()
        {
            return Err(BuildError::InvalidShape("parameters must be an object".to_string()));
        }
        serde_json::from_value(value).map_err(|err| BuildError::InvalidShape(err.to_string()))
    }

    /// Returns the rule name or a missing-identity error for `fragment`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingName`] when the name is absent or blank.
    pub fn require_name(&self, fragment: &'static str) -> Result<&str, BuildError> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(BuildError::MissingName {
                fragment,
            }),
        }
    }
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Template parameter declaration.
///
/// Extra keys such as `Default` or `AllowedValues` are carried through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter type (`String`, `Number`, ...).
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Human-readable description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional parameter attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ParameterSpec {
    /// Creates a parameter with a type and description.
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            description: Some(description.into()),
            extra: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Policy Statements
// ============================================================================

/// IAM-style permission statement.
///
/// Keys other than the selectors below (`Sid`, `Condition`, ...) pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// `Allow` or `Deny`.
    #[serde(rename = "Effect", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Value>,
    /// Positive action selector.
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    /// Negated action selector.
    #[serde(rename = "NotAction", default, skip_serializing_if = "Option::is_none")]
    pub not_action: Option<Value>,
    /// Positive resource selector.
    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
    /// Negated resource selector.
    #[serde(rename = "NotResource", default, skip_serializing_if = "Option::is_none")]
    pub not_resource: Option<Value>,
    /// Additional statement keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PolicyStatement {
    /// Creates an `Allow` statement for the given actions and resource.
    #[must_use]
    pub fn allow(action: Value, resource: Value) -> Self {
        Self {
            effect: Some(Value::String("Allow".to_string())),
            action: Some(action),
            resource: Some(resource),
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Triggers
// ============================================================================

/// Pattern-matching trigger specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    /// Event pattern matched against the event bus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_pattern: Option<Value>,
}

/// Pub/sub fan-out marker. Presence alone enables the topic resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsRule {}

/// HTTP gateway trigger specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRule {
    /// HTTP verb served by the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Whether callers must present an API key.
    #[serde(default)]
    pub api_key: bool,
    /// Custom method response shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_responses: Option<Vec<Value>>,
    /// Custom integration response mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_responses: Option<Vec<Value>>,
}
