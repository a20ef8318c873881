// crates/rulecfn-core/src/fragments/mod.rs
// ============================================================================
// Module: Fragment Builders
// Description: Pure builders for every template fragment a rule contributes.
// Purpose: Validate rule inputs and emit isolated, immutable fragments.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each builder validates the inputs it needs before constructing anything and
//! returns either a complete fragment or a [`BuildError`]. Builders never
//! return partial fragments and never mutate the rule config.
//!
//! Fragment kinds can also be selected by name through [`FragmentKind`], which
//! is how single fragments are rendered for inspection.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod compute;
pub mod gateway;
pub mod monitoring;
pub mod outputs;
pub mod parameters;
pub mod policy;
pub mod pubsub;
pub mod triggers;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::RuleConfig;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compute::DEFAULT_MEMORY_SIZE;
pub use compute::DEFAULT_RUNTIME;
pub use compute::DEFAULT_TIMEOUT;
pub use compute::MAX_MEMORY_SIZE;
pub use compute::MAX_TIMEOUT;
pub use compute::compute_unit;
pub use compute::effective_memory_size;
pub use compute::effective_timeout;
pub use compute::environment;
pub use compute::invoke_permission;
pub use gateway::api_deployment;
pub use gateway::api_key;
pub use gateway::rest_api;
pub use monitoring::alarms;
pub use monitoring::gateway_alarms;
pub use outputs::outputs;
pub use parameters::parameters;
pub use policy::execution_role;
pub use policy::policy;
pub use pubsub::alarm_topic;
pub use pubsub::topic;
pub use pubsub::topic_access_key;
pub use pubsub::topic_user;
pub use triggers::EventTriggerKind;
pub use triggers::GatewayPart;
pub use triggers::HttpMethod;
pub use triggers::event_trigger;
pub use triggers::gateway_trigger;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fragment construction errors.
///
/// # Invariants
/// - Raised before any fragment is returned; callers never see partial output.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The rule name is required by the named fragment but absent.
    #[error("name property required for {fragment}")]
    MissingName {
        /// Fragment that required the name.
        fragment: &'static str,
    },
    /// A composite input lacks a required field.
    #[error("{context} must contain {field} property")]
    MissingField {
        /// Composite that is missing the field.
        context: String,
        /// Missing field name.
        field: &'static str,
    },
    /// A required value is present but empty.
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
    /// A composite input has the wrong container type.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A fragment or trigger discriminator is outside its allowed set.
    #[error("unknown fragment kind: {0}")]
    UnknownFragmentKind(String),
    /// The HTTP verb is outside the supported set.
    #[error("invalid client HTTP method specified: {0}")]
    InvalidHttpMethod(String),
    /// A fragment could not be rendered as JSON.
    #[error("fragment serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Fragment Kinds
// ============================================================================

/// Individually renderable fragment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Compute-unit definition.
    Compute,
    /// Invoke-permission grant.
    Permission,
    /// Environment-injection descriptor.
    Environment,
    /// Per-function monitoring alarms.
    Alarms,
    /// Namespaced parameter block.
    Parameters,
    /// Policy stanza.
    Policy,
    /// Output declarations.
    Outputs,
    /// Pattern or scheduled trigger.
    EventTrigger(EventTriggerKind),
    /// HTTP route or method.
    Gateway(GatewayPart),
    /// Pub/sub topic.
    Topic,
    /// Pub/sub subscriber identity.
    TopicUser,
    /// Pub/sub subscriber credential.
    TopicAccessKey,
}

impl FragmentKind {
    /// Every fragment kind, in display order.
    pub const ALL: [Self; 14] = [
        Self::Compute,
        Self::Permission,
        Self::Environment,
        Self::Alarms,
        Self::Parameters,
        Self::Policy,
        Self::Outputs,
        Self::EventTrigger(EventTriggerKind::Pattern),
        Self::EventTrigger(EventTriggerKind::Schedule),
        Self::Gateway(GatewayPart::Resource),
        Self::Gateway(GatewayPart::Method),
        Self::Topic,
        Self::TopicUser,
        Self::TopicAccessKey,
    ];

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Permission => "permission",
            Self::Environment => "environment",
            Self::Alarms => "alarms",
            Self::Parameters => "parameters",
            Self::Policy => "policy",
            Self::Outputs => "outputs",
            Self::EventTrigger(kind) => kind.as_str(),
            Self::Gateway(GatewayPart::Resource) => "gatewayResource",
            Self::Gateway(GatewayPart::Method) => "gatewayMethod",
            Self::Topic => "snsTopic",
            Self::TopicUser => "snsUser",
            Self::TopicAccessKey => "snsAccessKey",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentKind {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| BuildError::UnknownFragmentKind(value.to_string()))
    }
}

// ============================================================================
// SECTION: Fragment Rendering
// ============================================================================

/// Builds a single fragment of `kind` for `rule` and renders it as JSON.
///
/// Policy renders as `null` when the rule declares no statements.
///
/// # Errors
///
/// Returns [`BuildError`] when the fragment's inputs fail validation.
pub fn build_fragment(
    rule: &RuleConfig,
    kind: FragmentKind,
    runtime: &str,
) -> Result<Value, BuildError> {
    match kind {
        FragmentKind::Compute => to_json(&compute_unit(rule, runtime)?),
        FragmentKind::Permission => to_json(&invoke_permission(rule)?),
        FragmentKind::Environment => to_json(&environment(rule)?),
        FragmentKind::Alarms => to_json(&alarms(rule)?),
        FragmentKind::Parameters => to_json(&parameters(rule)?),
        FragmentKind::Policy => to_json(&policy(rule)?),
        FragmentKind::Outputs => to_json(&outputs(rule)?),
        FragmentKind::EventTrigger(trigger) => to_json(&event_trigger(rule, trigger)?),
        FragmentKind::Gateway(part) => to_json(&gateway_trigger(rule, part)?),
        FragmentKind::Topic => to_json(&topic(rule)?),
        FragmentKind::TopicUser => to_json(&topic_user(rule)?),
        FragmentKind::TopicAccessKey => to_json(&topic_access_key(rule)?),
    }
}

/// Renders a fragment as a JSON value.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, BuildError> {
    serde_json::to_value(value).map_err(|err| BuildError::Serialization(err.to_string()))
}

/// Returns true for JSON values that carry nothing: null, a blank string, an
/// empty array, or an empty object.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
