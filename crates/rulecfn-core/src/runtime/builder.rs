// crates/rulecfn-core/src/runtime/builder.rs
// ============================================================================
// Module: Rule Builder
// Description: Composes one rule's fragments into a rule bundle.
// Purpose: Gate optional trigger fragments on the rule's declared triggers.
// Dependencies: crate::core, crate::fragments
// ============================================================================

//! ## Overview
//! The builder always emits the compute unit, its permission, its environment
//! descriptor and its alarms. Each declared trigger adds its own resources; a
//! rule may declare any combination and receives the union of them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::RuleBundle;
use crate::core::RuleConfig;
use crate::core::names::environment_key;
use crate::core::names::event_rule_key;
use crate::core::names::gateway_method_key;
use crate::core::names::gateway_resource_key;
use crate::core::names::permission_key;
use crate::core::names::scheduled_rule_key;
use crate::core::names::topic_access_key_key;
use crate::core::names::topic_key;
use crate::core::names::topic_user_key;
use crate::fragments;
use crate::fragments::BuildError;
use crate::fragments::DEFAULT_RUNTIME;
use crate::fragments::EventTriggerKind;
use crate::fragments::GatewayPart;

// ============================================================================
// SECTION: Rule Builder
// ============================================================================

/// Builds rule bundles for a fixed execution runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBuilder {
    /// Runtime identifier stamped on every compute unit.
    runtime: String,
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

impl RuleBuilder {
    /// Creates a builder for the given runtime.
    #[must_use]
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    /// Returns the configured runtime.
    #[must_use]
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// Builds the bundle for one rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by any fragment builder.
    pub fn build(&self, rule: &RuleConfig) -> Result<RuleBundle, BuildError> {
        let name = rule.require_name("rule bundle")?;
        let mut resources = vec![
            (name.to_string(), fragments::compute_unit(rule, &self.runtime)?),
            (permission_key(name), fragments::invoke_permission(rule)?),
            (environment_key(name), fragments::environment(rule)?),
        ];
        if rule.sns_rule.is_some() {
            resources.push((topic_key(name), fragments::topic(rule)?));
            resources.push((topic_user_key(name), fragments::topic_user(rule)?));
            resources.push((topic_access_key_key(name), fragments::topic_access_key(rule)?));
        }
        if rule.event_rule.is_some() {
            let trigger = fragments::event_trigger(rule, EventTriggerKind::Pattern)?;
            resources.push((event_rule_key(name), trigger));
        }
        if rule.scheduled_rule.is_some() {
            resources.push((
                scheduled_rule_key(name),
                fragments::event_trigger(rule, EventTriggerKind::Schedule)?,
            ));
        }
        if rule.gateway_rule.is_some() {
            resources.push((
                gateway_resource_key(name),
                fragments::gateway_trigger(rule, GatewayPart::Resource)?,
            ));
            let method = fragments::gateway_trigger(rule, GatewayPart::Method)?;
            resources.push((gateway_method_key(name), method));
        }
        resources.extend(fragments::alarms(rule)?);

        Ok(RuleBundle {
            name: name.to_string(),
            parameters: fragments::parameters(rule)?,
            resources,
            policy: fragments::policy(rule)?,
            outputs: fragments::outputs(rule)?,
        })
    }
}
