// crates/rulecfn-core/src/fragments/parameters.rs
// ============================================================================
// Module: Parameter Fragments
// Description: Validation and namespacing of declared rule parameters.
// Purpose: Prevent parameter keys from different rules colliding.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Each declared parameter is re-keyed as the punctuation-stripped rule name
//! followed by the parameter name. For example, parameter `a` on rule
//! `invalid_char&^#--In!@Name` becomes `invalidcharInNamea`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ParameterSpec;
use crate::core::RuleConfig;
use crate::core::strip_punctuation;
use crate::fragments::BuildError;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Returns the rule's parameters under namespaced keys, in key order.
///
/// A named rule without parameters yields an empty list.
///
/// # Errors
///
/// Returns [`BuildError::MissingName`] when the rule is unnamed, with or
/// without parameters, and [`BuildError::MissingField`] when a parameter lacks
/// `Type` or `Description`.
pub fn parameters(rule: &RuleConfig) -> Result<Vec<(String, ParameterSpec)>, BuildError> {
    let prefix = strip_punctuation(rule.require_name("parameters")?);
    for (key, spec) in &rule.parameters {
        if is_blank(spec.kind.as_deref()) {
            return Err(BuildError::MissingField {
                context: format!("parameter {key}"),
                field: "Type",
            });
        }
        if is_blank(spec.description.as_deref()) {
            return Err(BuildError::MissingField {
                context: format!("parameter {key}"),
                field: "Description",
            });
        }
    }
    Ok(rule
        .parameters
        .iter()
        .map(|(key, spec)| (format!("{prefix}{key}"), spec.clone()))
        .collect())
}

/// Returns true when the value is absent or empty.
fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}
