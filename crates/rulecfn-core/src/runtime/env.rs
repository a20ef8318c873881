// crates/rulecfn-core/src/runtime/env.rs
// ============================================================================
// Module: Rule Runtime Helpers
// Description: Helpers for rule logic reading injected configuration.
// Purpose: Resolve namespaced parameters and parse list-valued settings.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Rule parameters reach the running compute unit under namespaced names
//! (`<rule><param>`). Rule logic only knows the short parameter name, so
//! lookup matches on substring. The variable set is always passed in
//! explicitly; nothing here reads the process environment.

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a comma-separated list, trimming whitespace around each comma.
///
/// Unset or empty input yields an empty list.
#[must_use]
pub fn split_on_comma(value: Option<&str>) -> Vec<String> {
    match value {
        None | Some("") => Vec::new(),
        Some(list) => {
            let parts: Vec<&str> = list.split(',').collect();
            let last = parts.len().saturating_sub(1);
            parts
                .iter()
                .enumerate()
                .map(|(index, part)| {
                    let part = if index > 0 { part.trim_start() } else { part };
                    let part = if index < last { part.trim_end() } else { part };
                    part.to_string()
                })
                .collect()
        }
    }
}

/// Returns the value of the first variable whose name contains `key`, or an
/// empty string when none does.
#[must_use]
pub fn find_namespaced_var<'a, I>(vars: I, key: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    vars.into_iter()
        .find(|(name, _)| name.contains(key))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
