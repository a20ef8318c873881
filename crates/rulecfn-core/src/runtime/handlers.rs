// crates/rulecfn-core/src/runtime/handlers.rs
// ============================================================================
// Module: Handler Manifest
// Description: Maps compiled compute units back to their rule sources.
// Purpose: Tell the external loader which entry point serves each unit.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Compute units built from a rule carry `Metadata.sourcePath`. The manifest
//! lists every such unit, keyed by its resource key, so a loader can bind the
//! exported entry point without re-reading rule definitions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::TemplateDocument;

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// One compute unit served by rule logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerEntry {
    /// Export name; equal to the compute unit's resource key.
    pub export: String,
    /// Handler property of the compute unit, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Locator of the rule's executable logic.
    pub source_path: String,
}

/// Returns handler entries for every sourced compute unit, ordered by key.
///
/// Resources of other types, and compute units without a string
/// `Metadata.sourcePath`, are skipped.
#[must_use]
pub fn handler_manifest(template: &TemplateDocument) -> Vec<HandlerEntry> {
    template
        .resources
        .iter()
        .filter(|(_, resource)| resource.is_function())
        .filter_map(|(key, resource)| {
            let source_path = resource.metadata.as_ref()?.get("sourcePath")?.as_str()?;
            let handler = resource.properties.get("Handler").and_then(Value::as_str);
            Some(HandlerEntry {
                export: key.clone(),
                handler: handler.map(str::to_string),
                source_path: source_path.to_string(),
            })
        })
        .collect()
}
