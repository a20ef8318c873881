// crates/rulecfn-config/src/lib.rs
// ============================================================================
// Module: Rulecfn Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for rulecfn.toml semantics.
// Dependencies: rulecfn-core, serde, toml
// ============================================================================

//! ## Overview
//! `rulecfn-config` defines the configuration model for the rulecfn compiler.
//! It provides strict, fail-closed validation and maps validated settings
//! onto the compiler's options, namer, and rule builder.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
