// crates/rulecfn-core/src/core/mod.rs
// ============================================================================
// Module: Rulecfn Core Types
// Description: Rule definitions, template shapes, naming, and hashing.
// Purpose: Provide stable, serializable types shared by builders and compiler.
// Dependencies: serde, serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for both the authoring input
//! (rule configs) and the emitted artifact (template documents).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod names;
pub mod rule;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::HashDigest;
pub use hashing::HashError;
pub use names::Namer;
pub use names::strip_punctuation;
pub use rule::EventRule;
pub use rule::GatewayRule;
pub use rule::ParameterSpec;
pub use rule::PolicyStatement;
pub use rule::RuleConfig;
pub use rule::SnsRule;
pub use template::Output;
pub use template::Policy;
pub use template::PolicyDocument;
pub use template::Resource;
pub use template::RuleBundle;
pub use template::TemplateDocument;
