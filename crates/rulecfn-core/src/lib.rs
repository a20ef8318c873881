// crates/rulecfn-core/src/lib.rs
// ============================================================================
// Module: Rulecfn Core Library
// Description: Rule to infrastructure-template compiler.
// Purpose: Build per-rule fragments and fold them into one template.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror, tracing
// ============================================================================

//! ## Overview
//! Rulecfn turns independently authored rules, each describing one
//! event-driven compute unit and its triggers, into a single infrastructure
//! template. [`fragments`] builds isolated pieces per rule, [`RuleBuilder`]
//! groups them into a [`RuleBundle`], and [`TemplateCompiler`] folds bundles
//! into a [`TemplateDocument`] while enforcing key uniqueness and sharing one
//! execution role, one alarm topic and, when needed, one HTTP gateway.
//! Invariants:
//! - Compilation is deterministic for a fixed input order and revision mode.
//! - A failed compile returns no document; the base document is never mutated.
//! - The crate performs no file, network, or process-environment access.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod fragments;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::HashDigest;
pub use crate::core::HashError;
pub use crate::core::Namer;
pub use crate::core::Output;
pub use crate::core::ParameterSpec;
pub use crate::core::Policy;
pub use crate::core::PolicyStatement;
pub use crate::core::Resource;
pub use crate::core::RuleBundle;
pub use crate::core::RuleConfig;
pub use crate::core::TemplateDocument;
pub use fragments::BuildError;
pub use fragments::FragmentKind;
pub use fragments::build_fragment;
pub use interfaces::Notification;
pub use interfaces::NotificationSender;
pub use interfaces::NotifyError;
pub use interfaces::PublishRequest;
pub use interfaces::RecordingSender;
pub use interfaces::RuleDefinition;
pub use interfaces::RuleSource;
pub use interfaces::SourceError;
pub use interfaces::StaticRuleSource;
pub use interfaces::decode_rule_set;
pub use runtime::CompileError;
pub use runtime::CompileOptions;
pub use runtime::DeploymentRevision;
pub use runtime::Pipeline;
pub use runtime::PipelineError;
pub use runtime::RuleBuilder;
pub use runtime::TemplateCompiler;
pub use runtime::handler_manifest;
