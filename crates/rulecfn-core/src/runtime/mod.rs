// crates/rulecfn-core/src/runtime/mod.rs
// ============================================================================
// Module: Rulecfn Runtime
// Description: Rule builder, template compiler, pipeline, and helpers.
// Purpose: Turn rule configs into a compiled template document.
// Dependencies: crate::core, crate::fragments, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! Runtime components are synchronous and side-effect free apart from
//! structured log events. Data flows one way: rule configs become bundles,
//! bundles fold into a template.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod builder;
pub mod compiler;
pub mod env;
pub mod handlers;
pub mod pipeline;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::RuleBuilder;
pub use compiler::CompileError;
pub use compiler::CompileOptions;
pub use compiler::CompiledTemplate;
pub use compiler::DeploymentRevision;
pub use compiler::TemplateCompiler;
pub use env::find_namespaced_var;
pub use env::split_on_comma;
pub use handlers::HandlerEntry;
pub use handlers::handler_manifest;
pub use pipeline::Pipeline;
pub use pipeline::PipelineError;
