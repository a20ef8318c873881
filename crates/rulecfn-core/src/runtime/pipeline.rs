// crates/rulecfn-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Compile Pipeline
// Description: Source -> namespace -> build -> compile orchestration.
// Purpose: Turn a rule source into a compiled template in one call.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! The pipeline namespaces each rule with its module path, records the path
//! as the rule's source locator, builds bundles in source order and compiles
//! them over the base document. Rule configs from the source are not
//! modified; the pipeline works on copies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::debug;

use crate::core::Namer;
use crate::core::RuleBundle;
use crate::core::RuleConfig;
use crate::core::TemplateDocument;
use crate::fragments::BuildError;
use crate::interfaces::RuleDefinition;
use crate::interfaces::RuleSource;
use crate::interfaces::SourceError;
use crate::runtime::builder::RuleBuilder;
use crate::runtime::compiler::CompileError;
use crate::runtime::compiler::TemplateCompiler;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The rule source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A rule failed to build.
    #[error("rule {path}: {source}")]
    Build {
        /// Module path of the failing rule.
        path: String,
        /// Build failure.
        source: BuildError,
    },
    /// Compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Namer, builder and compiler wired together.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Rule name namespacer.
    namer: Namer,
    /// Rule bundle builder.
    builder: RuleBuilder,
    /// Template compiler.
    compiler: TemplateCompiler,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(namer: Namer, builder: RuleBuilder, compiler: TemplateCompiler) -> Self {
        Self {
            namer,
            builder,
            compiler,
        }
    }

    /// Returns `definition`'s config with its name namespaced and its source
    /// locator set to the module path.
    #[must_use]
    pub fn prepare(&self, definition: &RuleDefinition) -> RuleConfig {
        let mut config = definition.config.clone();
        config.name = config
            .name
            .as_deref()
            .map(|name| self.namer.namespace(name, &definition.module_path));
        config.source_path = Some(definition.module_path.clone());
        config
    }

    /// Builds one bundle per definition, in order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Build`] for the first rule that fails.
    pub fn bundles(
        &self,
        definitions: &[RuleDefinition],
    ) -> Result<Vec<RuleBundle>, PipelineError> {
        definitions
            .iter()
            .map(|definition| {
                let config = self.prepare(definition);
                debug!(
                    path = %definition.module_path,
                    name = config.name.as_deref().unwrap_or_default(),
                    "building rule"
                );
                self.builder.build(&config).map_err(|source| PipelineError::Build {
                    path: definition.module_path.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Reads, builds and compiles every rule from `source` over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on the first source, build or compile failure.
    pub fn run<S>(
        &self,
        source: &S,
        base: &TemplateDocument,
    ) -> Result<TemplateDocument, PipelineError>
    where
        S: RuleSource + ?Sized,
    {
        let definitions = source.rules()?;
        let bundles = self.bundles(&definitions)?;
        Ok(self.compiler.compile(base, &bundles)?)
    }
}
