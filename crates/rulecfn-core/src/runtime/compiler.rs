// crates/rulecfn-core/src/runtime/compiler.rs
// ============================================================================
// Module: Template Compiler
// Description: Folds rule bundles into one template document.
// Purpose: Enforce key uniqueness and materialize shared resources once.
// Dependencies: crate::core, crate::fragments, thiserror, tracing
// ============================================================================

//! ## Overview
//! The compiler clones the base document into a [`CompiledTemplate`]
//! accumulator and folds bundles into it in input order. Every insert checks
//! uniqueness; the first collision aborts the compile and the accumulator is
//! dropped, so callers never observe a partially folded document.
//!
//! Shared resources:
//! - the execution role, attached once at least one bundle was folded, with
//!   the base policy plus every bundle policy in fold order;
//! - the alarm topic, always attached;
//! - the HTTP gateway set, materialized when the first method is folded;
//! - the stage deployment, attached after folding when the gateway exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;
use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::core::Output;
use crate::core::ParameterSpec;
use crate::core::Policy;
use crate::core::Resource;
use crate::core::RuleBundle;
use crate::core::TemplateDocument;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::names::ALARM_EMAIL_PARAMETER;
use crate::core::names::ALARM_TOPIC_KEY;
use crate::core::names::API_GATEWAY_KEY;
use crate::core::names::API_KEY_KEY;
use crate::core::names::API_KEY_OUTPUT_KEY;
use crate::core::names::CODE_BUCKET_PARAMETER;
use crate::core::names::CODE_PREFIX_PARAMETER;
use crate::core::names::REVISION_PARAMETER;
use crate::core::names::ROLE_KEY;
use crate::core::names::SERVICE_TOKEN_PARAMETER;
use crate::core::names::deployment_key;
use crate::fragments;
use crate::fragments::BuildError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Template format version seeded when the base document has none.
pub const DEFAULT_FORMAT_VERSION: &str = "2010-09-09";
/// Template description seeded when the base document has none.
pub const DEFAULT_DESCRIPTION: &str = "LambdaCfn";
/// Hex characters of the content hash used as the deployment suffix.
pub const CONTENT_HASH_LEN: usize = 12;
/// Maximum revision token length.
pub const MAX_REVISION_TOKEN_LEN: usize = 64;

/// Global parameters every compiled template declares.
const GLOBAL_PARAMETERS: [(&str, &str); 5] = [
    (CODE_BUCKET_PARAMETER, "lambda function S3 bucket location"),
    (CODE_PREFIX_PARAMETER, "lambda function S3 prefix location"),
    (REVISION_PARAMETER, "lambda function S3 prefix location"),
    (SERVICE_TOKEN_PARAMETER, "StreambotEnv lambda function ARN"),
    (ALARM_EMAIL_PARAMETER, "Alarm notifications will send to this email address"),
];

/// Resource keys owned by the compiler; bundles may not claim them.
const RESERVED_RESOURCE_KEYS: [&str; 2] = [ROLE_KEY, ALARM_TOPIC_KEY];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template compilation errors.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A parameter key is already present.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),
    /// A resource key is already present or reserved.
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    /// An output key is already present.
    #[error("duplicate output: {0}")]
    DuplicateOutput(String),
    /// Content hashing of the compile inputs failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The deployment revision token is not usable in a resource key.
    #[error("invalid revision token: {0}")]
    InvalidRevisionToken(String),
    /// A shared fragment could not be built.
    #[error(transparent)]
    Fragment(#[from] BuildError),
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Source of the stage deployment key suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeploymentRevision {
    /// No suffix; the key is always `ApiDeployment`.
    Fixed,
    /// Caller-supplied token appended to the key.
    Token(String),
    /// Short content hash of the base document and bundles.
    #[default]
    ContentHash,
}

/// Compile-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Deployment key strategy.
    pub revision: DeploymentRevision,
    /// Format version seeded into documents without one.
    pub format_version: String,
    /// Description seeded into documents without one.
    pub description: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            revision: DeploymentRevision::default(),
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Accumulator
// ============================================================================

/// In-progress compiled template.
///
/// # Invariants
/// - Every parameter, resource and output key was inserted exactly once.
/// - Gateway resources exist iff `gateway_materialized` is true.
/// - `method_keys` lists folded method resources in fold order.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    /// Document being folded into.
    document: TemplateDocument,
    /// Rule policies in fold order.
    policies: Vec<Policy>,
    /// Whether the shared gateway set has been inserted.
    gateway_materialized: bool,
    /// Method resource keys the deployment depends on.
    method_keys: Vec<String>,
    /// Resolved stage deployment key.
    deployment_key: String,
    /// Number of bundles folded so far.
    folded: usize,
}

impl CompiledTemplate {
    /// Starts an accumulator over `document`.
    #[must_use]
    pub fn new(document: TemplateDocument, deployment_key: impl Into<String>) -> Self {
        Self {
            document,
            policies: Vec::new(),
            gateway_materialized: false,
            method_keys: Vec::new(),
            deployment_key: deployment_key.into(),
            folded: 0,
        }
    }

    /// Returns whether the shared gateway set has been inserted.
    #[must_use]
    pub const fn gateway_materialized(&self) -> bool {
        self.gateway_materialized
    }

    /// Returns the method keys recorded for the stage deployment.
    #[must_use]
    pub fn method_keys(&self) -> &[String] {
        &self.method_keys
    }

    /// Returns the resolved stage deployment key.
    #[must_use]
    pub fn deployment_key(&self) -> &str {
        &self.deployment_key
    }

    /// Inserts a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateParameter`] when `key` is present.
    pub fn insert_parameter(
        &mut self,
        key: String,
        spec: ParameterSpec,
    ) -> Result<(), CompileError> {
        if self.document.parameters.contains_key(&key) {
            return Err(CompileError::DuplicateParameter(key));
        }
        self.document.parameters.insert(key, spec);
        Ok(())
    }

    /// Inserts a resource, materializing the shared gateway set first when
    /// `resource` is the first HTTP method.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateResource`] when `key` (or a gateway
    /// key) is present or reserved, and [`CompileError::DuplicateOutput`] when
    /// the gateway key output is already declared.
    pub fn insert_resource(&mut self, key: String, resource: Resource) -> Result<(), CompileError> {
        self.ensure_resource_vacant(&key)?;
        if resource.is_gateway_method() {
            if !self.gateway_materialized {
                self.materialize_gateway()?;
            }
            self.method_keys.push(key.clone());
        }
        self.document.resources.insert(key, resource);
        Ok(())
    }

    /// Inserts an output.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::DuplicateOutput`] when `key` is present.
    pub fn insert_output(&mut self, key: String, output: Output) -> Result<(), CompileError> {
        if self.document.outputs.contains_key(&key) {
            return Err(CompileError::DuplicateOutput(key));
        }
        self.document.outputs.insert(key, output);
        Ok(())
    }

    /// Appends a policy to the shared execution role.
    pub fn append_policy(&mut self, policy: Policy) {
        self.policies.push(policy);
    }

    /// Folds one bundle: parameters, then resources, outputs and policy.
    ///
    /// # Errors
    ///
    /// Returns the first collision encountered.
    pub fn fold(&mut self, bundle: &RuleBundle) -> Result<(), CompileError> {
        for (key, spec) in &bundle.parameters {
            self.insert_parameter(key.clone(), spec.clone())?;
        }
        for (key, resource) in &bundle.resources {
            self.insert_resource(key.clone(), resource.clone())?;
        }
        for (key, output) in &bundle.outputs {
            self.insert_output(key.clone(), output.clone())?;
        }
        if let Some(policy) = &bundle.policy {
            self.append_policy(policy.clone());
        }
        self.folded += 1;
        Ok(())
    }

    /// Attaches the shared resources and returns the finished document.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when a shared resource cannot be built or the
    /// deployment key is already taken.
    pub fn finish(mut self) -> Result<TemplateDocument, CompileError> {
        if self.folded > 0 {
            let role = fragments::execution_role(&self.policies)?;
            self.document.resources.insert(ROLE_KEY.to_string(), role);
        }
        self.document.resources.insert(ALARM_TOPIC_KEY.to_string(), fragments::alarm_topic());
        if self.gateway_materialized {
            let key = self.deployment_key.clone();
            self.ensure_resource_vacant(&key)?;
            self.document.resources.insert(key, fragments::api_deployment(&self.method_keys));
        }
        Ok(self.document)
    }

    /// Rejects keys that are present or owned by the compiler.
    fn ensure_resource_vacant(&self, key: &str) -> Result<(), CompileError> {
        if self.document.resources.contains_key(key) || RESERVED_RESOURCE_KEYS.contains(&key) {
            return Err(CompileError::DuplicateResource(key.to_string()));
        }
        Ok(())
    }

    /// Inserts the gateway, its access key, its alarms and the key output.
    fn materialize_gateway(&mut self) -> Result<(), CompileError> {
        debug!(deployment = %self.deployment_key, "materializing shared http gateway");
        let mut shared = vec![
            (API_GATEWAY_KEY.to_string(), fragments::rest_api()),
            (API_KEY_KEY.to_string(), fragments::api_key(&self.deployment_key)),
        ];
        shared.extend(fragments::gateway_alarms());
        for (key, _) in &shared {
            self.ensure_resource_vacant(key)?;
        }
        if self.document.outputs.contains_key(API_KEY_OUTPUT_KEY) {
            return Err(CompileError::DuplicateOutput(API_KEY_OUTPUT_KEY.to_string()));
        }
        self.document.resources.extend(shared);
        self.document
            .outputs
            .insert(API_KEY_OUTPUT_KEY.to_string(), Output::new(json!({ "Ref": API_KEY_KEY })));
        self.gateway_materialized = true;
        Ok(())
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Folds bundles into template documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCompiler {
    /// Compile settings.
    options: CompileOptions,
}

impl TemplateCompiler {
    /// Creates a compiler with the given options.
    #[must_use]
    pub const fn new(options: CompileOptions) -> Self {
        Self {
            options,
        }
    }

    /// Returns the compile options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles `bundles` over a copy of `base`.
    ///
    /// `base` is never modified; on error no partial document is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on the first collision or when the deployment
    /// key cannot be resolved.
    pub fn compile(
        &self,
        base: &TemplateDocument,
        bundles: &[RuleBundle],
    ) -> Result<TemplateDocument, CompileError> {
        let deployment_key = self.resolve_deployment_key(base, bundles)?;
        let mut document = base.clone();
        if document.format_version.is_none() {
            document.format_version = Some(self.options.format_version.clone());
        }
        if document.description.is_none() {
            document.description = Some(self.options.description.clone());
        }
        for (key, description) in GLOBAL_PARAMETERS {
            document.parameters.insert(key.to_string(), ParameterSpec::new("String", description));
        }

        let mut template = CompiledTemplate::new(document, deployment_key);
        for bundle in bundles {
            debug!(
                rule = %bundle.name,
                resources = bundle.resources.len(),
                parameters = bundle.parameters.len(),
                outputs = bundle.outputs.len(),
                "folding rule bundle"
            );
            template.fold(bundle)?;
        }
        let gateway = template.gateway_materialized();
        let document = template.finish()?;
        info!(
            rules = bundles.len(),
            resources = document.resources.len(),
            parameters = document.parameters.len(),
            outputs = document.outputs.len(),
            gateway,
            "compiled template"
        );
        Ok(document)
    }

    /// Resolves the stage deployment key for this compile.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidRevisionToken`] for unusable tokens and
    /// [`CompileError::Hash`] when the inputs cannot be canonicalized.
    pub fn resolve_deployment_key(
        &self,
        base: &TemplateDocument,
        bundles: &[RuleBundle],
    ) -> Result<String, CompileError> {
        match &self.options.revision {
            DeploymentRevision::Fixed => Ok(deployment_key("")),
            DeploymentRevision::Token(token) => {
                validate_revision_token(token)?;
                Ok(deployment_key(token))
            }
            DeploymentRevision::ContentHash => {
                let digest = hash_canonical_json(&(base, bundles))?;
                Ok(deployment_key(digest.short(CONTENT_HASH_LEN)))
            }
        }
    }
}

/// Checks that a revision token is 1..=64 ASCII alphanumerics.
///
/// # Errors
///
/// Returns [`CompileError::InvalidRevisionToken`] otherwise.
pub fn validate_revision_token(token: &str) -> Result<(), CompileError> {
    if token.is_empty()
        || token.len() > MAX_REVISION_TOKEN_LEN
        || !token.chars().all(|ch| ch.is_ascii_alphanumeric())
    {
        return Err(CompileError::InvalidRevisionToken(token.to_string()));
    }
    Ok(())
}
