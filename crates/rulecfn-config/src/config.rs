// crates/rulecfn-config/src/config.rs
// ============================================================================
// Module: Rulecfn Configuration
// Description: Configuration loading and validation for rulecfn.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rulecfn-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys and invalid values are rejected. Relative rule and output
//! paths are resolved against the directory of the config file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rulecfn_core::CompileOptions;
use rulecfn_core::DeploymentRevision;
use rulecfn_core::Namer;
use rulecfn_core::RuleBuilder;
use rulecfn_core::fragments::DEFAULT_RUNTIME;
use rulecfn_core::runtime::compiler::DEFAULT_DESCRIPTION;
use rulecfn_core::runtime::compiler::DEFAULT_FORMAT_VERSION;
use rulecfn_core::runtime::compiler::validate_revision_token;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "rulecfn.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RULECFN_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of namespace packages.
pub(crate) const MAX_PACKAGES: usize = 256;
/// Maximum number of rule definition paths.
pub(crate) const MAX_RULE_PATHS: usize = 1024;
/// Maximum length of free-text template fields.
pub(crate) const MAX_TEXT_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Canonical `rulecfn.toml` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulecfnConfig {
    /// Template metadata seeded into the compiled document.
    #[serde(default)]
    pub template: TemplateConfig,
    /// Package names used to namespace rules.
    #[serde(default)]
    pub namespace: NamespaceConfig,
    /// Rule definition sources.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Compute-unit build settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Stage deployment key settings.
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Output destination.
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory of the loaded config file (not serialized).
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl RulecfnConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_resolved(&resolved)
    }

    /// Loads configuration like [`RulecfnConfig::load`], but returns defaults
    /// when no path was given and the default file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit or existing config fails to
    /// load or validate.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some() || env::var_os(CONFIG_ENV_VAR).is_some();
        let resolved = resolve_path(path)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        Self::load_resolved(&resolved)
    }

    /// Reads, parses and validates the config at `resolved`.
    fn load_resolved(resolved: &Path) -> Result<Self, ConfigError> {
        validate_path(resolved)?;
        let bytes = fs::read(resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source_dir = resolved.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.template.validate()?;
        self.namespace.validate()?;
        self.rules.validate()?;
        self.build.validate()?;
        self.deployment.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Returns compile options derived from the template and deployment sections.
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            revision: self.deployment.revision(),
            format_version: self.template.format_version.clone(),
            description: self.template.description.clone(),
        }
    }

    /// Returns the namer over the configured packages.
    #[must_use]
    pub fn namer(&self) -> Namer {
        Namer::new(self.namespace.packages.iter().cloned())
    }

    /// Returns the rule builder for the configured runtime.
    #[must_use]
    pub fn rule_builder(&self) -> RuleBuilder {
        RuleBuilder::new(self.build.runtime.clone())
    }

    /// Returns rule paths resolved against the config directory.
    #[must_use]
    pub fn rule_paths(&self) -> Vec<PathBuf> {
        self.rules.paths.iter().map(|path| self.resolve(path)).collect()
    }

    /// Returns each rule path as written in `rules.paths` with its resolved
    /// location. The written form is the stable module path for namespacing
    /// and source stamping; the resolved form is only for reading.
    #[must_use]
    pub fn rule_files(&self) -> Vec<(String, PathBuf)> {
        self.rules
            .paths
            .iter()
            .map(|path| (path.trim().to_string(), self.resolve(path)))
            .collect()
    }

    /// Returns the output path resolved against the config directory.
    #[must_use]
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.path.as_deref().map(|path| self.resolve(path))
    }

    /// Resolves `path` against the config directory when relative.
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path.trim());
        match &self.source_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

// ============================================================================
// SECTION: Template
// ============================================================================

/// Template metadata configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Description seeded into templates without one.
    #[serde(default = "default_description")]
    pub description: String,
    /// Format version seeded into templates without one.
    #[serde(default = "default_format_version")]
    pub format_version: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            description: default_description(),
            format_version: default_format_version(),
        }
    }
}

impl TemplateConfig {
    /// Validates template metadata.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_text("template.description", &self.description)?;
        validate_text("template.format_version", &self.format_version)
    }
}

/// Default template description.
fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

/// Default template format version.
fn default_format_version() -> String {
    DEFAULT_FORMAT_VERSION.to_string()
}

// ============================================================================
// SECTION: Namespace
// ============================================================================

/// Namespacing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    /// External package names, matched in order.
    #[serde(default)]
    pub packages: Vec<String>,
}

impl NamespaceConfig {
    /// Validates the package list.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.len() > MAX_PACKAGES {
            return Err(ConfigError::Invalid(format!(
                "namespace.packages exceeds max entries ({MAX_PACKAGES})"
            )));
        }
        let mut seen = BTreeSet::new();
        for package in &self.packages {
            validate_text("namespace.packages entry", package)?;
            if !seen.insert(package.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "namespace.packages contains duplicate entry: {package}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Rule definition source configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule definition JSON files, relative to the config directory.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl RulesConfig {
    /// Validates rule paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.len() > MAX_RULE_PATHS {
            return Err(ConfigError::Invalid(format!(
                "rules.paths exceeds max entries ({MAX_RULE_PATHS})"
            )));
        }
        for path in &self.paths {
            validate_path_string("rules.paths entry", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Build
// ============================================================================

/// Compute-unit build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Execution runtime identifier.
    #[serde(default = "default_runtime")]
    pub runtime: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
        }
    }
}

impl BuildConfig {
    /// Validates build settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_text("build.runtime", &self.runtime)
    }
}

/// Default execution runtime.
fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

// ============================================================================
// SECTION: Deployment
// ============================================================================

/// Stage deployment key strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionMode {
    /// Suffix the key with a short content hash.
    #[default]
    ContentHash,
    /// Use the bare key.
    Fixed,
    /// Suffix the key with `deployment.token`.
    Token,
}

/// Stage deployment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    /// Key strategy.
    #[serde(default)]
    pub revision: RevisionMode,
    /// Revision token; required iff `revision = "token"`.
    #[serde(default)]
    pub token: Option<String>,
}

impl DeploymentConfig {
    /// Returns the compile-time revision for this configuration.
    #[must_use]
    pub fn revision(&self) -> DeploymentRevision {
        match (self.revision, &self.token) {
            (RevisionMode::Fixed, _) => DeploymentRevision::Fixed,
            (RevisionMode::Token, Some(token)) => DeploymentRevision::Token(token.clone()),
            (RevisionMode::ContentHash | RevisionMode::Token, _) => DeploymentRevision::ContentHash,
        }
    }

    /// Validates the revision/token pairing.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.revision, &self.token) {
            (RevisionMode::Token, None) => Err(ConfigError::Invalid(
                "deployment.revision=token requires deployment.token".to_string(),
            )),
            (RevisionMode::Token, Some(token)) => validate_revision_token(token)
                .map_err(|err| ConfigError::Invalid(format!("deployment.token: {err}"))),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "deployment.token requires deployment.revision=token".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Output destination configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Template output path; stdout when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl OutputConfig {
    /// Validates the output path.
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => validate_path_string("output.path", path),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a free-text field.
fn validate_text(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_TEXT_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}
