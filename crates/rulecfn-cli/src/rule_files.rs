// crates/rulecfn-cli/src/rule_files.rs
// ============================================================================
// Module: File Rule Source
// Description: Rule source backed by JSON rule definition files.
// Purpose: Feed the compile pipeline from disk with bounded reads.
// Dependencies: rulecfn-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each configured file holds one rule definition object or an array of them.
//! The path as authored (in `rules.paths` or on the command line) is the
//! module path handed to the namer, so rules shipped under an external package
//! directory are namespaced by that package. Config-relative paths are
//! resolved only to read the file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use rulecfn_core::BuildError;
use rulecfn_core::RuleDefinition;
use rulecfn_core::RuleSource;
use rulecfn_core::SourceError;
use rulecfn_core::decode_rule_set;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single rule definition file.
pub const MAX_RULE_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug, Error)]
pub enum ReadLimitError {
    /// File I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// File size exceeds the configured limit.
    #[error("file size {size} exceeds limit {limit}")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError`] when the file cannot be read or is too large.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Rule Source
// ============================================================================

/// One rule definition file.
///
/// # Invariants
/// - `module_path` is the path as authored and never depends on the working
///   directory; `path` is where the file is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFile {
    /// Authored path, used for namespacing and as the source locator.
    pub module_path: String,
    /// Location the file is read from.
    pub path: PathBuf,
}

impl RuleFile {
    /// Creates a rule file whose module path differs from its read location.
    #[must_use]
    pub fn new(module_path: impl Into<String>, path: PathBuf) -> Self {
        Self {
            module_path: module_path.into(),
            path,
        }
    }

    /// Creates a rule file read from the path exactly as given.
    #[must_use]
    pub fn as_given(path: &Path) -> Self {
        Self::new(path.to_string_lossy(), path.to_path_buf())
    }
}

/// Rule source reading definitions from JSON files in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FileRuleSource {
    /// Rule definition files.
    files: Vec<RuleFile>,
}

impl FileRuleSource {
    /// Creates a source over `files`.
    #[must_use]
    pub const fn new(files: Vec<RuleFile>) -> Self {
        Self {
            files,
        }
    }

    /// Returns the configured files.
    #[must_use]
    pub fn files(&self) -> &[RuleFile] {
        &self.files
    }
}

impl RuleSource for FileRuleSource {
    fn rules(&self) -> Result<Vec<RuleDefinition>, SourceError> {
        let mut definitions = Vec::new();
        for file in &self.files {
            definitions.extend(read_rule_file(file)?);
        }
        Ok(definitions)
    }
}

/// Reads and decodes one rule definition file.
///
/// Every definition carries `file.module_path`.
///
/// # Errors
///
/// Returns [`SourceError`] when the file cannot be read or decoded.
pub fn read_rule_file(file: &RuleFile) -> Result<Vec<RuleDefinition>, SourceError> {
    let module_path = file.module_path.clone();
    let bytes = read_bytes_with_limit(&file.path, MAX_RULE_FILE_BYTES)
        .map_err(|err| SourceError::Io(format!("{module_path}: {err}")))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|err| SourceError::Decode {
        path: module_path.clone(),
        source: BuildError::InvalidShape(format!("malformed json: {err}")),
    })?;
    let rules = decode_rule_set(value).map_err(|source| SourceError::Decode {
        path: module_path.clone(),
        source,
    })?;
    Ok(rules.into_iter().map(|config| RuleDefinition::new(module_path.clone(), config)).collect())
}
