// crates/rulecfn-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, rule files, and JSON rendering.
// Purpose: Ensure CLI inputs fail closed and outputs are deterministic.
// Dependencies: rulecfn-cli main helpers
// ============================================================================

//! ## Overview
//! Validates the helpers behind the `rulecfn` commands without spawning the
//! binary.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rulecfn_config::RulecfnConfig;
use rulecfn_core::RuleSource;
use rulecfn_core::SourceError;
use serde_json::json;

use super::FileRuleSource;
use super::pipeline;
use super::read_bytes_with_limit;
use super::read_rule_file;
use super::render_json;
use super::rule_files::ReadLimitError;
use super::rule_files::RuleFile;
use super::single_definition;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn temp_file(label: &str, contents: &[u8]) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("rulecfn-cli-{label}-{nanos}.json"));
    fs::write(&path, contents).expect("write temp file");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_small_file() {
    let path = temp_file("small", b"{}");
    let bytes = read_bytes_with_limit(&path, 16).expect("read");
    assert_eq!(bytes, b"{}");
    cleanup(&path);
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let path = temp_file("large", &[b'a'; 32]);
    let err = read_bytes_with_limit(&path, 16).unwrap_err();
    assert!(matches!(err, ReadLimitError::TooLarge { size: 32, limit: 16 }));
    assert_eq!(err.to_string(), "file size 32 exceeds limit 16");
    cleanup(&path);
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let mut path = std::env::temp_dir();
    path.push("rulecfn-cli-definitely-missing.json");
    assert!(matches!(read_bytes_with_limit(&path, 16), Err(ReadLimitError::Io(_))));
}

// ============================================================================
// SECTION: Rule Files
// ============================================================================

#[test]
fn rule_file_object_yields_one_definition_stamped_with_path() {
    let path = temp_file("object", br#"{ "name": "rootLogin", "timeout": 30 }"#);
    let definitions = read_rule_file(&RuleFile::as_given(&path)).expect("decode");
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].module_path, path.to_string_lossy());
    assert_eq!(definitions[0].config.name.as_deref(), Some("rootLogin"));
    assert_eq!(definitions[0].config.timeout, Some(serde_json::Number::from(30)));
    cleanup(&path);
}

#[test]
fn rule_file_stamps_the_authored_path_not_the_read_location() {
    let path = temp_file("authored", br#"[{ "name": "a" }, { "name": "b" }]"#);
    let file = RuleFile::new("rules/webhook.json", path.clone());
    let definitions = read_rule_file(&file).expect("decode");
    assert_eq!(definitions.len(), 2);
    assert!(definitions.iter().all(|definition| definition.module_path == "rules/webhook.json"));
    cleanup(&path);
}

#[test]
fn rule_file_errors_name_the_authored_path() {
    let path = temp_file("authored-bad", b"{ not json");
    let err = read_rule_file(&RuleFile::new("rules/bad.json", path.clone())).unwrap_err();
    assert!(err.to_string().contains("rules/bad.json"));
    cleanup(&path);
}

#[test]
fn rule_source_concatenates_files_in_order() {
    let first = temp_file("first", br#"[{ "name": "a" }, { "name": "b" }]"#);
    let second = temp_file("second", br#"{ "name": "c" }"#);
    let source =
        FileRuleSource::new(vec![RuleFile::as_given(&first), RuleFile::as_given(&second)]);
    let names: Vec<String> = source
        .rules()
        .expect("rules")
        .into_iter()
        .filter_map(|definition| definition.config.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    cleanup(&first);
    cleanup(&second);
}

#[test]
fn malformed_rule_file_is_a_decode_error() {
    let path = temp_file("malformed", b"{ not json");
    let err = read_rule_file(&RuleFile::as_given(&path)).unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
    assert!(err.to_string().contains("malformed json"));
    cleanup(&path);
}

#[test]
fn scalar_rule_file_is_a_shape_error() {
    let path = temp_file("scalar", b"42");
    let err = read_rule_file(&RuleFile::as_given(&path)).unwrap_err();
    assert!(err.to_string().contains("must be an object or an array"));
    cleanup(&path);
}

#[test]
fn fragment_requires_exactly_one_definition() {
    let path = temp_file("pair", br#"[{ "name": "a" }, { "name": "b" }]"#);
    let definitions = read_rule_file(&RuleFile::as_given(&path)).expect("decode");
    let err = single_definition(definitions).unwrap_err();
    assert_eq!(err.to_string(), "fragment requires exactly one rule definition, found 2");
    assert!(single_definition(Vec::new()).is_err());
    cleanup(&path);
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

#[test]
fn render_json_sorts_keys_and_ends_with_newline() {
    let rendered = render_json(&json!({ "b": 1, "a": { "d": 2, "c": 3 } })).expect("render");
    assert_eq!(rendered, "{\n  \"a\": {\n    \"c\": 3,\n    \"d\": 2\n  },\n  \"b\": 1\n}\n");
}

#[test]
fn revision_token_override_applies_to_the_pipeline() {
    let path = temp_file(
        "gateway",
        br#"{ "name": "hook", "gatewayRule": { "method": "POST" } }"#,
    );
    let source = FileRuleSource::new(vec![RuleFile::as_given(&path)]);
    let document = pipeline(&RulecfnConfig::default(), Some("build7"))
        .run(&source, &rulecfn_core::TemplateDocument::default())
        .expect("compile");
    assert!(document.resources.contains_key("ApiDeploymentbuild7"));
    cleanup(&path);
}
