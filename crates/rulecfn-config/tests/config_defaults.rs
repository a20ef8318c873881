//! Config defaults and core validation tests for rulecfn-config.
// crates/rulecfn-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Core Validation Tests
// Description: Validate default behavior and section invariants.
// Purpose: Ensure minimal config is valid and invalid values fail closed.
// =============================================================================

use common::assert_invalid;
use rulecfn_config::RevisionMode;
use rulecfn_config::config_toml_example;
use rulecfn_core::DeploymentRevision;

mod common;

type TestResult = Result<(), String>;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn defaults_match_compiler_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let options = config.compile_options();
    if options.description != "LambdaCfn" || options.format_version != "2010-09-09" {
        return Err("template defaults should match the compiler".to_string());
    }
    if options.revision != DeploymentRevision::ContentHash {
        return Err("revision should default to content hash".to_string());
    }
    if config.rule_builder().runtime() != "nodejs" {
        return Err("runtime should default to nodejs".to_string());
    }
    if !config.rule_paths().is_empty() || config.output_path().is_some() {
        return Err("rules and output should default to empty".to_string());
    }
    Ok(())
}

#[test]
fn example_config_parses_and_validates() -> TestResult {
    let config =
        common::config_from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.namespace.packages.len() != 2 {
        return Err("example should declare two packages".to_string());
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    match common::config_from_toml("[build]\nruntime = \"nodejs\"\nhandler = \"x\"\n") {
        Err(_) => Ok(()),
        Ok(_) => Err("unknown key should fail to parse".to_string()),
    }
}

#[test]
fn blank_runtime_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.build.runtime = "  ".to_string();
    assert_invalid(config.validate(), "build.runtime must be non-empty")
}

#[test]
fn blank_description_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.template.description = String::new();
    assert_invalid(config.validate(), "template.description must be non-empty")
}

#[test]
fn duplicate_packages_rejected_case_insensitively() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.namespace.packages = vec!["pkg-one".to_string(), "PKG-ONE".to_string()];
    assert_invalid(config.validate(), "namespace.packages contains duplicate entry")
}

#[test]
fn too_many_packages_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.namespace.packages = (0 .. 257).map(|idx| format!("pkg-{idx}")).collect();
    assert_invalid(config.validate(), "namespace.packages exceeds max entries")
}

#[test]
fn blank_rule_path_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.rules.paths = vec![String::new()];
    assert_invalid(config.validate(), "rules.paths entry must be non-empty")
}

#[test]
fn long_output_path_component_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.output.path = Some(format!("build/{}", "a".repeat(300)));
    assert_invalid(config.validate(), "output.path path component too long")
}

// ============================================================================
// SECTION: Deployment Revision
// ============================================================================

#[test]
fn token_mode_requires_token() -> TestResult {
    let config = common::config_from_toml("[deployment]\nrevision = \"token\"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "deployment.revision=token requires deployment.token")
}

#[test]
fn token_must_be_alphanumeric() -> TestResult {
    let config =
        common::config_from_toml("[deployment]\nrevision = \"token\"\ntoken = \"v1-2\"\n")
            .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "deployment.token")
}

#[test]
fn token_without_token_mode_rejected() -> TestResult {
    let config = common::config_from_toml("[deployment]\nrevision = \"fixed\"\ntoken = \"abc\"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "deployment.token requires deployment.revision=token")
}

#[test]
fn token_mode_maps_to_token_revision() -> TestResult {
    let config =
        common::config_from_toml("[deployment]\nrevision = \"token\"\ntoken = \"build42\"\n")
            .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.deployment.revision != RevisionMode::Token {
        return Err("revision mode should parse as token".to_string());
    }
    if config.compile_options().revision != DeploymentRevision::Token("build42".to_string()) {
        return Err("token should flow into compile options".to_string());
    }
    Ok(())
}

#[test]
fn fixed_mode_maps_to_fixed_revision() -> TestResult {
    let config = common::config_from_toml("[deployment]\nrevision = \"fixed\"\n")
        .map_err(|err| err.to_string())?;
    if config.compile_options().revision != DeploymentRevision::Fixed {
        return Err("fixed mode should map to fixed revision".to_string());
    }
    Ok(())
}

#[test]
fn configured_packages_drive_the_namer() -> TestResult {
    let config = common::config_from_toml("[namespace]\npackages = [\"pkg-one\"]\n")
        .map_err(|err| err.to_string())?;
    let name = config.namer().namespace("watch", "node_modules/pkg-one/rules/watch.js");
    if name != "pkgonewatch" {
        return Err(format!("unexpected namespaced name {name}"));
    }
    Ok(())
}
