// crates/rulecfn-cli/tests/compile_command.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests driving the rulecfn binary end to end.
// Purpose: Ensure compile, check, handlers, fragment, and config commands
// produce deterministic output and fail closed on bad input.
// Dependencies: rulecfn-cli binary
// ============================================================================
//! ## Overview
//! Spawns the `rulecfn` binary against rule definition files in a temporary
//! directory and inspects stdout, stderr, and written templates.

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
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const ROOT_LOGIN_RULE: &str = r#"{
  "name": "rootLogin",
  "eventRule": {
    "eventPattern": {
      "detail-type": ["AWS Console Sign In via CloudTrail"],
      "detail": { "userIdentity": { "type": ["Root"] } }
    }
  },
  "statements": [
    { "Effect": "Allow", "Action": ["iam:ListAccountAliases"], "Resource": "*" }
  ]
}"#;

const WEBHOOK_RULE: &str = r#"{
  "name": "webhook",
  "gatewayRule": { "method": "POST", "apiKey": true }
}"#;

fn rulecfn_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rulecfn"))
}

fn temp_root(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("rulecfn-cli-{label}-{nanos}"));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_dir_all(path);
}

fn write(root: &Path, name: &str, contents: &str) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(&path, contents).expect("write file");
    path
}

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(rulecfn_bin())
        .current_dir(root)
        .env_remove("RULECFN_CONFIG")
        .env_remove("RULECFN_LOG")
        .args(args)
        .output()
        .expect("run rulecfn")
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// SECTION: Compile
// ============================================================================

#[test]
fn compile_prints_template_to_stdout() {
    let root = temp_root("compile-stdout");
    let rule = write(&root, "rules/root-login.json", ROOT_LOGIN_RULE);

    let output = run(&root, &["compile", "--rules", &path_arg(&rule)]);
    let template = stdout_json(&output);

    let resources = template["Resources"].as_object().expect("resources");
    for key in [
        "rootLogin",
        "rootLoginPermission",
        "rootLoginEventRule",
        "rootLoginAlarmErrors",
        "StreambotEnvrootLogin",
        "LambdaCfnRole",
        "LambdaCfnAlarmSNSTopic",
    ] {
        assert!(resources.contains_key(key), "missing {key}");
    }
    assert_eq!(template["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert_eq!(
        template["Resources"]["rootLogin"]["Metadata"]["sourcePath"],
        json!(path_arg(&rule))
    );
    assert!(output.stdout.ends_with(b"}\n"));
    cleanup(&root);
}

#[test]
fn compile_is_deterministic_across_runs() {
    let root = temp_root("compile-determinism");
    let first = write(&root, "rules/root-login.json", ROOT_LOGIN_RULE);
    let second = write(&root, "rules/webhook.json", WEBHOOK_RULE);
    let (first, second) = (path_arg(&first), path_arg(&second));
    let args = ["compile", "--rules", first.as_str(), second.as_str()];

    let one = run(&root, &args);
    let two = run(&root, &args);
    assert!(one.status.success(), "stderr: {}", String::from_utf8_lossy(&one.stderr));
    assert_eq!(one.stdout, two.stdout);
    cleanup(&root);
}

#[test]
fn compile_uses_config_rules_and_output_path() {
    let root = temp_root("compile-config");
    write(&root, "rules/webhook.json", WEBHOOK_RULE);
    let config = write(
        &root,
        "rulecfn.toml",
        "[rules]\npaths = [\"rules/webhook.json\"]\n\n[deployment]\nrevision = \"fixed\"\n\n\
         [output]\npath = \"build/template.json\"\n",
    );

    let output = run(&root, &["compile", "--config", &path_arg(&config)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let written = fs::read(root.join("build/template.json")).expect("template written");
    let template: Value = serde_json::from_slice(&written).expect("template json");
    assert!(template["Resources"]["ApiDeployment"].is_object());
    assert_eq!(template["Resources"]["ApiKey"]["DependsOn"], json!("ApiDeployment"));
    assert!(template["Outputs"]["webhookAPIEndpoint"].is_object());
    cleanup(&root);
}

#[test]
fn compile_output_does_not_depend_on_working_directory() {
    let root = temp_root("compile-cwd");
    let project = root.join("project");
    write(&project, "rules/webhook.json", WEBHOOK_RULE);
    write(&project, "rulecfn.toml", "[rules]\npaths = [\"rules/webhook.json\"]\n");

    let inside = run(&project, &["compile", "--config", "rulecfn.toml"]);
    let outside = run(&root, &["compile", "--config", "project/rulecfn.toml"]);
    let template = stdout_json(&inside);
    assert!(outside.status.success(), "stderr: {}", String::from_utf8_lossy(&outside.stderr));
    assert_eq!(inside.stdout, outside.stdout);
    assert_eq!(
        template["Resources"]["webhook"]["Metadata"]["sourcePath"],
        json!("rules/webhook.json")
    );

    let written = write(&project, "template.json", &String::from_utf8_lossy(&inside.stdout));
    let written_arg = path_arg(&written);
    let checked = run(
        &root,
        &["check", "--config", "project/rulecfn.toml", "--template", written_arg.as_str()],
    );
    assert!(checked.status.success(), "stderr: {}", String::from_utf8_lossy(&checked.stderr));
    cleanup(&root);
}

#[test]
fn compile_revision_token_flag_sets_deployment_key() {
    let root = temp_root("compile-token");
    let rule = write(&root, "webhook.json", WEBHOOK_RULE);
    let output =
        run(&root, &["compile", "--rules", &path_arg(&rule), "--revision-token", "abc123"]);
    let template = stdout_json(&output);
    assert!(template["Resources"]["ApiDeploymentabc123"].is_object());
    cleanup(&root);
}

#[test]
fn compile_rejects_duplicate_rule_names() {
    let root = temp_root("compile-duplicate");
    let first = write(&root, "a.json", ROOT_LOGIN_RULE);
    let second = write(&root, "b.json", ROOT_LOGIN_RULE);
    let output = run(&root, &["compile", "--rules", &path_arg(&first), &path_arg(&second)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("compile failed"), "stderr: {stderr}");
    assert!(stderr.contains("rootLogin"), "stderr: {stderr}");
    cleanup(&root);
}

#[test]
fn compile_reports_rule_path_for_invalid_rule() {
    let root = temp_root("compile-invalid");
    let rule = write(&root, "broken.json", r#"{ "name": "broken", "scheduledRule": "" }"#);
    let output = run(&root, &["compile", "--rules", &path_arg(&rule)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.json"), "stderr: {stderr}");
    assert!(stderr.contains("scheduledRule must not be empty"), "stderr: {stderr}");
    cleanup(&root);
}

#[test]
fn compile_folds_into_base_template() {
    let root = temp_root("compile-base");
    let rule = write(&root, "rule.json", ROOT_LOGIN_RULE);
    let base = write(
        &root,
        "base.json",
        r#"{ "Description": "patrol", "Resources": { "Bucket": { "Type": "AWS::S3::Bucket" } } }"#,
    );
    let output =
        run(&root, &["compile", "--rules", &path_arg(&rule), "--base", &path_arg(&base)]);
    let template = stdout_json(&output);
    assert_eq!(template["Description"], json!("patrol"));
    assert!(template["Resources"]["Bucket"].is_object());
    assert!(template["Resources"]["rootLogin"].is_object());
    cleanup(&root);
}

// ============================================================================
// SECTION: Check
// ============================================================================

#[test]
fn check_passes_for_fresh_template_and_fails_after_edit() {
    let root = temp_root("check");
    let rule = write(&root, "rule.json", ROOT_LOGIN_RULE);
    let template = root.join("template.json");

    let compiled = run(
        &root,
        &["compile", "--rules", &path_arg(&rule), "--out", &path_arg(&template)],
    );
    assert!(compiled.status.success(), "stderr: {}", String::from_utf8_lossy(&compiled.stderr));

    let (rule_arg, template_arg) = (path_arg(&rule), path_arg(&template));
    let check_args = ["check", "--rules", rule_arg.as_str(), "--template", template_arg.as_str()];
    let fresh = run(&root, &check_args);
    assert!(fresh.status.success(), "stderr: {}", String::from_utf8_lossy(&fresh.stderr));
    assert!(String::from_utf8_lossy(&fresh.stdout).contains("is up to date"));

    let mut edited: Value =
        serde_json::from_slice(&fs::read(&template).expect("read template")).expect("json");
    edited["Description"] = json!("edited by hand");
    fs::write(&template, serde_json::to_vec(&edited).expect("render")).expect("write template");

    let stale = run(&root, &check_args);
    assert!(!stale.status.success());
    assert!(String::from_utf8_lossy(&stale.stderr).contains("is out of date"));
    cleanup(&root);
}

// ============================================================================
// SECTION: Inspection
// ============================================================================

#[test]
fn handlers_lists_sourced_compute_units() {
    let root = temp_root("handlers");
    let first = write(&root, "root-login.json", ROOT_LOGIN_RULE);
    let second = write(&root, "webhook.json", WEBHOOK_RULE);
    let template = root.join("template.json");
    let compiled = run(
        &root,
        &[
            "compile",
            "--rules",
            &path_arg(&first),
            &path_arg(&second),
            "--out",
            &path_arg(&template),
        ],
    );
    assert!(compiled.status.success(), "stderr: {}", String::from_utf8_lossy(&compiled.stderr));

    let manifest = stdout_json(&run(&root, &["handlers", "--template", &path_arg(&template)]));
    assert_eq!(
        manifest,
        json!([
            {
                "export": "rootLogin",
                "handler": "index.rootLogin",
                "sourcePath": path_arg(&first)
            },
            {
                "export": "webhook",
                "handler": "index.webhook",
                "sourcePath": path_arg(&second)
            }
        ])
    );
    cleanup(&root);
}

#[test]
fn fragment_prints_single_fragment() {
    let root = temp_root("fragment");
    let rule = write(&root, "rule.json", ROOT_LOGIN_RULE);
    let fragment =
        stdout_json(&run(&root, &["fragment", "--rule", &path_arg(&rule), "--kind", "eventRule"]));
    assert_eq!(fragment["Type"], json!("AWS::Events::Rule"));
    assert_eq!(fragment["Properties"]["Targets"][0]["Id"], json!("rootLogin"));
    cleanup(&root);
}

#[test]
fn fragment_rejects_unknown_kind() {
    let root = temp_root("fragment-kind");
    let rule = write(&root, "rule.json", ROOT_LOGIN_RULE);
    let output = run(&root, &["fragment", "--rule", &path_arg(&rule), "--kind", "lambda"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown fragment kind: lambda"));
    cleanup(&root);
}

// ============================================================================
// SECTION: Config
// ============================================================================

#[test]
fn config_validate_accepts_example_and_rejects_bad_token() {
    let root = temp_root("config-validate");
    let example = run(&root, &["config", "example"]);
    assert!(example.status.success());
    let good = write(&root, "good.toml", &String::from_utf8_lossy(&example.stdout));
    let ok = run(&root, &["config", "validate", "--config", &path_arg(&good)]);
    assert!(ok.status.success(), "stderr: {}", String::from_utf8_lossy(&ok.stderr));
    assert_eq!(String::from_utf8_lossy(&ok.stdout), "config ok\n");

    let bad = write(&root, "bad.toml", "[deployment]\nrevision = \"token\"\n");
    let failed = run(&root, &["config", "validate", "--config", &path_arg(&bad)]);
    assert!(!failed.status.success());
    assert!(String::from_utf8_lossy(&failed.stderr).contains("requires deployment.token"));
    cleanup(&root);
}

#[test]
fn config_validate_requires_a_config_file() {
    let root = temp_root("config-missing");
    let output = run(&root, &["config", "validate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("config io error"));
    cleanup(&root);
}
