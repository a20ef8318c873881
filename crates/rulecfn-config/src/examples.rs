// crates/rulecfn-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `rulecfn.toml`. The example is validated by the test
//! suite so it cannot drift from the config model.

/// Returns a canonical example `rulecfn.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[template]
description = "LambdaCfn"
format_version = "2010-09-09"

[namespace]
packages = ["@mapbox/patrol-rules-aws", "patrol-rules-github"]

[rules]
paths = ["rules/root-login.json"]

[build]
runtime = "nodejs"

[deployment]
revision = "content_hash"

[output]
path = "build/template.json"
"#,
    )
}
