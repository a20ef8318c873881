// crates/rulecfn-core/src/runtime/env/tests.rs
// ============================================================================
// Module: Rule Runtime Helper Tests
// Description: Unit tests for list splitting and namespaced lookup.
// Purpose: Pin whitespace handling and first-match lookup semantics.
// Dependencies: super
// ============================================================================

//! ## Overview
//! Exercises [`super::split_on_comma`] and [`super::find_namespaced_var`].

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

use super::find_namespaced_var;
use super::split_on_comma;

#[test]
fn split_trims_whitespace_around_commas_only() {
    assert_eq!(split_on_comma(Some("a , b,c  ,  d")), vec!["a", "b", "c", "d"]);
    assert_eq!(split_on_comma(Some(" a,b ")), vec![" a", "b "]);
}

#[test]
fn split_unset_or_empty_yields_nothing() {
    assert!(split_on_comma(None).is_empty());
    assert!(split_on_comma(Some("")).is_empty());
}

#[test]
fn split_single_value_is_untouched() {
    assert_eq!(split_on_comma(Some("alpha")), vec!["alpha"]);
}

#[test]
fn lookup_matches_namespaced_name() {
    let vars = [("HOME", "/root"), ("rootLoginblockedIps", "1.1.1.1"), ("otherblockedIps", "x")];
    assert_eq!(find_namespaced_var(vars, "blockedIps"), "1.1.1.1");
}

#[test]
fn lookup_without_match_is_empty() {
    let vars = [("HOME", "/root")];
    assert_eq!(find_namespaced_var(vars, "missing"), "");
}
