// crates/rulecfn-core/tests/proptest_sizing.rs
// ============================================================================
// Module: Sizing And Namespacing Property-Based Tests
// Description: Property tests for compute sizing fallbacks and name stripping.
// Purpose: Check sizing and namespacing invariants across wide input ranges.
// ============================================================================

//! Property-based tests for sizing and namespacing invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use rulecfn_core::Namer;
use rulecfn_core::RuleConfig;
use rulecfn_core::core::strip_punctuation;
use rulecfn_core::fragments;
use rulecfn_core::fragments::effective_memory_size;
use rulecfn_core::fragments::effective_timeout;
use serde_json::Number;

/// Any JSON number a rule author could write: negative, fractional, or huge.
fn any_number() -> impl Strategy<Value = Number> {
    prop_oneof![
        any::<i64>().prop_map(Number::from),
        any::<u64>().prop_map(Number::from),
        (-1.0e12_f64 .. 1.0e12_f64).prop_filter_map("finite", Number::from_f64),
    ]
}

proptest! {
    #[test]
    fn timeout_is_supplied_value_or_default(requested in proptest::option::of(any::<u32>())) {
        let timeout = effective_timeout(requested.map(Number::from).as_ref());
        match requested {
            Some(value) if (1 ..= 300).contains(&value) => prop_assert_eq!(timeout, value),
            _ => prop_assert_eq!(timeout, 60),
        }
    }

    #[test]
    fn memory_is_a_valid_step_or_minimum(requested in proptest::option::of(0u32 .. 4096)) {
        let memory = effective_memory_size(requested.map(Number::from).as_ref());
        prop_assert!((128 ..= 1536).contains(&memory));
        prop_assert_eq!(memory % 64, 0);
        if let Some(value) = requested
            && memory != value
        {
            prop_assert_eq!(memory, 128);
        }
    }

    #[test]
    fn arbitrary_numbers_stay_within_sizing_bounds(requested in any_number()) {
        let memory = effective_memory_size(Some(&requested));
        let timeout = effective_timeout(Some(&requested));
        prop_assert!((128 ..= 1536).contains(&memory));
        prop_assert_eq!(memory % 64, 0);
        prop_assert!((1 ..= 300).contains(&timeout));
        let whole = requested.as_u64();
        if whole != Some(u64::from(memory)) {
            prop_assert_eq!(memory, 128);
        }
        if whole != Some(u64::from(timeout)) {
            prop_assert_eq!(timeout, 60);
        }
    }

    #[test]
    fn compute_unit_carries_effective_sizing(
        memory in proptest::option::of(any_number()),
        timeout in proptest::option::of(any_number()),
    ) {
        let rule = RuleConfig {
            memory_size: memory.clone(),
            timeout: timeout.clone(),
            ..RuleConfig::named("sized")
        };
        let unit = fragments::compute_unit(&rule, "nodejs").unwrap();
        let expected_memory = serde_json::json!(effective_memory_size(memory.as_ref()));
        let expected_timeout = serde_json::json!(effective_timeout(timeout.as_ref()));
        prop_assert_eq!(&unit.properties["MemorySize"], &expected_memory);
        prop_assert_eq!(&unit.properties["Timeout"], &expected_timeout);
    }

    #[test]
    fn stripped_names_are_alphanumeric(name in ".*") {
        let stripped = strip_punctuation(&name);
        prop_assert!(stripped.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn distinct_packages_namespace_distinctly(
        name in "[a-zA-Z][a-zA-Z0-9]{0,12}",
        first in "[a-z]{3,8}",
        second in "[a-z]{3,8}",
    ) {
        prop_assume!(!first.contains(&second) && !second.contains(&first));
        let namer = Namer::new([first.clone(), second.clone()]);
        let a = namer.namespace(&name, &format!("/{first}/"));
        let b = namer.namespace(&name, &format!("/{second}/"));
        prop_assert_ne!(a, b);
    }

    #[test]
    fn unmatched_paths_keep_the_name(name in "[a-zA-Z0-9]{1,12}") {
        let namer = Namer::new(["zzz-unmatched-package"]);
        prop_assert_eq!(namer.namespace(&name, "rules/local.js"), name);
    }
}
