//! Tag filter property-based tests.
//!
//! ## Purpose
//! Generated expressions are printed with random spacing and casing, then
//! checked for normalization idempotence and AST equivalence. Arbitrary text
//! must never panic the parser.
// crates/tag-filter/tests/proptest_normalize.rs
// ============================================================================
// Module: Tag Filter Property-Based Tests
// Description: Idempotence and equivalence of normalization.
// Purpose: Ensure normalize(normalize(s)) == normalize(s) and parse stability.
// ============================================================================

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
use tag_filter::ComparisonOperator;
use tag_filter::TagFilter;
use tag_filter::UnaryOperator;
use tag_filter::normalize;
use tag_filter::parse;

/// Generates identifiers that are not logical keywords.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,8}".prop_filter("logical keywords are reserved", |name| {
        name != "and" && name != "or"
    })
}

/// Generates a leaf predicate in loosely formatted text.
fn leaf() -> impl Strategy<Value = String> {
    let comparison = (
        identifier(),
        prop::sample::select(ComparisonOperator::ALL.to_vec()),
        prop_oneof![
            "[a-zA-Z0-9 ]{0,6}".prop_map(|s| format!("'{s}'")),
            (-1000i64 .. 1000).prop_map(|n| n.to_string()),
            (-1.0e3f64 .. 1.0e3).prop_map(|n| n.to_string()),
            (1u32 .. 1000, -40i32 .. 40, any::<bool>())
                .prop_map(|(mantissa, exponent, upper)| {
                    let marker = if upper { 'E' } else { 'e' };
                    format!("{mantissa}{marker}{exponent}")
                }),
            any::<bool>().prop_map(|b| if b { "true".to_string() } else { "FALSE".to_string() }),
        ],
        any::<bool>(),
    )
        .prop_map(|(name, op, literal, lower)| {
            let op = if lower { op.as_str().to_ascii_lowercase() } else { op.as_str().to_string() };
            format!("{name}  {op}   {literal}")
        });
    let unary = (identifier(), prop::sample::select(UnaryOperator::ALL.to_vec()))
        .prop_map(|(name, op)| format!("{name} {}", op.as_str()));
    prop_oneof![comparison, unary]
}

/// Generates nested expressions with explicit parentheses.
fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 24, 4, |inner| {
        (prop::collection::vec(inner, 2 .. 4), any::<bool>(), any::<bool>()).prop_map(
            |(parts, use_and, wrap)| {
                let joined = parts.join(if use_and { " and " } else { " OR " });
                if wrap { format!("( {joined} )") } else { joined }
            },
        )
    })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(input in expression()) {
        let once = normalize(&input).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn normalization_preserves_the_ast(input in expression()) {
        let original = parse(&input).unwrap();
        let reparsed = parse(&normalize(&input).unwrap()).unwrap();
        prop_assert_eq!(original, reparsed);
    }

    #[test]
    fn wire_mapping_preserves_the_ast(input in expression()) {
        let original = parse(&input).unwrap();
        let mapped = TagFilter::from_expression(&original).to_expression().unwrap();
        prop_assert_eq!(Some(original), mapped);
    }

    #[test]
    fn arbitrary_text_never_panics(raw in ".{0,64}") {
        let _ = parse(&raw);
    }
}
