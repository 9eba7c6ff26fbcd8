// crates/tag-filter/src/lib.rs
// ============================================================================
// Module: Tag Filter Root
// Description: Public API surface for the tag-filter expression language.
// Purpose: Wire together the AST, parser, and wire-model mapper.
// Dependencies: crate::{ast, parser, api}
// ============================================================================

//! ## Overview
//! Tag filters are boolean predicates over tagged attributes, used by alert
//! configurations to scope which calls, beacons, or entities are evaluated.
//! The crate parses the textual form into a [`TagFilterExpression`], prints it
//! back in a canonical normalized form, and maps it to and from the nested
//! JSON model used by the remote API.
//!
//! ### Example
//!
//! ```
//! use tag_filter::normalize;
//!
//! let normalized = normalize("service.name  equals 'x' and (a is_empty or b not_blank)").unwrap();
//! assert_eq!(normalized, "service.name EQUALS 'x' AND (a IS_EMPTY OR b NOT_BLANK)");
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod ast;
pub mod parser;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::LogicalOperator;
pub use api::TagFilter;
pub use api::TagFilterElementType;
pub use api::TagFilterEntity;
pub use ast::ComparisonExpression;
pub use ast::ComparisonOperator;
pub use ast::EntityOrigin;
pub use ast::Literal;
pub use ast::TagFilterExpression;
pub use ast::TagKey;
pub use ast::UnaryExpression;
pub use ast::UnaryOperator;
pub use parser::TagFilterError;
pub use parser::parse;

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Parses the expression and prints it back in canonical form.
///
/// Operators and keywords are uppercased, whitespace collapses to single
/// spaces, strings are single quoted, and parentheses only remain where an
/// `OR` group is nested inside an `AND` group.
///
/// # Errors
/// Returns [`TagFilterError`] when the input does not parse.
pub fn normalize(input: &str) -> Result<String, TagFilterError> {
    parse(input).map(|expression| expression.to_string())
}

/// Returns true when `new` normalizes to exactly `old`.
///
/// Used as a diff-suppress predicate: the stored value is always the
/// normalized form, so an equivalent spelling in the desired state does not
/// register as a change. Unparseable input never suppresses.
#[must_use]
pub fn is_equivalent(old: &str, new: &str) -> bool {
    normalize(new).is_ok_and(|normalized| normalized == old)
}
