// crates/tag-filter/src/ast.rs
// ============================================================================
// Module: Tag Filter AST
// Description: Expression tree for tag-filter predicates.
// Purpose: Represent parsed filters and print them in canonical form.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The AST has two composite nodes (`And`, `Or`) and two leaves (comparison
//! and unary operator). Composite nodes are always built through
//! [`TagFilterExpression::and`] and [`TagFilterExpression::or`], which flatten
//! nested groups of the same operator and unwrap single-element groups, so two
//! spellings of the same predicate produce equal trees.
//! Invariants:
//! - An `And` node never has an `And` child; an `Or` node never has an `Or`
//!   child.
//! - Composite nodes have at least two children.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Number;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `EQUALS`
    Equals,
    /// `NOT_EQUAL`
    NotEqual,
    /// `CONTAINS`
    Contains,
    /// `NOT_CONTAIN`
    NotContain,
    /// `STARTS_WITH`
    StartsWith,
    /// `ENDS_WITH`
    EndsWith,
    /// `NOT_STARTS_WITH`
    NotStartsWith,
    /// `NOT_ENDS_WITH`
    NotEndsWith,
    /// `LESS_THAN`
    LessThan,
    /// `LESS_OR_EQUAL_THAN`
    LessOrEqualThan,
    /// `GREATER_THAN`
    GreaterThan,
    /// `GREATER_OR_EQUAL_THAN`
    GreaterOrEqualThan,
}

impl ComparisonOperator {
    /// All comparison operators in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Equals,
        Self::NotEqual,
        Self::Contains,
        Self::NotContain,
        Self::StartsWith,
        Self::EndsWith,
        Self::NotStartsWith,
        Self::NotEndsWith,
        Self::LessThan,
        Self::LessOrEqualThan,
        Self::GreaterThan,
        Self::GreaterOrEqualThan,
    ];

    /// Returns the canonical keyword, which is also the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEqual => "NOT_EQUAL",
            Self::Contains => "CONTAINS",
            Self::NotContain => "NOT_CONTAIN",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::NotStartsWith => "NOT_STARTS_WITH",
            Self::NotEndsWith => "NOT_ENDS_WITH",
            Self::LessThan => "LESS_THAN",
            Self::LessOrEqualThan => "LESS_OR_EQUAL_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterOrEqualThan => "GREATER_OR_EQUAL_THAN",
        }
    }

    /// Looks up an operator keyword, ignoring ASCII case.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str().eq_ignore_ascii_case(keyword))
    }
}

/// Unary operators that test a tag without a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `IS_EMPTY`
    IsEmpty,
    /// `NOT_EMPTY`
    NotEmpty,
    /// `IS_BLANK`
    IsBlank,
    /// `NOT_BLANK`
    NotBlank,
}

impl UnaryOperator {
    /// All unary operators in declaration order.
    pub const ALL: [Self; 4] = [Self::IsEmpty, Self::NotEmpty, Self::IsBlank, Self::NotBlank];

    /// Returns the canonical keyword, which is also the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsEmpty => "IS_EMPTY",
            Self::NotEmpty => "NOT_EMPTY",
            Self::IsBlank => "IS_BLANK",
            Self::NotBlank => "NOT_BLANK",
        }
    }

    /// Looks up an operator keyword, ignoring ASCII case.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str().eq_ignore_ascii_case(keyword))
    }
}

// ============================================================================
// SECTION: Leaves
// ============================================================================

/// Side of a call a tag is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityOrigin {
    /// Source side, written `@src`.
    Source,
    /// Destination side, written `@dest`.
    Destination,
    /// No side; the default when no suffix is written.
    #[default]
    NotApplicable,
}

impl EntityOrigin {
    /// Returns the identifier suffix used in the textual form.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Source => "@src",
            Self::Destination => "@dest",
            Self::NotApplicable => "",
        }
    }

    /// Parses the part after `@`, ignoring ASCII case.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "src" => Some(Self::Source),
            "dest" => Some(Self::Destination),
            "na" => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

/// Tag reference on the left-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagKey {
    /// Tag name, e.g. `service.name`.
    pub name: String,
    /// Key within a key/value tag, written `name:key`.
    pub tag_key: Option<String>,
    /// Call side the tag is evaluated against.
    pub entity: EntityOrigin,
}

impl TagKey {
    /// Creates a plain tag reference with no key and no entity side.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag_key: None,
            entity: EntityOrigin::NotApplicable,
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(tag_key) = &self.tag_key {
            write!(f, ":{tag_key}")?;
        }
        f.write_str(self.entity.suffix())
    }
}

/// Literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Quoted string.
    String(String),
    /// Integer or decimal number.
    Number(Number),
    /// `TRUE` or `FALSE`.
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => {
                f.write_str("'")?;
                for ch in value.chars() {
                    if ch == '\'' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("'")
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
        }
    }
}

/// `key OPERATOR literal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonExpression {
    /// Tag being compared.
    pub key: TagKey,
    /// Comparison operator.
    pub operator: ComparisonOperator,
    /// Right-hand literal.
    pub value: Literal,
}

/// `key UNARY_OPERATOR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnaryExpression {
    /// Tag being tested.
    pub key: TagKey,
    /// Unary operator.
    pub operator: UnaryOperator,
}

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// Parsed tag-filter predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagFilterExpression {
    /// Conjunction of at least two children, none of which is an `And`.
    And(Vec<TagFilterExpression>),
    /// Disjunction of at least two children, none of which is an `Or`.
    Or(Vec<TagFilterExpression>),
    /// Binary comparison leaf.
    Comparison(ComparisonExpression),
    /// Unary operator leaf.
    Unary(UnaryExpression),
}

impl TagFilterExpression {
    /// Builds a conjunction, flattening nested conjunctions.
    ///
    /// A single child is returned unchanged. An empty input yields an empty
    /// `And`, which callers treat as "no filter".
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::And(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 { flat.remove(0) } else { Self::And(flat) }
    }

    /// Builds a disjunction, flattening nested disjunctions.
    ///
    /// A single child is returned unchanged.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::Or(grandchildren) => flat.extend(grandchildren),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 { flat.remove(0) } else { Self::Or(flat) }
    }

    /// Builds a comparison leaf.
    #[must_use]
    pub const fn comparison(key: TagKey, operator: ComparisonOperator, value: Literal) -> Self {
        Self::Comparison(ComparisonExpression {
            key,
            operator,
            value,
        })
    }

    /// Builds a unary leaf.
    #[must_use]
    pub const fn unary(key: TagKey, operator: UnaryOperator) -> Self {
        Self::Unary(UnaryExpression {
            key,
            operator,
        })
    }

    /// Returns the nesting depth of the tree; leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Comparison(_) | Self::Unary(_) => 1,
        }
    }

    /// Writes a child of an `And` node, parenthesizing `Or` groups.
    fn fmt_and_child(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self, Self::Or(_)) { write!(f, "({self})") } else { write!(f, "{self}") }
    }
}

/// Prints the canonical normalized form.
impl fmt::Display for TagFilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" AND ")?;
                    }
                    child.fmt_and_child(f)?;
                }
                Ok(())
            }
            Self::Or(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" OR ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Self::Comparison(comparison) => write!(
                f,
                "{} {} {}",
                comparison.key,
                comparison.operator.as_str(),
                comparison.value
            ),
            Self::Unary(unary) => write!(f, "{} {}", unary.key, unary.operator.as_str()),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    fn leaf(name: &str) -> TagFilterExpression {
        TagFilterExpression::unary(TagKey::new(name), UnaryOperator::IsEmpty)
    }

    #[test]
    fn and_flattens_nested_conjunctions() {
        let inner = TagFilterExpression::and(vec![leaf("b"), leaf("c")]);
        let outer = TagFilterExpression::and(vec![leaf("a"), inner]);
        assert_eq!(outer, TagFilterExpression::And(vec![leaf("a"), leaf("b"), leaf("c")]));
    }

    #[test]
    fn single_child_groups_unwrap() {
        assert_eq!(TagFilterExpression::or(vec![leaf("a")]), leaf("a"));
        assert_eq!(TagFilterExpression::and(vec![leaf("a")]), leaf("a"));
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let expr = TagFilterExpression::and(vec![
            leaf("a"),
            TagFilterExpression::or(vec![leaf("b"), leaf("c")]),
        ]);
        assert_eq!(expr.to_string(), "a IS_EMPTY AND (b IS_EMPTY OR c IS_EMPTY)");
    }

    #[test]
    fn and_inside_or_is_not_parenthesized() {
        let expr = TagFilterExpression::or(vec![
            leaf("a"),
            TagFilterExpression::and(vec![leaf("b"), leaf("c")]),
        ]);
        assert_eq!(expr.to_string(), "a IS_EMPTY OR b IS_EMPTY AND c IS_EMPTY");
    }

    #[test]
    fn string_literals_escape_quotes_and_backslashes() {
        let literal = Literal::String("it's a \\ test".to_string());
        assert_eq!(literal.to_string(), "'it\\'s a \\\\ test'");
    }

    #[test]
    fn tag_key_prints_key_and_entity() {
        let key = TagKey {
            name: "call.http.header".to_string(),
            tag_key: Some("x-id".to_string()),
            entity: EntityOrigin::Destination,
        };
        assert_eq!(key.to_string(), "call.http.header:x-id@dest");
    }

    #[test]
    fn depth_counts_levels() {
        let expr = TagFilterExpression::and(vec![
            leaf("a"),
            TagFilterExpression::or(vec![leaf("b"), leaf("c")]),
        ]);
        assert_eq!(expr.depth(), 3);
    }
}
