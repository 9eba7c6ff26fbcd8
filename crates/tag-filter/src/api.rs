// crates/tag-filter/src/api.rs
// ============================================================================
// Module: Tag Filter Wire Model
// Description: Nested JSON representation of tag filters used by the remote API.
// Purpose: Map expressions to and from the `EXPRESSION` / `TAG_FILTER` tree.
// Dependencies: crate::ast, serde, serde_json
// ============================================================================

//! ## Overview
//! The remote API represents a filter as a tree of elements. Composite
//! elements carry `type: "EXPRESSION"`, a `logicalOperator`, and `elements`;
//! leaves carry `type: "TAG_FILTER"`, `name`, `operator`, at most one typed
//! value, and `entity`.
//! Invariants:
//! - Leaves emitted by [`TagFilter::from_expression`] always carry `entity`
//!   (`NOT_APPLICABLE` when unspecified).
//! - An `EXPRESSION` with no elements means "no filter".

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

use crate::ast::ComparisonOperator;
use crate::ast::EntityOrigin;
use crate::ast::Literal;
use crate::ast::TagFilterExpression;
use crate::ast::TagKey;
use crate::ast::UnaryOperator;
use crate::parser::TagFilterError;
use crate::parser::is_printable_tag_key;

// ============================================================================
// SECTION: Wire Enumerations
// ============================================================================

/// Element discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagFilterElementType {
    /// Composite element with children.
    Expression,
    /// Leaf predicate.
    TagFilter,
}

/// Logical operator of a composite element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

/// Call side a leaf applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagFilterEntity {
    /// Source side.
    Source,
    /// Destination side.
    Destination,
    /// Not side specific.
    NotApplicable,
}

impl From<EntityOrigin> for TagFilterEntity {
    fn from(origin: EntityOrigin) -> Self {
        match origin {
            EntityOrigin::Source => Self::Source,
            EntityOrigin::Destination => Self::Destination,
            EntityOrigin::NotApplicable => Self::NotApplicable,
        }
    }
}

impl From<TagFilterEntity> for EntityOrigin {
    fn from(entity: TagFilterEntity) -> Self {
        match entity {
            TagFilterEntity::Source => Self::Source,
            TagFilterEntity::Destination => Self::Destination,
            TagFilterEntity::NotApplicable => Self::NotApplicable,
        }
    }
}

// ============================================================================
// SECTION: Wire Element
// ============================================================================

/// One element of the remote tag-filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilter {
    /// Element discriminator.
    #[serde(rename = "type")]
    pub element_type: TagFilterElementType,
    /// Logical operator for composite elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
    /// Children of composite elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<TagFilter>>,
    /// Tag name of a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Key within a key/value tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,
    /// Operator keyword of a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// String literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// Numeric literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<Number>,
    /// Boolean literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    /// Call side of a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<TagFilterEntity>,
}

impl TagFilter {
    /// Returns the element used when no filter is configured.
    #[must_use]
    pub const fn empty() -> Self {
        Self::expression(LogicalOperator::And, Vec::new())
    }

    /// Builds a composite element.
    #[must_use]
    pub const fn expression(operator: LogicalOperator, elements: Vec<Self>) -> Self {
        Self {
            element_type: TagFilterElementType::Expression,
            logical_operator: Some(operator),
            elements: Some(elements),
            name: None,
            tag_key: None,
            operator: None,
            string_value: None,
            number_value: None,
            boolean_value: None,
            entity: None,
        }
    }

    /// Builds a leaf element with no value set.
    fn leaf(key: &TagKey, operator: &str) -> Self {
        Self {
            element_type: TagFilterElementType::TagFilter,
            logical_operator: None,
            elements: None,
            name: Some(key.name.clone()),
            tag_key: key.tag_key.clone(),
            operator: Some(operator.to_string()),
            string_value: None,
            number_value: None,
            boolean_value: None,
            entity: Some(key.entity.into()),
        }
    }

    /// Maps an optional expression; `None` yields [`TagFilter::empty`].
    #[must_use]
    pub fn from_optional_expression(expression: Option<&TagFilterExpression>) -> Self {
        expression.map_or_else(Self::empty, Self::from_expression)
    }

    /// Maps an expression to its wire element.
    #[must_use]
    pub fn from_expression(expression: &TagFilterExpression) -> Self {
        match expression {
            TagFilterExpression::And(children) => Self::expression(
                LogicalOperator::And,
                children.iter().map(Self::from_expression).collect(),
            ),
            TagFilterExpression::Or(children) => Self::expression(
                LogicalOperator::Or,
                children.iter().map(Self::from_expression).collect(),
            ),
            TagFilterExpression::Comparison(comparison) => {
                let mut leaf = Self::leaf(&comparison.key, comparison.operator.as_str());
                match &comparison.value {
                    Literal::String(value) => leaf.string_value = Some(value.clone()),
                    Literal::Number(value) => leaf.number_value = Some(value.clone()),
                    Literal::Bool(value) => leaf.boolean_value = Some(*value),
                }
                leaf
            }
            TagFilterExpression::Unary(unary) => Self::leaf(&unary.key, unary.operator.as_str()),
        }
    }

    /// Maps the wire element back to an expression.
    ///
    /// Returns `Ok(None)` for an empty composite element.
    ///
    /// # Errors
    /// Returns [`TagFilterError::InvalidWireModel`] when a leaf lacks a name
    /// or operator, its name or tag key is not a valid identifier, it carries
    /// an unknown operator, or a comparison has no value.
    pub fn to_expression(&self) -> Result<Option<TagFilterExpression>, TagFilterError> {
        match self.element_type {
            TagFilterElementType::Expression => {
                let mut children = Vec::new();
                for element in self.elements.iter().flatten() {
                    if let Some(child) = element.to_expression()? {
                        children.push(child);
                    }
                }
                if children.is_empty() {
                    return Ok(None);
                }
                let expression = match self.logical_operator.unwrap_or(LogicalOperator::And) {
                    LogicalOperator::And => TagFilterExpression::and(children),
                    LogicalOperator::Or => TagFilterExpression::or(children),
                };
                Ok(Some(expression))
            }
            TagFilterElementType::TagFilter => self.leaf_to_expression().map(Some),
        }
    }

    /// Maps a `TAG_FILTER` leaf.
    fn leaf_to_expression(&self) -> Result<TagFilterExpression, TagFilterError> {
        let name = self
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| TagFilterError::InvalidWireModel("tag filter without name".into()))?;
        let operator = self
            .operator
            .as_deref()
            .ok_or_else(|| TagFilterError::InvalidWireModel(format!("{name} has no operator")))?;
        let key = TagKey {
            name,
            tag_key: self.tag_key.clone().filter(|key| !key.is_empty()),
            entity: self.entity.map_or(EntityOrigin::NotApplicable, EntityOrigin::from),
        };
        if !is_printable_tag_key(&key) {
            return Err(TagFilterError::InvalidWireModel(format!("`{key}` is not a valid tag name")));
        }
        if let Some(unary) = UnaryOperator::from_keyword(operator) {
            return Ok(TagFilterExpression::unary(key, unary));
        }
        let comparison = ComparisonOperator::from_keyword(operator).ok_or_else(|| {
            TagFilterError::InvalidWireModel(format!("{operator} is not a supported operator"))
        })?;
        let value = if let Some(value) = &self.string_value {
            Literal::String(value.clone())
        } else if let Some(value) = &self.number_value {
            Literal::Number(value.clone())
        } else if let Some(value) = self.boolean_value {
            Literal::Bool(value)
        } else {
            return Err(TagFilterError::InvalidWireModel(format!(
                "{} {operator} has no value",
                key.name
            )));
        };
        Ok(TagFilterExpression::comparison(key, comparison, value))
    }
}
