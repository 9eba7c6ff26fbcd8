// crates/monitor-sync-core/src/core/variant.rs
// ============================================================================
// Module: Variant Axes
// Description: Sibling-block protocol for discriminated remote records.
// Purpose: Select the populated variant block and emit all siblings on read.
// Dependencies: crate::core::state, serde_json
// ============================================================================

//! ## Overview
//! A variant axis is a group of sibling blocks of which exactly one holds a
//! single element. The populated sibling decides the remote discriminator.
//! Invariants:
//! - [`VariantAxis::select`] fails unless exactly one sibling is populated.
//! - [`VariantAxis::emit`] writes every sibling: the chosen one as a
//!   single-element list, the others as empty lists.
//! - The discriminator table is a compile-time constant per axis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::error::SyncError;
use crate::core::state::BlockView;
use crate::core::state::Fields;

// ============================================================================
// SECTION: Variant Axis
// ============================================================================

/// Discriminator table of one variant axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantAxis {
    /// Noun used in error messages, e.g. `alerting channel`.
    pub label: &'static str,
    /// `(wire discriminator, sibling block name)` pairs.
    pub variants: &'static [(&'static str, &'static str)],
}

impl VariantAxis {
    /// Returns the sibling block names.
    pub fn blocks(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(_, block)| *block)
    }

    /// Returns the sibling block names as a vector, for schema groups.
    #[must_use]
    pub fn block_names(&self) -> Vec<&'static str> {
        self.blocks().collect()
    }

    /// Maps a wire discriminator to its block name.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] for unknown discriminators.
    pub fn block_for(&self, discriminator: &str) -> Result<&'static str, SyncError> {
        self.variants
            .iter()
            .find(|(wire, _)| *wire == discriminator)
            .map(|(_, block)| *block)
            .ok_or_else(|| {
                SyncError::validation(format!(
                    "{discriminator} is not a supported {}",
                    self.label
                ))
            })
    }

    /// Maps a block name to its wire discriminator.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] for unknown block names.
    pub fn discriminator_for(&self, block: &str) -> Result<&'static str, SyncError> {
        self.variants
            .iter()
            .find(|(_, name)| *name == block)
            .map(|(wire, _)| *wire)
            .ok_or_else(|| SyncError::validation(format!("{block} is not a supported {}", self.label)))
    }

    /// Returns the single populated sibling and its block.
    ///
    /// # Errors
    /// Returns `no supported <label> defined` when no sibling is populated and
    /// `more than one <label> defined` when several are.
    pub fn select<'a, F: Fields>(
        &self,
        source: &'a F,
    ) -> Result<(&'static str, BlockView<'a>), SyncError> {
        let mut chosen: Option<(&'static str, BlockView<'a>)> = None;
        for block in self.blocks() {
            if let Some(view) = source.block(block) {
                if chosen.is_some() {
                    return Err(SyncError::validation(format!(
                        "more than one {} defined",
                        self.label
                    )));
                }
                chosen = Some((block, view));
            }
        }
        chosen.ok_or_else(|| SyncError::validation(format!("no supported {} defined", self.label)))
    }

    /// Writes every sibling into `target`; only `chosen` holds `inner`.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] when `chosen` is not a sibling.
    pub fn emit(
        &self,
        target: &mut Map<String, Value>,
        chosen: &str,
        inner: Map<String, Value>,
    ) -> Result<(), SyncError> {
        if !self.blocks().any(|block| block == chosen) {
            return Err(SyncError::validation(format!("{chosen} is not a supported {}", self.label)));
        }
        let mut inner = Some(inner);
        for block in self.blocks() {
            let value = if block == chosen {
                inner
                    .take()
                    .map_or_else(|| Value::Array(Vec::new()), |map| Value::Array(vec![Value::Object(map)]))
            } else {
                Value::Array(Vec::new())
            };
            target.insert(block.to_string(), value);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test assertions use unwrap for clarity.")]

    use serde_json::json;

    use super::*;

    const SHAPES: VariantAxis = VariantAxis {
        label: "shape",
        variants: &[("circle", "circle"), ("squareShape", "square")],
    };

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn select_requires_exactly_one_sibling() {
        let none = object(json!({"circle": [], "square": []}));
        let err = SHAPES.select(&none).unwrap_err();
        assert_eq!(err.to_string(), "no supported shape defined");

        let both = object(json!({"circle": [{"r": 1}], "square": [{"side": 2}]}));
        let err = SHAPES.select(&both).unwrap_err();
        assert_eq!(err.to_string(), "more than one shape defined");

        let one = object(json!({"circle": [], "square": [{"side": 2}]}));
        let (block, view) = SHAPES.select(&one).unwrap();
        assert_eq!(block, "square");
        assert_eq!(view.int("side"), Some(2));
    }

    #[test]
    fn emit_writes_every_sibling() {
        let mut target = Map::new();
        SHAPES.emit(&mut target, "circle", object(json!({"r": 3}))).unwrap();
        assert_eq!(Value::Object(target), json!({"circle": [{"r": 3}], "square": []}));
    }

    #[test]
    fn discriminators_map_both_ways() {
        assert_eq!(SHAPES.block_for("squareShape").unwrap(), "square");
        assert_eq!(SHAPES.discriminator_for("square").unwrap(), "squareShape");
        assert!(SHAPES.block_for("triangle").is_err());
    }
}
