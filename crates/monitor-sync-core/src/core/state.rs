// crates/monitor-sync-core/src/core/state.rs
// ============================================================================
// Module: Resource State
// Description: Field-name to value container for one resource instance.
// Purpose: Carry desired and applied values across a single CRUD call.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`ResourceState`] holds the values of one resource instance as JSON
//! values keyed by schema field name, the remote ID, and the values last
//! applied so handles can ask whether a field changed.
//! Nested blocks are JSON objects inside lists; [`BlockView`] reads them
//! through the same [`Fields`] accessors as the top level.
//!
//! Invariants:
//! - The ID is empty iff the resource does not exist remotely.
//! - Absent optional scalars are `null`; absent collections are `[]` or `{}`
//!   once the schema normalized the state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Field Access
// ============================================================================

/// Typed read access over a JSON object of field values.
///
/// Scalar accessors return `None` for missing, `null`, or wrongly typed
/// values. [`Fields::string`] also treats the empty string as unset.
pub trait Fields {
    /// Returns the raw value of a field.
    fn raw(&self, key: &str) -> Option<&Value>;

    /// Returns a non-empty string field.
    fn string(&self, key: &str) -> Option<String> {
        self.raw(key).and_then(Value::as_str).filter(|value| !value.is_empty()).map(str::to_string)
    }

    /// Returns a string field or the empty string.
    fn string_or_empty(&self, key: &str) -> String {
        self.string(key).unwrap_or_default()
    }

    /// Returns a boolean field.
    fn bool(&self, key: &str) -> Option<bool> {
        self.raw(key).and_then(Value::as_bool)
    }

    /// Returns a boolean field, `false` when unset.
    fn flag(&self, key: &str) -> bool {
        self.bool(key).unwrap_or(false)
    }

    /// Returns an integer field.
    fn int(&self, key: &str) -> Option<i64> {
        self.raw(key).and_then(|value| {
            value.as_i64().or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(float_to_i64))
        })
    }

    /// Returns a floating point field.
    fn float(&self, key: &str) -> Option<f64> {
        self.raw(key).and_then(Value::as_f64)
    }

    /// Returns the string elements of a list or set field.
    fn strings(&self, key: &str) -> Vec<String> {
        self.raw(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns the integer elements of a list or set field.
    fn ints(&self, key: &str) -> Vec<i64> {
        self.raw(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    /// Returns a string map field.
    fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.raw(key)
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every nested block of a list or set field.
    fn blocks(&self, key: &str) -> Vec<BlockView<'_>> {
        self.raw(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).map(BlockView::new).collect())
            .unwrap_or_default()
    }

    /// Returns the first nested block of a list field.
    fn block(&self, key: &str) -> Option<BlockView<'_>> {
        self.raw(key)
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(Value::as_object)
            .map(BlockView::new)
    }

    /// Returns true when a field holds a non-null, non-empty value.
    fn is_set(&self, key: &str) -> bool {
        self.raw(key).is_some_and(is_populated)
    }
}

/// Returns true for values that count as "set" for cardinality checks.
#[must_use]
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        Value::String(text) => !text.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Converts an integral float without silent wrap-around.
#[allow(clippy::cast_possible_truncation, reason = "Caller checked the value is integral.")]
fn float_to_i64(value: f64) -> i64 {
    if value >= i64::MAX as f64 {
        i64::MAX
    } else if value <= i64::MIN as f64 {
        i64::MIN
    } else {
        value as i64
    }
}

// ============================================================================
// SECTION: Block View
// ============================================================================

/// Borrowed view over one nested block.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    /// Field values of the block.
    values: &'a Map<String, Value>,
}

impl<'a> BlockView<'a> {
    /// Wraps a JSON object.
    #[must_use]
    pub const fn new(values: &'a Map<String, Value>) -> Self {
        Self {
            values,
        }
    }

    /// Returns the underlying object.
    #[must_use]
    pub const fn values(&self) -> &'a Map<String, Value> {
        self.values
    }
}

impl Fields for BlockView<'_> {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl Fields for Map<String, Value> {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

// ============================================================================
// SECTION: Resource State
// ============================================================================

/// State of one resource instance during a CRUD call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Remote ID; empty when the resource does not exist remotely.
    id: String,
    /// Schema version the values were written with.
    schema_version: u32,
    /// Current (desired or refreshed) values.
    values: Map<String, Value>,
    /// Values last applied; the baseline for change detection.
    prior: Map<String, Value>,
}

impl ResourceState {
    /// Creates an empty state for a resource that does not exist yet.
    #[must_use]
    pub fn new(schema_version: u32) -> Self {
        Self {
            schema_version,
            ..Self::default()
        }
    }

    /// Creates a state whose values equal the last applied values.
    #[must_use]
    pub fn applied(id: impl Into<String>, schema_version: u32, values: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            schema_version,
            prior: values.clone(),
            values,
        }
    }

    /// Creates a state carrying planned values on top of the applied ones.
    #[must_use]
    pub fn planned(
        id: impl Into<String>,
        schema_version: u32,
        prior: Map<String, Value>,
        values: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            schema_version,
            values,
            prior,
        }
    }

    /// Returns the remote ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the remote ID.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Marks the resource as absent remotely.
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Returns the schema version of the values.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Sets the schema version of the values.
    pub const fn set_schema_version(&mut self, version: u32) {
        self.schema_version = version;
    }

    /// Returns the current values.
    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Replaces the current values.
    pub fn set_values(&mut self, values: Map<String, Value>) {
        self.values = values;
    }

    /// Returns the last applied values.
    #[must_use]
    pub const fn prior(&self) -> &Map<String, Value> {
        &self.prior
    }

    /// Returns one value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Writes one value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Returns true when a field differs from the last applied value.
    ///
    /// `null` and a missing entry compare equal.
    #[must_use]
    pub fn has_change(&self, key: &str) -> bool {
        let current = self.values.get(key).filter(|v| !v.is_null());
        let prior = self.prior.get(key).filter(|v| !v.is_null());
        current != prior
    }

    /// Makes the current values the applied baseline.
    pub fn commit(&mut self) {
        self.prior = self.values.clone();
    }
}

impl Fields for ResourceState {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

// ============================================================================
// SECTION: Value Builders
// ============================================================================

/// Builds a JSON list from strings.
#[must_use]
pub fn string_list<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(items.into_iter().map(|item| Value::String(item.into())).collect())
}

/// Builds a JSON object from string pairs.
#[must_use]
pub fn string_map<I, K, V>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Value::Object(entries.into_iter().map(|(k, v)| (k.into(), Value::String(v.into()))).collect())
}

/// Wraps one block as a single-element list.
#[must_use]
pub fn single_block(block: Map<String, Value>) -> Value {
    Value::Array(vec![Value::Object(block)])
}

/// Builds a list of blocks.
#[must_use]
pub fn block_list(blocks: impl IntoIterator<Item = Map<String, Value>>) -> Value {
    Value::Array(blocks.into_iter().map(Value::Object).collect())
}

/// Returns an empty list value.
#[must_use]
pub const fn empty_list() -> Value {
    Value::Array(Vec::new())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
