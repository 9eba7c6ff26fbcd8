// crates/monitor-sync-core/src/core/schema.rs
// ============================================================================
// Module: Resource Schema
// Description: Declarative field descriptors with validation and normalization.
// Purpose: Reject invalid desired state early and keep stored state canonical.
// Dependencies: crate::core::canonical, serde_json, tag-filter
// ============================================================================

//! ## Overview
//! A [`Schema`] maps field names to [`Field`] descriptors. Each field has a
//! semantic type, a cardinality, optional item bounds, validators, a
//! diff-suppress predicate, and a state function applied on normalization.
//! Nested records are fields whose elements are blocks with their own schema.
//!
//! Three operations are offered:
//! - [`Schema::validate`] checks a value map before any remote call.
//! - [`Schema::normalize`] fills absent fields, sorts sets, applies state
//!   functions, and drops unknown keys.
//! - [`Schema::diff`] lists fields whose normalized values differ.
//!
//! Invariants:
//! - `normalize` is idempotent.
//! - `exactly_one_of` and `conflicts_with` only name siblings in the same
//!   block.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde_json::Map;
use serde_json::Value;

use crate::core::canonical;
use crate::core::error::SyncError;
use crate::core::state::is_populated;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
}

impl ValueType {
    /// Returns true when `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|number| number.fract() == 0.0)
            }
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Element type of a collection.
#[derive(Debug, Clone)]
pub enum Element {
    /// Scalar elements.
    Scalar(ValueType),
    /// Nested record elements.
    Block(Schema),
}

/// Semantic type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Single scalar.
    Scalar(ValueType),
    /// Ordered collection.
    List(Element),
    /// Unordered collection without duplicates.
    Set(Element),
    /// String-keyed map.
    Map(ValueType),
}

/// Who supplies a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cardinality {
    /// Must be set by the user.
    Required,
    /// May be set by the user.
    Optional,
    /// Set by the remote or the handle only.
    Computed,
    /// May be set by the user; filled from the remote otherwise.
    OptionalComputed,
    /// May be set by the user; the given value applies otherwise.
    Default(Value),
}

/// Predicate `(old, new)` returning true when a difference is insignificant.
pub type DiffSuppressFn = fn(&Value, &Value) -> bool;

/// Rewrites a stored value into its canonical state form.
pub type StateFn = fn(&Value) -> Value;

/// Custom validation hook.
pub type ValidateFn = fn(&Value) -> Result<(), String>;

/// Value validators.
#[derive(Debug, Clone)]
pub enum Validator {
    /// String must be one of the listed values.
    OneOf(&'static [&'static str]),
    /// Integer must be one of the listed values.
    IntOneOf(&'static [i64]),
    /// Integer must be within the inclusive range.
    IntRange {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// Number must be within the inclusive range.
    FloatRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// String length in characters must be within the inclusive range.
    StringLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// String must be valid JSON.
    Json,
    /// String must be a valid tag-filter expression.
    TagFilter,
    /// Custom check.
    Custom(ValidateFn),
}

impl Validator {
    /// Checks one scalar value.
    ///
    /// # Errors
    /// Returns the violation message.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::OneOf(allowed) => match value.as_str() {
                Some(text) if allowed.contains(&text) => Ok(()),
                Some(text) => Err(format!("expected one of [{}], got {text}", allowed.join(", "))),
                None => Ok(()),
            },
            Self::IntOneOf(allowed) => match value.as_i64() {
                Some(number) if allowed.contains(&number) => Ok(()),
                Some(number) => Err(format!(
                    "expected one of [{}], got {number}",
                    allowed.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
                )),
                None => Ok(()),
            },
            Self::IntRange {
                min,
                max,
            } => match value.as_i64() {
                Some(number) if (*min..=*max).contains(&number) => Ok(()),
                Some(number) => {
                    Err(format!("expected to be in the range ({min} - {max}), got {number}"))
                }
                None => Ok(()),
            },
            Self::FloatRange {
                min,
                max,
            } => match value.as_f64() {
                Some(number) if number >= *min && number <= *max => Ok(()),
                Some(number) => {
                    Err(format!("expected to be in the range ({min} - {max}), got {number}"))
                }
                None => Ok(()),
            },
            Self::StringLength {
                min,
                max,
            } => match value.as_str() {
                Some(text) => {
                    let length = text.chars().count();
                    if (*min..=*max).contains(&length) {
                        Ok(())
                    } else {
                        Err(format!(
                            "expected length to be in the range ({min} - {max}), got {length}"
                        ))
                    }
                }
                None => Ok(()),
            },
            Self::Json => match value.as_str() {
                Some(text) => canonical::canonicalize(text).map(|_| ()).map_err(|e| e.to_string()),
                None => Ok(()),
            },
            Self::TagFilter => match value.as_str() {
                Some(text) => tag_filter::parse(text).map(|_| ()).map_err(|err| err.to_string()),
                None => Ok(()),
            },
            Self::Custom(check) => check(value),
        }
    }
}

// ============================================================================
// SECTION: Field
// ============================================================================

/// Descriptor of one schema field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Semantic type.
    pub kind: FieldType,
    /// Who supplies the value.
    pub cardinality: Cardinality,
    /// Human readable description.
    pub description: &'static str,
    /// Minimum number of collection items.
    pub min_items: Option<usize>,
    /// Maximum number of collection items.
    pub max_items: Option<usize>,
    /// Validators applied to scalars or scalar elements.
    pub validators: Vec<Validator>,
    /// Predicate hiding insignificant differences.
    pub diff_suppress: Option<DiffSuppressFn>,
    /// Canonicalizer applied on normalization.
    pub state_func: Option<StateFn>,
    /// Sibling group of which exactly one must be set.
    pub exactly_one_of: Vec<&'static str>,
    /// Siblings that must not be set together with this field.
    pub conflicts_with: Vec<&'static str>,
    /// Value must not be logged or displayed.
    pub sensitive: bool,
}

impl Field {
    /// Creates an optional field of the given type.
    #[must_use]
    pub const fn new(kind: FieldType) -> Self {
        Self {
            kind,
            cardinality: Cardinality::Optional,
            description: "",
            min_items: None,
            max_items: None,
            validators: Vec::new(),
            diff_suppress: None,
            state_func: None,
            exactly_one_of: Vec::new(),
            conflicts_with: Vec::new(),
            sensitive: false,
        }
    }

    /// String field.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(FieldType::Scalar(ValueType::String))
    }

    /// Integer field.
    #[must_use]
    pub const fn int() -> Self {
        Self::new(FieldType::Scalar(ValueType::Int))
    }

    /// Float field.
    #[must_use]
    pub const fn float() -> Self {
        Self::new(FieldType::Scalar(ValueType::Float))
    }

    /// Boolean field.
    #[must_use]
    pub const fn bool() -> Self {
        Self::new(FieldType::Scalar(ValueType::Bool))
    }

    /// List of scalars.
    #[must_use]
    pub const fn list(element: ValueType) -> Self {
        Self::new(FieldType::List(Element::Scalar(element)))
    }

    /// Set of scalars.
    #[must_use]
    pub const fn set(element: ValueType) -> Self {
        Self::new(FieldType::Set(Element::Scalar(element)))
    }

    /// Map from string to scalar.
    #[must_use]
    pub const fn map(value: ValueType) -> Self {
        Self::new(FieldType::Map(value))
    }

    /// List of nested records.
    #[must_use]
    pub const fn block_list(schema: Schema) -> Self {
        Self::new(FieldType::List(Element::Block(schema)))
    }

    /// Set of nested records.
    #[must_use]
    pub const fn block_set(schema: Schema) -> Self {
        Self::new(FieldType::Set(Element::Block(schema)))
    }

    /// Marks the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    /// Marks the field computed.
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.cardinality = Cardinality::Computed;
        self
    }

    /// Marks the field optional and computed.
    #[must_use]
    pub fn optional_computed(mut self) -> Self {
        self.cardinality = Cardinality::OptionalComputed;
        self
    }

    /// Sets the default applied when the field is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.cardinality = Cardinality::Default(value.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the minimum number of items.
    #[must_use]
    pub const fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Sets the maximum number of items.
    #[must_use]
    pub const fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets the diff-suppress predicate.
    #[must_use]
    pub const fn diff_suppress(mut self, suppress: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(suppress);
        self
    }

    /// Sets the state function.
    #[must_use]
    pub const fn state_func(mut self, func: StateFn) -> Self {
        self.state_func = Some(func);
        self
    }

    /// Declares the sibling group of which exactly one must be set.
    #[must_use]
    pub fn exactly_one_of(mut self, group: &[&'static str]) -> Self {
        self.exactly_one_of = group.to_vec();
        self
    }

    /// Declares conflicting siblings.
    #[must_use]
    pub fn conflicts_with(mut self, others: &[&'static str]) -> Self {
        self.conflicts_with = others.to_vec();
        self
    }

    /// Marks the value sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Returns the value stored when the field is absent.
    fn absent_value(&self) -> Value {
        if let Cardinality::Default(value) = &self.cardinality {
            return value.clone();
        }
        match self.kind {
            FieldType::List(_) | FieldType::Set(_) => Value::Array(Vec::new()),
            FieldType::Map(_) => Value::Object(Map::new()),
            FieldType::Scalar(_) => Value::Null,
        }
    }

    /// Applies the state function, if any.
    fn apply_state_func(&self, value: &Value) -> Value {
        self.state_func.map_or_else(|| value.clone(), |func| func(value))
    }

    /// Returns the normalized form of a raw value.
    fn normalize(&self, raw: Option<&Value>) -> Value {
        let Some(value) = raw.filter(|value| !value.is_null()) else {
            return self.absent_value();
        };
        match &self.kind {
            FieldType::Scalar(_) | FieldType::Map(_) => self.apply_state_func(value),
            FieldType::List(element) => match value.as_array() {
                Some(items) => Value::Array(
                    items.iter().map(|item| self.normalize_element(element, item)).collect(),
                ),
                None => value.clone(),
            },
            FieldType::Set(element) => match value.as_array() {
                Some(items) => {
                    let mut keyed: Vec<(String, Value)> = items
                        .iter()
                        .map(|item| {
                            let normalized = self.normalize_element(element, item);
                            (sort_key(&normalized), normalized)
                        })
                        .collect();
                    keyed.sort_by(|left, right| left.0.cmp(&right.0));
                    keyed.dedup_by(|left, right| left.0 == right.0);
                    Value::Array(keyed.into_iter().map(|(_, item)| item).collect())
                }
                None => value.clone(),
            },
        }
    }

    /// Normalizes one collection element.
    fn normalize_element(&self, element: &Element, item: &Value) -> Value {
        match (element, item) {
            (Element::Block(schema), Value::Object(values)) => {
                Value::Object(schema.normalize(values))
            }
            (Element::Block(_), other) => other.clone(),
            (Element::Scalar(_), scalar) => self.apply_state_func(scalar),
        }
    }

    /// Records violations of a populated value.
    fn check(&self, value: &Value, path: &str, errors: &mut Vec<String>) {
        match &self.kind {
            FieldType::Scalar(value_type) => self.check_scalar(*value_type, value, path, errors),
            FieldType::List(element) | FieldType::Set(element) => {
                let Some(items) = value.as_array() else {
                    errors.push(format!("{path}: expected a list"));
                    return;
                };
                if let Some(min) = self.min_items
                    && items.len() < min
                {
                    errors.push(format!(
                        "{path}: attribute supports {min} item minimum, but config has {}",
                        items.len()
                    ));
                }
                if let Some(max) = self.max_items
                    && items.len() > max
                {
                    errors.push(format!(
                        "{path}: attribute supports {max} item maximum, but config has {} declared",
                        items.len()
                    ));
                }
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{path}.{index}");
                    match element {
                        Element::Scalar(value_type) => {
                            self.check_scalar(*value_type, item, &item_path, errors);
                        }
                        Element::Block(schema) => match item.as_object() {
                            Some(values) => schema.collect_errors(values, &item_path, errors),
                            None => errors.push(format!("{item_path}: expected a block")),
                        },
                    }
                }
            }
            FieldType::Map(value_type) => {
                let Some(entries) = value.as_object() else {
                    errors.push(format!("{path}: expected a map"));
                    return;
                };
                for (key, entry) in entries {
                    self.check_scalar(*value_type, entry, &format!("{path}.{key}"), errors);
                }
            }
        }
    }

    /// Records type and validator violations of a scalar.
    fn check_scalar(
        &self,
        value_type: ValueType,
        value: &Value,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        if !value_type.matches(value) {
            errors.push(format!("{path}: expected type {value_type}"));
            return;
        }
        for validator in &self.validators {
            if let Err(message) = validator.check(value) {
                errors.push(format!("{path}: {message}"));
            }
        }
    }
}

/// Sort key used to order set elements deterministically.
fn sort_key(value: &Value) -> String {
    canonical::canonical_value(value).unwrap_or_else(|_| value.to_string())
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Field map of a resource or nested block.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Fields keyed by name.
    fields: BTreeMap<&'static str, Field>,
}

impl Schema {
    /// Builds a schema from `(name, field)` pairs.
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = (&'static str, Field)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns one field descriptor.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterates fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Field)> {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a value map.
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] listing every violation.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), SyncError> {
        let mut errors = Vec::new();
        self.collect_errors(values, "", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Validation(errors.join("; ")))
        }
    }

    /// Records every violation of a block.
    fn collect_errors(&self, values: &Map<String, Value>, path: &str, errors: &mut Vec<String>) {
        let qualify = |name: &str| {
            if path.is_empty() { name.to_string() } else { format!("{path}.{name}") }
        };
        let populated = |name: &str| values.get(name).is_some_and(is_populated);
        let mut groups: BTreeSet<Vec<&'static str>> = BTreeSet::new();

        for (name, field) in &self.fields {
            let field_path = qualify(*name);
            match values.get(*name).filter(|value| is_populated(value)) {
                None => {
                    if field.cardinality == Cardinality::Required {
                        errors.push(format!("{field_path}: required field is missing"));
                    }
                }
                Some(value) => {
                    field.check(value, &field_path, errors);
                    for other in &field.conflicts_with {
                        if populated(*other) {
                            errors.push(format!("{field_path}: conflicts with {}", qualify(*other)));
                        }
                    }
                }
            }
            if !field.exactly_one_of.is_empty() {
                let mut group = field.exactly_one_of.clone();
                group.sort_unstable();
                group.dedup();
                groups.insert(group);
            }
        }

        for group in groups {
            let set: Vec<&str> = group.iter().copied().filter(|name| populated(*name)).collect();
            let listed = group.iter().map(|name| qualify(*name)).collect::<Vec<_>>().join(", ");
            match set.len() {
                1 => {}
                0 => errors.push(format!("one of `{listed}` must be specified")),
                _ => errors.push(format!(
                    "only one of `{listed}` can be specified, but `{}` were specified",
                    set.iter().map(|name| qualify(*name)).collect::<Vec<_>>().join(", ")
                )),
            }
        }
    }

    /// Returns the canonical state form of a value map.
    #[must_use]
    pub fn normalize(&self, values: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, field)| ((*name).to_string(), field.normalize(values.get(*name))))
            .collect()
    }

    /// Lists fields whose values differ between `old` and `new`.
    ///
    /// Diff-suppress predicates are honoured. Computed fields are ignored, and
    /// optional-computed fields are ignored when `new` leaves them unset.
    #[must_use]
    pub fn diff(&self, old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<&'static str> {
        let old = self.normalize(old);
        let new = self.normalize(new);
        let mut changed = Vec::new();
        for (name, field) in &self.fields {
            let (Some(before), Some(after)) = (old.get(*name), new.get(*name)) else {
                continue;
            };
            if before == after {
                continue;
            }
            match field.cardinality {
                Cardinality::Computed => continue,
                Cardinality::OptionalComputed if !is_populated(after) => continue,
                _ => {}
            }
            if field.diff_suppress.is_some_and(|suppress| suppress(before, after)) {
                continue;
            }
            changed.push(*name);
        }
        changed
    }
}

// ============================================================================
// SECTION: Diff Suppressors
// ============================================================================

/// Suppresses differences between JSON texts with equal canonical forms.
#[must_use]
pub fn suppress_equivalent_json(old: &Value, new: &Value) -> bool {
    match (old.as_str(), new.as_str()) {
        (Some(old), Some(new)) => canonical::equivalent(old, new),
        _ => false,
    }
}

/// Suppresses differences when `new` normalizes to the stored tag filter.
#[must_use]
pub fn suppress_equivalent_tag_filter(old: &Value, new: &Value) -> bool {
    match (old.as_str(), new.as_str()) {
        (Some(old), Some(new)) => tag_filter::is_equivalent(old, new),
        _ => false,
    }
}

/// Suppresses differences in letter case.
#[must_use]
pub fn suppress_case_insensitive(old: &Value, new: &Value) -> bool {
    match (old.as_str(), new.as_str()) {
        (Some(old), Some(new)) => old.eq_ignore_ascii_case(new),
        _ => false,
    }
}

// ============================================================================
// SECTION: State Functions
// ============================================================================

/// Stores JSON text canonically; invalid JSON is kept verbatim.
#[must_use]
pub fn canonical_json_state(value: &Value) -> Value {
    value
        .as_str()
        .and_then(|text| canonical::canonicalize(text).ok())
        .map_or_else(|| value.clone(), Value::String)
}

/// Stores tag filters in normalized form; unparsable input is kept verbatim.
#[must_use]
pub fn normalized_tag_filter_state(value: &Value) -> Value {
    value
        .as_str()
        .and_then(|text| tag_filter::normalize(text).ok())
        .map_or_else(|| value.clone(), Value::String)
}
