// crates/monitor-sync-core/src/core/naming.rs
// ============================================================================
// Module: Name Formatter
// Description: Provider-wide prefix and suffix for resource names.
// Purpose: Apply affixes on write and strip them on read.
// Dependencies: crate::core::state
// ============================================================================

//! ## Overview
//! Resources with a user-facing name keep two state fields: the short `name`
//! the user wrote and the `full_name` the remote stores. The formatter turns
//! one into the other.
//! Invariants:
//! - `undo_format(format(s)) == s` for every `s`.
//! - When `name` did not change, the stored `full_name` is sent verbatim so
//!   affixes added or removed on the remote never drift into `name`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::state::Fields;
use crate::core::state::ResourceState;

// ============================================================================
// SECTION: Formatter
// ============================================================================

/// Prefix/suffix formatter configured once per provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFormatter {
    /// Prepended to short names.
    prefix: String,
    /// Appended to short names.
    suffix: String,
}

impl NameFormatter {
    /// Creates a formatter.
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the configured suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns `prefix + short + suffix`.
    #[must_use]
    pub fn format(&self, short: &str) -> String {
        let mut full = String::with_capacity(self.prefix.len() + short.len() + self.suffix.len());
        full.push_str(&self.prefix);
        full.push_str(short);
        full.push_str(&self.suffix);
        full
    }

    /// Strips the prefix and suffix where present.
    #[must_use]
    pub fn undo_format(&self, full: &str) -> String {
        let without_prefix = full.strip_prefix(self.prefix.as_str()).unwrap_or(full);
        let residue = without_prefix.strip_suffix(self.suffix.as_str()).unwrap_or(without_prefix);
        residue.to_string()
    }

    /// Returns the full name to send for a state.
    ///
    /// Formats `name_field` when it changed or no full name is stored yet;
    /// otherwise returns the stored `full_name_field`.
    #[must_use]
    pub fn full_name_for(
        &self,
        state: &ResourceState,
        name_field: &str,
        full_name_field: &str,
    ) -> String {
        let stored = state.string(full_name_field);
        match stored {
            Some(full) if !state.has_change(name_field) => full,
            _ => self.format(&state.string_or_empty(name_field)),
        }
    }

    /// Writes `full_name_field` and the derived short `name_field`.
    pub fn write_names(
        &self,
        state: &mut ResourceState,
        full_name: &str,
        name_field: &str,
        full_name_field: &str,
    ) {
        state.set(full_name_field, full_name);
        state.set(name_field, self.undo_format(full_name));
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::Map;
    use serde_json::json;

    use super::*;

    #[test]
    fn format_and_undo_are_inverse() {
        let formatter = NameFormatter::new("prefix ", " suffix");
        assert_eq!(formatter.format("hello"), "prefix hello suffix");
        assert_eq!(formatter.undo_format("prefix hello suffix"), "hello");
    }

    #[test]
    fn undo_leaves_names_without_affixes_untouched() {
        let formatter = NameFormatter::new("[tf] ", "");
        assert_eq!(formatter.undo_format("manual name"), "manual name");
        assert_eq!(formatter.undo_format("[tf] managed"), "managed");
    }

    #[test]
    fn unchanged_name_keeps_stored_full_name() {
        let formatter = NameFormatter::new("new-", "");
        let mut values = Map::new();
        values.insert("name".to_string(), json!("hello"));
        values.insert("full_name".to_string(), json!("old-hello"));
        let state = ResourceState::applied("id", 0, values);
        assert_eq!(formatter.full_name_for(&state, "name", "full_name"), "old-hello");
    }

    #[test]
    fn changed_name_is_formatted() {
        let formatter = NameFormatter::new("new-", "");
        let mut prior = Map::new();
        prior.insert("name".to_string(), json!("hello"));
        prior.insert("full_name".to_string(), json!("old-hello"));
        let mut values = prior.clone();
        values.insert("name".to_string(), json!("world"));
        let state = ResourceState::planned("id", 0, prior, values);
        assert_eq!(formatter.full_name_for(&state, "name", "full_name"), "new-world");
    }
}
