// crates/monitor-sync-core/src/core/migration.rs
// ============================================================================
// Module: State Migration
// Description: Ordered upgraders from older schema versions.
// Purpose: Bring stored state to the current schema before any CRUD call.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! Each schema version increase is paired with exactly one [`StateUpgrader`]
//! whose `version` is the version it upgrades *from*. Upgraders are pure
//! functions over the raw value map.
//! State machine: `Stored(v) -> Upgraded(v+1) -> ... -> Current(V)`; any
//! failure ends in an error and no remote call is made.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use tracing::info;

use crate::core::error::SyncError;

// ============================================================================
// SECTION: Upgraders
// ============================================================================

/// Pure raw-map transformation.
pub type UpgradeFn = fn(Map<String, Value>) -> Result<Map<String, Value>, String>;

/// Upgrade step from `version` to `version + 1`.
#[derive(Debug, Clone, Copy)]
pub struct StateUpgrader {
    /// Version this step upgrades from.
    pub version: u32,
    /// Transformation.
    pub upgrade: UpgradeFn,
}

/// Checks that every version below `target` has exactly one upgrader.
///
/// # Errors
/// Returns [`SyncError::Migration`] naming the first gap or duplicate.
pub fn check_upgraders(target: u32, upgraders: &[StateUpgrader]) -> Result<(), SyncError> {
    for version in 0 .. target {
        let count = upgraders.iter().filter(|step| step.version == version).count();
        if count != 1 {
            return Err(SyncError::Migration(format!(
                "expected exactly one upgrader from version {version}, found {count}"
            )));
        }
    }
    if let Some(step) = upgraders.iter().find(|step| step.version >= target) {
        return Err(SyncError::Migration(format!(
            "upgrader from version {} exceeds schema version {target}",
            step.version
        )));
    }
    Ok(())
}

/// Runs the upgraders from `from` up to `target`.
///
/// # Errors
/// Returns [`SyncError::Migration`] when the stored version is newer than the
/// schema, an upgrader is missing, or an upgrader fails.
pub fn upgrade_state(
    resource: &str,
    mut raw: Map<String, Value>,
    from: u32,
    target: u32,
    upgraders: &[StateUpgrader],
) -> Result<Map<String, Value>, SyncError> {
    if from > target {
        return Err(SyncError::Migration(format!(
            "stored schema version {from} is newer than supported version {target}"
        )));
    }
    for version in from .. target {
        let step = upgraders.iter().find(|step| step.version == version).ok_or_else(|| {
            SyncError::Migration(format!("no upgrader from version {version}"))
        })?;
        raw = (step.upgrade)(raw).map_err(|message| {
            SyncError::Migration(format!("upgrade from version {version} failed: {message}"))
        })?;
        info!(resource, from = version, to = version + 1, "upgraded stored state");
    }
    Ok(raw)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test assertions use unwrap for clarity.")]

    use serde_json::json;

    use super::*;

    fn add_marker(mut raw: Map<String, Value>) -> Result<Map<String, Value>, String> {
        raw.insert("marker".to_string(), json!(true));
        Ok(raw)
    }

    fn keep(raw: Map<String, Value>) -> Result<Map<String, Value>, String> {
        Ok(raw)
    }

    fn fail(_: Map<String, Value>) -> Result<Map<String, Value>, String> {
        Err("legacy layout".to_string())
    }

    #[test]
    fn upgraders_run_in_order() {
        let upgraders = [
            StateUpgrader {
                version: 1,
                upgrade: keep,
            },
            StateUpgrader {
                version: 0,
                upgrade: add_marker,
            },
        ];
        check_upgraders(2, &upgraders).unwrap();
        let upgraded = upgrade_state("test", Map::new(), 0, 2, &upgraders).unwrap();
        assert_eq!(upgraded.get("marker"), Some(&json!(true)));
    }

    #[test]
    fn failures_and_gaps_are_migration_errors() {
        let failing = [StateUpgrader {
            version: 0,
            upgrade: fail,
        }];
        let err = upgrade_state("test", Map::new(), 0, 1, &failing).unwrap_err();
        assert!(matches!(err, SyncError::Migration(message) if message.contains("legacy layout")));

        assert!(check_upgraders(2, &failing).is_err());
        assert!(upgrade_state("test", Map::new(), 3, 1, &failing).is_err());
    }
}
