//! Engine-wide knobs a host application can embed in its own configuration.

use serde::{Deserialize, Serialize};

/// The UPDATE-tracking granularity requested for a table.
///
/// Mirrors the `0`/`1`/`2` integer argument of the SQL-facing
/// `undoable_table(name, granularity)` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateGranularity {
    /// No UPDATE trigger is installed at all.
    None,
    /// One UPDATE trigger per table, covering every non-key column.
    Table,
    /// One UPDATE trigger per non-key column.
    Column,
}

impl UpdateGranularity {
    /// Maps the SQL-facing `0`/`1`/`2` convention onto a variant.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(UpdateGranularity::None),
            1 => Some(UpdateGranularity::Table),
            2 => Some(UpdateGranularity::Column),
            _ => None,
        }
    }
}

/// Names and defaults used when attaching the engine to a connection.
///
/// The hardcoded `_undo`/`_u_` names in the rest of this crate's
/// documentation are this struct's [`Default`] values; a host application
/// embedding its own config file can override them to avoid colliding with
/// objects it creates itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoRedoConfig {
    /// Name of the append-only log table. Defaults to `_undo`.
    pub log_table: String,
    /// Prefix used for generated trigger names. Defaults to `_u_`.
    pub trigger_prefix: String,
    /// Granularity used by [`crate::UndoRedoEngine::make_undoable`] callers
    /// that don't specify one explicitly.
    pub default_granularity: UpdateGranularity,
}

impl Default for UndoRedoConfig {
    fn default() -> Self {
        UndoRedoConfig {
            log_table: "_undo".to_owned(),
            trigger_prefix: "_u_".to_owned(),
            default_granularity: UpdateGranularity::Table,
        }
    }
}
