//! The error type returned by every fallible operation in this crate.

/// Errors that can occur while installing triggers, running an undoable
/// session, or stepping the undo/redo stacks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `make_undoable` was called with an empty table name.
    #[error("table name must be a non-empty string")]
    InvalidTableName,

    /// `undoable_table`'s `granularity` argument was outside `0..=2`.
    #[error("invalid update_type; valid values: 0 None, 1 Table, 2 Column")]
    InvalidUpdateType,

    /// Column introspection failed or returned no columns for the table.
    #[error("failed to create triggers for table {table:?}")]
    CreateTriggersFailed {
        /// The table that could not be introspected.
        table: String,
    },

    /// The SQL passed to `undoable` was empty.
    #[error("SQL must be a non-empty string")]
    InvalidSql,

    /// `begin` was called while a session was already open (or while replaying).
    #[error("undoable is already active")]
    AlreadyActive,

    /// `end` or `step` was called while no session was open.
    #[error("undoable is not active")]
    NotActive,

    /// `end` observed that the connection had already left the transaction
    /// it opened, i.e. something committed or rolled back underneath it.
    #[error("a rollback occurred")]
    RollbackOccurred,

    /// The final `COMMIT` of a session failed.
    #[error("commit failed")]
    CommitFailed,

    /// Any other failure reported by the host connection, unmodified.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
