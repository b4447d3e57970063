//! A trigger-synthesized undo/redo engine for SQLite tables.
//!
//! [`UndoRedoEngine::attach`] turns a connection into one that can track
//! undo/redo history for a chosen set of tables. [`UndoRedoEngine::make_undoable`]
//! equips a table with triggers that, while a session is open, record the
//! inverse of every INSERT/UPDATE/DELETE fired against it into a private
//! log. [`UndoRedoEngine::begin`]/[`UndoRedoEngine::end`] frame a session;
//! [`UndoRedoEngine::undo`]/[`UndoRedoEngine::redo`] step through the
//! resulting history one logical transaction at a time.
//!
//! ```no_run
//! use rusqlite::Connection;
//! use sqlite_undo_redo::{UndoRedoEngine, UpdateGranularity};
//!
//! # fn main() -> Result<(), sqlite_undo_redo::Error> {
//! let conn = Connection::open_in_memory()?;
//! conn.execute("CREATE TABLE t(id INTEGER PRIMARY KEY, v TEXT)", [])?;
//!
//! let engine = UndoRedoEngine::attach(&conn)?;
//! engine.make_undoable("t", UpdateGranularity::Column)?;
//!
//! engine.undoable("INSERT INTO t VALUES(1,'a')")?;
//! let undone = engine.undo()?.unwrap();
//! assert_eq!(undone.sql, "DELETE FROM \"t\" WHERE rowid=1");
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod engine;
mod error;
mod inverse;
mod log_store;
mod schema;
mod session;
mod triggers;

pub use config::{UndoRedoConfig, UpdateGranularity};
pub use driver::{Direction, UndoRedoResult};
pub use engine::UndoRedoEngine;
pub use error::{Error, Result};
pub use schema::ColumnInfo;
pub use session::UndoStatus;

// Exposed for trigger-synthesis unit tests and the demo binary that wants
// to show column introspection without going through `make_undoable`.
#[doc(hidden)]
pub use schema::columns_of;
