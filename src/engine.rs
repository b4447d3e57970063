//! The engine handle: one per connection, owning the activation flag, the
//! session state, and the configuration used to install the log store,
//! triggers, and SQL-callable surface.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::config::{UndoRedoConfig, UpdateGranularity};
use crate::driver::{self, Direction, UndoRedoResult};
use crate::error::{Error, Result};
use crate::log_store::{self, REDO_ROW_IDS};
use crate::schema::quote_ident;
use crate::session::{SessionState, UndoStatus};
use crate::triggers;

/// A per-connection handle for the undo/redo engine.
///
/// Created once per [`Connection`] via [`UndoRedoEngine::attach`]. The
/// activation flag and session state live behind [`Cell`]/[`AtomicBool`],
/// so state-mutating operations only need `&self` — the single-writer
/// discipline this relies on comes from the connection itself being
/// single-threaded (see the Open Questions in `DESIGN.md`), not from a
/// mutex this crate adds on top.
pub struct UndoRedoEngine<'conn> {
    conn: &'conn Connection,
    config: UndoRedoConfig,
    active: Arc<AtomicBool>,
    session: Cell<SessionState>,
}

impl<'conn> UndoRedoEngine<'conn> {
    /// Attaches the engine to `conn` using [`UndoRedoConfig::default`].
    pub fn attach(conn: &'conn Connection) -> Result<Self> {
        Self::attach_with_config(conn, UndoRedoConfig::default())
    }

    /// Attaches the engine to `conn` with a caller-supplied configuration.
    ///
    /// Creates the log table and its views, and registers the
    /// `undoable_active()` SQL scalar function triggers use in their `WHEN`
    /// clause. Fails if the connection already has an engine attached
    /// (i.e. the log table already exists) — call [`Self::detach`] first to
    /// re-attach.
    pub fn attach_with_config(conn: &'conn Connection, config: UndoRedoConfig) -> Result<Self> {
        log_store::create_log_store(conn, &config)?;

        let active = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&active);
        conn.create_scalar_function(
            "undoable_active",
            0,
            FunctionFlags::SQLITE_UTF8,
            move |_ctx| Ok(i64::from(flag.load(Ordering::SeqCst))),
        )?;

        tracing::debug!(log_table = %config.log_table, "undo/redo engine attached");

        Ok(UndoRedoEngine {
            conn,
            config,
            active,
            session: Cell::new(SessionState::Idle),
        })
    }

    /// Removes the log store, its views, and every table's undo triggers.
    ///
    /// `TEMP` objects are dropped automatically when the connection closes;
    /// this exists so a long-lived connection can detach and re-attach
    /// (e.g. under a different configuration) within one process lifetime.
    pub fn detach(self, tables: &[&str]) -> Result<()> {
        for table in tables {
            triggers::drop_undoable(self.conn, &self.config, table)?;
        }
        log_store::drop_log_store(self.conn, &self.config)?;
        self.conn.remove_function("undoable_active", 0)?;
        Ok(())
    }

    /// The configuration this engine was attached with.
    pub fn config(&self) -> &UndoRedoConfig {
        &self.config
    }

    pub(crate) fn active_flag(&self) -> &Arc<AtomicBool> {
        &self.active
    }

    /// Installs the trigger set for `table` under `granularity`.
    ///
    /// See [`triggers::make_undoable`] for the full contract.
    pub fn make_undoable(&self, table: &str, granularity: UpdateGranularity) -> Result<()> {
        triggers::make_undoable(self.conn, &self.config, table, granularity)
    }

    /// Installs the trigger set for `table` under `config.default_granularity`.
    pub fn make_undoable_default(&self, table: &str) -> Result<()> {
        self.make_undoable(table, self.config.default_granularity)
    }

    /// Installs the trigger set for `table`, mapping the SQL-facing
    /// `0`/`1`/`2` convention onto [`UpdateGranularity`].
    ///
    /// Fails with [`Error::InvalidUpdateType`] if `granularity` is outside
    /// `0..=2`, matching the `undoable_table(name, granularity INT)`
    /// contract.
    pub fn make_undoable_by_code(&self, table: &str, granularity: i64) -> Result<()> {
        let granularity = UpdateGranularity::from_i64(granularity).ok_or(Error::InvalidUpdateType)?;
        self.make_undoable(table, granularity)
    }

    /// Drops the trigger set previously installed for `table`.
    pub fn drop_undoable(&self, table: &str) -> Result<()> {
        triggers::drop_undoable(self.conn, &self.config, table)
    }

    /// Whether capture is currently enabled (user session open, or the
    /// driver is mid-replay).
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn stack_depths(&self) -> Result<UndoStatus> {
        let undo = log_store::stack_depth(self.conn, &self.config.log_table, 'U')?;
        let redo = log_store::stack_depth(self.conn, &self.config.log_table, 'R')?;
        Ok(UndoStatus { undo, redo })
    }

    /// Opens a capture session: invalidates redo history, begins a host
    /// transaction, appends a `'U'` marker, and enables capture.
    ///
    /// Fails with [`Error::AlreadyActive`] if a session is already open or
    /// the driver is mid-replay.
    #[tracing::instrument(skip(self))]
    pub fn begin(&self) -> Result<()> {
        if self.session.get() != SessionState::Idle {
            return Err(Error::AlreadyActive);
        }

        let attempt = self.begin_inner();
        if attempt.is_err() {
            self.conn.execute_batch("ROLLBACK").ok();
            self.active.store(false, Ordering::SeqCst);
            self.session.set(SessionState::Idle);
        }
        attempt
    }

    fn begin_inner(&self) -> Result<()> {
        let log_table = quote_ident(&self.config.log_table);
        self.conn.execute_batch("BEGIN")?;
        self.conn.execute_batch(&format!(
            "DELETE FROM {log_table} WHERE rowid IN (SELECT rowid FROM {redo_ids}); \
             INSERT INTO {log_table}(s) VALUES('U');",
            redo_ids = quote_ident(REDO_ROW_IDS),
        ))?;
        self.active.store(true, Ordering::SeqCst);
        self.session.set(SessionState::Open);
        Ok(())
    }

    /// Closes a capture session, commits, and reports the resulting stack
    /// depths.
    ///
    /// Fails with [`Error::NotActive`] if no session is open, with
    /// [`Error::RollbackOccurred`] if the host transaction was already
    /// closed out from under the engine, or with [`Error::CommitFailed`] if
    /// the commit itself fails.
    #[tracing::instrument(skip(self))]
    pub fn end(&self) -> Result<UndoStatus> {
        if self.session.get() != SessionState::Open {
            return Err(Error::NotActive);
        }

        self.active.store(false, Ordering::SeqCst);

        if self.conn.is_autocommit() {
            self.session.set(SessionState::Idle);
            tracing::warn!("rollback occurred during undoable session");
            return Err(Error::RollbackOccurred);
        }

        if self.conn.execute_batch("COMMIT").is_err() {
            self.session.set(SessionState::Idle);
            return Err(Error::CommitFailed);
        }

        self.session.set(SessionState::Idle);
        let status = self.stack_depths()?;
        tracing::debug!(undo = status.undo, redo = status.redo, "undoable session closed");
        Ok(status)
    }

    /// Convenience wrapper: `begin(); conn.execute_batch(sql); end()`.
    pub fn undoable(&self, sql: &str) -> Result<UndoStatus> {
        if sql.trim().is_empty() {
            return Err(Error::InvalidSql);
        }

        self.begin()?;
        if let Err(err) = self.conn.execute_batch(sql) {
            self.conn.execute_batch("ROLLBACK").ok();
            self.active.store(false, Ordering::SeqCst);
            self.session.set(SessionState::Idle);
            return Err(err.into());
        }
        self.end()
    }

    /// Pops and replays the top frame of the undo stack. Returns `Ok(None)`
    /// if there is nothing to undo.
    pub fn undo(&self) -> Result<Option<UndoRedoResult>> {
        self.session.set(SessionState::Replaying);
        let result = driver::step(self.conn, self, Direction::Undo);
        self.session.set(SessionState::Idle);
        result
    }

    /// Pops and replays the top frame of the redo stack. Returns `Ok(None)`
    /// if there is nothing to redo.
    pub fn redo(&self) -> Result<Option<UndoRedoResult>> {
        self.session.set(SessionState::Replaying);
        let result = driver::step(self.conn, self, Direction::Redo);
        self.session.set(SessionState::Idle);
        result
    }
}
