//! Undo/Redo Driver: executes the top frame of one stack, re-logs it onto
//! the other stack, and returns a summary.

use std::fmt;
use std::sync::atomic::Ordering;

use rusqlite::Connection;

use crate::error::Result;
use crate::log_store::{self, REDO_STACK_TOP, UNDO_STACK_TOP};
use crate::UndoRedoEngine;

/// Which stack to pop a frame from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Pop the top of the undo stack, push its inverse onto the redo stack.
    Undo,
    /// Pop the top of the redo stack, push its inverse onto the undo stack.
    Redo,
}

/// The outcome of a successful [`Direction::Undo`]/[`Direction::Redo`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedoResult {
    /// Number of frames left on the undo stack after this step.
    pub undo: i64,
    /// Number of frames left on the redo stack after this step.
    pub redo: i64,
    /// The compound inverse statement that was just executed.
    pub sql: String,
}

impl fmt::Display for UndoRedoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNDO={}\nREDO={}\nSQL={}", self.undo, self.redo, self.sql)
    }
}

fn marker_char(direction: Direction) -> (char, char, &'static str) {
    match direction {
        // (src marker, dst marker, src stack-top view)
        Direction::Undo => ('U', 'R', UNDO_STACK_TOP),
        Direction::Redo => ('R', 'U', REDO_STACK_TOP),
    }
}

/// Pops and replays the top frame of the stack named by `direction`.
///
/// Returns `Ok(None)` if that stack is empty. On success, the popped
/// frame's statements have been executed (in reverse row-identity order)
/// with capture re-enabled, so the triggers recorded the inverse-of-the-
/// inverse as a fresh frame on the *other* stack — the mechanism that keeps
/// undo and redo symmetric without a second log.
#[tracing::instrument(skip(conn, engine), fields(?direction))]
pub(crate) fn step(
    conn: &Connection,
    engine: &UndoRedoEngine<'_>,
    direction: Direction,
) -> Result<Option<UndoRedoResult>> {
    let (_src_marker, dst_marker, src_top_view) = marker_char(direction);
    let config = engine.config();

    let Some((tstart, tend)) = log_store::stack_top(conn, src_top_view)? else {
        return Ok(None);
    };
    tracing::trace!(tstart, tend, "replaying frame");

    let log_table = crate::schema::quote_ident(&config.log_table);

    conn.execute_batch("BEGIN")?;

    let replay = (|| -> Result<UndoRedoResult> {
        let sql = read_frame_sql(conn, &log_table, tstart, tend)?;

        conn.execute(
            &format!("DELETE FROM {log_table} WHERE rowid>=?1 AND rowid<=?2"),
            rusqlite::params![tstart, tend],
        )?;

        conn.execute(
            &format!("INSERT INTO {log_table}(s) VALUES(?1)"),
            rusqlite::params![dst_marker.to_string()],
        )?;

        engine.active_flag().store(true, Ordering::SeqCst);
        let exec_result = conn.execute_batch(&sql);
        engine.active_flag().store(false, Ordering::SeqCst);
        exec_result?;

        let undo = log_store::stack_depth(conn, &config.log_table, 'U')?;
        let redo = log_store::stack_depth(conn, &config.log_table, 'R')?;

        Ok(UndoRedoResult { undo, redo, sql })
    })();

    match replay {
        Ok(result) => {
            conn.execute_batch("COMMIT")?;
            Ok(Some(result))
        }
        Err(err) => {
            conn.execute_batch("ROLLBACK").ok();
            Err(err)
        }
    }
}

fn read_frame_sql(conn: &Connection, log_table: &str, tstart: i64, tend: i64) -> Result<String> {
    let mut stmt = conn.prepare(&format!(
        "SELECT s FROM {log_table} WHERE rowid>?1 AND rowid<=?2 ORDER BY rowid DESC"
    ))?;
    let statements = stmt
        .query_map(rusqlite::params![tstart, tend], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(statements.join(";"))
}
