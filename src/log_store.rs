//! Undo Log Store: the single append-only log table plus the read-only
//! views that expose the top of each stack.
//!
//! The log (`_undo` by default, configurable via
//! [`UndoRedoConfig::log_table`]) holds both marker rows (`'U'`/`'R'`) and
//! payload rows (inverse statements). Everything else in this module is a
//! plain SQL view computed from it; the `tend` of a frame is "the rowid
//! just before the next marker, or `MAX(rowid)` if there is none" — which
//! makes the currently-open frame implicitly extend to the rest of the log,
//! exactly the behaviour wanted during capture.

use rusqlite::Connection;

use crate::config::UndoRedoConfig;
use crate::error::Result;
use crate::schema::quote_ident;

/// Names of the reserved views derived from the log table. These are fixed
/// regardless of `log_table`'s name: only the underlying physical log
/// table is renameable, to let a host avoid colliding with an object it
/// creates itself.
pub(crate) const UNDO_STACK: &str = "_undo_stack";
pub(crate) const UNDO_STACK_TOP: &str = "_undo_stack_top";
pub(crate) const REDO_STACK: &str = "_redo_stack";
pub(crate) const REDO_STACK_TOP: &str = "_redo_stack_top";
pub(crate) const REDO_ROW_IDS: &str = "_redo_row_ids";

fn stack_view_sql(view_name: &str, log_table: &str, marker: char) -> String {
    format!(
        "CREATE TEMP VIEW {view} AS \
         SELECT T1.rowid AS tstart, \
         coalesce( \
           (SELECT T2.rowid FROM {log} T2 \
            WHERE T2.rowid>T1.rowid AND (T2.s='U' OR T2.s='R') LIMIT 1)-1, \
           (SELECT max(rowid) FROM {log}) \
         ) AS tend \
         FROM {log} T1 WHERE T1.s='{marker}' ORDER BY T1.rowid DESC;",
        view = quote_ident(view_name),
        log = log_table,
    )
}

/// Creates the log table and its derived views for `config` on `conn`.
///
/// Idempotent only insofar as `CREATE TEMP TABLE`/`CREATE TEMP VIEW` are:
/// calling this twice on the same connection fails with a host "already
/// exists" error, matching [`crate::UndoRedoEngine::attach`]'s one-handle-
/// per-connection contract.
pub(crate) fn create_log_store(conn: &Connection, config: &UndoRedoConfig) -> Result<()> {
    let log_table = quote_ident(&config.log_table);

    let mut sql = format!("CREATE TEMP TABLE {log_table}(s TEXT);");
    sql += &stack_view_sql(UNDO_STACK, &log_table, 'U');
    sql += &format!(
        "CREATE TEMP VIEW {top} AS SELECT tstart,tend FROM {stack} LIMIT 1;",
        top = quote_ident(UNDO_STACK_TOP),
        stack = quote_ident(UNDO_STACK),
    );
    sql += &stack_view_sql(REDO_STACK, &log_table, 'R');
    sql += &format!(
        "CREATE TEMP VIEW {top} AS SELECT tstart,tend FROM {stack} LIMIT 1;",
        top = quote_ident(REDO_STACK_TOP),
        stack = quote_ident(REDO_STACK),
    );
    sql += &format!(
        "CREATE TEMP VIEW {ids} AS \
         SELECT T2.rowid FROM {stack} T1 \
         LEFT JOIN {log} T2 ON T2.rowid BETWEEN T1.tstart AND T1.tend \
         ORDER BY T2.rowid DESC;",
        ids = quote_ident(REDO_ROW_IDS),
        stack = quote_ident(REDO_STACK),
        log = log_table,
    );

    conn.execute_batch(&sql)?;

    Ok(())
}

/// Drops the log table and its views. `TEMP` objects are dropped
/// automatically when the connection closes; this lets a long-lived
/// connection detach and re-attach cleanly instead.
pub(crate) fn drop_log_store(conn: &Connection, config: &UndoRedoConfig) -> Result<()> {
    for view in [REDO_ROW_IDS, REDO_STACK_TOP, REDO_STACK, UNDO_STACK_TOP, UNDO_STACK] {
        conn.execute(&format!("DROP VIEW IF EXISTS {}", quote_ident(view)), [])?;
    }
    conn.execute(
        &format!("DROP TABLE IF EXISTS {}", quote_ident(&config.log_table)),
        [],
    )?;
    Ok(())
}

/// The number of frames currently on the stack named by `stack_view`.
pub(crate) fn stack_depth(conn: &Connection, log_table: &str, marker: char) -> Result<i64> {
    let depth = conn.query_row(
        &format!(
            "SELECT count(*) FROM {log} WHERE s='{marker}'",
            log = quote_ident(log_table)
        ),
        [],
        |row| row.get(0),
    )?;
    Ok(depth)
}

/// `(tstart, tend]` of the top frame of `view`, or `None` if the stack is
/// empty.
pub(crate) fn stack_top(conn: &Connection, view: &str) -> Result<Option<(i64, i64)>> {
    let top = conn
        .query_row(
            &format!("SELECT tstart,tend FROM {}", quote_ident(view)),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .ok();
    Ok(top)
}
