//! Trigger Synthesizer: combines the Schema Introspector and the
//! Inverse-Statement Generator into a batch of `CREATE TRIGGER` statements
//! for a table, and installs or removes them.

use std::fmt::Write as _;

use rusqlite::Connection;

use crate::config::{UndoRedoConfig, UpdateGranularity};
use crate::error::{Error, Result};
use crate::inverse::{delete_inverse_expr, insert_inverse_expr, update_column_expr, update_table_expr};
use crate::schema::{columns_of, quote_ident, ColumnInfo};

fn trigger_name(config: &UndoRedoConfig, table: &str, suffix: &str) -> String {
    quote_ident(&format!("{}{table}_{suffix}", config.trigger_prefix))
}

fn build_triggers_sql(
    config: &UndoRedoConfig,
    table: &str,
    columns: &[ColumnInfo],
    granularity: UpdateGranularity,
) -> String {
    let table_q = quote_ident(table);
    let log_table = quote_ident(&config.log_table);
    let mut sql = String::new();

    let name_i = trigger_name(config, table, "i");
    let insert_expr = insert_inverse_expr(table);
    let _ = write!(
        sql,
        "CREATE TEMP TRIGGER {name_i} AFTER INSERT ON {table_q} WHEN undoable_active() \
         BEGIN INSERT INTO {log_table}(s) VALUES({insert_expr}); END;"
    );

    let name_d = trigger_name(config, table, "d");
    let delete_expr = delete_inverse_expr(table, columns);
    let _ = write!(
        sql,
        "CREATE TEMP TRIGGER {name_d} BEFORE DELETE ON {table_q} WHEN undoable_active() \
         BEGIN INSERT INTO {log_table}(s) VALUES({delete_expr}); END;"
    );

    let non_key: Vec<ColumnInfo> = columns.iter().filter(|c| !c.is_primary_key).cloned().collect();

    match granularity {
        UpdateGranularity::None => {}
        UpdateGranularity::Table => {
            // A table whose only column is its primary key has nothing to
            // restore on UPDATE; installing an empty SET-list would be
            // invalid SQL, so no trigger is emitted in that case.
            if !non_key.is_empty() {
                let name_u = trigger_name(config, table, "u");
                let expr = update_table_expr(table, &non_key);
                let _ = write!(
                    sql,
                    "CREATE TEMP TRIGGER {name_u} AFTER UPDATE ON {table_q} WHEN undoable_active() \
                     BEGIN INSERT INTO {log_table}(s) VALUES({expr}); END;"
                );
            }
        }
        UpdateGranularity::Column => {
            for c in &non_key {
                let name_u = trigger_name(config, table, &format!("u_{}", c.name));
                let col_q = quote_ident(&c.name);
                let expr = update_column_expr(table, &c.name);
                let _ = write!(
                    sql,
                    "CREATE TEMP TRIGGER {name_u} AFTER UPDATE OF {col_q} ON {table_q} \
                     WHEN undoable_active() \
                     BEGIN INSERT INTO {log_table}(s) VALUES({expr}); END;"
                );
            }
        }
    }

    sql
}

/// Installs the trigger set for `table` under the given UPDATE granularity.
///
/// Fails with [`Error::CreateTriggersFailed`] if the table cannot be
/// introspected (including: it does not exist). A second call for the same
/// table without first calling [`drop_undoable`] surfaces the host's
/// trigger-name collision as [`Error::Sqlite`]; this function never
/// silently replaces an existing trigger set.
pub fn make_undoable(
    conn: &Connection,
    config: &UndoRedoConfig,
    table: &str,
    granularity: UpdateGranularity,
) -> Result<()> {
    if table.trim().is_empty() {
        return Err(Error::InvalidTableName);
    }

    let columns = columns_of(conn, table)?;
    if columns.is_empty() {
        return Err(Error::CreateTriggersFailed {
            table: table.to_owned(),
        });
    }

    let sql = build_triggers_sql(config, table, &columns, granularity);
    tracing::debug!(table, ?granularity, "installing undo triggers");
    conn.execute_batch(&sql)?;

    Ok(())
}

fn list_temp_triggers(conn: &Connection) -> Result<Vec<String>> {
    let query = |relation: &str| -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT name FROM {relation} WHERE type='trigger'"
        ))?;
        stmt.query_map([], |row| row.get(0))?.collect()
    };

    match query("sqlite_temp_schema") {
        Ok(names) => Ok(names),
        Err(_) => Ok(query("sqlite_temp_master")?),
    }
}

/// Drops every trigger this crate installed for `table`, if any.
///
/// Safe to call on a table that was never made undoable; it simply finds
/// nothing to drop.
pub fn drop_undoable(conn: &Connection, config: &UndoRedoConfig, table: &str) -> Result<()> {
    let prefix = format!("{}{table}_", config.trigger_prefix);
    for name in list_temp_triggers(conn)?.into_iter().filter(|n| n.starts_with(&prefix)) {
        conn.execute(&format!("DROP TRIGGER {}", quote_ident(&name)), [])?;
    }
    Ok(())
}
