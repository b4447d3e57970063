//! Inverse-Statement Generator: pure string construction of the SQL
//! expressions a trigger body uses to write its inverse statement into the
//! log.
//!
//! Nothing here touches the database. Each function returns the text of an
//! SQL *expression* — built from `'literal'||quote(OLD.col)||...` pieces —
//! that SQLite evaluates against the firing row when the trigger runs. The
//! resulting text is itself a complete, self-contained inverse DML
//! statement, ready to `execute_batch` verbatim at replay time.

use std::fmt::Write as _;

use crate::schema::{quote_ident, ColumnInfo};

/// The `DELETE FROM t WHERE rowid=<NEW.rowid>` expression fired by the
/// AFTER INSERT trigger.
pub(crate) fn insert_inverse_expr(table: &str) -> String {
    format!("'DELETE FROM {} WHERE rowid='||NEW.rowid", quote_ident(table))
}

/// The `rowid,c1,c2,...` column list for the resurrection INSERT.
fn delete_inverse_columns(columns: &[ColumnInfo]) -> String {
    let mut out = String::from("rowid");
    for c in columns {
        write!(out, ",{}", quote_ident(&c.name)).unwrap();
    }
    out
}

/// The `INSERT INTO t(rowid,c1,c2,...) VALUES(<OLD.rowid>,<quoted OLD.c1>,...)`
/// expression fired by the BEFORE DELETE trigger. `columns` is every
/// declared column (primary-key columns included, so the resurrected row
/// carries its original key).
pub(crate) fn delete_inverse_expr(table: &str, columns: &[ColumnInfo]) -> String {
    let column_list = delete_inverse_columns(columns);
    let mut expr = format!(
        "'INSERT INTO {}({}) VALUES('||OLD.rowid",
        quote_ident(table),
        column_list
    );
    for c in columns {
        write!(expr, "||','||quote(OLD.{})", quote_ident(&c.name)).unwrap();
    }
    expr.push_str("||')'");
    expr
}

/// The single-row `UPDATE t SET c1=<quoted OLD.c1>,... WHERE rowid=<OLD.rowid>`
/// expression fired by the table-granularity AFTER UPDATE trigger.
/// `non_key_columns` must already exclude primary-key columns.
pub(crate) fn update_table_expr(table: &str, non_key_columns: &[ColumnInfo]) -> String {
    let mut expr = format!("'UPDATE {} SET ", quote_ident(table));
    for (i, c) in non_key_columns.iter().enumerate() {
        if i > 0 {
            expr.push(',');
        }
        let col = quote_ident(&c.name);
        write!(expr, "{col}='||quote(OLD.{col})||'").unwrap();
    }
    expr.push_str(" WHERE rowid='||OLD.rowid");
    expr
}

/// The single-column `UPDATE t SET c=<quoted OLD.c> WHERE rowid=<OLD.rowid>`
/// expression fired by one column-granularity AFTER UPDATE OF trigger.
pub(crate) fn update_column_expr(table: &str, column: &str) -> String {
    let col = quote_ident(column);
    format!(
        "'UPDATE {} SET {col}='||quote(OLD.{col})||' WHERE rowid='||OLD.rowid",
        quote_ident(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, is_primary_key: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_owned(),
            is_primary_key,
        }
    }

    #[test]
    fn insert_inverse_deletes_by_rowid() {
        assert_eq!(
            insert_inverse_expr("t"),
            "'DELETE FROM \"t\" WHERE rowid='||NEW.rowid"
        );
    }

    #[test]
    fn delete_inverse_restores_every_column_including_key() {
        let columns = vec![col("id", true), col("v", false)];

        assert_eq!(
            delete_inverse_expr("t", &columns),
            "'INSERT INTO \"t\"(rowid,\"id\",\"v\") VALUES('||OLD.rowid\
             ||','||quote(OLD.\"id\")||','||quote(OLD.\"v\")||')'"
        );
    }

    #[test]
    fn update_table_covers_every_non_key_column() {
        let non_key = vec![col("v", false), col("w", false)];

        assert_eq!(
            update_table_expr("t", &non_key),
            "'UPDATE \"t\" SET \"v\"='||quote(OLD.\"v\")||',\"w\"='||quote(OLD.\"w\")||' \
             WHERE rowid='||OLD.rowid"
        );
    }

    #[test]
    fn update_column_mentions_only_that_column() {
        assert_eq!(
            update_column_expr("t", "v"),
            "'UPDATE \"t\" SET \"v\"='||quote(OLD.\"v\")||' WHERE rowid='||OLD.rowid"
        );
    }
}
