//! Schema Introspector: discovers a table's columns and primary-key members.

use rusqlite::Connection;

use crate::error::Result;

/// One column of a table, in the host's declared column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// The column's name, exactly as declared.
    pub name: String,
    /// Whether this column is part of the table's `PRIMARY KEY`.
    pub is_primary_key: bool,
}

/// Wraps a bare identifier in double quotes, doubling any embedded quote.
///
/// Lets `make_undoable` work on names that would otherwise need quoting:
/// mixed case, reserved words.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Returns `table`'s columns in declared order, or an empty vector if the
/// table has no columns (including: it does not exist).
///
/// Callers treat an empty result as "triggers cannot be installed" per
/// [`crate::Error::CreateTriggersFailed`].
pub fn columns_of(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let pk: i64 = row.get(5)?;
            Ok(ColumnInfo {
                name,
                is_primary_key: pk != 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(columns)
}
