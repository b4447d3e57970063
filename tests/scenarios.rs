//! Cross-module scenarios exercising `UndoRedoEngine` against a real
//! in-memory connection, end to end.

use rusqlite::Connection;
use sqlite_undo_redo::{Error, UndoRedoEngine, UndoStatus, UpdateGranularity};

fn notes_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t(id INTEGER PRIMARY KEY, v TEXT)")
        .unwrap();
    conn
}

fn row(conn: &Connection, id: i64) -> Option<String> {
    conn.query_row("SELECT v FROM t WHERE id=?1", [id], |row| row.get(0))
        .ok()
}

#[test]
fn insert_round_trips_through_undo_and_redo() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Column).unwrap();

    let status = engine.undoable("INSERT INTO t VALUES(1,'a')").unwrap();
    assert_eq!(status, UndoStatus { undo: 1, redo: 0 });

    let undone = engine.undo().unwrap().unwrap();
    assert_eq!(row(&conn, 1), None);
    assert_eq!(undone.sql, "DELETE FROM \"t\" WHERE rowid=1");

    let redone = engine.redo().unwrap().unwrap();
    assert_eq!(row(&conn, 1), Some("a".to_string()));
    assert_eq!((redone.undo, redone.redo), (1, 0));
}

#[test]
fn column_granularity_update_restores_prior_value() {
    let conn = notes_db();
    conn.execute("INSERT INTO t VALUES(1,'a')", []).unwrap();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Column).unwrap();

    let status = engine
        .undoable("UPDATE t SET v='b' WHERE id=1")
        .unwrap();
    assert_eq!(status, UndoStatus { undo: 1, redo: 0 });
    assert_eq!(row(&conn, 1), Some("b".to_string()));

    let undone = engine.undo().unwrap().unwrap();
    assert_eq!(row(&conn, 1), Some("a".to_string()));
    assert_eq!(undone.sql, "UPDATE \"t\" SET \"v\"='a' WHERE rowid=1");
}

#[test]
fn delete_restores_the_exact_row_including_rowid() {
    let conn = notes_db();
    conn.execute("INSERT INTO t VALUES(1,'a')", []).unwrap();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Column).unwrap();

    engine.undoable("DELETE FROM t WHERE id=1").unwrap();
    assert_eq!(row(&conn, 1), None);

    engine.undo().unwrap();
    assert_eq!(row(&conn, 1), Some("a".to_string()));
}

#[test]
fn new_session_after_undo_clears_redo_history() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Table).unwrap();

    engine.undoable("INSERT INTO t VALUES(1,'a')").unwrap();
    engine.undo().unwrap();

    engine.undoable("INSERT INTO t VALUES(2,'b')").unwrap();

    assert_eq!(engine.redo().unwrap(), None);
}

#[test]
fn double_begin_is_rejected_and_leaves_log_untouched() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();

    engine.begin().unwrap();
    let err = engine.begin().unwrap_err();
    assert!(matches!(err, Error::AlreadyActive));

    engine.end().unwrap();
}

#[test]
fn out_of_range_granularity_code_is_rejected_and_installs_nothing() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();

    let err = engine.make_undoable_by_code("t", 3).unwrap_err();
    assert!(matches!(err, Error::InvalidUpdateType));

    let status = engine.undoable("INSERT INTO t VALUES(1,'a')").unwrap();
    assert_eq!(status, UndoStatus { undo: 1, redo: 0 });
    assert_eq!(row(&conn, 1), Some("a".to_string()));
}

#[test]
fn reinstalling_triggers_without_dropping_surfaces_a_collision() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Column).unwrap();

    let err = engine
        .make_undoable("t", UpdateGranularity::Column)
        .unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)));
}

#[test]
fn zero_length_frame_still_pushes_and_pops_a_marker() {
    let conn = notes_db();
    let engine = UndoRedoEngine::attach(&conn).unwrap();

    let status = engine.begin().map(|_| engine.end().unwrap());
    let status = status.unwrap();
    assert_eq!(status, UndoStatus { undo: 1, redo: 0 });

    let undone = engine.undo().unwrap().unwrap();
    assert_eq!(undone.sql, "");
    assert_eq!((undone.undo, undone.redo), (0, 1));
}

#[test]
fn table_granularity_update_mentions_every_non_key_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE t(id INTEGER PRIMARY KEY, a TEXT, b TEXT); \
         INSERT INTO t VALUES(1,'a0','b0');",
    )
    .unwrap();
    let engine = UndoRedoEngine::attach(&conn).unwrap();
    engine.make_undoable("t", UpdateGranularity::Table).unwrap();

    let undone = engine
        .undoable("UPDATE t SET a='a1', b='b1' WHERE id=1")
        .and_then(|_| engine.undo())
        .unwrap()
        .unwrap();

    assert!(undone.sql.contains("\"a\"='a0'"));
    assert!(undone.sql.contains("\"b\"='b0'"));
}
