//! Walks a tiny `notes` table through a few undoable edits, then undoes and
//! redoes them, printing the stack depths and the inverse SQL at each step.

use rusqlite::Connection;
use sqlite_undo_redo::{UndoRedoEngine, UpdateGranularity};

fn dump(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("SELECT id, body FROM notes ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    print!("  notes = [");
    for (i, row) in rows.enumerate() {
        let (id, body) = row?;
        if i > 0 {
            print!(", ");
        }
        print!("({id}, {body:?})");
    }
    println!("]");
    Ok(())
}

fn main() -> Result<(), sqlite_undo_redo::Error> {
    tracing_subscriber::fmt::init();

    let conn = Connection::open_in_memory()?;
    conn.execute_batch("CREATE TABLE notes(id INTEGER PRIMARY KEY, body TEXT NOT NULL)")?;

    let engine = UndoRedoEngine::attach(&conn)?;
    engine.make_undoable("notes", UpdateGranularity::Column)?;

    let status = engine.undoable("INSERT INTO notes VALUES(1,'buy milk')")?;
    println!("after insert: {status}");
    dump(&conn)?;

    let status = engine.undoable("UPDATE notes SET body='buy oat milk' WHERE id=1")?;
    println!("after update: {status}");
    dump(&conn)?;

    let status = engine.undoable("INSERT INTO notes VALUES(2,'walk the dog')")?;
    println!("after second insert: {status}");
    dump(&conn)?;

    while let Some(undone) = engine.undo()? {
        println!("undo -> {undone}");
        dump(&conn)?;
    }

    while let Some(redone) = engine.redo()? {
        println!("redo -> {redone}");
        dump(&conn)?;
    }

    Ok(())
}
