// src/store.rs

use crate::error::{Error, Result};
use crate::records::Record;
use crate::schema::Table;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Rows in `table` whose foreign key into `parent` has no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dangling {
    pub table: String,
    pub parent: String,
    pub rows: usize,
}

/// The SQLite sink. One handle per run, owned by the caller of the loader.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, enforce_foreign_keys: bool) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::configure(conn, enforce_foreign_keys)
    }

    pub fn open_in_memory(enforce_foreign_keys: bool) -> rusqlite::Result<Self> {
        Self::configure(Connection::open_in_memory()?, enforce_foreign_keys)
    }

    fn configure(conn: Connection, enforce_foreign_keys: bool) -> rusqlite::Result<Self> {
        // Has no effect inside a transaction, so it is set once here.
        conn.pragma_update(None, "foreign_keys", enforce_foreign_keys)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn enforces_foreign_keys(&self) -> rusqlite::Result<bool> {
        self.conn
            .pragma_query_value(None, "foreign_keys", |r| r.get(0))
    }

    /// Drop `tables` (and their search indexes) in the order given. Pass
    /// children before parents when foreign keys are enforced.
    pub fn drop_tables(&mut self, tables: &[&'static Table]) -> Result<()> {
        for table in tables {
            let tx = self.conn.transaction().map_err(Error::load(table.name))?;
            drop_table(&tx, table).map_err(Error::load(table.name))?;
            tx.commit().map_err(Error::load(table.name))?;
        }
        Ok(())
    }

    /// Replace the contents of `T`'s table with `records`, in one
    /// transaction. Nothing is committed unless every record converts and
    /// inserts; the search index, if any, is rebuilt before commit.
    pub fn replace<T, I>(&mut self, records: I) -> Result<usize>
    where
        T: Record,
        I: IntoIterator<Item = Result<T>>,
    {
        let table = T::table();
        let tx = self.conn.transaction().map_err(Error::load(table.name))?;

        drop_table(&tx, table).map_err(Error::load(table.name))?;
        tx.execute_batch(&table.create_sql())
            .map_err(Error::load(table.name))?;

        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(&table.insert_sql())
                .map_err(Error::load(table.name))?;
            for record in records {
                let record = record?;
                stmt.execute(&record.values()[..])
                    .map_err(Error::load(table.name))?;
                inserted += 1;
            }
        }

        if let (Some(sql), Some(fts)) = (table.create_search_sql(), table.search_table()) {
            tx.execute_batch(&sql).map_err(Error::load(table.name))?;
            tx.execute(
                &format!("INSERT INTO \"{fts}\"(\"{fts}\") VALUES ('rebuild')"),
                [],
            )
            .map_err(Error::load(table.name))?;
            debug!(table = table.name, index = %fts, "rebuilt search index");
        }

        tx.commit().map_err(Error::load(table.name))?;
        Ok(inserted)
    }

    pub fn count(&self, table: &Table) -> rusqlite::Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", table.name),
            [],
            |r| r.get(0),
        )
    }

    /// Phrase search over `table`'s full-text index. Returns the table's
    /// search key for each hit, best match first; empty if the table has no
    /// index.
    pub fn search(&self, table: &Table, text: &str) -> rusqlite::Result<Vec<String>> {
        let (Some(search), Some(fts)) = (table.search, table.search_table()) else {
            return Ok(Vec::new());
        };
        let phrase = format!("\"{}\"", text.replace('"', "\"\""));
        let sql = format!(
            "SELECT t.\"{key}\" FROM \"{fts}\" JOIN \"{name}\" t ON t.rowid = \"{fts}\".rowid \
             WHERE \"{fts}\" MATCH ?1 ORDER BY rank",
            key = search.key,
            fts = fts,
            name = table.name,
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map([phrase], |r| r.get::<_, Option<String>>(0))?
            .filter_map(|hit| hit.transpose())
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hits)
    }

    /// Every foreign-key value with no matching parent row, grouped by edge.
    pub fn foreign_key_violations(&self) -> rusqlite::Result<Vec<Dangling>> {
        let mut stmt = self.conn.prepare(
            "SELECT \"table\", \"parent\", COUNT(*) FROM pragma_foreign_key_check \
             GROUP BY \"table\", \"parent\" ORDER BY \"table\", \"parent\"",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(Dangling {
                    table: r.get(0)?,
                    parent: r.get(1)?,
                    rows: r.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if !rows.is_empty() {
            info!(edges = rows.len(), "foreign key check found dangling references");
        }
        Ok(rows)
    }
}

fn drop_table(conn: &Connection, table: &Table) -> rusqlite::Result<()> {
    if let Some(fts) = table.search_table() {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{fts}\""))?;
    }
    conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", table.name))
}
