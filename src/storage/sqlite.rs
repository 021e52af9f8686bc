//! Relational backend: an embedded SQLite database with two tables keyed by
//! the entity primary keys.
//!
//! Writes are upserts (`INSERT .. ON CONFLICT .. DO UPDATE`) plus per-key
//! deletes of rows that left the catalog, so both tables stay independently
//! addressable by `code`/`id`. `readers.taken_books` is denormalized into a
//! comma-joined string and split back on load.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use crate::{
    error::CatalogResult,
    models::{format_opt_date, parse_opt_date, Book, Catalog, Gender, Reader},
};

use super::PersistenceAdapter;

const TAKEN_BOOKS_SEPARATOR: &str = ",";

pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> CatalogResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS books (
                 code TEXT PRIMARY KEY,
                 name TEXT NOT NULL,
                 author TEXT NOT NULL,
                 is_taken INTEGER NOT NULL,
                 date_taken TEXT
             );
             CREATE TABLE IF NOT EXISTS readers (
                 id TEXT PRIMARY KEY,
                 first_name TEXT NOT NULL,
                 second_name TEXT NOT NULL,
                 third_name TEXT,
                 gender INTEGER NOT NULL,
                 reg_date TEXT,
                 taken_books TEXT
             );",
        )?;
        Ok(conn)
    }

    /// Upsert a single book row.
    pub fn upsert_book(&self, book: &Book) -> CatalogResult<()> {
        let conn = self.open()?;
        upsert_book_row(&conn, book)?;
        Ok(())
    }

    /// Upsert a single reader row.
    pub fn upsert_reader(&self, reader: &Reader) -> CatalogResult<()> {
        let conn = self.open()?;
        upsert_reader_row(&conn, reader)?;
        Ok(())
    }

    /// Delete a book row by primary key.
    pub fn delete_book(&self, code: &str) -> CatalogResult<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM books WHERE code = ?1", params![code])?;
        Ok(())
    }

    /// Delete a reader row by primary key.
    pub fn delete_reader(&self, id: &str) -> CatalogResult<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM readers WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn upsert_book_row(conn: &Connection, book: &Book) -> CatalogResult<()> {
    conn.execute(
        "INSERT INTO books (code, name, author, is_taken, date_taken)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(code) DO UPDATE SET
             name = excluded.name,
             author = excluded.author,
             is_taken = excluded.is_taken,
             date_taken = excluded.date_taken",
        params![
            book.code,
            book.title,
            book.author,
            book.is_taken as i64,
            book.date_taken.map(|d| format_opt_date(Some(d))),
        ],
    )?;
    Ok(())
}

fn upsert_reader_row(conn: &Connection, reader: &Reader) -> CatalogResult<()> {
    conn.execute(
        "INSERT INTO readers (id, first_name, second_name, third_name, gender, reg_date, taken_books)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
             first_name = excluded.first_name,
             second_name = excluded.second_name,
             third_name = excluded.third_name,
             gender = excluded.gender,
             reg_date = excluded.reg_date,
             taken_books = excluded.taken_books",
        params![
            reader.id,
            reader.last_name,
            reader.first_name,
            reader.middle_name,
            u8::from(reader.gender) as i64,
            reader.registration_date.map(|d| format_opt_date(Some(d))),
            reader.taken_books.join(TAKEN_BOOKS_SEPARATOR),
        ],
    )?;
    Ok(())
}

/// Raw row shapes, converted outside the rusqlite closures so date parsing
/// can use the crate's own error type.
struct BookRow {
    code: String,
    name: String,
    author: String,
    is_taken: i64,
    date_taken: Option<String>,
}

struct ReaderRow {
    id: String,
    first_name: String,
    second_name: String,
    third_name: Option<String>,
    gender: i64,
    reg_date: Option<String>,
    taken_books: Option<String>,
}

impl PersistenceAdapter for SqliteStorage {
    fn save(&self, catalog: &Catalog) -> CatalogResult<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        for book in &catalog.books {
            upsert_book_row(&tx, book)?;
        }
        for reader in &catalog.readers {
            upsert_reader_row(&tx, reader)?;
        }

        // Drop rows whose key left the catalog, one key at a time.
        let stale_codes: Vec<String> = {
            let mut stmt = tx.prepare("SELECT code FROM books")?;
            let codes = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            codes
                .into_iter()
                .filter(|code| !catalog.books.iter().any(|b| &b.code == code))
                .collect()
        };
        for code in &stale_codes {
            tx.execute("DELETE FROM books WHERE code = ?1", params![code])?;
        }

        let stale_ids: Vec<String> = {
            let mut stmt = tx.prepare("SELECT id FROM readers")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids.into_iter()
                .filter(|id| !catalog.readers.iter().any(|r| &r.id == id))
                .collect()
        };
        for id in &stale_ids {
            tx.execute("DELETE FROM readers WHERE id = ?1", params![id])?;
        }

        tx.commit()?;
        Ok(())
    }

    fn load(&self) -> CatalogResult<Catalog> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "database missing, treating as empty");
            return Ok(Catalog::default());
        }
        let conn = self.open()?;

        let book_rows: Vec<BookRow> = {
            let mut stmt = conn.prepare(
                "SELECT code, name, author, is_taken, date_taken FROM books ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(BookRow {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    author: row.get(2)?,
                    is_taken: row.get(3)?,
                    date_taken: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let reader_rows: Vec<ReaderRow> = {
            let mut stmt = conn.prepare(
                "SELECT id, first_name, second_name, third_name, gender, reg_date, taken_books
                 FROM readers ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ReaderRow {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    second_name: row.get(2)?,
                    third_name: row.get(3)?,
                    gender: row.get(4)?,
                    reg_date: row.get(5)?,
                    taken_books: row.get(6)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut books = Vec::with_capacity(book_rows.len());
        for row in book_rows {
            books.push(Book {
                code: row.code,
                title: row.name,
                author: row.author,
                is_taken: row.is_taken != 0,
                date_taken: parse_opt_date(row.date_taken.as_deref().unwrap_or(""))?,
            });
        }

        let mut readers = Vec::with_capacity(reader_rows.len());
        for row in reader_rows {
            let taken_books = row
                .taken_books
                .as_deref()
                .unwrap_or("")
                .split(TAKEN_BOOKS_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            readers.push(Reader {
                id: row.id,
                last_name: row.first_name,
                first_name: row.second_name,
                middle_name: row.third_name.filter(|s| !s.is_empty()),
                gender: Gender::from(row.gender as u8),
                registration_date: parse_opt_date(row.reg_date.as_deref().unwrap_or(""))?,
                taken_books,
            });
        }

        Ok(Catalog { books, readers })
    }

    fn describe(&self) -> String {
        format!("sqlite ({})", self.path.display())
    }
}
