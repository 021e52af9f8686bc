//! In-memory catalog store.
//!
//! Owns the two entity collections and every invariant-preserving mutation.
//! Validation is the caller's job (see [`crate::validation`]); the store
//! enforces the structural guards: unique keys, the lending state machine,
//! deletion guards, and the code-rename cascade.
//!
//! The store holds no locks and must only be mutated from one thread. The
//! report pipeline works on a [`CatalogStore::snapshot`] copy instead.

use chrono::NaiveDate;
use rand::Rng;

use crate::{
    error::{CatalogError, CatalogResult},
    models::{full_name, Book, Catalog, Reader},
};

/// Row-range change notification, delivered to subscribed observers after a
/// mutation completes. The UI layer maps these onto its table views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEvent {
    BookInserted { row: usize },
    BookRemoved { row: usize },
    BookRowsChanged { start: usize, end: usize },
    ReaderInserted { row: usize },
    ReaderRemoved { row: usize },
    ReaderRowsChanged { start: usize, end: usize },
}

type Listener = Box<dyn Fn(&CatalogEvent)>;

#[derive(Default)]
pub struct CatalogStore {
    books: Vec<Book>,
    readers: Vec<Reader>,
    listeners: Vec<Listener>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around already-loaded collections.
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            books: catalog.books,
            readers: catalog.readers,
            listeners: Vec::new(),
        }
    }

    /// Register a change observer. Every mutation that alters visible rows
    /// emits exactly one event after the mutation has completed.
    pub fn subscribe(&mut self, listener: impl Fn(&CatalogEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: CatalogEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn readers(&self) -> &[Reader] {
        &self.readers
    }

    /// By-value copy of both collections for the report pipeline.
    pub fn snapshot(&self) -> Catalog {
        Catalog {
            books: self.books.clone(),
            readers: self.readers.clone(),
        }
    }

    // ---- books ----

    /// Insert a book and return its code. The code is expected to come from
    /// [`CatalogStore::generate_unique_book_code`] or to be otherwise unique.
    pub fn add_book(&mut self, book: Book) -> String {
        let code = book.code.clone();
        self.books.push(book);
        self.emit(CatalogEvent::BookInserted {
            row: self.books.len() - 1,
        });
        code
    }

    /// Replace the book at `index`. Out-of-range indices are ignored.
    pub fn update_book_at(&mut self, index: usize, book: Book) {
        if index >= self.books.len() {
            return;
        }
        self.books[index] = book;
        self.emit(CatalogEvent::BookRowsChanged {
            start: index,
            end: index,
        });
    }

    /// Remove a book by code. `Ok(false)` when no such code exists; a book
    /// that is currently lent out cannot be removed.
    pub fn remove_book(&mut self, code: &str) -> CatalogResult<bool> {
        let Some(index) = self.find_book_index(code) else {
            return Ok(false);
        };
        if self.books[index].is_taken {
            return Err(CatalogError::DeleteForbidden(format!(
                "book {} is currently lent to a reader",
                code
            )));
        }
        self.books.remove(index);
        self.emit(CatalogEvent::BookRemoved { row: index });
        Ok(true)
    }

    /// Set the lending flag and date. The date is cleared whenever
    /// `taken == false`. Returns `false` when the code is unknown.
    pub fn set_book_taken(&mut self, code: &str, taken: bool, date: Option<NaiveDate>) -> bool {
        let Some(index) = self.find_book_index(code) else {
            return false;
        };
        self.books[index].is_taken = taken;
        self.books[index].date_taken = if taken { date } else { None };
        self.emit(CatalogEvent::BookRowsChanged {
            start: index,
            end: index,
        });
        true
    }

    /// Change a book's code and rewrite every reader entry referencing the
    /// old one, atomically from the caller's perspective. Returns whether any
    /// reader was touched.
    pub fn rename_book_code(&mut self, old: &str, new: &str) -> CatalogResult<bool> {
        let Some(index) = self.find_book_index(old) else {
            return Err(CatalogError::NotFound(format!("book {}", old)));
        };
        if old != new && self.find_book_index(new).is_some() {
            return Err(CatalogError::AlreadyInState(format!(
                "book code {} is already in use",
                new
            )));
        }

        self.books[index].code = new.to_string();

        let mut touched_rows = Vec::new();
        for (row, reader) in self.readers.iter_mut().enumerate() {
            let mut hit = false;
            for entry in reader.taken_books.iter_mut() {
                if entry == old {
                    *entry = new.to_string();
                    hit = true;
                }
            }
            if hit {
                touched_rows.push(row);
            }
        }

        for row in &touched_rows {
            self.emit(CatalogEvent::ReaderRowsChanged {
                start: *row,
                end: *row,
            });
        }
        self.emit(CatalogEvent::BookRowsChanged {
            start: index,
            end: index,
        });
        Ok(!touched_rows.is_empty())
    }

    pub fn find_book(&self, code: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.code == code)
    }

    pub fn find_book_index(&self, code: &str) -> Option<usize> {
        self.books.iter().position(|b| b.code == code)
    }

    /// Case-insensitive substring containment over code, title and author.
    pub fn search_books(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| {
                b.code.to_lowercase().contains(&needle)
                    || b.title.to_lowercase().contains(&needle)
                    || b.author.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Draw `B` + a uniform random number in `[1000, 9999)`, re-rolling on
    /// collision. Terminates almost surely; no hard iteration bound.
    pub fn generate_unique_book_code(existing: &[Book]) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code = format!("B{}", rng.gen_range(1000..9999));
            if !existing.iter().any(|b| b.code == code) {
                return code;
            }
        }
    }

    // ---- readers ----

    /// Insert a reader and return their id.
    pub fn add_reader(&mut self, reader: Reader) -> String {
        let id = reader.id.clone();
        self.readers.push(reader);
        self.emit(CatalogEvent::ReaderInserted {
            row: self.readers.len() - 1,
        });
        id
    }

    /// Replace the reader at `index`. Out-of-range indices are ignored.
    pub fn update_reader_at(&mut self, index: usize, reader: Reader) {
        if index >= self.readers.len() {
            return;
        }
        self.readers[index] = reader;
        self.emit(CatalogEvent::ReaderRowsChanged {
            start: index,
            end: index,
        });
    }

    /// Remove a reader by id. `Ok(false)` when no such id exists; a reader
    /// with outstanding loans cannot be removed.
    pub fn remove_reader(&mut self, id: &str) -> CatalogResult<bool> {
        let Some(index) = self.find_reader_index(id) else {
            return Ok(false);
        };
        if !self.readers[index].taken_books.is_empty() {
            return Err(CatalogError::DeleteForbidden(format!(
                "reader {} still holds {} book(s)",
                id,
                self.readers[index].taken_books.len()
            )));
        }
        self.readers.remove(index);
        self.emit(CatalogEvent::ReaderRemoved { row: index });
        Ok(true)
    }

    /// Append a book code to a reader's list. Returns `false` when the
    /// reader is unknown or the code is already linked.
    pub fn add_link(&mut self, reader_id: &str, code: &str) -> bool {
        let Some(index) = self.find_reader_index(reader_id) else {
            return false;
        };
        if self.readers[index].taken_books.iter().any(|c| c == code) {
            return false;
        }
        self.readers[index].taken_books.push(code.to_string());
        self.emit(CatalogEvent::ReaderRowsChanged {
            start: index,
            end: index,
        });
        true
    }

    /// Remove a book code from a reader's list. Returns `false` when the
    /// reader or the link does not exist.
    pub fn remove_link(&mut self, reader_id: &str, code: &str) -> bool {
        let Some(index) = self.find_reader_index(reader_id) else {
            return false;
        };
        let before = self.readers[index].taken_books.len();
        self.readers[index].taken_books.retain(|c| c != code);
        if self.readers[index].taken_books.len() == before {
            return false;
        }
        self.emit(CatalogEvent::ReaderRowsChanged {
            start: index,
            end: index,
        });
        true
    }

    pub fn find_reader(&self, id: &str) -> Option<&Reader> {
        self.readers.iter().find(|r| r.id == id)
    }

    pub fn find_reader_index(&self, id: &str) -> Option<usize> {
        self.readers.iter().position(|r| r.id == id)
    }

    /// Case-insensitive substring containment over id and full name.
    pub fn search_readers(&self, query: &str) -> Vec<&Reader> {
        let needle = query.to_lowercase();
        self.readers
            .iter()
            .filter(|r| {
                r.id.to_lowercase().contains(&needle)
                    || full_name(r).to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Draw `R` + a uniform random number in `[1000, 9999)`, re-rolling on
    /// collision.
    pub fn generate_unique_reader_id(existing: &[Reader]) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id = format!("R{}", rng.gen_range(1000..9999));
            if !existing.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }

    // ---- lending ----

    /// Lend `code` to `reader_id`: link the book and mark it taken with the
    /// given date, in a single call so no caller can observe a half-lent
    /// state.
    pub fn lend_book(&mut self, code: &str, reader_id: &str, date: NaiveDate) -> CatalogResult<()> {
        let book_index = self
            .find_book_index(code)
            .ok_or_else(|| CatalogError::NotFound(format!("book {}", code)))?;
        if self.books[book_index].is_taken {
            return Err(CatalogError::AlreadyInState(format!(
                "book {} is already lent out",
                code
            )));
        }
        let reader_index = self
            .find_reader_index(reader_id)
            .ok_or_else(|| CatalogError::NotFound(format!("reader {}", reader_id)))?;
        if self.readers[reader_index].taken_books.iter().any(|c| c == code) {
            return Err(CatalogError::AlreadyInState(format!(
                "reader {} already holds book {}",
                reader_id, code
            )));
        }

        self.readers[reader_index].taken_books.push(code.to_string());
        self.books[book_index].is_taken = true;
        self.books[book_index].date_taken = Some(date);

        self.emit(CatalogEvent::ReaderRowsChanged {
            start: reader_index,
            end: reader_index,
        });
        self.emit(CatalogEvent::BookRowsChanged {
            start: book_index,
            end: book_index,
        });
        Ok(())
    }

    /// Return `code` from `reader_id`: unlink the book and mark it
    /// available, clearing the lending date.
    pub fn return_book(&mut self, code: &str, reader_id: &str) -> CatalogResult<()> {
        let book_index = self
            .find_book_index(code)
            .ok_or_else(|| CatalogError::NotFound(format!("book {}", code)))?;
        if !self.books[book_index].is_taken {
            return Err(CatalogError::AlreadyInState(format!(
                "book {} is already available",
                code
            )));
        }
        let reader_index = self
            .find_reader_index(reader_id)
            .ok_or_else(|| CatalogError::NotFound(format!("reader {}", reader_id)))?;
        if !self.readers[reader_index].taken_books.iter().any(|c| c == code) {
            return Err(CatalogError::NotFound(format!(
                "book {} is not linked to reader {}",
                code, reader_id
            )));
        }

        self.readers[reader_index].taken_books.retain(|c| c != code);
        self.books[book_index].is_taken = false;
        self.books[book_index].date_taken = None;

        self.emit(CatalogEvent::ReaderRowsChanged {
            start: reader_index,
            end: reader_index,
        });
        self.emit(CatalogEvent::BookRowsChanged {
            start: book_index,
            end: book_index,
        });
        Ok(())
    }
}
