//! JSON backend: two files, one array of records each.
//!
//! Books: `code|name|author|is_taken|date_taken` (date as `dd/MM/yyyy` or
//! `""`). Readers: `ID|first_name|second_name|third_name|gender|reg_date|
//! taken_books` with `gender` as 0/1 and `taken_books` as an array of code
//! strings. The serde renames on the models produce exactly these keys.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::CatalogResult,
    models::{Book, Catalog, Reader},
};

use super::PersistenceAdapter;

pub struct JsonStorage {
    books_path: PathBuf,
    readers_path: PathBuf,
}

impl JsonStorage {
    pub fn new(books_path: impl Into<PathBuf>, readers_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            readers_path: readers_path.into(),
        }
    }

    fn read_array<T: serde::de::DeserializeOwned>(path: &Path) -> CatalogResult<Vec<T>> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "json file missing, treating as empty");
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl PersistenceAdapter for JsonStorage {
    fn save(&self, catalog: &Catalog) -> CatalogResult<()> {
        fs::write(
            &self.books_path,
            serde_json::to_string_pretty(&catalog.books)?,
        )?;
        fs::write(
            &self.readers_path,
            serde_json::to_string_pretty(&catalog.readers)?,
        )?;
        Ok(())
    }

    fn load(&self) -> CatalogResult<Catalog> {
        let books: Vec<Book> = Self::read_array(&self.books_path)?;
        let readers: Vec<Reader> = Self::read_array(&self.readers_path)?;
        Ok(Catalog { books, readers })
    }

    fn describe(&self) -> String {
        format!(
            "json ({}, {})",
            self.books_path.display(),
            self.readers_path.display()
        )
    }
}
