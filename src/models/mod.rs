//! Plain data models for the catalog.
//!
//! Everything here is inert data: invariants are enforced by
//! [`crate::catalog::CatalogStore`], and the persistence backends read and
//! write these shapes without interpreting them.

pub mod book;
pub mod reader;

pub use book::Book;
pub use reader::{full_name, Gender, Reader};

use chrono::NaiveDate;

use crate::error::{CatalogError, CatalogResult};

/// The one textual date pattern used by every backend (`dd/MM/yyyy`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The combined in-memory collections, passed by value between the store,
/// the persistence backends and the report pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub books: Vec<Book>,
    pub readers: Vec<Reader>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.readers.is_empty()
    }
}

/// Format an optional date with [`DATE_FORMAT`], empty string for `None`.
pub fn format_opt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse an optional date in [`DATE_FORMAT`]; blank input means `None`.
pub fn parse_opt_date(raw: &str) -> CatalogResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(CatalogError::from)
}

/// serde adapter: `Option<NaiveDate>` as a `dd/MM/yyyy` string, `None` as `""`.
pub(crate) mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// serde adapter: `Option<String>` where `None` is written as `""`.
pub(crate) mod opt_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            Ok(None)
        } else {
            Ok(Some(raw))
        }
    }
}
