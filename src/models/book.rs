//! Book model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::opt_date;

/// A single catalog entry.
///
/// `code` is the unique key (`B` + 3-5 digits). The lending state machine is
/// `Available -> Taken -> Available`; `date_taken` is set on lending and
/// cleared on return, and removal is only legal while available. All of this
/// is enforced by the store, not here.
///
/// The serde names match the legacy files: `code|name|author|is_taken|date_taken`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub code: String,
    #[serde(rename = "name")]
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub is_taken: bool,
    #[serde(with = "opt_date", default)]
    pub date_taken: Option<NaiveDate>,
}

impl Book {
    /// A freshly added book is always available.
    pub fn new(code: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            author: author.into(),
            is_taken: false,
            date_taken: None,
        }
    }
}
