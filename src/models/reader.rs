//! Reader model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{opt_date, opt_str};

/// Reader gender. Stored as 0 (female) / 1 (male) in every backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl From<u8> for Gender {
    fn from(v: u8) -> Self {
        match v {
            1 => Gender::Male,
            _ => Gender::Female,
        }
    }
}

impl From<Gender> for u8 {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }
}

/// A registered library reader.
///
/// `id` is the unique key (`R` + 4 digits). `taken_books` is an ordered,
/// duplicate-free list of book codes currently lent to this reader; the
/// store keeps it in sync with `Book::is_taken`.
///
/// Wire names keep the legacy columns, where `first_name` historically holds
/// the LAST name and `second_name` the first name. The struct uses honest
/// field names and maps them through serde renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "first_name")]
    pub last_name: String,
    #[serde(rename = "second_name")]
    pub first_name: String,
    #[serde(rename = "third_name", with = "opt_str", default)]
    pub middle_name: Option<String>,
    pub gender: Gender,
    #[serde(rename = "reg_date", with = "opt_date", default)]
    pub registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub taken_books: Vec<String>,
}

impl Reader {
    pub fn new(
        id: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        middle_name: Option<String>,
        gender: Gender,
        registration_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            middle_name,
            gender,
            registration_date,
            taken_books: Vec::new(),
        }
    }
}

/// Display name in "Last First Middle" order, skipping a missing middle name.
pub fn full_name(reader: &Reader) -> String {
    match reader.middle_name.as_deref() {
        Some(middle) if !middle.is_empty() => {
            format!("{} {} {}", reader.last_name, reader.first_name, middle)
        }
        _ => format!("{} {}", reader.last_name, reader.first_name),
    }
}
