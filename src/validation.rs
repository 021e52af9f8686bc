//! Free-text validation and normalization.
//!
//! Stateless, pure functions. Each one collapses internal whitespace runs and
//! trims the ends first, then applies its rules in order; the first violated
//! rule wins. On success the normalized text is returned, and re-validating
//! that output succeeds again (normalization is idempotent).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CatalogError, CatalogResult};

static TITLE_ALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\p{L}\p{N}\s.,:;!?()\[\]{}'"«»\-–—/\\+&%#@]+$"#).unwrap()
});

static NAME_ALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\-'.\s]+$").unwrap());

static PUNCT_OR_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{P}\p{S}]").unwrap());

static DOUBLED_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new("(-{2,}|'{2,}|`{2,})").unwrap());

static BOOK_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^B[0-9]{3,5}$").unwrap());

static READER_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^R[0-9]{4}$").unwrap());

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_punct_or_symbol(c: char) -> bool {
    let mut buf = [0u8; 4];
    PUNCT_OR_SYMBOL.is_match(c.encode_utf8(&mut buf))
}

fn count_letters(s: &str) -> usize {
    s.chars().filter(|c| c.is_alphabetic()).count()
}

fn count_digits(s: &str) -> usize {
    s.chars().filter(|c| c.is_numeric()).count()
}

/// True when the same punctuation or symbol character repeats 3+ times in a row.
fn has_long_repeated_punct(s: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in s.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run >= 3 && is_punct_or_symbol(c) {
            return true;
        }
    }
    false
}

fn first_alnum_index(s: &str) -> Option<usize> {
    s.chars().position(|c| c.is_alphanumeric())
}

fn last_alnum_index(s: &str) -> Option<usize> {
    let total = s.chars().count();
    s.chars()
        .rev()
        .position(|c| c.is_alphanumeric())
        .map(|i| total - 1 - i)
}

/// Validate a book title and return its normalized form.
pub fn validate_title(raw: &str) -> CatalogResult<String> {
    let title = normalize_spaces(raw);

    if title.is_empty() {
        return Err(CatalogError::EmptyField("title".into()));
    }

    if title.chars().next().is_some_and(is_punct_or_symbol) {
        return Err(CatalogError::InvalidFormat(
            "title must not start with punctuation".into(),
        ));
    }

    if !TITLE_ALLOWED.is_match(&title) {
        return Err(CatalogError::InvalidFormat(
            "title contains forbidden characters".into(),
        ));
    }

    let letters = count_letters(&title);
    let digits = count_digits(&title);

    if letters + digits < 1 {
        return Err(CatalogError::InvalidFormat(
            "title must contain letters or digits".into(),
        ));
    }

    if has_long_repeated_punct(&title) {
        return Err(CatalogError::InvalidFormat(
            "title contains repeated punctuation".into(),
        ));
    }

    if DOUBLED_HYPHENS.is_match(&title) {
        return Err(CatalogError::InvalidFormat(
            "doubled hyphens or apostrophes are not allowed in a title".into(),
        ));
    }

    let total = title.chars().count();
    let first = first_alnum_index(&title);
    let last = last_alnum_index(&title);
    match (first, last) {
        (Some(first), Some(last)) => {
            if first > 3 {
                return Err(CatalogError::InvalidFormat(
                    "title starts with too much punctuation".into(),
                ));
            }
            if total - 1 - last > 3 {
                return Err(CatalogError::InvalidFormat(
                    "title ends with too much punctuation".into(),
                ));
            }
        }
        _ => {
            return Err(CatalogError::InvalidFormat(
                "title has no alphanumeric characters".into(),
            ));
        }
    }

    // One-letter titles are only meaningful for things like "C++" or "C#".
    if letters > 0 && letters < 2 && digits == 0 && !title.contains('+') && !title.contains('#') {
        return Err(CatalogError::InvalidFormat("title is too short".into()));
    }

    Ok(title)
}

/// Validate a person-name field (author, last name, first name) and return
/// its normalized form. `field` names the offending field in errors.
pub fn validate_person_name(raw: &str, field: &str) -> CatalogResult<String> {
    let name = normalize_spaces(raw);

    if name.is_empty() {
        return Err(CatalogError::EmptyField(field.into()));
    }

    if !NAME_ALLOWED.is_match(&name) {
        return Err(CatalogError::InvalidFormat(format!(
            "{} contains forbidden characters",
            field
        )));
    }

    if DOUBLED_HYPHENS.is_match(&name) {
        return Err(CatalogError::InvalidFormat(format!(
            "{} contains doubled hyphens or apostrophes",
            field
        )));
    }

    let first = name.chars().next().unwrap_or(' ');
    let last = name.chars().next_back().unwrap_or(' ');
    if matches!(first, '-' | '\'' | '.') || matches!(last, '-' | '\'' | '.') {
        return Err(CatalogError::InvalidFormat(format!(
            "{} must not start or end with punctuation",
            field
        )));
    }

    if count_letters(&name) < 2 {
        return Err(CatalogError::InvalidFormat(format!(
            "{} must contain at least 2 letters",
            field
        )));
    }

    Ok(name)
}

/// Validate an author name and return its normalized form.
pub fn validate_author(raw: &str) -> CatalogResult<String> {
    validate_person_name(raw, "author")
}

/// Validate an optional middle name. A missing or blank value is fine and
/// normalizes to `None`. A supplied one must be longer than 2 characters
/// unless it is an initial containing a period, and then follows the usual
/// person-name rules.
pub fn validate_middle_name(raw: Option<&str>) -> CatalogResult<Option<String>> {
    let Some(raw) = raw else { return Ok(None) };
    let middle = normalize_spaces(raw);
    if middle.is_empty() {
        return Ok(None);
    }
    if middle.chars().count() <= 2 && !middle.contains('.') {
        return Err(CatalogError::InvalidFormat("middle name is too short".into()));
    }
    validate_person_name(&middle, "middle name").map(Some)
}

/// Validate a lending operation's identifier pair. Both fields are required;
/// matching is case-insensitive and the returned pair is uppercased.
pub fn validate_lending_ids(code: &str, reader_id: &str) -> CatalogResult<(String, String)> {
    let code = code.trim().to_uppercase();
    let reader_id = reader_id.trim().to_uppercase();

    if code.is_empty() {
        return Err(CatalogError::EmptyField("book code".into()));
    }
    if reader_id.is_empty() {
        return Err(CatalogError::EmptyField("reader id".into()));
    }

    if !BOOK_CODE.is_match(&code) {
        return Err(CatalogError::InvalidFormat(
            "book code must be 'B' followed by 3-5 digits".into(),
        ));
    }
    if !READER_ID.is_match(&reader_id) {
        return Err(CatalogError::InvalidFormat(
            "reader id must be 'R' followed by 4 digits".into(),
        ));
    }

    Ok((code, reader_id))
}

/// Validate a search query and return its normalized form.
pub fn validate_search_query(raw: &str) -> CatalogResult<String> {
    let query = normalize_spaces(raw);
    if query.is_empty() {
        return Err(CatalogError::EmptyField("search query".into()));
    }
    if !TITLE_ALLOWED.is_match(&query) {
        return Err(CatalogError::InvalidFormat(
            "search query contains forbidden characters".into(),
        ));
    }
    Ok(query)
}
