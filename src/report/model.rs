//! Aggregate stage: turn a catalog snapshot into a sorted, summarized
//! report model.

use chrono::{Datelike, NaiveDate};

use crate::models::{full_name, Book, Catalog, Reader};

/// Summary counters shown at the top of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total_books: usize,
    pub total_readers: usize,
    pub books_taken: usize,
    pub taken_this_month: usize,
    pub registered_this_month: usize,
}

/// One debtor table row: a reader still holding a book whose authoritative
/// record is marked taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtorRow {
    pub reader_id: String,
    pub reader_name: String,
    pub book_code: String,
    pub book_title: String,
    pub date_taken: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ReportModel {
    pub generated_on: NaiveDate,
    pub stats: ReportStats,
    /// Books sorted by title.
    pub books: Vec<Book>,
    /// Readers sorted by last then first name.
    pub readers: Vec<Reader>,
    pub debtors: Vec<DebtorRow>,
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// Derive the full report model from an immutable snapshot.
pub fn build_report(snapshot: &Catalog, today: NaiveDate) -> ReportModel {
    let mut books = snapshot.books.clone();
    books.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

    let mut readers = snapshot.readers.clone();
    readers.sort_by(|a, b| {
        (a.last_name.to_lowercase(), a.first_name.to_lowercase())
            .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase()))
    });

    let stats = ReportStats {
        total_books: snapshot.books.len(),
        total_readers: snapshot.readers.len(),
        books_taken: snapshot.books.iter().filter(|b| b.is_taken).count(),
        taken_this_month: snapshot
            .books
            .iter()
            .filter(|b| b.is_taken && b.date_taken.is_some_and(|d| same_month(d, today)))
            .count(),
        registered_this_month: snapshot
            .readers
            .iter()
            .filter(|r| r.registration_date.is_some_and(|d| same_month(d, today)))
            .count(),
    };

    let debtors = collect_debtors(snapshot);

    ReportModel {
        generated_on: today,
        stats,
        books,
        readers,
        debtors,
    }
}

/// A reader is a debtor once per held book that the book table still marks
/// as taken, matched by code.
fn collect_debtors(snapshot: &Catalog) -> Vec<DebtorRow> {
    let mut rows = Vec::new();
    for reader in &snapshot.readers {
        for code in &reader.taken_books {
            let Some(book) = snapshot.books.iter().find(|b| &b.code == code) else {
                continue;
            };
            if !book.is_taken {
                continue;
            }
            rows.push(DebtorRow {
                reader_id: reader.id.clone(),
                reader_name: full_name(reader),
                book_code: book.code.clone(),
                book_title: book.title.clone(),
                date_taken: book.date_taken,
            });
        }
    }
    rows
}
