//! End-to-end tests for the consistency report pipeline.

use chrono::NaiveDate;
use tempfile::tempdir;

use lectorium::{
    error::{CatalogError, ReportStage},
    models::{Book, Catalog, Gender, Reader},
    report::{self, NO_DEBTORS_NOTICE},
};

fn catalog_with_one_debtor() -> Catalog {
    let taken = Book {
        code: "B1001".into(),
        title: "Война и мир".into(),
        author: "Лев Толстой".into(),
        is_taken: true,
        date_taken: NaiveDate::from_ymd_opt(2024, 5, 10),
    };
    let available = Book::new("B1002", "Алые паруса", "Александр Грин");
    let mut reader = Reader::new("R1000", "Иванов", "Иван", None, Gender::Male, None);
    reader.taken_books = vec!["B1001".into()];
    Catalog {
        books: vec![taken, available],
        readers: vec![reader],
    }
}

#[tokio::test]
async fn report_lists_exactly_one_debtor_row() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("report.html");

    let summary = report::run_report(catalog_with_one_debtor(), dest.clone())
        .await
        .expect("pipeline failed");

    assert_eq!(summary.debtor_count, 1);
    assert_eq!(summary.stats.total_books, 2);
    assert_eq!(summary.stats.books_taken, 1);

    let html = std::fs::read_to_string(&dest).unwrap();
    // The debtor table references that reader and that book, once.
    assert_eq!(html.matches("Иванов Иван").count(), 2); // reader table + debtor table
    assert!(html.contains("B1001"));
    assert!(!html.contains(NO_DEBTORS_NOTICE));
}

#[tokio::test]
async fn empty_catalog_report_states_no_debtors() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("report.html");

    let summary = report::run_report(Catalog::default(), dest.clone())
        .await
        .expect("pipeline failed");

    assert_eq!(summary.debtor_count, 0);
    let html = std::fs::read_to_string(&dest).unwrap();
    assert!(html.contains(NO_DEBTORS_NOTICE));
}

#[tokio::test]
async fn unwritable_destination_fails_the_render_stage_cleanly() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("no-such-dir").join("report.html");

    let err = report::run_report(catalog_with_one_debtor(), dest.clone())
        .await
        .expect_err("pipeline should fail");

    match err {
        CatalogError::PipelineStage { stage, .. } => assert_eq!(stage, ReportStage::Render),
        other => panic!("unexpected error: {}", other),
    }
    // No partial output file is left behind.
    assert!(!dest.exists());
}

#[tokio::test]
async fn report_document_is_complete_and_ordered() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("report.html");
    report::run_report(catalog_with_one_debtor(), dest.clone())
        .await
        .unwrap();

    let html = std::fs::read_to_string(&dest).unwrap();
    let stats = html.find("<h2>Statistics</h2>").unwrap();
    let books = html.find("<h2>Books</h2>").unwrap();
    let readers = html.find("<h2>Readers</h2>").unwrap();
    let debtors = html.find("<h2>Debtors</h2>").unwrap();
    assert!(stats < books && books < readers && readers < debtors);

    // Books are sorted by title, so "Алые паруса" is listed first.
    let first = html.find("Алые паруса").unwrap();
    let second = html.find("Война и мир").unwrap();
    assert!(first < second);
}
