//! Scenario tests walking validated input through the store, the way the
//! interactive shell drives it.

use chrono::NaiveDate;

use lectorium::{
    catalog::CatalogStore,
    error::CatalogError,
    models::{Book, Gender, Reader},
    validation,
};

#[test]
fn add_and_lend_a_validated_book() {
    let title = validation::validate_title("  Война  и мир ").unwrap();
    let author = validation::validate_author("Лев Толстой").unwrap();

    let mut store = CatalogStore::new();
    let code = store.add_book(Book::new(
        CatalogStore::generate_unique_book_code(store.books()),
        title,
        author,
    ));
    assert!(!store.find_book(&code).unwrap().is_taken);

    store.add_reader(Reader::new("R1000", "Иванов", "Иван", None, Gender::Male, None));

    let (code, reader_id) =
        validation::validate_lending_ids(&code.to_lowercase(), " r1000 ").unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    store.lend_book(&code, &reader_id, date).unwrap();

    let book = store.find_book(&code).unwrap();
    assert!(book.is_taken);
    assert_eq!(book.date_taken, Some(date));
}

#[test]
fn reader_removal_is_guarded_by_outstanding_loans() {
    let mut store = CatalogStore::new();
    store.add_reader(Reader::new("R1234", "Петрова", "Анна", None, Gender::Female, None));
    store.add_book(Book::new("B0001", "Алые паруса", "Александр Грин"));

    assert!(store.add_link("R1234", "B0001"));
    assert_eq!(store.find_reader("R1234").unwrap().taken_books, ["B0001"]);

    assert!(matches!(
        store.remove_reader("R1234"),
        Err(CatalogError::DeleteForbidden(_))
    ));

    assert!(store.remove_link("R1234", "B0001"));
    assert!(store.remove_reader("R1234").unwrap());
    assert!(store.find_reader("R1234").is_none());
}

#[test]
fn invalid_input_never_reaches_the_store() {
    let mut store = CatalogStore::new();

    // Title validation fails fast, so nothing is added.
    let result = validation::validate_title("!!!");
    assert!(result.is_err());
    assert!(store.books().is_empty());

    // A malformed lending pair is rejected before any lookup happens.
    assert!(validation::validate_lending_ids("B12", "R0001").is_err());
    store.add_book(Book::new("B0001", "Книга о книгах", "Автор Авторов"));
    assert!(!store.find_book("B0001").unwrap().is_taken);
}

#[test]
fn generated_ids_fit_the_documented_patterns() {
    let code = CatalogStore::generate_unique_book_code(&[]);
    let id = CatalogStore::generate_unique_reader_id(&[]);
    assert!(validation::validate_lending_ids(&code, &id).is_ok());
}
