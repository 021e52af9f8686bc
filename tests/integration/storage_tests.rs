//! Round-trip and fallback tests for the persistence backends.

use chrono::NaiveDate;
use tempfile::tempdir;

use lectorium::{
    models::{Book, Catalog, Gender, Reader},
    storage::{self, JsonStorage, PersistenceAdapter, SqliteStorage, XmlStorage},
};

fn sample_catalog() -> Catalog {
    let taken = Book {
        code: "B1001".into(),
        title: "Война и мир".into(),
        author: "Лев Толстой".into(),
        is_taken: true,
        date_taken: NaiveDate::from_ymd_opt(2024, 5, 10),
    };
    let available = Book::new("B1002", "Tom & Jerry: \"the book\"", "Hanna-Barbera");
    let mut holder = Reader::new(
        "R1000",
        "Иванов",
        "Иван",
        Some("Иванович".into()),
        Gender::Male,
        NaiveDate::from_ymd_opt(2024, 1, 15),
    );
    holder.taken_books = vec!["B1001".into()];
    let newcomer = Reader::new("R1001", "Петрова", "Анна", None, Gender::Female, None);
    Catalog {
        books: vec![taken, available],
        readers: vec![holder, newcomer],
    }
}

fn single_book_catalog() -> Catalog {
    Catalog {
        books: vec![Book::new("B0001", "Алые паруса", "Александр Грин")],
        readers: vec![],
    }
}

fn assert_roundtrip(adapter: &dyn PersistenceAdapter, catalog: &Catalog) {
    adapter.save(catalog).expect("save failed");
    let loaded = adapter.load().expect("load failed");
    assert_eq!(&loaded, catalog);
}

#[test]
fn json_roundtrips_all_catalog_shapes() {
    let dir = tempdir().unwrap();
    let adapter = JsonStorage::new(dir.path().join("books.json"), dir.path().join("readers.json"));
    assert_roundtrip(&adapter, &Catalog::default());
    assert_roundtrip(&adapter, &single_book_catalog());
    assert_roundtrip(&adapter, &sample_catalog());
}

#[test]
fn xml_roundtrips_all_catalog_shapes() {
    let dir = tempdir().unwrap();
    let adapter = XmlStorage::new(dir.path().join("books.xml"), dir.path().join("readers.xml"));
    assert_roundtrip(&adapter, &Catalog::default());
    assert_roundtrip(&adapter, &single_book_catalog());
    assert_roundtrip(&adapter, &sample_catalog());
}

#[test]
fn sqlite_roundtrips_all_catalog_shapes() {
    let dir = tempdir().unwrap();
    let adapter = SqliteStorage::new(dir.path().join("library.db"));
    assert_roundtrip(&adapter, &Catalog::default());
    assert_roundtrip(&adapter, &single_book_catalog());
    assert_roundtrip(&adapter, &sample_catalog());
}

#[test]
fn json_books_use_the_legacy_keys() {
    let dir = tempdir().unwrap();
    let books_path = dir.path().join("books.json");
    let adapter = JsonStorage::new(&books_path, dir.path().join("readers.json"));
    adapter.save(&sample_catalog()).unwrap();

    let raw = std::fs::read_to_string(&books_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &parsed.as_array().unwrap()[0];
    assert_eq!(first["code"], "B1001");
    assert_eq!(first["name"], "Война и мир");
    assert_eq!(first["is_taken"], true);
    assert_eq!(first["date_taken"], "10/05/2024");
}

#[test]
fn json_readers_use_the_legacy_keys() {
    let dir = tempdir().unwrap();
    let readers_path = dir.path().join("readers.json");
    let adapter = JsonStorage::new(dir.path().join("books.json"), &readers_path);
    adapter.save(&sample_catalog()).unwrap();

    let raw = std::fs::read_to_string(&readers_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &parsed.as_array().unwrap()[0];
    assert_eq!(first["ID"], "R1000");
    // Legacy column naming: "first_name" carries the last name.
    assert_eq!(first["first_name"], "Иванов");
    assert_eq!(first["second_name"], "Иван");
    assert_eq!(first["third_name"], "Иванович");
    assert_eq!(first["gender"], 1);
    assert_eq!(first["reg_date"], "15/01/2024");
    assert_eq!(first["taken_books"][0], "B1001");
}

#[test]
fn xml_nests_taken_books_as_book_leaves() {
    let dir = tempdir().unwrap();
    let readers_path = dir.path().join("readers.xml");
    let adapter = XmlStorage::new(dir.path().join("books.xml"), &readers_path);
    adapter.save(&sample_catalog()).unwrap();

    let raw = std::fs::read_to_string(&readers_path).unwrap();
    assert!(raw.contains("<taken_books>"));
    assert!(raw.contains("<book>B1001</book>"));
    assert!(raw.contains("<gender>1</gender>"));
}

#[test]
fn sqlite_saves_are_upserts_keyed_on_primary_key() {
    let dir = tempdir().unwrap();
    let adapter = SqliteStorage::new(dir.path().join("library.db"));

    let mut catalog = sample_catalog();
    adapter.save(&catalog).unwrap();

    // Same keys, changed payload: the row count must stay stable.
    catalog.books[0].title = "Война и мир, том 2".into();
    adapter.save(&catalog).unwrap();
    let loaded = adapter.load().unwrap();
    assert_eq!(loaded.books.len(), 2);
    assert_eq!(loaded.books[0].title, "Война и мир, том 2");

    // A key that left the catalog disappears from the table.
    catalog.books.remove(1);
    adapter.save(&catalog).unwrap();
    let loaded = adapter.load().unwrap();
    assert_eq!(loaded.books.len(), 1);
    assert_eq!(loaded.books[0].code, "B1001");
}

#[test]
fn sqlite_rows_are_individually_addressable() {
    let dir = tempdir().unwrap();
    let adapter = SqliteStorage::new(dir.path().join("library.db"));

    let book = Book::new("B2000", "Одна книга", "Автор Автора");
    adapter.upsert_book(&book).unwrap();
    let reader = Reader::new("R2000", "Сидоров", "Пётр", None, Gender::Male, None);
    adapter.upsert_reader(&reader).unwrap();

    let loaded = adapter.load().unwrap();
    assert_eq!(loaded.books, vec![book]);
    assert_eq!(loaded.readers, vec![reader]);

    adapter.delete_book("B2000").unwrap();
    adapter.delete_reader("R2000").unwrap();
    assert!(adapter.load().unwrap().is_empty());
}

#[test]
fn load_chain_prefers_earlier_backends_and_skips_empty_ones() {
    let dir = tempdir().unwrap();
    let sqlite = SqliteStorage::new(dir.path().join("missing.db"));
    let json = JsonStorage::new(dir.path().join("books.json"), dir.path().join("readers.json"));
    let xml = XmlStorage::new(dir.path().join("books.xml"), dir.path().join("readers.xml"));

    // Only the middle backend has data.
    json.save(&sample_catalog()).unwrap();

    let adapters: [&dyn PersistenceAdapter; 3] = [&sqlite, &json, &xml];
    let loaded = storage::load_first_available(&adapters);
    assert_eq!(loaded, sample_catalog());
}

#[test]
fn load_chain_with_nothing_available_starts_empty() {
    let dir = tempdir().unwrap();
    let sqlite = SqliteStorage::new(dir.path().join("missing.db"));
    let xml = XmlStorage::new(dir.path().join("books.xml"), dir.path().join("readers.xml"));
    let adapters: [&dyn PersistenceAdapter; 2] = [&sqlite, &xml];
    assert!(storage::load_first_available(&adapters).is_empty());
}

#[test]
fn corrupt_json_falls_through_to_the_next_backend() {
    let dir = tempdir().unwrap();
    let books_json = dir.path().join("books.json");
    std::fs::write(&books_json, "{ not json").unwrap();

    let json = JsonStorage::new(&books_json, dir.path().join("readers.json"));
    let xml = XmlStorage::new(dir.path().join("books.xml"), dir.path().join("readers.xml"));
    xml.save(&single_book_catalog()).unwrap();

    let adapters: [&dyn PersistenceAdapter; 2] = [&json, &xml];
    let loaded = storage::load_first_available(&adapters);
    assert_eq!(loaded, single_book_catalog());
}

#[test]
fn save_all_reports_the_failure_but_writes_the_rest() {
    let dir = tempdir().unwrap();
    // Unwritable location for the JSON backend.
    let json = JsonStorage::new(
        dir.path().join("no-such-dir").join("books.json"),
        dir.path().join("no-such-dir").join("readers.json"),
    );
    let sqlite = SqliteStorage::new(dir.path().join("library.db"));

    let adapters: [&dyn PersistenceAdapter; 2] = [&json, &sqlite];
    let result = storage::save_all(&adapters, &sample_catalog());
    assert!(result.is_err());
    // The healthy backend still holds the data.
    assert_eq!(sqlite.load().unwrap(), sample_catalog());
}
