//! XML backend: two files with nested markup.
//!
//! `<books>` holds `<book>` elements with `code,name,author,is_taken(0/1),
//! date_taken` children; `<readers>` holds `<reader>` elements with
//! `ID,first_name,second_name,third_name,gender(0/1),reg_date` children plus
//! a nested `<taken_books>` of repeated `<book>CODE</book>` leaves.
//!
//! Reading is a streaming event walk: open a record on its start tag, fill
//! fields from text nodes, close it on the end tag.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader as XmlReader, Writer as XmlWriter};

use crate::{
    error::CatalogResult,
    models::{format_opt_date, parse_opt_date, Book, Catalog, Gender, Reader},
};

use super::PersistenceAdapter;

pub struct XmlStorage {
    books_path: PathBuf,
    readers_path: PathBuf,
}

impl XmlStorage {
    pub fn new(books_path: impl Into<PathBuf>, readers_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            readers_path: readers_path.into(),
        }
    }

    fn write_books(&self, books: &[Book]) -> CatalogResult<()> {
        let mut writer = XmlWriter::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("books")))?;
        for book in books {
            writer.write_event(Event::Start(BytesStart::new("book")))?;
            write_text_element(&mut writer, "code", &book.code)?;
            write_text_element(&mut writer, "name", &book.title)?;
            write_text_element(&mut writer, "author", &book.author)?;
            write_text_element(&mut writer, "is_taken", if book.is_taken { "1" } else { "0" })?;
            write_text_element(&mut writer, "date_taken", &format_opt_date(book.date_taken))?;
            writer.write_event(Event::End(BytesEnd::new("book")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("books")))?;
        fs::write(&self.books_path, writer.into_inner())?;
        Ok(())
    }

    fn write_readers(&self, readers: &[Reader]) -> CatalogResult<()> {
        let mut writer = XmlWriter::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("readers")))?;
        for reader in readers {
            writer.write_event(Event::Start(BytesStart::new("reader")))?;
            write_text_element(&mut writer, "ID", &reader.id)?;
            write_text_element(&mut writer, "first_name", &reader.last_name)?;
            write_text_element(&mut writer, "second_name", &reader.first_name)?;
            write_text_element(
                &mut writer,
                "third_name",
                reader.middle_name.as_deref().unwrap_or(""),
            )?;
            write_text_element(
                &mut writer,
                "gender",
                if reader.gender == Gender::Male { "1" } else { "0" },
            )?;
            write_text_element(
                &mut writer,
                "reg_date",
                &format_opt_date(reader.registration_date),
            )?;
            writer.write_event(Event::Start(BytesStart::new("taken_books")))?;
            for code in &reader.taken_books {
                write_text_element(&mut writer, "book", code)?;
            }
            writer.write_event(Event::End(BytesEnd::new("taken_books")))?;
            writer.write_event(Event::End(BytesEnd::new("reader")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("readers")))?;
        fs::write(&self.readers_path, writer.into_inner())?;
        Ok(())
    }

    fn read_books(path: &Path) -> CatalogResult<Vec<Book>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(path)?;
        let mut reader = XmlReader::from_str(&data);
        reader.config_mut().trim_text(true);

        let mut books = Vec::new();
        let mut current: Option<Book> = None;
        let mut field: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if tag == "book" {
                        current = Some(Book::default());
                        field = None;
                    } else if current.is_some() {
                        field = Some(tag);
                    }
                }
                Event::Text(e) => {
                    if let (Some(book), Some(tag)) = (current.as_mut(), field.as_deref()) {
                        let text = e.unescape()?.into_owned();
                        match tag {
                            "code" => book.code = text,
                            "name" => book.title = text,
                            "author" => book.author = text,
                            "is_taken" => {
                                let v = text.trim().to_lowercase();
                                book.is_taken = v == "1" || v == "true";
                            }
                            "date_taken" => book.date_taken = parse_opt_date(&text)?,
                            _ => {}
                        }
                    }
                }
                Event::End(e) => {
                    if e.name().as_ref() == b"book" {
                        if let Some(book) = current.take() {
                            books.push(book);
                        }
                    } else {
                        field = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(books)
    }

    fn read_readers(path: &Path) -> CatalogResult<Vec<Reader>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(path)?;
        let mut reader = XmlReader::from_str(&data);
        reader.config_mut().trim_text(true);

        let mut readers = Vec::new();
        let mut current: Option<Reader> = None;
        let mut field: Option<String> = None;
        let mut in_taken_books = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match tag.as_str() {
                        "reader" => {
                            current = Some(Reader::default());
                            field = None;
                            in_taken_books = false;
                        }
                        "taken_books" if current.is_some() => {
                            in_taken_books = true;
                            field = None;
                        }
                        _ if current.is_some() => field = Some(tag),
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    let Some(record) = current.as_mut() else { continue };
                    let text = e.unescape()?.into_owned();
                    if in_taken_books {
                        if field.as_deref() == Some("book") {
                            let code = text.trim().to_string();
                            if !code.is_empty() {
                                record.taken_books.push(code);
                            }
                        }
                        continue;
                    }
                    match field.as_deref() {
                        Some("ID") => record.id = text,
                        Some("first_name") => record.last_name = text,
                        Some("second_name") => record.first_name = text,
                        Some("third_name") => {
                            if !text.is_empty() {
                                record.middle_name = Some(text);
                            }
                        }
                        Some("gender") => {
                            record.gender = if text.trim() == "1" {
                                Gender::Male
                            } else {
                                Gender::Female
                            };
                        }
                        Some("reg_date") => record.registration_date = parse_opt_date(&text)?,
                        _ => {}
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"reader" => {
                        if let Some(record) = current.take() {
                            readers.push(record);
                        }
                    }
                    b"taken_books" => in_taken_books = false,
                    _ => field = None,
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(readers)
    }
}

fn write_text_element<W: std::io::Write>(
    writer: &mut XmlWriter<W>,
    tag: &str,
    value: &str,
) -> CatalogResult<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

impl PersistenceAdapter for XmlStorage {
    fn save(&self, catalog: &Catalog) -> CatalogResult<()> {
        self.write_books(&catalog.books)?;
        self.write_readers(&catalog.readers)?;
        Ok(())
    }

    fn load(&self) -> CatalogResult<Catalog> {
        Ok(Catalog {
            books: Self::read_books(&self.books_path)?,
            readers: Self::read_readers(&self.readers_path)?,
        })
    }

    fn describe(&self) -> String {
        format!(
            "xml ({}, {})",
            self.books_path.display(),
            self.readers_path.display()
        )
    }
}
