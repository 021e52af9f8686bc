//! Lectorium - library catalog consistency core
//!
//! The in-memory data layer of a small library-catalog manager: validated
//! free-text input, a book/reader store with cross-referential invariants
//! and a lending state machine, three interchangeable persistence backends
//! (JSON, XML, SQLite), and a concurrent three-stage consistency report
//! pipeline. The interactive shell (windows, dialogs, login) lives outside
//! this crate and talks to it through [`CatalogStore`] and the adapters.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod storage;
pub mod validation;

pub use catalog::{CatalogEvent, CatalogStore};
pub use config::AppConfig;
pub use error::{CatalogError, CatalogResult, ReportStage};
pub use models::{Book, Catalog, Gender, Reader};
