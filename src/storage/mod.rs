//! Persistence backends.
//!
//! Three interchangeable adapters share one contract: serialize the full
//! catalog to an external medium and read it back losslessly. Backends move
//! plain [`Catalog`] values around and never enforce catalog invariants
//! themselves.

pub mod json;
pub mod sqlite;
pub mod xml;

pub use json::JsonStorage;
pub use sqlite::SqliteStorage;
pub use xml::XmlStorage;

use crate::{
    error::{CatalogError, CatalogResult},
    models::Catalog,
};

pub trait PersistenceAdapter {
    fn save(&self, catalog: &Catalog) -> CatalogResult<()>;
    fn load(&self) -> CatalogResult<Catalog>;
    /// Human-readable backend description for log lines.
    fn describe(&self) -> String;
}

/// Walk the adapter chain in order and return the first non-empty catalog.
///
/// A failed or empty load logs and falls through to the next backend; when
/// every backend comes up empty the catalog simply starts empty.
pub fn load_first_available(adapters: &[&dyn PersistenceAdapter]) -> Catalog {
    for adapter in adapters {
        match adapter.load() {
            Ok(catalog) if !catalog.is_empty() => {
                tracing::info!(
                    backend = %adapter.describe(),
                    books = catalog.books.len(),
                    readers = catalog.readers.len(),
                    "catalog loaded"
                );
                return catalog;
            }
            Ok(_) => {
                tracing::debug!(backend = %adapter.describe(), "backend empty, trying next");
            }
            Err(e) => {
                tracing::warn!(backend = %adapter.describe(), error = %e, "load failed, trying next");
            }
        }
    }
    tracing::info!("no backend had data, starting with an empty catalog");
    Catalog::default()
}

/// Write the catalog through every backend. Each failure is logged and the
/// remaining backends are still attempted; the first error is returned so
/// the caller can report it. In-memory state is never affected.
pub fn save_all(
    adapters: &[&dyn PersistenceAdapter],
    catalog: &Catalog,
) -> CatalogResult<()> {
    let mut first_failure: Option<CatalogError> = None;
    for adapter in adapters {
        if let Err(e) = adapter.save(catalog) {
            tracing::warn!(backend = %adapter.describe(), error = %e, "save failed");
            first_failure.get_or_insert(e);
        }
    }
    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
