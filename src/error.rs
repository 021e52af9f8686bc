//! Error types for the catalog core

use thiserror::Error;

/// Report pipeline stage names, carried by [`CatalogError::PipelineStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Snapshot,
    Aggregate,
    Render,
}

impl std::fmt::Display for ReportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReportStage::Snapshot => "snapshot",
            ReportStage::Aggregate => "aggregate",
            ReportStage::Render => "render",
        };
        write!(f, "{}", name)
    }
}

/// Main error type of the catalog core.
///
/// Validation failures (`EmptyField`, `InvalidFormat`) are raised before any
/// mutation happens. Store guard failures (`NotFound`, `AlreadyInState`,
/// `DeleteForbidden`) are returned instead of silently doing nothing, so the
/// caller can tell a key miss from a forbidden operation.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Invalid input: {0}")]
    InvalidFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already in requested state: {0}")]
    AlreadyInState(String),

    #[error("Delete forbidden: {0}")]
    DeleteForbidden(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Report pipeline failed at {stage} stage: {source}")]
    PipelineStage {
        stage: ReportStage,
        #[source]
        source: Box<CatalogError>,
    },
}

impl From<quick_xml::Error> for CatalogError {
    fn from(e: quick_xml::Error) -> Self {
        CatalogError::Xml(e.to_string())
    }
}

impl CatalogError {
    /// Wrap an error as a failure of the given pipeline stage.
    pub fn at_stage(self, stage: ReportStage) -> Self {
        CatalogError::PipelineStage {
            stage,
            source: Box::new(self),
        }
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
