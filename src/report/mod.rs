//! Consistency report pipeline.
//!
//! Three stages run as independent tasks wired with single-shot typed
//! channels: snapshot -> aggregate -> render. A stage only starts its
//! consuming work once the upstream stage has published its whole output,
//! and everything crossing a task boundary is an owned value, so the
//! rendered report always reflects one coherent snapshot.
//!
//! There is no cancellation and no timeout: the caller joins all three
//! tasks and receives the failure of the earliest stage that failed.

pub mod model;
pub mod render;

pub use model::{build_report, DebtorRow, ReportModel, ReportStats};
pub use render::{render_html, NO_DEBTORS_NOTICE};

use std::path::PathBuf;

use chrono::Local;
use tokio::sync::oneshot;

use crate::{
    error::{CatalogError, CatalogResult, ReportStage},
    models::Catalog,
};

/// What the pipeline hands back on success.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub destination: PathBuf,
    pub stats: ReportStats,
    pub debtor_count: usize,
}

fn join_failure(stage: ReportStage, e: tokio::task::JoinError) -> CatalogError {
    CatalogError::Internal(format!("stage task aborted: {}", e)).at_stage(stage)
}

/// Run the full pipeline over an already-copied snapshot and write the
/// rendered document to `destination`.
///
/// The snapshot must be taken on the thread that owns the catalog before
/// calling this; the snapshot stage publishes it unchanged, which is the
/// signal the aggregate stage waits for.
pub async fn run_report(snapshot: Catalog, destination: PathBuf) -> CatalogResult<ReportSummary> {
    let (snapshot_tx, snapshot_rx) = oneshot::channel::<Catalog>();
    let (model_tx, model_rx) = oneshot::channel::<ReportModel>();

    let snapshot_task = tokio::spawn(async move {
        snapshot_tx.send(snapshot).map_err(|_| {
            CatalogError::Internal("aggregate stage hung up before the snapshot arrived".into())
                .at_stage(ReportStage::Snapshot)
        })
    });

    let aggregate_task = tokio::spawn(async move {
        let snapshot = snapshot_rx.await.map_err(|_| {
            CatalogError::Internal("snapshot stage finished without publishing".into())
                .at_stage(ReportStage::Aggregate)
        })?;
        let model = build_report(&snapshot, Local::now().date_naive());
        model_tx.send(model).map_err(|_| {
            CatalogError::Internal("render stage hung up before the model arrived".into())
                .at_stage(ReportStage::Aggregate)
        })
    });

    let render_dest = destination.clone();
    let render_task = tokio::spawn(async move {
        let model = model_rx.await.map_err(|_| {
            CatalogError::Internal("aggregate stage finished without publishing".into())
                .at_stage(ReportStage::Render)
        })?;
        let html = render_html(&model);
        // Single write of the complete document; a failure here leaves no
        // half-written file behind.
        tokio::fs::write(&render_dest, html)
            .await
            .map_err(|e| CatalogError::from(e).at_stage(ReportStage::Render))?;
        Ok::<_, CatalogError>((model.stats, model.debtors.len()))
    });

    // Join in stage order so the first chronological failure wins; a failed
    // upstream stage makes every downstream receive fail too, but those are
    // secondary.
    let snapshot_result = snapshot_task
        .await
        .map_err(|e| join_failure(ReportStage::Snapshot, e))?;
    let aggregate_result = aggregate_task
        .await
        .map_err(|e| join_failure(ReportStage::Aggregate, e))?;
    let render_result = render_task
        .await
        .map_err(|e| join_failure(ReportStage::Render, e))?;

    snapshot_result?;
    aggregate_result?;
    let (stats, debtor_count) = render_result?;

    tracing::info!(
        destination = %destination.display(),
        books = stats.total_books,
        readers = stats.total_readers,
        debtors = debtor_count,
        "consistency report written"
    );

    Ok(ReportSummary {
        destination,
        stats,
        debtor_count,
    })
}
