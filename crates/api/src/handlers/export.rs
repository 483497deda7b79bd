//! Export handlers: PDF reports, photo archives, CSV.
//!
//! Rendering and packaging are CPU-bound and run on the blocking pool.

use axum::extract::{Path, State};
use axum::response::Response;
use campo_core::error::CoreError;
use campo_core::export::{
    folder_report_entry, inspection_csv, photo_archive_entries, report_filename, slug,
    ArchiveBuilder, InspectionDocument,
};
use campo_core::report::{photo_labels, render_inspection_pdf, ReportPhoto};
use campo_core::types::DbId;
use campo_db::repositories::{FolderRepo, InspectionRepo};

use crate::error::{AppError, AppResult};
use crate::response::attachment;
use crate::state::AppState;
use crate::storage::UploadStorage;

async fn load_document(state: &AppState, id: DbId) -> AppResult<InspectionDocument> {
    let summary = InspectionRepo::find_summary(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Inspection",
            id,
        }))?;
    Ok(summary.into())
}

/// Read every photo of `doc` in report order. Unreadable files become
/// placeholders in the rendered report.
async fn load_report_photos(storage: &UploadStorage, doc: &InspectionDocument) -> Vec<ReportPhoto> {
    let mut photos = Vec::new();
    for (label, path) in photo_labels(doc) {
        let bytes = storage.read(&path).await;
        photos.push(ReportPhoto { label, bytes });
    }
    photos
}

async fn render_pdf(doc: InspectionDocument, photos: Vec<ReportPhoto>) -> AppResult<Vec<u8>> {
    let pdf = tokio::task::spawn_blocking(move || render_inspection_pdf(&doc, &photos))
        .await
        .map_err(|e| AppError::InternalError(format!("PDF render task failed: {e}")))??;
    Ok(pdf)
}

/// GET /api/inspection/pdf/{id}
pub async fn inspection_pdf(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let doc = load_document(&state, id).await?;
    let filename = report_filename(&doc);
    let photos = load_report_photos(&state.storage, &doc).await;

    let pdf = render_pdf(doc, photos).await?;
    tracing::info!(inspection_id = id, size = pdf.len(), "Exported inspection PDF");

    Ok(attachment("application/pdf", &filename, pdf))
}

/// GET /api/inspection/photos/{id}
///
/// ZIP of the stored photos. Files missing on disk are skipped.
pub async fn inspection_photos(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let doc = load_document(&state, id).await?;

    let mut files = Vec::new();
    for entry in photo_archive_entries(&doc) {
        let stored = campo_core::uploads::stored_path(&entry.file_name);
        match state.storage.read(&stored).await {
            Some(bytes) => files.push((entry.entry_name, bytes)),
            None => tracing::warn!(
                inspection_id = id,
                file = %entry.file_name,
                "Photo missing on disk, leaving it out of the archive"
            ),
        }
    }

    let archive = tokio::task::spawn_blocking(move || {
        let mut builder = ArchiveBuilder::new();
        for (name, bytes) in &files {
            builder.add_stored(name, bytes)?;
        }
        builder.finish()
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Archive task failed: {e}")))??;

    let filename = format!("{}_fotos.zip", slug(&doc.name));
    Ok(attachment("application/zip", &filename, archive))
}

/// GET /api/inspection/csv/{id}
pub async fn inspection_csv_export(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let doc = load_document(&state, id).await?;
    let csv = inspection_csv(&doc);
    let filename = format!("{}.csv", slug(&doc.name));
    Ok(attachment("text/csv; charset=utf-8", &filename, csv.into_bytes()))
}

/// GET /api/folder/pdf/{id}
///
/// ZIP with one PDF report per inspection in the folder.
pub async fn folder_pdfs(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let folder = FolderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id,
        }))?;

    let summaries = InspectionRepo::list_summaries_by_folder(&state.pool, id).await?;
    if summaries.is_empty() {
        return Err(AppError::NotFound(format!(
            "Folder '{}' has no inspections to export",
            folder.name
        )));
    }

    let mut reports = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let doc: InspectionDocument = summary.into();
        let entry = folder_report_entry(&doc);
        let photos = load_report_photos(&state.storage, &doc).await;
        let pdf = render_pdf(doc, photos).await?;
        reports.push((entry, pdf));
    }

    let count = reports.len();
    let archive = tokio::task::spawn_blocking(move || {
        let mut builder = ArchiveBuilder::new();
        for (name, pdf) in &reports {
            builder.add_file(name, pdf)?;
        }
        builder.finish()
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Archive task failed: {e}")))??;

    tracing::info!(folder_id = id, reports = count, "Exported folder PDFs");

    let filename = format!("{}_relatorios.zip", slug(&folder.name));
    Ok(attachment("application/zip", &filename, archive))
}
