//! Export formats for inspections: CSV rows and ZIP archives.
//!
//! PDF rendering lives in [`crate::report`]; this module packages the
//! results and builds the plain-text formats.

use std::io::{Cursor, Write};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::uploads::filename_from_stored;

/// Everything an export needs to know about one inspection.
///
/// Photo fields hold persisted relative paths (`static/uploads/...`).
#[derive(Debug, Clone, Serialize)]
pub struct InspectionDocument {
    pub id: DbId,
    pub name: String,
    pub folder_name: Option<String>,
    pub dimensions_value: Option<String>,
    pub dimensions_unit: Option<String>,
    pub observations: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub created_at: Timestamp,
    pub jusante_photo: String,
    pub montante_photo: String,
    pub other_photos: Vec<String>,
}

impl InspectionDocument {
    /// Dimensions as displayed in reports, e.g. `"12.5 m"`.
    pub fn dimensions_display(&self) -> Option<String> {
        match (self.dimensions_value.as_deref(), self.dimensions_unit.as_deref()) {
            (Some(value), Some(unit)) => Some(format!("{value} {unit}")),
            (Some(value), None) => Some(value.to_string()),
            (None, Some(unit)) => Some(unit.to_string()),
            (None, None) => None,
        }
    }

    /// Coordinates as displayed in reports, e.g. `"-23.550139, -46.633333"`.
    pub fn coordinates_display(&self) -> Option<String> {
        match (self.latitude.as_deref(), self.longitude.as_deref()) {
            (Some(lat), Some(lon)) => Some(format!("{lat}, {lon}")),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Filesystem-safe lowercase rendering of a name for download filenames.
///
/// Runs of anything that is not an ASCII letter or digit collapse into a
/// single `_`. An empty result falls back to `inspection`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        "inspection".to_string()
    } else {
        out
    }
}

/// `{slug}_relatorio.pdf`
pub fn report_filename(doc: &InspectionDocument) -> String {
    format!("{}_relatorio.pdf", slug(&doc.name))
}

/// Entry name of an inspection's report inside a folder archive.
pub fn folder_report_entry(doc: &InspectionDocument) -> String {
    format!("{}_{}.pdf", slug(&doc.name), doc.id)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub const CSV_HEADER: [&str; 12] = [
    "id",
    "folder",
    "name",
    "dimensions_value",
    "dimensions_unit",
    "observations",
    "latitude",
    "longitude",
    "created_at",
    "jusante_photo",
    "montante_photo",
    "other_photos",
];

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Build the CSV export for one inspection: a header line and one data row.
pub fn inspection_csv(doc: &InspectionDocument) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();

    let row = [
        doc.id.to_string(),
        opt(&doc.folder_name),
        doc.name.clone(),
        opt(&doc.dimensions_value),
        opt(&doc.dimensions_unit),
        opt(&doc.observations),
        opt(&doc.latitude),
        opt(&doc.longitude),
        doc.created_at.to_rfc3339(),
        doc.jusante_photo.clone(),
        doc.montante_photo.clone(),
        doc.other_photos.join(";"),
    ];

    let header = CSV_HEADER.join(",");
    let data: Vec<String> = row.iter().map(|v| csv_escape(v)).collect();
    format!("{header}\n{}\n", data.join(","))
}

// ---------------------------------------------------------------------------
// ZIP
// ---------------------------------------------------------------------------

/// A photo to include in an inspection's photo archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name inside the archive.
    pub entry_name: String,
    /// Bare filename inside the uploads directory.
    pub file_name: String,
}

/// Plan the photo archive layout: `jusante_{file}`, `montante_{file}`,
/// and `outras/{file}` for extras.
///
/// Paths that do not resolve to a file inside the uploads directory are
/// dropped with a warning.
pub fn photo_archive_entries(doc: &InspectionDocument) -> Vec<ArchiveEntry> {
    let mut entries = Vec::with_capacity(2 + doc.other_photos.len());

    let mut push = |path: &str, entry_prefix: &str| match filename_from_stored(path) {
        Some(file) => entries.push(ArchiveEntry {
            entry_name: format!("{entry_prefix}{file}"),
            file_name: file.to_string(),
        }),
        None => tracing::warn!(inspection_id = doc.id, path, "Skipping photo with invalid path"),
    };

    push(&doc.jusante_photo, "jusante_");
    push(&doc.montante_photo, "montante_");
    for path in &doc.other_photos {
        push(path, "outras/");
    }

    entries
}

/// In-memory ZIP archive writer.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Add an entry compressed with deflate.
    pub fn add_file(&mut self, name: &str, contents: &[u8]) -> Result<(), CoreError> {
        self.add(name, contents, CompressionMethod::Deflated)
    }

    /// Add an entry without compression, for already-compressed data
    /// such as JPEG photos.
    pub fn add_stored(&mut self, name: &str, contents: &[u8]) -> Result<(), CoreError> {
        self.add(name, contents, CompressionMethod::Stored)
    }

    fn add(
        &mut self,
        name: &str,
        contents: &[u8],
        method: CompressionMethod,
    ) -> Result<(), CoreError> {
        let options = SimpleFileOptions::default().compression_method(method);
        self.writer
            .start_file(name, options)
            .map_err(|e| CoreError::Internal(format!("Failed to start zip entry {name}: {e}")))?;
        self.writer
            .write_all(contents)
            .map_err(|e| CoreError::Internal(format!("Failed to write zip entry {name}: {e}")))?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Finalize the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, CoreError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| CoreError::Internal(format!("Failed to finalize zip archive: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
