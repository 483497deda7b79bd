//! PDF inspection reports.
//!
//! One report per inspection: a header block with the recorded fields,
//! followed by every photo scaled to the printable width. Pages are A4 and
//! content flows onto new pages as needed.

#[cfg(not(feature = "pdf"))]
use crate::error::CoreError;
use crate::export::InspectionDocument;

/// A photo slot in the report. `bytes` is `None` when the file could not be
/// read from disk; the slot then renders as a placeholder line.
#[derive(Debug, Clone)]
pub struct ReportPhoto {
    pub label: String,
    pub bytes: Option<Vec<u8>>,
}

/// Greedy word wrap to at most `max_chars` characters per line.
///
/// Explicit newlines are kept as paragraph breaks. Words longer than a
/// full line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current);
    }

    lines
}

#[cfg(feature = "pdf")]
pub use render::render_inspection_pdf;

#[cfg(not(feature = "pdf"))]
pub fn render_inspection_pdf(
    _doc: &InspectionDocument,
    _photos: &[ReportPhoto],
) -> Result<Vec<u8>, CoreError> {
    Err(CoreError::Unavailable(
        "PDF export is not available in this build".to_string(),
    ))
}

#[cfg(feature = "pdf")]
mod render {
    use printpdf::{
        BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
        PdfDocumentReference, PdfLayerReference,
    };

    use super::{wrap_text, ReportPhoto};
    use crate::error::CoreError;
    use crate::export::InspectionDocument;

    const PAGE_WIDTH_MM: f32 = 210.0;
    const PAGE_HEIGHT_MM: f32 = 297.0;
    const MARGIN_MM: f32 = 15.0;
    const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

    const TITLE_SIZE: f32 = 18.0;
    const BODY_SIZE: f32 = 11.0;
    const LINE_HEIGHT_MM: f32 = 6.0;
    /// Characters per wrapped line at body size across the content width.
    const WRAP_CHARS: usize = 95;

    /// Photos are downscaled before embedding to keep reports small.
    const MAX_PHOTO_PX: u32 = 1600;
    const PHOTO_DPI: f32 = 150.0;
    const MAX_PHOTO_HEIGHT_MM: f32 = 120.0;

    const MM_PER_INCH: f32 = 25.4;

    fn pdf_err<E: std::fmt::Debug>(context: &str) -> impl Fn(E) -> CoreError + '_ {
        move |e| CoreError::Internal(format!("{context}: {e:?}"))
    }

    /// Tracks the write position and starts new pages when content would
    /// run past the bottom margin.
    struct PageCursor {
        doc: PdfDocumentReference,
        layer: PdfLayerReference,
        regular: IndirectFontRef,
        bold: IndirectFontRef,
        y: f32,
        pages: usize,
    }

    impl PageCursor {
        fn new(title: &str) -> Result<Self, CoreError> {
            let (doc, page, layer) =
                PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            let regular = doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(pdf_err("Failed to load font"))?;
            let bold = doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_err("Failed to load font"))?;
            let layer = doc.get_page(page).get_layer(layer);

            Ok(Self {
                doc,
                layer,
                regular,
                bold,
                y: PAGE_HEIGHT_MM - MARGIN_MM,
                pages: 1,
            })
        }

        fn ensure_space(&mut self, height_mm: f32) {
            if self.y - height_mm >= MARGIN_MM {
                return;
            }
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        fn text(&mut self, text: &str, size: f32, bold: bool) {
            self.ensure_space(LINE_HEIGHT_MM);
            self.y -= LINE_HEIGHT_MM;
            let font = if bold { &self.bold } else { &self.regular };
            self.layer.use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        }

        fn field(&mut self, label: &str, value: Option<&str>) {
            let value = value.unwrap_or("-");
            self.text(&format!("{label}: {value}"), BODY_SIZE, false);
        }

        fn gap(&mut self, height_mm: f32) {
            self.y -= height_mm;
        }

        fn photo(&mut self, photo: &ReportPhoto) {
            self.gap(LINE_HEIGHT_MM / 2.0);
            self.text(&photo.label, BODY_SIZE, true);

            let Some(bytes) = photo.bytes.as_deref() else {
                self.text("[photo not available]", BODY_SIZE, false);
                return;
            };

            let decoded = match image::load_from_memory(bytes) {
                Ok(img) => img.thumbnail(MAX_PHOTO_PX, MAX_PHOTO_PX).to_rgb8(),
                Err(e) => {
                    tracing::warn!(
                        label = %photo.label,
                        error = %e,
                        "Failed to decode report photo"
                    );
                    self.text("[photo could not be decoded]", BODY_SIZE, false);
                    return;
                }
            };

            let (px_w, px_h) = (decoded.width(), decoded.height());
            let Some(buffer) =
                printpdf::image_crate::RgbImage::from_raw(px_w, px_h, decoded.into_raw())
            else {
                self.text("[photo could not be decoded]", BODY_SIZE, false);
                return;
            };

            let natural_w = px_w as f32 / PHOTO_DPI * MM_PER_INCH;
            let natural_h = px_h as f32 / PHOTO_DPI * MM_PER_INCH;
            let scale = (CONTENT_WIDTH_MM / natural_w).min(MAX_PHOTO_HEIGHT_MM / natural_h);
            let height = natural_h * scale;

            self.ensure_space(height + 2.0);
            self.y -= height + 2.0;

            let image =
                Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(buffer));
            image.add_to_layer(
                self.layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(MARGIN_MM)),
                    translate_y: Some(Mm(self.y)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(PHOTO_DPI),
                    ..Default::default()
                },
            );
        }

        fn finish(self) -> Result<Vec<u8>, CoreError> {
            self.doc
                .save_to_bytes()
                .map_err(pdf_err("Failed to serialize PDF"))
        }
    }

    /// Render the report for one inspection.
    ///
    /// Photos are drawn in the order given; callers pass jusante, montante,
    /// then extras.
    pub fn render_inspection_pdf(
        doc: &InspectionDocument,
        photos: &[ReportPhoto],
    ) -> Result<Vec<u8>, CoreError> {
        let mut page = PageCursor::new(&format!("Inspection report - {}", doc.name))?;

        page.text(&format!("Inspection report: {}", doc.name), TITLE_SIZE, true);
        page.gap(LINE_HEIGHT_MM / 2.0);

        let created = doc.created_at.format("%Y-%m-%d %H:%M").to_string();
        page.field("Folder", doc.folder_name.as_deref());
        page.field("Created", Some(&created));
        page.field("Dimensions", doc.dimensions_display().as_deref());
        page.field("Coordinates", doc.coordinates_display().as_deref());

        page.text("Observations:", BODY_SIZE, true);
        match doc.observations.as_deref().filter(|o| !o.trim().is_empty()) {
            Some(obs) => {
                for line in wrap_text(obs, WRAP_CHARS) {
                    page.text(&line, BODY_SIZE, false);
                }
            }
            None => page.text("-", BODY_SIZE, false),
        }

        page.gap(LINE_HEIGHT_MM);
        page.text("Photos", TITLE_SIZE - 4.0, true);
        for photo in photos {
            page.photo(photo);
        }

        tracing::debug!(inspection_id = doc.id, pages = page.pages, "Rendered inspection report");
        page.finish()
    }
}

/// Photo slots for a report, in report order, from the document's paths.
pub fn photo_labels(doc: &InspectionDocument) -> Vec<(String, String)> {
    let mut slots = vec![
        ("Jusante (downstream)".to_string(), doc.jusante_photo.clone()),
        ("Montante (upstream)".to_string(), doc.montante_photo.clone()),
    ];
    slots.extend(
        doc.other_photos
            .iter()
            .enumerate()
            .map(|(i, path)| (format!("Extra photo {}", i + 1), path.clone())),
    );
    slots
}
