//! Export pipeline: PDF capture and Word serialization.
//!
//! Both exporters consume the same [`DocumentTree`](crate::compose::DocumentTree)
//! and differ only in their leaf serializer:
//!
//! | Exporter | Serializer | Output |
//! |---|---|---|
//! | [`PdfExporter`] | view page in export mode → [`Rasterizer`] | `<title>_LessonPlan.pdf`, or a print page on failure |
//! | [`export_word`] | static-profile HTML + BOM | `<title>_LessonPlan.doc` (`application/msword`) |
//!
//! The module is split into:
//! - **Parameters**: the renderer configuration record
//! - **Backend**: [`Rasterizer`] trait + [`ChromeRasterizer`]
//! - **Exporters**: the PDF state machine and the Word serializer

pub mod backend;
pub mod chrome_backend;
pub mod params;
pub mod pdf;
pub mod word;

use thiserror::Error;

pub use backend::{RasterError, Rasterizer};
pub use chrome_backend::ChromeRasterizer;
pub use params::PdfOptions;
pub use pdf::{ExportState, PdfExporter, PdfOutcome};
pub use word::{WordExport, export_word};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
