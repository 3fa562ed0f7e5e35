//! Rasterizing renderer trait and shared types.
//!
//! A [`Rasterizer`] takes a complete, self-contained HTML page and returns
//! PDF bytes laid out per [`PdfOptions`]. The production implementation is
//! [`ChromeRasterizer`](super::chrome_backend::ChromeRasterizer), which prints
//! through headless Chrome. Failures are ordinary errors; the
//! [`PdfExporter`](super::pdf::PdfExporter) turns them into the print
//! fallback.

use super::params::PdfOptions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Browser launch failed: {0}")]
    Launch(String),
    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Trait for rasterizing renderers.
pub trait Rasterizer: Sync {
    fn render_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RasterError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock rasterizer that records calls and returns scripted results.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared across threads.
    #[derive(Default)]
    pub struct MockRasterizer {
        pub fail_with: Option<String>,
        pub calls: Mutex<Vec<RecordedRender>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRender {
        pub html: String,
        pub options: PdfOptions,
    }

    impl MockRasterizer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedRender> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Rasterizer for MockRasterizer {
        fn render_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RasterError> {
            self.calls.lock().unwrap().push(RecordedRender {
                html: html.to_string(),
                options: options.clone(),
            });
            match &self.fail_with {
                Some(message) => Err(RasterError::Render(message.clone())),
                None => Ok(b"%PDF-1.7 mock".to_vec()),
            }
        }
    }

    #[test]
    fn mock_records_calls() {
        let mock = MockRasterizer::new();
        let bytes = mock.render_pdf("<html></html>", &PdfOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(mock.get_calls().len(), 1);
        assert_eq!(mock.get_calls()[0].html, "<html></html>");
    }

    #[test]
    fn failing_mock_returns_render_error() {
        let mock = MockRasterizer::failing("boom");
        let err = mock.render_pdf("", &PdfOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Rendering failed: boom");
    }
}
