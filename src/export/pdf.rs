//! PDF export state machine.
//!
//! ```text
//!            begin_capture()                 rasterizer Ok
//!   Idle ───────────────────▶ Capturing ─────────────────▶ Done(path)
//!    ▲                            │
//!    │                            │ rasterizer Err / abandoned
//!    │                            ▼
//!    └─ (Done and Failed    Failed { error, fallback }
//!        may start again)
//! ```
//!
//! While `Capturing`, further exports are rejected with [`PdfOutcome::Busy`]
//! and produce no file. Capture always renders the document in export mode
//! (every day visible, one day per page) from a copy of the caller's view
//! state, so the on-screen selection is never disturbed.
//!
//! A rasterizer failure is not an error to the caller: the failure is logged
//! and a printable page (`<title>_LessonPlan.print.html`) that opens the print
//! dialog on load is written instead.

use super::ExportError;
use super::backend::Rasterizer;
use super::params::PdfOptions;
use crate::compose::DocumentTree;
use crate::naming::{Artifact, export_filename};
use crate::view::{ViewState, render_page, view_model};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const PRINT_ON_LOAD: &str = "window.print();";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Capturing,
    Done(PathBuf),
    Failed {
        error: String,
        /// Print page written in place of the PDF, if any.
        fallback: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfOutcome {
    Saved(PathBuf),
    PrintFallback(PathBuf),
    /// Another capture was in progress; nothing was written.
    Busy,
}

pub struct PdfExporter<R: Rasterizer> {
    rasterizer: R,
    options: PdfOptions,
    state: Mutex<ExportState>,
}

impl<R: Rasterizer> PdfExporter<R> {
    pub fn new(rasterizer: R, options: PdfOptions) -> Self {
        Self {
            rasterizer,
            options,
            state: Mutex::new(ExportState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExportState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ExportState {
        self.lock().clone()
    }

    /// Whether the export action should be disabled.
    pub fn is_capturing(&self) -> bool {
        *self.lock() == ExportState::Capturing
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Enter `Capturing`, or `None` if a capture is already running.
    ///
    /// The returned guard must be finished with a terminal state; dropping it
    /// unfinished records the capture as failed.
    pub fn begin_capture(&self) -> Option<CaptureGuard<'_, R>> {
        let mut state = self.lock();
        if *state == ExportState::Capturing {
            return None;
        }
        *state = ExportState::Capturing;
        Some(CaptureGuard {
            exporter: self,
            finished: false,
        })
    }

    /// Export the document to `out_dir`.
    pub fn export(
        &self,
        doc: &DocumentTree<'_>,
        view: &ViewState,
        theme_css: &str,
        out_dir: &Path,
    ) -> Result<PdfOutcome, ExportError> {
        let Some(guard) = self.begin_capture() else {
            tracing::info!("PDF export already in progress, ignoring request");
            return Ok(PdfOutcome::Busy);
        };

        let capture_state = view.exporting();
        let model = view_model(doc, &capture_state);

        let result = std::fs::create_dir_all(out_dir).map_err(ExportError::from);
        if let Err(e) = result {
            guard.finish_failed(e.to_string(), None);
            return Err(e);
        }

        let html = render_page(&model, theme_css, None).into_string();
        match self.rasterizer.render_pdf(&html, &self.options) {
            Ok(bytes) => {
                let path = out_dir.join(export_filename(doc.title, Artifact::Pdf));
                if let Err(e) = std::fs::write(&path, bytes) {
                    guard.finish_failed(e.to_string(), None);
                    return Err(e.into());
                }
                tracing::info!(path = %path.display(), "PDF saved");
                guard.finish(ExportState::Done(path.clone()));
                Ok(PdfOutcome::Saved(path))
            }
            Err(e) => {
                tracing::warn!(error = %e, "PDF rasterization failed, writing print page instead");
                let path = out_dir.join(export_filename(doc.title, Artifact::PrintPage));
                let page = render_page(&model, theme_css, Some(PRINT_ON_LOAD)).into_string();
                if let Err(io) = std::fs::write(&path, page) {
                    guard.finish_failed(e.to_string(), None);
                    return Err(io.into());
                }
                guard.finish_failed(e.to_string(), Some(path.clone()));
                Ok(PdfOutcome::PrintFallback(path))
            }
        }
    }
}

/// Scoped `Capturing` state. See [`PdfExporter::begin_capture`].
pub struct CaptureGuard<'e, R: Rasterizer> {
    exporter: &'e PdfExporter<R>,
    finished: bool,
}

impl<R: Rasterizer> CaptureGuard<'_, R> {
    pub fn finish(mut self, state: ExportState) {
        *self.exporter.lock() = state;
        self.finished = true;
    }

    fn finish_failed(self, error: String, fallback: Option<PathBuf>) {
        self.finish(ExportState::Failed { error, fallback });
    }
}

impl<R: Rasterizer> Drop for CaptureGuard<'_, R> {
    fn drop(&mut self) {
        if !self.finished {
            *self.exporter.lock() = ExportState::Failed {
                error: "capture abandoned".to_string(),
                fallback: None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::export::backend::RasterError;
    use crate::export::backend::tests::MockRasterizer;
    use crate::test_helpers::*;
    use std::sync::{Arc, Barrier, mpsc};
    use tempfile::TempDir;

    #[test]
    fn starts_idle() {
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());
        assert_eq!(exporter.state(), ExportState::Idle);
        assert!(!exporter.is_capturing());
    }

    #[test]
    fn success_saves_pdf_and_is_done() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday", "Wednesday"]));
        let doc = compose(&m, &p);
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());

        let outcome = exporter
            .export(&doc, &ViewState::new(&doc), "", tmp.path())
            .unwrap();

        let expected = tmp.path().join("Quadratic_Functions_LessonPlan.pdf");
        assert_eq!(outcome, PdfOutcome::Saved(expected.clone()));
        assert_eq!(exporter.state(), ExportState::Done(expected.clone()));
        assert!(std::fs::read(&expected).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn capture_renders_every_day_in_export_mode() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday", "Wednesday"]));
        let doc = compose(&m, &p);
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());
        let view = ViewState::new(&doc);

        exporter.export(&doc, &view, "", tmp.path()).unwrap();

        let calls = exporter.rasterizer.get_calls();
        assert_eq!(calls.len(), 1);
        let html = &calls[0].html;
        assert!(html.contains(r#"<body class="export-mode">"#));
        assert!(!html.contains(" hidden>"));
        assert!(html.contains("page-break-before: always"));
        assert_eq!(calls[0].options, PdfOptions::default());
        // Caller's view state is untouched
        assert!(!view.export_mode());
    }

    #[test]
    fn failure_writes_print_fallback() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let doc = compose(&m, &p);
        let exporter = PdfExporter::new(MockRasterizer::failing("no chrome"), PdfOptions::default());

        let outcome = exporter
            .export(&doc, &ViewState::new(&doc), "", tmp.path())
            .unwrap();

        let page = tmp.path().join("Quadratic_Functions_LessonPlan.print.html");
        assert_eq!(outcome, PdfOutcome::PrintFallback(page.clone()));
        assert_eq!(
            exporter.state(),
            ExportState::Failed {
                error: "Rendering failed: no chrome".to_string(),
                fallback: Some(page.clone()),
            }
        );
        let html = std::fs::read_to_string(&page).unwrap();
        assert!(html.contains("window.print();"));
        assert!(html.contains("export-mode"));
        assert!(!tmp.path().join("Quadratic_Functions_LessonPlan.pdf").exists());
    }

    #[test]
    fn export_while_capturing_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let doc = compose(&m, &p);
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());

        let guard = exporter.begin_capture().unwrap();
        let outcome = exporter
            .export(&doc, &ViewState::new(&doc), "", tmp.path())
            .unwrap();

        assert_eq!(outcome, PdfOutcome::Busy);
        assert_eq!(exporter.state(), ExportState::Capturing);
        assert!(exporter.rasterizer.get_calls().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
        drop(guard);
    }

    #[test]
    fn second_begin_capture_rejected() {
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());
        let first = exporter.begin_capture();
        assert!(first.is_some());
        assert!(exporter.begin_capture().is_none());
        first.unwrap().finish(ExportState::Idle);
        assert!(exporter.begin_capture().is_some());
    }

    #[test]
    fn abandoned_capture_is_failed() {
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());
        drop(exporter.begin_capture());
        assert!(matches!(exporter.state(), ExportState::Failed { fallback: None, .. }));
        assert!(!exporter.is_capturing());
    }

    #[test]
    fn export_again_after_done() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let doc = compose(&m, &p);
        let exporter = PdfExporter::new(MockRasterizer::new(), PdfOptions::default());
        let view = ViewState::new(&doc);
        exporter.export(&doc, &view, "", tmp.path()).unwrap();
        let again = exporter.export(&doc, &view, "", tmp.path()).unwrap();
        assert!(matches!(again, PdfOutcome::Saved(_)));
        assert_eq!(exporter.rasterizer.get_calls().len(), 2);
    }

    /// Rasterizer that blocks until released, to hold the exporter in
    /// `Capturing` while another thread tries to export.
    struct BlockingRasterizer {
        entered: Arc<Barrier>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Rasterizer for BlockingRasterizer {
        fn render_pdf(&self, _html: &str, _options: &PdfOptions) -> Result<Vec<u8>, RasterError> {
            self.entered.wait();
            self.release.lock().unwrap().recv().unwrap();
            Ok(b"%PDF-1.7 slow".to_vec())
        }
    }

    #[test]
    fn concurrent_export_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let entered = Arc::new(Barrier::new(2));
        let (release_tx, release_rx) = mpsc::channel();
        let exporter = PdfExporter::new(
            BlockingRasterizer {
                entered: Arc::clone(&entered),
                release: Mutex::new(release_rx),
            },
            PdfOptions::default(),
        );

        std::thread::scope(|s| {
            let first = s.spawn(|| {
                let doc = compose(&m, &p);
                exporter.export(&doc, &ViewState::new(&doc), "", tmp.path())
            });

            entered.wait();
            assert!(exporter.is_capturing());
            let doc = compose(&m, &p);
            let second = exporter
                .export(&doc, &ViewState::new(&doc), "", tmp.path())
                .unwrap();
            assert_eq!(second, PdfOutcome::Busy);
            assert_eq!(exporter.state(), ExportState::Capturing);

            release_tx.send(()).unwrap();
            let first = first.join().unwrap().unwrap();
            assert!(matches!(first, PdfOutcome::Saved(_)));
        });

        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
