//! Headless Chrome rasterizer.
//!
//! Writes the page to a temporary `.html` file, loads it in a fresh headless
//! tab, waits for math typesetting (`body[data-math-ready]`) plus a short
//! settle delay, then prints to PDF over the DevTools protocol.
//!
//! Chrome prints vectors, so [`PdfOptions::scale`] and the image format do not
//! apply here. Page size and margins do. `@page` rules are preferred only
//! while CSS page breaks are honored.

use super::backend::{RasterError, Rasterizer};
use super::params::{Orientation, PageBreakMode, PdfOptions, mm_to_inches};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    settle: Duration,
}

impl ChromeRasterizer {
    pub fn new(settle_ms: u64) -> Self {
        Self {
            settle: Duration::from_millis(settle_ms),
        }
    }
}

fn render_err(e: impl std::fmt::Display) -> RasterError {
    RasterError::Render(e.to_string())
}

/// DevTools print parameters for the given options.
pub fn print_options(options: &PdfOptions) -> PrintToPdfOptions {
    let (paper_width, paper_height) = options.paper_inches();
    PrintToPdfOptions {
        landscape: Some(options.orientation == Orientation::Landscape),
        print_background: Some(true),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        margin_top: Some(mm_to_inches(options.margins.top)),
        margin_right: Some(mm_to_inches(options.margins.right)),
        margin_bottom: Some(mm_to_inches(options.margins.bottom)),
        margin_left: Some(mm_to_inches(options.margins.left)),
        prefer_css_page_size: Some(options.honors(PageBreakMode::Css)),
        ..Default::default()
    }
}

impl Rasterizer for ChromeRasterizer {
    fn render_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RasterError> {
        let mut page = tempfile::Builder::new()
            .prefix("lesson-plan-")
            .suffix(".html")
            .tempfile()?;
        page.write_all(html.as_bytes())?;
        page.flush()?;

        let launch = LaunchOptions {
            headless: true,
            ..Default::default()
        };
        let browser = Browser::new(launch).map_err(|e| RasterError::Launch(e.to_string()))?;
        let tab = browser.new_tab().map_err(render_err)?;

        let url = format!("file://{}", page.path().display());
        tracing::debug!(%url, "loading page for capture");
        tab.navigate_to(&url)
            .map_err(render_err)?
            .wait_until_navigated()
            .map_err(render_err)?;

        if let Err(e) = tab.wait_for_element("body[data-math-ready]") {
            tracing::warn!(error = %e, "math typesetting did not finish, capturing anyway");
        }
        std::thread::sleep(self.settle);

        tab.print_to_pdf(Some(print_options(options)))
            .map_err(render_err)
    }
}
