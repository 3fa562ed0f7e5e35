//! Configuration record handed to the rasterizing renderer.
//!
//! These types describe *what* page to produce, not *how*. They are the
//! interface between the [`pdf`](super::pdf) exporter (which decides page
//! setup) and a [`Rasterizer`](super::backend::Rasterizer) (which does the
//! actual rendering), so backends can be swapped without touching the export
//! state machine.
//!
//! Defaults: A4 portrait, margins 5 mm top/bottom and 10 mm left/right, scale
//! factor 2, JPEG at 0.98, page breaks honoring both CSS hints and legacy
//! `page-break-*` properties.

use crate::config::PdfConfig;

const MM_PER_INCH: f64 = 25.4;

/// Paper size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    #[default]
    A4,
}

impl PageFormat {
    /// Portrait `(width, height)` in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// From `[top, right, bottom, left]`.
    pub fn from_array([top, right, bottom, left]: [f64; 4]) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::from_array([5.0, 10.0, 5.0, 10.0])
    }
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Lossy encoding quality for rasterized page images (0.0-1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageQuality(f64);

impl ImageQuality {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        Self(0.98)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFormat {
    Jpeg(ImageQuality),
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Jpeg(ImageQuality::default())
    }
}

/// Which pagination hints the renderer honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBreakMode {
    /// `break-before` / `break-inside` from CSS.
    Css,
    /// `page-break-before: always` and friends.
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub format: PageFormat,
    pub orientation: Orientation,
    pub margins: Margins,
    /// Raster scale factor. Backends that print vectors ignore it.
    pub scale: f64,
    pub image: ImageFormat,
    pub page_breaks: Vec<PageBreakMode>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            scale: 2.0,
            image: ImageFormat::default(),
            page_breaks: vec![PageBreakMode::Css, PageBreakMode::Legacy],
        }
    }
}

impl PdfOptions {
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            margins: Margins::from_array(config.margins_mm),
            scale: config.scale,
            image: ImageFormat::Jpeg(ImageQuality::new(config.image_quality)),
            ..Self::default()
        }
    }

    /// Paper `(width, height)` in inches, orientation applied.
    pub fn paper_inches(&self) -> (f64, f64) {
        let (w, h) = self.format.size_mm();
        let (w, h) = match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        (mm_to_inches(w), mm_to_inches(h))
    }

    pub fn honors(&self, mode: PageBreakMode) -> bool {
        self.page_breaks.contains(&mode)
    }
}
