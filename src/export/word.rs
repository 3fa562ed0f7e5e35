//! Word export.
//!
//! Serializes the document tree to a single self-contained HTML document that
//! word processors open as a legacy `.doc` file: Office XML namespaces on the
//! root, all styling in one `<style>` block or inline, markdown fields
//! rendered with the static profile (math stays literal `$…$`).
//!
//! Layout, per the document tree:
//!
//! ```text
//! h1 title
//! table  metadata grid (6 rows, 4 columns, colspans from the grid)
//! for each day:
//!   br (page-break-before: always)
//!   h2 day
//!   7 × (h3 block heading + table of labelled cells)
//! ```
//!
//! The payload is the UTF-8 byte-order mark followed by the HTML. This path
//! cannot fail; a field whose markdown cannot be parsed falls back to raw text.

use super::ExportError;
use crate::compose::{Block, CellValue, DaySection, DocumentTree, Emphasis, Field, GridCell, Layout, MetadataGrid};
use crate::markdown::render_static;
use crate::naming::{Artifact, export_filename};
use maud::{Markup, PreEscaped, html};
use std::path::{Path, PathBuf};

pub const WORD_MIME_TYPE: &str = "application/msword";

const BOM: &str = "\u{feff}";

const OFFICE_ROOT: &str = "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
     xmlns:w='urn:schemas-microsoft-com:office:word' \
     xmlns='http://www.w3.org/TR/REC-html40'>";

const WORD_CSS: &str = "\
body { font-family: 'Calibri', sans-serif; font-size: 11pt; }
table { border-collapse: collapse; width: 100%; margin-bottom: 15px; }
td, th { border: 1px solid #000; padding: 6px; vertical-align: top; }
h1 { font-size: 18pt; text-align: center; color: #2E1065; margin-bottom: 20px; }
h2 { font-size: 16pt; color: #1e1b4b; border-bottom: 2px solid #000; padding-bottom: 5px; margin-top: 30px; }
h3 { font-size: 14pt; color: #334155; margin-top: 15px; margin-bottom: 10px; background-color: #f8fafc; padding: 5px; }
.label { font-weight: bold; text-transform: uppercase; font-size: 0.75em; color: #64748b; display: block; margin-bottom: 4px; }
.content { font-size: 11pt; }
p { margin: 0 0 10px 0; }
ul { margin: 0 0 10px 20px; padding: 0; }
li { margin-bottom: 4px; }
";

/// A Word document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl WordExport {
    /// Write into `dir` under [`Self::filename`].
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), "Word document saved");
        Ok(path)
    }
}

/// Build the Word export for a document.
pub fn export_word(doc: &DocumentTree<'_>) -> WordExport {
    let mut payload = String::from(BOM);
    payload.push_str(&render_word_html(doc));
    WordExport {
        filename: export_filename(doc.title, Artifact::Word),
        mime_type: WORD_MIME_TYPE,
        bytes: payload.into_bytes(),
    }
}

/// The HTML document, without the byte-order mark.
pub fn render_word_html(doc: &DocumentTree<'_>) -> String {
    let head = html! {
        head {
            meta charset="utf-8";
            title { (doc.title) }
            style { (PreEscaped(WORD_CSS)) }
        }
    };
    let body = html! {
        body {
            h1 { (doc.title) }
            (metadata_table(&doc.grid))
            @for day in &doc.days {
                (day_section(day))
            }
        }
    };
    format!("{OFFICE_ROOT}{}{}</html>", head.into_string(), body.into_string())
}

fn labelled(label: &str, content: Markup) -> Markup {
    html! {
        span.label { (label) }
        div.content { (content) }
    }
}

fn static_markdown(text: &str) -> Markup {
    PreEscaped(render_static(text))
}

fn metadata_table(grid: &MetadataGrid<'_>) -> Markup {
    html! {
        table {
            @for (i, row) in grid.rows.iter().enumerate() {
                tr {
                    @for cell in &row.cells {
                        (grid_cell(cell, i == 0))
                    }
                }
            }
        }
    }
}

fn grid_cell(cell: &GridCell<'_>, first_row: bool) -> Markup {
    let colspan = (cell.span > 1).then(|| cell.span.to_string());
    let width = first_row.then_some("25%");
    let content = match &cell.value {
        CellValue::Text { text, emphasis } => match emphasis {
            Emphasis::Italic => html! { em { (&**text) } },
            Emphasis::Plain | Emphasis::Strong => html! { (&**text) },
        },
        CellValue::Markdown(md) => static_markdown(md),
        CellValue::Standard { code, description } => html! {
            strong { (code) } " - " (description)
        },
    };
    html! {
        td width=[width] colspan=[colspan] { (labelled(cell.label, content)) }
    }
}

fn day_section(day: &DaySection<'_>) -> Markup {
    html! {
        br style="page-break-before: always;";
        h2 { (day.day) }
        @for block in &day.blocks {
            h3 { (block.heading()) }
            (block_table(block))
        }
    }
}

fn field_cell(field: &Field<'_>, width: Option<&str>) -> Markup {
    html! {
        td width=[width] { (labelled(field.label, static_markdown(field.text))) }
    }
}

fn block_table(block: &Block<'_>) -> Markup {
    html! {
        table {
            @match block.layout {
                Layout::Columns(n) => {
                    @let n = usize::from(n.max(1));
                    @let width = format!("{}%", 100 / n);
                    @for row in block.fields.chunks(n) {
                        tr {
                            @for field in row {
                                (field_cell(field, Some(width.as_str())))
                            }
                        }
                    }
                }
                Layout::Stack => {
                    @for field in &block.fields {
                        tr { (field_cell(field, None)) }
                    }
                }
                Layout::Split => {
                    tr {
                        @for (i, field) in block.fields.iter().enumerate() {
                            (field_cell(field, (i == 0).then_some("30%")))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn word_html(days: &[&str]) -> String {
        let (m, p) = (sample_metadata(days), sample_plan(days));
        let doc = compose(&m, &p);
        render_word_html(&doc)
    }

    #[test]
    fn payload_starts_with_bom_and_office_root() {
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let export = export_word(&compose(&m, &p));
        assert!(export.bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        let text = String::from_utf8(export.bytes).unwrap();
        assert!(text[3..].starts_with("<html xmlns:o='urn:schemas-microsoft-com:office:office'"));
        assert!(text.ends_with("</html>"));
    }

    #[test]
    fn filename_and_mime_type() {
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let export = export_word(&compose(&m, &p));
        assert_eq!(export.filename, "Quadratic_Functions_LessonPlan.doc");
        assert_eq!(export.mime_type, "application/msword");
    }

    #[test]
    fn one_page_break_and_heading_per_day() {
        let html = word_html(&["Monday", "Wednesday"]);
        assert_eq!(html.matches(r#"<br style="page-break-before: always;">"#).count(), 2);
        let monday = html.find("<h2>Monday</h2>").unwrap();
        let wednesday = html.find("<h2>Wednesday</h2>").unwrap();
        assert!(monday < wednesday);
    }

    #[test]
    fn seven_block_headings_per_day_in_order() {
        let html = word_html(&["Monday"]);
        assert_eq!(html.matches("<h3>").count(), 7);
        let positions: Vec<usize> = [
            "1. Introduction / Hook (5 mins)",
            "2. Presentation (10 mins)",
            "3. Guided Practice (15 mins)",
            "4. Independent Practice (10 mins)",
            "5. Closure (5 mins)",
            "6. Differentiation Strategies",
            "7. Homework",
        ]
        .iter()
        .map(|h| html.find(h).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn metadata_table_colspans() {
        let html = word_html(&["Monday"]);
        assert_eq!(html.matches(r#"td width="25%""#).count(), 4);
        // CCSS spans two; four cells in rows 4-6 span two
        assert_eq!(html.matches(r#"colspan="2""#).count(), 7);
        assert!(html.contains("<strong>8.EE.C.7</strong> - 8.EE.C.7:"));
        assert!(html.contains("2026-11-02 to 2026-11-06"));
    }

    #[test]
    fn math_is_passed_through_literally() {
        let html = word_html(&["Monday"]);
        assert!(html.contains("$$x^2 + 5x + 6 = (x+2)(x+3)$$"));
        assert!(!html.contains("math-inline"));
        assert!(!html.contains("math-display"));
    }

    #[test]
    fn markdown_fields_use_inline_styles() {
        let html = word_html(&["Monday"]);
        assert!(html.contains(r#"<ul style="margin:0 0 10px 20px;padding:0;">"#));
        assert!(html.contains("<strong>root</strong>"));
    }

    #[test]
    fn empty_equations_have_no_block() {
        let (m, mut p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        p.daily_plans[0].independent_practice.equations = Some(String::new());
        let html = render_word_html(&compose(&m, &p));
        assert!(!html.contains(">Equations<"));
        assert!(html.contains(">Core Tasks<"));
    }

    #[test]
    fn split_layout_narrow_first_cell() {
        let html = word_html(&["Monday"]);
        assert!(html.contains(r#"<td width="30%"><span class="label">Grouping</span>"#));
    }

    #[test]
    fn three_column_blocks_use_third_widths() {
        let html = word_html(&["Monday"]);
        assert!(html.contains(r#"<td width="33%"><span class="label">Self Assessment</span>"#));
    }

    #[test]
    fn write_to_creates_file() {
        let tmp = TempDir::new().unwrap();
        let (m, p) = (sample_metadata(&["Monday"]), sample_plan(&["Monday"]));
        let export = export_word(&compose(&m, &p));
        let path = export.write_to(&tmp.path().join("out")).unwrap();
        assert_eq!(path.file_name().unwrap(), "Quadratic_Functions_LessonPlan.doc");
        assert_eq!(std::fs::read(&path).unwrap(), export.bytes);
    }
}
