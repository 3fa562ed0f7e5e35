//! On-screen view of a composed lesson plan.
//!
//! Rendering is split in two so visibility rules never mix with markup:
//!
//! 1. [`view_model`] turns a [`DocumentTree`] plus [`ViewState`] into explicit
//!    flags: which tab is active, which day sections are visible, where page
//!    breaks go, whether the tab bar is shown at all.
//! 2. [`render_page`] is a stateless function of that model.
//!
//! ## Visibility rules
//!
//! - Outside export mode exactly the sections labelled `active_day` are
//!   visible. `active_day` starts at the first day, or `""` when there are
//!   no days (nothing visible, no tabs).
//! - In export mode every section is visible, the tab bar is dropped, and
//!   each day after the first starts a new page.
//!
//! The generated page carries its own tab script, so switching days in the
//! browser never reloads or calls out. Math spans are typeset client-side by
//! KaTeX.

use crate::compose::{
    Block, CellValue, DaySection, DocumentTree, Emphasis, Field, FieldStyle, GridCell, Layout,
    MetadataGrid,
};
use crate::markdown;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/view.css");
const TABS_JS: &str = include_str!("../static/tabs.js");
const MATH_JS: &str = include_str!("../static/math.js");

const KATEX_CSS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";
const KATEX_JS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.js";

/// Inline style forcing a new page, understood by both modern and legacy
/// pagination.
pub const PAGE_BREAK_STYLE: &str = "break-before: page; page-break-before: always;";

/// View-level state: the selected day and the export override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    active_day: String,
    export_mode: bool,
}

impl ViewState {
    /// Initial state: first day selected, export mode off.
    pub fn new(doc: &DocumentTree<'_>) -> Self {
        Self {
            active_day: doc
                .days
                .first()
                .map(|d| d.day.to_string())
                .unwrap_or_default(),
            export_mode: false,
        }
    }

    pub fn active_day(&self) -> &str {
        &self.active_day
    }

    pub fn export_mode(&self) -> bool {
        self.export_mode
    }

    /// Select a day. Labels not in the document are ignored.
    pub fn select_day(&mut self, doc: &DocumentTree<'_>, day: &str) -> bool {
        if doc.days.iter().any(|d| d.day == day) {
            self.active_day = day.to_string();
            true
        } else {
            false
        }
    }

    /// A copy with export mode on. The original is untouched, so the override
    /// ends when the copy is dropped.
    pub fn exporting(&self) -> Self {
        Self {
            active_day: self.active_day.clone(),
            export_mode: true,
        }
    }

    pub fn is_visible(&self, day: &str) -> bool {
        self.export_mode || (!self.active_day.is_empty() && self.active_day == day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView<'a> {
    pub day: &'a str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView<'d, 'a> {
    pub section: &'d DaySection<'a>,
    pub visible: bool,
    pub page_break_before: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<'d, 'a> {
    pub title: &'a str,
    pub grid: &'d MetadataGrid<'a>,
    /// Empty in export mode.
    pub tabs: Vec<TabView<'a>>,
    pub sections: Vec<SectionView<'d, 'a>>,
    pub export_mode: bool,
}

impl ViewModel<'_, '_> {
    pub fn visible_days(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.visible)
            .map(|s| s.section.day)
            .collect()
    }
}

/// Derive view flags from the document and view state.
pub fn view_model<'d, 'a>(doc: &'d DocumentTree<'a>, state: &ViewState) -> ViewModel<'d, 'a> {
    let tabs = if state.export_mode() {
        Vec::new()
    } else {
        doc.days
            .iter()
            .map(|d| TabView {
                day: d.day,
                active: d.day == state.active_day(),
            })
            .collect()
    };

    let sections = doc
        .days
        .iter()
        .enumerate()
        .map(|(i, section)| SectionView {
            section,
            visible: state.is_visible(section.day),
            page_break_before: state.export_mode() && i > 0,
        })
        .collect();

    ViewModel {
        title: doc.title,
        grid: &doc.grid,
        tabs,
        sections,
        export_mode: state.export_mode(),
    }
}

/// Full interactive page for a document in the given view state.
pub fn render_view(doc: &DocumentTree<'_>, state: &ViewState, theme_css: &str) -> Markup {
    render_page(&view_model(doc, state), theme_css, None)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the page shell around the document region.
///
/// `on_load` is extra script run once the page (and KaTeX) has loaded.
pub fn render_page(model: &ViewModel<'_, '_>, theme_css: &str, on_load: Option<&str>) -> Markup {
    let css = format!("{theme_css}\n\n{CSS_STATIC}");
    let body_class = model.export_mode.then_some("export-mode");
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (model.title) }
                link rel="stylesheet" href=(KATEX_CSS) crossorigin="anonymous";
                script defer src=(KATEX_JS) crossorigin="anonymous" {}
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (render_document(model))
                script { (PreEscaped(TABS_JS)) }
                script { (PreEscaped(MATH_JS)) }
                @if let Some(js) = on_load {
                    script { (PreEscaped(format!("window.addEventListener('load', function () {{ {js} }});"))) }
                }
            }
        }
    }
}

/// The document region: title, metadata grid, tabs, day sections.
pub fn render_document(model: &ViewModel<'_, '_>) -> Markup {
    html! {
        main.document {
            header.doc-header {
                h1 { (model.title) }
            }
            (render_grid(model.grid))
            @if !model.tabs.is_empty() {
                nav.day-tabs role="tablist" {
                    @for tab in &model.tabs {
                        button.tab.active[tab.active] type="button" role="tab"
                            data-day=(tab.day) aria-selected=(tab.active.to_string()) {
                            (tab.day)
                        }
                    }
                }
            }
            div.days {
                @for view in &model.sections {
                    (render_section(view))
                }
            }
        }
    }
}

fn render_grid(grid: &MetadataGrid<'_>) -> Markup {
    html! {
        div.meta-grid {
            @for row in &grid.rows {
                div class=(format!("meta-row cols-{}", row.cells.len())) {
                    @for cell in &row.cells {
                        (render_cell(cell))
                    }
                }
            }
        }
    }
}

fn render_cell(cell: &GridCell<'_>) -> Markup {
    html! {
        div.meta-cell {
            span.label { (cell.label) }
            @match &cell.value {
                CellValue::Text { text, emphasis } => {
                    span.value.strong[*emphasis == Emphasis::Strong]
                        .italic[*emphasis == Emphasis::Italic] { (&**text) }
                }
                CellValue::Markdown(md) => {
                    div.value.prose { (markdown::render(md, false)) }
                }
                CellValue::Standard { code, description } => {
                    span.value {
                        code.standard { (code) }
                        " "
                        (description)
                    }
                }
            }
        }
    }
}

fn render_section(view: &SectionView<'_, '_>) -> Markup {
    let style = view.page_break_before.then_some(PAGE_BREAK_STYLE);
    html! {
        section.day-section data-day=(view.section.day) hidden[!view.visible] style=[style] {
            h2.day-title { (view.section.day) }
            @for block in &view.section.blocks {
                (render_block(block))
            }
        }
    }
}

fn layout_class(layout: Layout) -> String {
    match layout {
        Layout::Columns(n) => format!("fields cols-{n}"),
        Layout::Stack => "fields stack".to_string(),
        Layout::Split => "fields split".to_string(),
    }
}

fn render_block(block: &Block<'_>) -> Markup {
    html! {
        div class=(format!("block block-{}", block.kind.slug())) {
            h3 { (block.heading()) }
            div class=(layout_class(block.layout)) {
                @for field in &block.fields {
                    (render_field(field))
                }
            }
        }
    }
}

fn field_class(style: FieldStyle) -> &'static str {
    match style {
        FieldStyle::Plain => "field",
        FieldStyle::Panel => "field panel",
        FieldStyle::Equations => "field equations",
        FieldStyle::Card => "field card",
    }
}

fn render_field(field: &Field<'_>) -> Markup {
    html! {
        div class=(field_class(field.style)) {
            span.label { (field.label) }
            div.content { (markdown::render(field.text, field.math)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::test_helpers::*;
    use crate::types::{Metadata, Plan};

    fn fixture(days: &[&str]) -> (Metadata, Plan) {
        (sample_metadata(days), sample_plan(days))
    }

    #[test]
    fn initial_active_day_is_first() {
        let (m, p) = fixture(&["Monday", "Wednesday"]);
        let doc = compose(&m, &p);
        let state = ViewState::new(&doc);
        assert_eq!(state.active_day(), "Monday");
        assert!(!state.export_mode());
    }

    #[test]
    fn zero_days_uses_empty_sentinel() {
        let (m, p) = fixture(&[]);
        let doc = compose(&m, &p);
        let state = ViewState::new(&doc);
        assert_eq!(state.active_day(), "");
        let model = view_model(&doc, &state);
        assert!(model.tabs.is_empty());
        assert!(model.sections.is_empty());
    }

    #[test]
    fn exactly_active_section_visible() {
        let (m, p) = fixture(&["Monday", "Wednesday", "Friday"]);
        let doc = compose(&m, &p);
        let mut state = ViewState::new(&doc);
        assert!(state.select_day(&doc, "Wednesday"));
        let model = view_model(&doc, &state);
        assert_eq!(model.visible_days(), vec!["Wednesday"]);
        let active: Vec<&str> = model.tabs.iter().filter(|t| t.active).map(|t| t.day).collect();
        assert_eq!(active, vec!["Wednesday"]);
    }

    #[test]
    fn unknown_day_selection_is_ignored() {
        let (m, p) = fixture(&["Monday", "Wednesday"]);
        let doc = compose(&m, &p);
        let mut state = ViewState::new(&doc);
        assert!(!state.select_day(&doc, "Sunday"));
        assert_eq!(state.active_day(), "Monday");
    }

    #[test]
    fn export_mode_shows_every_section() {
        let (m, p) = fixture(&["Monday", "Wednesday", "Friday"]);
        let doc = compose(&m, &p);
        let mut state = ViewState::new(&doc);
        state.select_day(&doc, "Friday");
        let exporting = state.exporting();
        let model = view_model(&doc, &exporting);
        assert_eq!(model.visible_days(), vec!["Monday", "Wednesday", "Friday"]);
        assert!(model.tabs.is_empty());
        // The original state keeps its selection and stays interactive
        assert_eq!(state.active_day(), "Friday");
        assert!(!state.export_mode());
    }

    #[test]
    fn export_mode_breaks_pages_between_days() {
        let (m, p) = fixture(&["Monday", "Wednesday", "Friday"]);
        let doc = compose(&m, &p);
        let model = view_model(&doc, &ViewState::new(&doc).exporting());
        let breaks: Vec<bool> = model.sections.iter().map(|s| s.page_break_before).collect();
        assert_eq!(breaks, vec![false, true, true]);

        let interactive = view_model(&doc, &ViewState::new(&doc));
        assert!(interactive.sections.iter().all(|s| !s.page_break_before));
    }

    #[test]
    fn rendered_page_hides_inactive_sections() {
        let (m, p) = fixture(&["Monday", "Wednesday"]);
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc), "").into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<section class="day-section" data-day="Monday">"#));
        assert!(html.contains(r#"<section class="day-section" data-day="Wednesday" hidden>"#));
        assert!(html.contains(r#"<nav class="day-tabs" role="tablist">"#));
        assert!(html.contains(r#"class="tab active""#));
        assert!(html.contains(r#"data-day="Wednesday" aria-selected="false""#));
    }

    #[test]
    fn rendered_export_page_has_no_tabs_and_breaks() {
        let (m, p) = fixture(&["Monday", "Wednesday"]);
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc).exporting(), "").into_string();
        assert!(!html.contains(r#"<nav class="day-tabs""#));
        assert!(!html.contains(" hidden>"));
        assert!(html.contains(PAGE_BREAK_STYLE));
        assert!(html.contains(r#"<body class="export-mode">"#));
    }

    #[test]
    fn rendered_page_includes_blocks_and_math() {
        let (m, p) = fixture(&["Monday"]);
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc), "").into_string();
        assert!(html.contains("1. Introduction / Hook (5 mins)"));
        assert!(html.contains("7. Homework"));
        assert!(html.contains("math-display"));
        assert!(html.contains("katex.min.js"));
        assert!(html.contains("<h1>Quadratic Functions</h1>"));
    }

    #[test]
    fn rendered_grid_shows_standard_code() {
        let (m, p) = fixture(&["Monday"]);
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc), "").into_string();
        assert!(html.contains(r#"<code class="standard">8.EE.C.7</code>"#));
        assert!(html.contains("2026-11-02 to 2026-11-06"));
        assert!(html.contains(r#"class="meta-row cols-3""#));
    }

    #[test]
    fn theme_css_is_embedded() {
        let (m, p) = fixture(&["Monday"]);
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc), ":root { --color-accent: #123456; }")
            .into_string();
        assert!(html.contains("--color-accent: #123456"));
    }

    #[test]
    fn on_load_script_is_appended() {
        let (m, p) = fixture(&["Monday"]);
        let doc = compose(&m, &p);
        let model = view_model(&doc, &ViewState::new(&doc));
        let html = render_page(&model, "", Some("window.print();")).into_string();
        assert!(html.contains("window.print();"));
    }

    #[test]
    fn titles_are_escaped() {
        let (mut m, p) = fixture(&["Monday"]);
        m.lesson_title = "<b>Bad</b>".to_string();
        let doc = compose(&m, &p);
        let html = render_view(&doc, &ViewState::new(&doc), "").into_string();
        assert!(html.contains("&lt;b&gt;Bad&lt;/b&gt;"));
    }
}
