//! # Lesson Plan
//!
//! Turns lesson material and a teacher's scheduling metadata into a
//! structured multi-day mathematics lesson plan, shown as an interactive page
//! with one tab per day and exported as PDF and Word documents.
//!
//! # Architecture: One Tree, Three Serializers
//!
//! A generated [`Plan`](types::Plan) never reaches a renderer directly. The
//! [`compose`] module turns `(Metadata, Plan)` into a single
//! [`DocumentTree`](compose::DocumentTree), and every output is a serializer
//! over that tree:
//!
//! ```text
//!                         ┌──▶ view::render_view      →  index.html (tabs, math)
//! (Metadata, Plan) ──▶ DocumentTree ──▶ export::PdfExporter  →  <Title>_LessonPlan.pdf
//!                         └──▶ export::export_word     →  <Title>_LessonPlan.doc
//! ```
//!
//! Block order, field labels, layout hints and the "omit empty equations"
//! rule live in the tree, so the three outputs cannot drift apart.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Metadata, Plan and the uploaded PDF; metadata validation |
//! | [`naming`] | Title sanitization and export filenames |
//! | [`markdown`] | Markdown to HTML, interactive (math spans) and static (inline styles) profiles |
//! | [`compose`] | Document Composer and day ordering |
//! | [`view`] | View state (active day, export mode) and the stateless page renderer |
//! | [`export`] | PDF state machine over a rasterizer backend; Word serializer |
//! | [`generation`] | AI generation: prompt, response schema, Gemini client |
//! | [`cache`] | Content-addressed cache of generated plans |
//! | [`app`] | Step state machine from metadata form to result |
//! | [`config`] | `config.toml` loading, validation, stock config, theme CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Flags In, Markup Out
//!
//! The view renderer takes a [`ViewModel`](view::ViewModel) of plain flags
//! (which section is visible, which gets a page break) and never consults
//! global state. Export mode is a copy of the on-screen state with every day
//! visible, so capturing a PDF cannot disturb the selected tab.
//!
//! ## Degrade, Don't Fail
//!
//! A field whose markdown cannot be rendered shows its raw text. A PDF
//! rasterizer failure writes a printable page instead. Both are logged through
//! `tracing`; neither aborts the export.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). All interpolation is
//! auto-escaped, so text coming back from the generation service cannot inject
//! markup; only rendered markdown is inserted pre-escaped.

pub mod app;
pub mod cache;
pub mod compose;
pub mod config;
pub mod export;
pub mod generation;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
