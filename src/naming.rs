//! Export filename derivation.
//!
//! Every exported artifact is named after the lesson title. The title is free
//! text typed by the teacher, so it is sanitized before it touches the
//! filesystem: each character outside `[A-Za-z0-9]` is replaced 1:1 with `_`.
//!
//! - `"Quadratic Functions"` → `Quadratic_Functions_LessonPlan.pdf`
//! - `"Quadratic Functions: Day 1!"` → `Quadratic_Functions__Day_1__LessonPlan.doc`
//!
//! Sanitization is total (any input, including empty, yields a name) and
//! idempotent (`_` maps to itself).

/// Suffix shared by every exported artifact.
const SUFFIX: &str = "_LessonPlan";

/// Kinds of artifact written by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Pdf,
    Word,
    /// Printable page written when PDF rasterization fails.
    PrintPage,
}

impl Artifact {
    pub fn extension(self) -> &'static str {
        match self {
            Artifact::Pdf => "pdf",
            Artifact::Word => "doc",
            Artifact::PrintPage => "print.html",
        }
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `<sanitized-title>_LessonPlan.<ext>` for the given artifact.
pub fn export_filename(title: &str, artifact: Artifact) -> String {
    format!("{}{}.{}", sanitize_title(title), SUFFIX, artifact.extension())
}
