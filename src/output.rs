//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what the teacher recognizes (lesson title, day labels,
//! block headings) and shows file paths as secondary context after an arrow.
//! Days are listed with a positional index in document order, which is the
//! order the tabs, the PDF pages and the Word sections use.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Lesson
//!     Quadratic Functions
//!     Grade 8 · Fall · Week 12
//!     Standard: 8.EE.C.7
//!     Days: Monday, Wednesday
//!     Metadata complete
//!
//! Plan
//!     001 Monday (7 blocks)
//!     002 Wednesday (7 blocks)
//! ```
//!
//! ## Generate / Render / Export
//!
//! ```text
//! Plan (generated) → dist/plan.json
//!     001 Monday
//!     002 Wednesday
//! Quadratic Functions → dist/index.html
//! Word → dist/Quadratic_Functions_LessonPlan.doc
//! PDF → dist/Quadratic_Functions_LessonPlan.pdf
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::cache::CacheStatus;
use crate::compose::DocumentTree;
use crate::export::PdfOutcome;
use crate::types::{Metadata, Plan};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn normalized(day: &str) -> String {
    day.trim().to_ascii_lowercase()
}

/// Labels in `a` with no case-insensitive match in `b`.
fn days_not_in<'a>(a: &'a [String], b: &[String]) -> Vec<&'a str> {
    a.iter()
        .filter(|d| !b.iter().any(|o| normalized(o) == normalized(d)))
        .map(String::as_str)
        .collect()
}

// ============================================================================
// Check
// ============================================================================

/// Format the `check` summary: metadata status and, when given, the plan's
/// days against the selection.
pub fn format_check_output(metadata: &Metadata, doc: Option<&DocumentTree<'_>>) -> Vec<String> {
    let mut lines = vec!["Lesson".to_string()];
    let title = if metadata.lesson_title.is_empty() {
        "(untitled)"
    } else {
        metadata.lesson_title.as_str()
    };
    lines.push(format!("{}{}", indent(1), title));

    let mut schedule: Vec<String> = [&metadata.grade, &metadata.semester]
        .into_iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect();
    if !metadata.week_number.is_empty() {
        schedule.push(format!("Week {}", metadata.week_number));
    }
    if !schedule.is_empty() {
        lines.push(format!("{}{}", indent(1), schedule.join(" \u{b7} ")));
    }
    if !metadata.ccss_code.is_empty() {
        lines.push(format!("{}Standard: {}", indent(1), metadata.ccss_code));
    }
    if !metadata.selected_days.is_empty() {
        lines.push(format!(
            "{}Days: {}",
            indent(1),
            metadata.selected_days.join(", ")
        ));
    }

    match metadata.validate() {
        Ok(()) => lines.push(format!("{}Metadata complete", indent(1))),
        Err(e) => lines.push(format!("{}{}", indent(1), e)),
    }

    if let Some(doc) = doc {
        lines.push(String::new());
        lines.extend(format_document_summary(doc));

        let returned: Vec<String> = doc.days.iter().map(|d| d.day.to_string()).collect();
        let unrequested = days_not_in(&returned, &metadata.selected_days);
        if !unrequested.is_empty() {
            lines.push(format!("{}Not selected: {}", indent(1), unrequested.join(", ")));
        }
        let absent = days_not_in(&metadata.selected_days, &returned);
        if !absent.is_empty() {
            lines.push(format!("{}Not in plan: {}", indent(1), absent.join(", ")));
        }
    }

    lines
}

pub fn print_check_output(metadata: &Metadata, doc: Option<&DocumentTree<'_>>) {
    print_lines(format_check_output(metadata, doc));
}

/// Format the day list of a composed document.
///
/// ```text
/// Plan
///     001 Monday (7 blocks)
/// ```
pub fn format_document_summary(doc: &DocumentTree<'_>) -> Vec<String> {
    let mut lines = vec!["Plan".to_string()];
    if doc.days.is_empty() {
        lines.push(format!("{}(no days)", indent(1)));
    }
    for (i, day) in doc.days.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({} blocks)",
            indent(1),
            format_index(i + 1),
            day.day,
            day.blocks.len()
        ));
    }
    lines
}

// ============================================================================
// Generate
// ============================================================================

/// Format the result of a generation: provenance, destination, days.
pub fn format_generate_output(plan: &Plan, status: CacheStatus, path: &Path) -> Vec<String> {
    let mut lines = vec![format!("Plan ({}) \u{2192} {}", status, path.display())];
    for (i, day) in plan.daily_plans.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), day.day));
    }
    lines
}

pub fn print_generate_output(plan: &Plan, status: CacheStatus, path: &Path) {
    print_lines(format_generate_output(plan, status, path));
}

/// Format a generation failure: the banner, then the underlying error.
pub fn format_generation_failure(banner: &str, detail: Option<&str>) -> Vec<String> {
    let mut lines = vec![banner.to_string()];
    if let Some(detail) = detail {
        lines.push(format!("{}{}", indent(1), detail));
    }
    lines
}

pub fn print_generation_failure(banner: &str, detail: Option<&str>) {
    for line in format_generation_failure(banner, detail) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Render / Export
// ============================================================================

/// Format the rendered interactive page.
pub fn format_render_output(title: &str, path: &Path) -> Vec<String> {
    vec![format!("{} \u{2192} {}", title, path.display())]
}

pub fn print_render_output(title: &str, path: &Path) {
    print_lines(format_render_output(title, path));
}

/// Format a saved Word document.
pub fn format_word_output(path: &Path) -> Vec<String> {
    vec![format!("Word \u{2192} {}", path.display())]
}

pub fn print_word_output(path: &Path) {
    print_lines(format_word_output(path));
}

/// Format the outcome of a PDF export.
pub fn format_pdf_outcome(outcome: &PdfOutcome) -> Vec<String> {
    match outcome {
        PdfOutcome::Saved(path) => vec![format!("PDF \u{2192} {}", path.display())],
        PdfOutcome::PrintFallback(path) => vec![
            "PDF export failed, falling back to print".to_string(),
            format!("{}Print page \u{2192} {}", indent(1), path.display()),
        ],
        PdfOutcome::Busy => vec!["PDF export already in progress, skipped".to_string()],
    }
}

pub fn print_pdf_outcome(outcome: &PdfOutcome) {
    print_lines(format_pdf_outcome(outcome));
}

// ============================================================================
// Tests
// ============================================================================
