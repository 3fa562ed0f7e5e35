//! Document composition: `(Metadata, Plan)` → [`DocumentTree`].
//!
//! The document tree is the single source of truth for what appears in a
//! lesson plan and in which order. The on-screen view ([`crate::view`]), the
//! PDF capture and the Word export ([`crate::export`]) all walk the same tree
//! and only decide how each leaf is serialized, so the field mapping below is
//! written down exactly once.
//!
//! ## Structure
//!
//! ```text
//! DocumentTree
//! ├── title                      metadata.lessonTitle
//! ├── MetadataGrid (6 rows)
//! │   ├── Grade | Semester | Week | Dates
//! │   ├── Subject | Unit | Lesson Title | Duration
//! │   ├── Focus/Skill | CCSS Alignment | Assessment Planned
//! │   ├── Teacher Name | HOD Name
//! │   ├── Learning Intention | Success Criteria
//! │   └── Materials and Resources | Pre-requisites
//! └── DaySection × plan.dailyPlans.len()   (array order)
//!     └── 7 blocks: Introduction, Presentation, Guided Practice,
//!         Independent Practice, Closure, Differentiation, Homework
//! ```
//!
//! Composition borrows from its inputs and is recomputed, never patched, when
//! either input changes. It is total over schema-valid inputs.

use crate::generation::GenerationError;
use crate::types::{DailyPlan, Metadata, Plan};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Width of the metadata grid in logical columns.
pub const GRID_COLUMNS: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTree<'a> {
    pub title: &'a str,
    pub grid: MetadataGrid<'a>,
    pub days: Vec<DaySection<'a>>,
}

impl DocumentTree<'_> {
    pub fn day_labels(&self) -> Vec<&str> {
        self.days.iter().map(|d| d.day).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataGrid<'a> {
    pub rows: Vec<GridRow<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub cells: Vec<GridCell<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<'a> {
    pub label: &'static str,
    pub value: CellValue<'a>,
    /// Columns spanned out of [`GRID_COLUMNS`]. Spans in a row sum to 4.
    pub span: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
    Italic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Text {
        text: Cow<'a, str>,
        emphasis: Emphasis,
    },
    /// Markdown without math.
    Markdown(&'a str),
    /// Standard code badge followed by its description.
    Standard { code: &'a str, description: &'a str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySection<'a> {
    pub day: &'a str,
    pub blocks: Vec<Block<'a>>,
}

/// The seven pedagogical blocks, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Introduction,
    Presentation,
    GuidedPractice,
    IndependentPractice,
    Closure,
    Differentiation,
    Homework,
}

impl BlockKind {
    pub const ORDER: [BlockKind; 7] = [
        BlockKind::Introduction,
        BlockKind::Presentation,
        BlockKind::GuidedPractice,
        BlockKind::IndependentPractice,
        BlockKind::Closure,
        BlockKind::Differentiation,
        BlockKind::Homework,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            BlockKind::Introduction => "1. Introduction / Hook (5 mins)",
            BlockKind::Presentation => "2. Presentation (10 mins)",
            BlockKind::GuidedPractice => "3. Guided Practice (15 mins)",
            BlockKind::IndependentPractice => "4. Independent Practice (10 mins)",
            BlockKind::Closure => "5. Closure (5 mins)",
            BlockKind::Differentiation => "6. Differentiation Strategies",
            BlockKind::Homework => "7. Homework",
        }
    }

    /// CSS class suffix used by the view stylesheet.
    pub fn slug(self) -> &'static str {
        match self {
            BlockKind::Introduction => "intro",
            BlockKind::Presentation => "presentation",
            BlockKind::GuidedPractice => "guided",
            BlockKind::IndependentPractice => "independent",
            BlockKind::Closure => "closure",
            BlockKind::Differentiation => "differentiation",
            BlockKind::Homework => "homework",
        }
    }
}

/// How a block arranges its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Row-major grid with this many columns.
    Columns(u8),
    /// One field per row.
    Stack,
    /// Two fields in one row, the first narrow (one third).
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    Plain,
    /// Boxed panel for worked math (examples, core tasks).
    Panel,
    /// Larger serif panel for the equations list.
    Equations,
    /// Titled card (differentiation groups).
    Card,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    pub label: &'static str,
    pub text: &'a str,
    pub math: bool,
    pub style: FieldStyle,
}

impl<'a> Field<'a> {
    fn new(label: &'static str, text: &'a str) -> Self {
        Self {
            label,
            text,
            math: true,
            style: FieldStyle::Plain,
        }
    }

    fn styled(mut self, style: FieldStyle) -> Self {
        self.style = style;
        self
    }

    fn without_math(mut self) -> Self {
        self.math = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    pub layout: Layout,
    pub fields: Vec<Field<'a>>,
}

impl Block<'_> {
    pub fn heading(&self) -> &'static str {
        self.kind.heading()
    }

    pub fn has_field(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.label == label)
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Build the document tree for a metadata/plan pair.
pub fn compose<'a>(metadata: &'a Metadata, plan: &'a Plan) -> DocumentTree<'a> {
    DocumentTree {
        title: &metadata.lesson_title,
        grid: metadata_grid(metadata, plan),
        days: plan.daily_plans.iter().map(day_section).collect(),
    }
}

fn text<'a>(label: &'static str, value: &'a str, emphasis: Emphasis, span: u8) -> GridCell<'a> {
    GridCell {
        label,
        value: CellValue::Text {
            text: Cow::Borrowed(value),
            emphasis,
        },
        span,
    }
}

fn markdown<'a>(label: &'static str, value: &'a str) -> GridCell<'a> {
    GridCell {
        label,
        value: CellValue::Markdown(value),
        span: 2,
    }
}

fn metadata_grid<'a>(m: &'a Metadata, plan: &'a Plan) -> MetadataGrid<'a> {
    use Emphasis::*;
    let info = &plan.general_info;
    let dates = GridCell {
        label: "Dates",
        value: CellValue::Text {
            text: Cow::Owned(format!("{} to {}", m.start_date, m.end_date)),
            emphasis: Strong,
        },
        span: 1,
    };

    let rows = vec![
        vec![
            text("Grade", &m.grade, Strong, 1),
            text("Semester", &m.semester, Strong, 1),
            text("Week", &m.week_number, Strong, 1),
            dates,
        ],
        vec![
            text("Subject", &m.subject, Strong, 1),
            text("Unit", &m.unit_name, Strong, 1),
            text("Lesson Title", &m.lesson_title, Strong, 1),
            text("Duration", &m.duration, Strong, 1),
        ],
        vec![
            text("Focus/Skill", &info.focus_skill, Plain, 1),
            GridCell {
                label: "CCSS Alignment",
                value: CellValue::Standard {
                    code: &m.ccss_code,
                    description: &info.ccss_alignment,
                },
                span: 2,
            },
            text("Assessment Planned", &info.assessment_planned, Plain, 1),
        ],
        vec![
            text("Teacher Name", &m.teacher_name, Strong, 2),
            text("HOD Name", &m.hod_name, Strong, 2),
        ],
        vec![
            text("Learning Intention", &info.learning_intention, Italic, 2),
            markdown("Success Criteria", &info.success_criteria),
        ],
        vec![
            markdown("Materials and Resources", &info.materials),
            markdown("Pre-requisites", &info.prerequisites),
        ],
    ];

    MetadataGrid {
        rows: rows.into_iter().map(|cells| GridRow { cells }).collect(),
    }
}

fn day_section(day: &DailyPlan) -> DaySection<'_> {
    DaySection {
        day: &day.day,
        blocks: BlockKind::ORDER
            .iter()
            .map(|&kind| block(kind, day))
            .collect(),
    }
}

fn block(kind: BlockKind, day: &DailyPlan) -> Block<'_> {
    let (layout, fields) = match kind {
        BlockKind::Introduction => (
            Layout::Columns(2),
            vec![
                Field::new("Warm-Up", &day.intro.warm_up),
                Field::new("Review", &day.intro.review),
                Field::new("Vocabulary", &day.intro.vocabulary),
                Field::new("Engaging Starter", &day.intro.starter),
            ],
        ),
        BlockKind::Presentation => (
            Layout::Stack,
            vec![
                Field::new("Teacher Explanation", &day.presentation.explanation),
                Field::new("Math Examples", &day.presentation.examples)
                    .styled(FieldStyle::Panel),
                Field::new(
                    "Check for Understanding",
                    &day.presentation.check_understanding,
                ),
            ],
        ),
        BlockKind::GuidedPractice => (
            Layout::Split,
            vec![
                Field::new("Grouping", &day.guided_practice.group_structure),
                Field::new("Tasks", &day.guided_practice.tasks),
            ],
        ),
        BlockKind::IndependentPractice => {
            let mut fields = vec![
                Field::new("Core Tasks", &day.independent_practice.tasks)
                    .styled(FieldStyle::Panel),
            ];
            if let Some(equations) = day.independent_practice.equations() {
                fields.push(Field::new("Equations", equations).styled(FieldStyle::Equations));
            }
            (Layout::Stack, fields)
        }
        BlockKind::Closure => (
            Layout::Columns(3),
            vec![
                Field::new("Self Assessment", &day.closure.self_assessment),
                Field::new("Summary", &day.closure.summary),
                Field::new("Exit Ticket", &day.closure.exit_ticket),
            ],
        ),
        BlockKind::Differentiation => {
            let d = &day.differentiation;
            fn card<'a>(label: &'static str, text: &'a str) -> Field<'a> {
                Field::new(label, text)
                    .styled(FieldStyle::Card)
                    .without_math()
            }
            (
                Layout::Columns(3),
                vec![
                    card("High Achievers", &d.high_achievers),
                    card("Average Students", &d.average_students),
                    card("Struggling Students", &d.struggling_students),
                ],
            )
        }
        BlockKind::Homework => (
            Layout::Columns(3),
            vec![
                Field::new("Support (Easy)", &day.homework.support),
                Field::new("Core (Medium)", &day.homework.core),
                Field::new("Challenge (Hard)", &day.homework.challenge),
            ],
        ),
    };
    Block {
        kind,
        layout,
        fields,
    }
}

// ============================================================================
// Day ordering
// ============================================================================

/// What to do when the generated day labels disagree with `selectedDays`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOrderPolicy {
    /// Keep the order the generator returned.
    Trust,
    /// Sort requested days into `selectedDays` order; unrequested days follow.
    #[default]
    Reorder,
    /// Require exactly the requested days, then reorder.
    Strict,
}

fn day_key(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

/// Reconcile a plan's day order with the days the teacher asked for.
pub fn order_days(
    mut plan: Plan,
    selected_days: &[String],
    policy: DayOrderPolicy,
) -> Result<Plan, GenerationError> {
    if policy == DayOrderPolicy::Trust {
        return Ok(plan);
    }

    let requested: Vec<String> = selected_days.iter().map(|d| day_key(d)).collect();

    if policy == DayOrderPolicy::Strict {
        let mut want = requested.clone();
        let mut got: Vec<String> = plan.daily_plans.iter().map(|d| day_key(&d.day)).collect();
        want.sort();
        got.sort();
        if want != got {
            return Err(GenerationError::DayMismatch {
                requested: selected_days.to_vec(),
                returned: plan.daily_plans.iter().map(|d| d.day.clone()).collect(),
            });
        }
    }

    let position = |label: &str| {
        let key = day_key(label);
        requested
            .iter()
            .position(|r| *r == key)
            .unwrap_or(usize::MAX)
    };
    plan.daily_plans.sort_by_key(|d| position(&d.day));
    Ok(plan)
}
