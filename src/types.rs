//! Shared data model: teacher metadata, the generated plan, and the uploaded PDF.
//!
//! All types serialize with camelCase keys, matching the JSON the generation
//! service is asked to produce. Values are created once and never mutated
//! afterwards; a new generation replaces the [`Plan`] wholesale.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0} is not a PDF file")]
    NotPdf(String),
    #[error("Metadata is incomplete: missing {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    #[error("Day selected more than once: {0}")]
    DuplicateDay(String),
}

/// Teacher-entered scheduling and identification fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Metadata {
    pub grade: String,
    pub semester: String,
    pub week_number: String,
    pub start_date: String,
    pub end_date: String,
    /// Ordered set of weekday names, e.g. `["Monday", "Wednesday"]`.
    pub selected_days: Vec<String>,
    pub lesson_title: String,
    pub ccss_code: String,
    pub teacher_name: String,
    pub hod_name: String,
    pub subject: String,
    pub unit_name: String,
    pub duration: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            grade: String::new(),
            semester: String::new(),
            week_number: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            selected_days: Vec::new(),
            lesson_title: String::new(),
            ccss_code: String::new(),
            teacher_name: String::new(),
            hod_name: String::new(),
            subject: "Mathematics".to_string(),
            unit_name: String::new(),
            duration: "60 minutes".to_string(),
        }
    }
}

impl Metadata {
    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.grade.trim().is_empty() {
            missing.push("grade");
        }
        if self.lesson_title.trim().is_empty() {
            missing.push("lessonTitle");
        }
        if self.ccss_code.trim().is_empty() {
            missing.push("ccssCode");
        }
        if self.selected_days.is_empty() {
            missing.push("selectedDays");
        }
        missing
    }

    /// Whether generation may proceed with this metadata.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty() && self.duplicate_day().is_none()
    }

    /// Validate required fields and the day set.
    pub fn validate(&self) -> Result<(), InputError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(InputError::Incomplete(missing));
        }
        if let Some(day) = self.duplicate_day() {
            return Err(InputError::DuplicateDay(day.to_string()));
        }
        Ok(())
    }

    fn duplicate_day(&self) -> Option<&str> {
        self.selected_days.iter().enumerate().find_map(|(i, day)| {
            self.selected_days[..i]
                .iter()
                .any(|d| d.trim().eq_ignore_ascii_case(day.trim()))
                .then_some(day.as_str())
        })
    }

    /// Load metadata from a `.toml` or `.json` file (camelCase keys in both).
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }
}

/// The generated lesson plan: one general-info block plus per-day plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub general_info: GeneralInfo,
    pub daily_plans: Vec<DailyPlan>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    pub focus_skill: String,
    pub ccss_alignment: String,
    pub assessment_planned: String,
    pub learning_intention: String,
    /// Markdown.
    pub success_criteria: String,
    /// Markdown.
    pub materials: String,
    /// Markdown.
    pub prerequisites: String,
}

/// One day's plan. Every leaf string may carry markdown and inline math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub day: String,
    pub intro: Intro,
    pub presentation: Presentation,
    pub guided_practice: GuidedPractice,
    pub independent_practice: IndependentPractice,
    pub closure: Closure,
    pub differentiation: Differentiation,
    pub homework: Homework,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intro {
    pub warm_up: String,
    pub review: String,
    pub vocabulary: String,
    pub starter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub explanation: String,
    pub modeling: String,
    /// Expected to carry math notation.
    pub examples: String,
    pub check_understanding: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedPractice {
    pub group_structure: String,
    pub tasks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentPractice {
    pub tasks: String,
    /// Absent, null, or blank suppresses the equations block.
    #[serde(default)]
    pub equations: Option<String>,
}

impl IndependentPractice {
    /// Equations text, if there is anything to show.
    pub fn equations(&self) -> Option<&str> {
        self.equations
            .as_deref()
            .filter(|eq| !eq.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Closure {
    pub self_assessment: String,
    pub summary: String,
    pub exit_ticket: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Differentiation {
    #[serde(default)]
    pub strategies: Vec<String>,
    pub high_achievers: String,
    pub average_students: String,
    pub struggling_students: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    pub support: String,
    pub core: String,
    pub challenge: String,
}

/// The lesson material uploaded for generation.
///
/// Only PDFs get this far: construction checks the `%PDF-` signature, so a
/// renamed image or text file is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub const MIME_TYPE: &'static str = "application/pdf";

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, InputError> {
        let name = name.into();
        if !bytes.starts_with(b"%PDF-") {
            return Err(InputError::NotPdf(name));
        }
        Ok(Self { name, bytes })
    }

    pub fn open(path: &Path) -> Result<Self, InputError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(name, bytes)
    }
}
