//! Application step state machine.
//!
//! The workflow is a closed set of steps:
//!
//! ```text
//! Form ──Next──▶ Upload ──StartGeneration──▶ Generating ──ok──▶ Result
//!  ▲               │  ▲                          │                │
//!  └─────Back──────┘  └──────────failed──────────┘                │
//!  ▲                                                              │
//!  └──────────────────────────Reset───────────────────────────────┘
//! ```
//!
//! [`update`] is total and pure: every `(step, action)` pair has an outcome,
//! and actions that make no sense in the current step leave the state as it
//! was. The single generation call lives in [`run_generation`]; while the state
//! is `Generating` a second `StartGeneration` is ignored, so at most one call
//! is ever in flight.

use crate::compose::{DayOrderPolicy, order_days};
use crate::generation::{GenerationError, PlanGenerator, generate_plan};
use crate::types::{Metadata, PdfFile, Plan};

/// Banner shown on the upload step after a failed generation.
pub const GENERATION_FAILED_MESSAGE: &str =
    "An error occurred while generating the plan. Please check your API key and try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    Form,
    Upload,
    Generating,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EditMetadata(Metadata),
    Next,
    Back,
    SelectFile(PdfFile),
    StartGeneration,
    GenerationSucceeded(Plan),
    /// Carries the banner text to show.
    GenerationFailed(String),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub step: Step,
    pub metadata: Metadata,
    pub pdf_file: Option<PdfFile>,
    pub plan: Option<Plan>,
    pub error: Option<String>,
}

impl AppState {
    /// Initial state with metadata already filled in.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }
}

/// Apply one action.
pub fn update(state: AppState, action: Action) -> AppState {
    match (state.step, action) {
        (Step::Form, Action::EditMetadata(metadata)) => AppState { metadata, ..state },
        (Step::Form, Action::Next) if state.metadata.is_complete() => AppState {
            step: Step::Upload,
            ..state
        },
        (Step::Upload, Action::Back) => AppState {
            step: Step::Form,
            ..state
        },
        (Step::Upload, Action::SelectFile(file)) => AppState {
            pdf_file: Some(file),
            ..state
        },
        (Step::Upload, Action::StartGeneration) if state.pdf_file.is_some() => AppState {
            step: Step::Generating,
            error: None,
            ..state
        },
        (Step::Generating, Action::GenerationSucceeded(plan)) => AppState {
            step: Step::Result,
            plan: Some(plan),
            ..state
        },
        (Step::Generating, Action::GenerationFailed(message)) => AppState {
            step: Step::Upload,
            error: Some(message),
            ..state
        },
        (Step::Result, Action::Reset) => AppState::default(),
        (step, action) => {
            tracing::debug!(?step, action = action_name(&action), "action ignored");
            state
        }
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::EditMetadata(_) => "EditMetadata",
        Action::Next => "Next",
        Action::Back => "Back",
        Action::SelectFile(_) => "SelectFile",
        Action::StartGeneration => "StartGeneration",
        Action::GenerationSucceeded(_) => "GenerationSucceeded",
        Action::GenerationFailed(_) => "GenerationFailed",
        Action::Reset => "Reset",
    }
}

/// Drive `Upload → Generating → {Result, Upload}` with a generator.
///
/// The returned plan is reconciled with the selected days under `policy`.
/// A state that cannot start generating is returned unchanged.
pub fn run_generation(
    state: AppState,
    generator: &impl PlanGenerator,
    policy: DayOrderPolicy,
) -> AppState {
    run_generation_with(state, policy, |metadata, pdf| {
        generate_plan(generator, metadata, pdf)
    })
}

/// Like [`run_generation`], with the call supplied as a closure so a caller
/// can put a cache in front of the generator.
pub fn run_generation_with<F>(state: AppState, policy: DayOrderPolicy, generate: F) -> AppState
where
    F: FnOnce(&Metadata, &PdfFile) -> Result<Plan, GenerationError>,
{
    let state = update(state, Action::StartGeneration);
    if state.step != Step::Generating {
        return state;
    }

    let result = state.pdf_file.as_ref().map(|pdf| {
        generate(&state.metadata, pdf)
            .and_then(|plan| order_days(plan, &state.metadata.selected_days, policy))
    });

    match result {
        None => state,
        Some(Ok(plan)) => {
            tracing::info!(days = plan.daily_plans.len(), "lesson plan ready");
            update(state, Action::GenerationSucceeded(plan))
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "plan generation failed");
            update(
                state,
                Action::GenerationFailed(GENERATION_FAILED_MESSAGE.to_string()),
            )
        }
    }
}
