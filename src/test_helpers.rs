//! Shared test utilities for the lesson-plan test suite.
//!
//! Builders for complete, schema-valid inputs so tests only spell out the
//! fields they care about.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let metadata = sample_metadata(&["Monday", "Wednesday"]);
//! let mut plan = sample_plan(&["Monday", "Wednesday"]);
//! plan.daily_plans[1].independent_practice.equations = Some(String::new());
//! ```

use crate::types::*;

// =========================================================================
// Metadata
// =========================================================================

/// Metadata for "Quadratic Functions", complete apart from the given days.
pub fn sample_metadata(days: &[&str]) -> Metadata {
    Metadata {
        grade: "Grade 8".to_string(),
        semester: "Fall".to_string(),
        week_number: "12".to_string(),
        start_date: "2026-11-02".to_string(),
        end_date: "2026-11-06".to_string(),
        selected_days: days.iter().map(|d| d.to_string()).collect(),
        lesson_title: "Quadratic Functions".to_string(),
        ccss_code: "8.EE.C.7".to_string(),
        teacher_name: "A. Rivera".to_string(),
        hod_name: "J. Okafor".to_string(),
        subject: "Mathematics".to_string(),
        unit_name: "Unit 4: Functions".to_string(),
        duration: "60 minutes".to_string(),
    }
}

// =========================================================================
// Plan
// =========================================================================

/// A plan with one daily plan per label, in the given order.
pub fn sample_plan(days: &[&str]) -> Plan {
    Plan {
        general_info: sample_general_info(),
        daily_plans: days.iter().map(|d| sample_daily_plan(d)).collect(),
    }
}

pub fn sample_general_info() -> GeneralInfo {
    GeneralInfo {
        focus_skill: "Solving quadratics by factoring".to_string(),
        ccss_alignment: "8.EE.C.7: Solve linear equations in one variable".to_string(),
        assessment_planned: "Exit ticket and observation".to_string(),
        learning_intention: "I can factor and solve $x^2 + bx + c = 0$.".to_string(),
        success_criteria: "- Identify factors\n- Apply the zero product property".to_string(),
        materials: "- Whiteboards\n- Graph paper".to_string(),
        prerequisites: "Multiplying binomials".to_string(),
    }
}

/// A daily plan whose leaf values are prefixed with the day label, so tests
/// can tell days apart in rendered output.
pub fn sample_daily_plan(day: &str) -> DailyPlan {
    let t = |s: &str| format!("{day} {s}");
    DailyPlan {
        day: day.to_string(),
        intro: Intro {
            warm_up: t("warm-up: factor $x^2 - 9$"),
            review: t("review of binomials"),
            vocabulary: t("vocabulary: **root**, *zero*"),
            starter: t("starter puzzle"),
        },
        presentation: Presentation {
            explanation: t("explanation of factoring"),
            modeling: t("modeling on the board"),
            examples: t("examples: $$x^2 + 5x + 6 = (x+2)(x+3)$$"),
            check_understanding: t("thumbs up check"),
        },
        guided_practice: GuidedPractice {
            group_structure: t("pairs"),
            tasks: t("guided tasks"),
        },
        independent_practice: IndependentPractice {
            tasks: t("independent tasks"),
            equations: Some(t("equations: $x^2 = 16$")),
        },
        closure: Closure {
            self_assessment: t("traffic lights"),
            summary: t("summary"),
            exit_ticket: t("exit ticket: solve $x^2 = 25$"),
        },
        differentiation: Differentiation {
            strategies: vec!["Scaffolded notes".to_string()],
            high_achievers: t("extension problems"),
            average_students: t("core set"),
            struggling_students: t("worked examples"),
        },
        homework: Homework {
            support: t("support sheet"),
            core: t("core sheet"),
            challenge: t("challenge sheet"),
        },
    }
}
