//! Build state threaded through every phase of one run.
//!
//! The orchestrator owns the state exclusively. Phases read it and the
//! orchestrator records their typed outputs; fields are added or overwritten,
//! never removed.

use thiserror::Error;

use crate::core::types::{
    ArchitecturePlan, BuildStatus, ClarificationOutcome, ComplexityLevel, GameFiles,
    ValidationReport,
};

/// Recorded in place of an empty interactive answer.
pub const NO_PREFERENCE_ANSWER: &str = "No preference, use your best judgment.";

/// Default Implement↔Validate round budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Attempted a status move the pipeline does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal build status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: BuildStatus,
    pub to: BuildStatus,
}

/// A clarification question paired with the recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaPair<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildState {
    user_prompt: String,
    pub clarification_questions: Vec<String>,
    pub user_answers: Vec<String>,
    pub complexity_level: ComplexityLevel,
    pub detected_game_type: String,
    plan: Option<ArchitecturePlan>,
    pub implementation_files: GameFiles,
    pub validation_report: Option<ValidationReport>,
    iteration_count: u32,
    max_iterations: u32,
    status: BuildStatus,
    pub run_instructions: Option<String>,
}

impl BuildState {
    pub fn new(user_prompt: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            clarification_questions: Vec::new(),
            user_answers: Vec::new(),
            complexity_level: ComplexityLevel::default(),
            detected_game_type: String::new(),
            plan: None,
            implementation_files: GameFiles::new(),
            validation_report: None,
            iteration_count: 0,
            max_iterations: max_iterations.max(1),
            status: BuildStatus::Init,
            run_instructions: None,
        }
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Move to `next`.
    ///
    /// Status only moves forward, except the retry edge
    /// `validating -> implementing`. Re-entering the current status is a no-op.
    pub fn advance(&mut self, next: BuildStatus) -> Result<(), TransitionError> {
        let retry_edge =
            self.status == BuildStatus::Validating && next == BuildStatus::Implementing;
        if next < self.status && !retry_edge {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Start round `iteration` of the Implement↔Validate loop.
    ///
    /// # Panics
    ///
    /// Panics if `iteration` is not the next round or exceeds the budget; the
    /// loop in `refine` is the only caller and never does either.
    pub fn begin_iteration(&mut self, iteration: u32) {
        assert!(
            iteration == self.iteration_count + 1 && iteration <= self.max_iterations,
            "iteration {iteration} out of order (current {}, max {})",
            self.iteration_count,
            self.max_iterations
        );
        self.iteration_count = iteration;
    }

    pub fn record_clarification(&mut self, outcome: ClarificationOutcome) {
        self.complexity_level = outcome.complexity_level;
        self.detected_game_type = outcome.detected_game_type;
        self.clarification_questions = outcome.clarification_questions;
    }

    /// Record answers in question order, normalizing blanks.
    pub fn record_answers<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.user_answers = answers
            .into_iter()
            .map(|answer| normalize_answer(answer.as_ref()))
            .collect();
    }

    /// Store the plan. Only the first plan is kept.
    pub fn record_plan(&mut self, plan: ArchitecturePlan) {
        if self.plan.is_none() {
            self.plan = Some(plan);
        }
    }

    pub fn plan(&self) -> Option<&ArchitecturePlan> {
        self.plan.as_ref()
    }

    pub fn qa_pairs(&self) -> impl Iterator<Item = QaPair<'_>> {
        self.clarification_questions
            .iter()
            .zip(&self.user_answers)
            .map(|(question, answer)| QaPair {
                question: question.as_str(),
                answer: answer.as_str(),
            })
    }
}

/// Trim an answer; blank answers become [`NO_PREFERENCE_ANSWER`].
pub fn normalize_answer(answer: &str) -> String {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        NO_PREFERENCE_ANSWER.to_string()
    } else {
        trimmed.to_string()
    }
}
