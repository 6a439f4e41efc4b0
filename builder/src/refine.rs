//! The Implement↔Validate refinement loop.

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::agents::{implement, validate};
use crate::build::BuildEvent;
use crate::core::state::BuildState;
use crate::core::types::{BuildStatus, IterationOutcome};
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

/// Feedback sent after a round that did not produce all three files.
pub const INCOMPLETE_FILES_FEEDBACK: &str = "The previous output was incomplete — not all 3 files were generated. You MUST output ALL THREE files: index.html, style.css, AND game.js, each with the ### filename header and proper code block.";

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineStop {
    /// Validation passed in round `iteration`.
    Passed { iteration: u32 },
    /// Every round ran without a pass; the last complete file set is kept.
    Exhausted { max_iterations: u32 },
}

/// Summary of one refinement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOutcome {
    /// One entry per round, in order.
    pub rounds: Vec<IterationOutcome>,
    pub stop: RefineStop,
}

impl RefineOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.stop, RefineStop::Passed { .. })
    }
}

/// Run up to `state.max_iterations()` rounds of Implement then Validate.
///
/// An incomplete round skips validation and keeps the previously stored
/// files. A failed validation feeds its consolidated feedback into the next
/// round. The loop stops at the first pass. Generator errors abort the loop.
#[instrument(skip_all, fields(max_iterations = state.max_iterations()))]
pub fn run_refinement<G: Generator, F: FnMut(&BuildEvent<'_>)>(
    state: &mut BuildState,
    generator: &G,
    prompts: &PromptBuilder,
    on_event: &mut F,
) -> Result<RefineOutcome> {
    let max_iterations = state.max_iterations();
    let mut feedback: Option<String> = None;
    let mut rounds = Vec::new();

    for iteration in 1..=max_iterations {
        state.advance(BuildStatus::Implementing)?;
        state.begin_iteration(iteration);
        on_event(&BuildEvent::IterationStarted {
            iteration,
            max_iterations,
        });

        let files = implement::run(generator, prompts, state, feedback.as_deref())?;
        let outcome = if files.is_complete() {
            state.implementation_files = files;
            state.advance(BuildStatus::Validating)?;
            let report = validate::run(generator, prompts, state)?;
            state.validation_report = Some(report.clone());
            if report.passed() {
                IterationOutcome::Passed { report }
            } else {
                feedback = Some(report.consolidated_feedback.clone());
                IterationOutcome::ValidationFailed { report }
            }
        } else {
            warn!(iteration, missing = ?files.missing(), "skipping validation of incomplete output");
            feedback = Some(INCOMPLETE_FILES_FEEDBACK.to_string());
            IterationOutcome::IncompleteOutput {
                found: files.present(),
            }
        };

        on_event(&BuildEvent::IterationFinished {
            iteration,
            outcome: &outcome,
        });
        let passed = outcome.is_pass();
        rounds.push(outcome);
        if passed {
            info!(iteration, "validation passed");
            return Ok(RefineOutcome {
                rounds,
                stop: RefineStop::Passed { iteration },
            });
        }
    }

    warn!(max_iterations, "refinement budget exhausted");
    on_event(&BuildEvent::Exhausted { max_iterations });
    Ok(RefineOutcome {
        rounds,
        stop: RefineStop::Exhausted { max_iterations },
    })
}
