//! Validate phase: review the generated files against the plan.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::report::parse_validation_report;
use crate::core::state::BuildState;
use crate::core::types::{Phase, ValidationReport};
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

#[instrument(skip_all, fields(iteration = state.iteration_count()))]
pub fn run<G: Generator>(
    generator: &G,
    prompts: &PromptBuilder,
    state: &BuildState,
) -> Result<ValidationReport> {
    let prompt = prompts.validate(state)?;
    let raw = super::call(generator, Phase::Validate, prompt)?;
    let report = parse_validation_report(&raw);
    info!(
        passed = report.passed(),
        errors = report.errors.len(),
        logic_issues = report.logic_issues.len(),
        missing_features = report.missing_features.len(),
        "validation report parsed"
    );
    Ok(report)
}
