//! Clarify phase: classify the idea and draft questions for the user.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::clarification::parse_clarification;
use crate::core::types::{ClarificationOutcome, Phase};
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

#[instrument(skip_all)]
pub fn run<G: Generator>(
    generator: &G,
    prompts: &PromptBuilder,
    user_prompt: &str,
) -> Result<ClarificationOutcome> {
    let prompt = prompts.clarify(user_prompt)?;
    let raw = super::call(generator, Phase::Clarify, prompt)?;
    let outcome = parse_clarification(&raw);
    info!(
        complexity = %outcome.complexity_level,
        game_type = %outcome.detected_game_type,
        questions = outcome.clarification_questions.len(),
        "clarified idea"
    );
    Ok(outcome)
}
