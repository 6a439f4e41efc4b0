//! Instructions phase: write the player-facing run and play guide.

use std::path::Path;

use anyhow::Result;
use tracing::instrument;

use crate::core::state::BuildState;
use crate::core::types::Phase;
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

#[instrument(skip_all)]
pub fn run<G: Generator>(
    generator: &G,
    prompts: &PromptBuilder,
    state: &BuildState,
    output_dir: &Path,
) -> Result<String> {
    let prompt = prompts.instructions(state, output_dir)?;
    let raw = super::call(generator, Phase::Instructions, prompt)?;
    Ok(raw.trim().to_string())
}
