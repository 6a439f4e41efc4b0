//! Implement phase: generate the three game files.

use anyhow::Result;
use tracing::{info, instrument, warn};

use crate::core::extraction::extract_files;
use crate::core::state::BuildState;
use crate::core::types::{GameFiles, Phase};
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

/// Generate and extract files for the current iteration.
///
/// The result may be incomplete; deciding what to do about that is the
/// refinement loop's job.
#[instrument(skip_all, fields(iteration = state.iteration_count()))]
pub fn run<G: Generator>(
    generator: &G,
    prompts: &PromptBuilder,
    state: &BuildState,
    feedback: Option<&str>,
) -> Result<GameFiles> {
    let prompt = prompts.implement(state, feedback)?;
    let raw = super::call(generator, Phase::Implement, prompt)?;
    let files = extract_files(&raw);
    if files.is_complete() {
        info!("extracted all game files");
    } else {
        warn!(missing = ?files.missing(), "implementation output is missing files");
    }
    Ok(files)
}
