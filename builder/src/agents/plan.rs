//! Plan phase: produce the architecture plan used by every later phase.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::state::BuildState;
use crate::core::types::{ArchitecturePlan, Phase};
use crate::io::llm::Generator;
use crate::io::prompt::PromptBuilder;

/// The plan is kept verbatim; its section layout is requested, not enforced.
#[instrument(skip_all)]
pub fn run<G: Generator>(
    generator: &G,
    prompts: &PromptBuilder,
    state: &BuildState,
) -> Result<ArchitecturePlan> {
    let prompt = prompts.plan(state)?;
    let raw = super::call(generator, Phase::Plan, prompt)?;
    info!(plan_chars = raw.chars().count(), "architecture plan ready");
    Ok(ArchitecturePlan::new(raw))
}
