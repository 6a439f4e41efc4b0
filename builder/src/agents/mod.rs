//! One module per pipeline phase.
//!
//! Each phase renders its prompt, makes exactly one generative call, and
//! parses the response into a typed value. Phases never mutate
//! [`BuildState`](crate::core::state::BuildState); the orchestrator records
//! what they return.

pub mod clarify;
pub mod implement;
pub mod instructions;
pub mod plan;
pub mod validate;

use anyhow::{Context, Result};

use crate::core::types::Phase;
use crate::io::llm::{GenerateRequest, Generator};

/// Send one phase prompt and return the raw response.
fn call<G: Generator>(generator: &G, phase: Phase, prompt: String) -> Result<String> {
    generator
        .generate(&GenerateRequest::new(phase, prompt))
        .with_context(|| format!("{phase} phase generation failed"))
}
