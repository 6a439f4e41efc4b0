//! Phase prompt rendering.
//!
//! Each phase has one minijinja template under `prompts/`. Templates receive
//! typed context built from [`BuildState`]; no phase formats prompt text by
//! hand.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::state::BuildState;
use crate::core::types::CanonicalFile;

const SUMMARY_TEMPLATE: &str = include_str!("prompts/summary.md");
const CLARIFY_TEMPLATE: &str = include_str!("prompts/clarify.md");
const PLAN_TEMPLATE: &str = include_str!("prompts/plan.md");
const IMPLEMENT_TEMPLATE: &str = include_str!("prompts/implement.md");
const VALIDATE_TEMPLATE: &str = include_str!("prompts/validate.md");
const INSTRUCTIONS_TEMPLATE: &str = include_str!("prompts/instructions.md");

/// Shown to the reviewer in place of a file that was not produced.
const MISSING_FILE: &str = "MISSING";

#[derive(Debug, Clone, Serialize)]
struct QaContext<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Requirements summary shared by the Plan and Implement prompts.
#[derive(Debug, Clone, Serialize)]
struct SummaryContext<'a> {
    user_prompt: &'a str,
    game_type: &'a str,
    complexity: &'a str,
    qa: Vec<QaContext<'a>>,
}

impl<'a> SummaryContext<'a> {
    fn from_state(state: &'a BuildState) -> Self {
        Self {
            user_prompt: state.user_prompt(),
            game_type: &state.detected_game_type,
            complexity: state.complexity_level.as_str(),
            qa: state
                .qa_pairs()
                .map(|pair| QaContext {
                    question: pair.question,
                    answer: pair.answer,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileContext<'a> {
    name: &'static str,
    body: &'a str,
}

/// Limits applied when embedding the plan into later prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    pub validation_plan_chars: usize,
    pub instructions_plan_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            validation_plan_chars: 3000,
            instructions_plan_chars: 2000,
        }
    }
}

/// Renders the prompt for every phase.
pub struct PromptBuilder {
    env: Environment<'static>,
    limits: PromptLimits,
}

impl PromptBuilder {
    pub fn new(limits: PromptLimits) -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("summary", SUMMARY_TEMPLATE),
            ("clarify", CLARIFY_TEMPLATE),
            ("plan", PLAN_TEMPLATE),
            ("implement", IMPLEMENT_TEMPLATE),
            ("validate", VALIDATE_TEMPLATE),
            ("instructions", INSTRUCTIONS_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("embedded prompt template should be valid");
        }
        Self { env, limits }
    }

    pub fn clarify(&self, user_prompt: &str) -> Result<String> {
        self.render(
            "clarify",
            context! {
                user_prompt => user_prompt.trim(),
            },
        )
    }

    pub fn plan(&self, state: &BuildState) -> Result<String> {
        self.render(
            "plan",
            context! {
                summary => SummaryContext::from_state(state),
            },
        )
    }

    /// Implement prompt; `feedback` is the previous round's correction, if any.
    pub fn implement(&self, state: &BuildState, feedback: Option<&str>) -> Result<String> {
        self.render(
            "implement",
            context! {
                summary => SummaryContext::from_state(state),
                plan => state.plan().map(|plan| plan.as_str().trim()).unwrap_or_default(),
                feedback => feedback.map(str::trim).filter(|s| !s.is_empty()),
                iteration => state.iteration_count(),
            },
        )
    }

    pub fn validate(&self, state: &BuildState) -> Result<String> {
        let files: Vec<FileContext<'_>> = CanonicalFile::ALL
            .into_iter()
            .map(|file| FileContext {
                name: file.name(),
                body: state.implementation_files.get(file).unwrap_or(MISSING_FILE),
            })
            .collect();
        let plan_excerpt = state
            .plan()
            .map(|plan| plan.excerpt(self.limits.validation_plan_chars))
            .unwrap_or_default();
        self.render(
            "validate",
            context! {
                plan_excerpt => plan_excerpt,
                files => files,
            },
        )
    }

    pub fn instructions(&self, state: &BuildState, output_dir: &Path) -> Result<String> {
        let plan_excerpt = state
            .plan()
            .map(|plan| plan.excerpt(self.limits.instructions_plan_chars))
            .unwrap_or_default();
        self.render(
            "instructions",
            context! {
                game_type => &state.detected_game_type,
                complexity => state.complexity_level.as_str(),
                user_prompt => state.user_prompt(),
                output_dir => output_dir.display().to_string(),
                plan_excerpt => plan_excerpt,
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .with_context(|| format!("load {name} template"))?;
        template
            .render(ctx)
            .with_context(|| format!("render {name} prompt"))
    }
}
