//! End-to-end build pipeline: clarify, collect answers, plan, refine, write
//! files, then produce run instructions.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{info, instrument};

use crate::agents::{clarify, instructions, plan};
use crate::core::state::BuildState;
use crate::core::types::{BuildStatus, ComplexityLevel, IterationOutcome, Phase};
use crate::io::answers::AnswerSource;
use crate::io::llm::Generator;
use crate::io::output::write_game_files;
use crate::io::prompt::PromptBuilder;
use crate::refine::{RefineOutcome, run_refinement};

/// Inputs for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub user_prompt: String,
    pub max_iterations: u32,
    pub output_dir: PathBuf,
}

/// Progress notifications for the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent<'a> {
    PhaseStarted(Phase),
    Clarified {
        complexity: ComplexityLevel,
        game_type: &'a str,
    },
    /// Questions are about to be asked, in order.
    QuestionsReady { questions: &'a [String] },
    Planned { plan_chars: usize },
    IterationStarted { iteration: u32, max_iterations: u32 },
    IterationFinished {
        iteration: u32,
        outcome: &'a IterationOutcome,
    },
    /// No round passed validation; the best available files are used.
    Exhausted { max_iterations: u32 },
    FilesWritten { dir: &'a Path, paths: &'a [PathBuf] },
    InstructionsReady { text: &'a str },
}

/// Result of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub state: BuildState,
    pub refine: RefineOutcome,
    /// Paths of the files written to the output directory.
    pub written: Vec<PathBuf>,
}

/// Run the whole pipeline.
///
/// Returns `Err` on any generator, prompt, or filesystem failure. Files are
/// written after refinement whether or not validation passed.
#[instrument(skip_all, fields(output_dir = %options.output_dir.display()))]
pub fn run_build<G, A, F>(
    generator: &G,
    answers: &mut A,
    prompts: &PromptBuilder,
    options: &BuildOptions,
    mut on_event: F,
) -> Result<BuildOutcome>
where
    G: Generator,
    A: AnswerSource,
    F: FnMut(&BuildEvent<'_>),
{
    if options.user_prompt.trim().is_empty() {
        bail!("game idea must be non-empty");
    }
    let mut state = BuildState::new(options.user_prompt.trim(), options.max_iterations);

    state.advance(BuildStatus::Clarifying)?;
    on_event(&BuildEvent::PhaseStarted(Phase::Clarify));
    let clarification = clarify::run(generator, prompts, state.user_prompt())?;
    state.record_clarification(clarification);
    on_event(&BuildEvent::Clarified {
        complexity: state.complexity_level,
        game_type: &state.detected_game_type,
    });

    on_event(&BuildEvent::QuestionsReady {
        questions: &state.clarification_questions,
    });
    let mut collected = Vec::with_capacity(state.clarification_questions.len());
    for (idx, question) in state.clarification_questions.iter().enumerate() {
        collected.push(answers.answer(idx + 1, question)?);
    }
    state.record_answers(collected);

    state.advance(BuildStatus::Planning)?;
    on_event(&BuildEvent::PhaseStarted(Phase::Plan));
    let architecture = plan::run(generator, prompts, &state)?;
    on_event(&BuildEvent::Planned {
        plan_chars: architecture.as_str().chars().count(),
    });
    state.record_plan(architecture);

    on_event(&BuildEvent::PhaseStarted(Phase::Implement));
    let refine = run_refinement(&mut state, generator, prompts, &mut on_event)?;

    let written = write_game_files(&options.output_dir, &state.implementation_files)?;
    on_event(&BuildEvent::FilesWritten {
        dir: &options.output_dir,
        paths: &written,
    });

    on_event(&BuildEvent::PhaseStarted(Phase::Instructions));
    let guide = instructions::run(generator, prompts, &state, &options.output_dir)?;
    on_event(&BuildEvent::InstructionsReady { text: &guide });
    state.run_instructions = Some(guide);
    state.advance(BuildStatus::Done)?;

    info!(
        passed = refine.passed(),
        iterations = state.iteration_count(),
        files = written.len(),
        "build finished"
    );
    Ok(BuildOutcome {
        state,
        refine,
        written,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::core::state::NO_PREFERENCE_ANSWER;
    use crate::io::answers::PresetAnswers;
    use crate::io::prompt::PromptLimits;
    use crate::refine::RefineStop;
    use crate::test_support::{
        ScriptedGenerator, clarify_response, complete_files_response, passing_report,
    };

    fn options(dir: &Path) -> BuildOptions {
        BuildOptions {
            user_prompt: "  a space shooter  ".to_string(),
            max_iterations: 3,
            output_dir: dir.join("generated_game"),
        }
    }

    #[test]
    fn happy_path_reaches_done_and_writes_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new([
            clarify_response("high", "shooter", &["Power-ups?", "Boss fights?"]),
            "## 1. FRAMEWORK\nCanvas".to_string(),
            complete_files_response("v1"),
            passing_report(),
            "Open index.html".to_string(),
        ]);
        let mut answers = PresetAnswers::new(["yes".to_string()]);
        let prompts = PromptBuilder::new(PromptLimits::default());
        let mut phases = Vec::new();

        let outcome = run_build(
            &generator,
            &mut answers,
            &prompts,
            &options(temp.path()),
            |event| {
                if let BuildEvent::PhaseStarted(phase) = event {
                    phases.push(*phase);
                }
            },
        )
        .expect("build");

        assert_eq!(outcome.state.status(), BuildStatus::Done);
        assert_eq!(outcome.state.user_prompt(), "a space shooter");
        assert_eq!(outcome.state.user_answers, vec!["yes", NO_PREFERENCE_ANSWER]);
        assert_eq!(outcome.refine.stop, RefineStop::Passed { iteration: 1 });
        assert_eq!(outcome.written.len(), 3);
        assert_eq!(
            outcome.state.run_instructions.as_deref(),
            Some("Open index.html")
        );
        assert!(temp.path().join("generated_game/index.html").exists());
        assert_eq!(
            phases,
            vec![
                Phase::Clarify,
                Phase::Plan,
                Phase::Implement,
                Phase::Instructions
            ]
        );
        assert_eq!(generator.remaining(), 0);
    }

    #[test]
    fn empty_idea_is_rejected_before_any_call() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new(Vec::<String>::new());
        let prompts = PromptBuilder::new(PromptLimits::default());
        let mut opts = options(temp.path());
        opts.user_prompt = "   ".to_string();

        let err = run_build(
            &generator,
            &mut PresetAnswers::default(),
            &prompts,
            &opts,
            |_| {},
        )
        .unwrap_err();

        assert!(err.to_string().contains("non-empty"));
        assert!(generator.requests().is_empty());
    }

    #[test]
    fn plan_failure_leaves_no_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new([clarify_response("low", "puzzle", &["Levels?"])]);
        let prompts = PromptBuilder::new(PromptLimits::default());
        let opts = options(temp.path());

        let err = run_build(
            &generator,
            &mut PresetAnswers::default(),
            &prompts,
            &opts,
            |_| {},
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("plan phase generation failed"));
        assert!(!opts.output_dir.exists());
    }

    #[test]
    fn answers_source_errors_abort() {
        struct Closed;
        impl AnswerSource for Closed {
            fn answer(&mut self, _number: usize, _question: &str) -> Result<String> {
                Err(crate::io::answers::InputClosed.into())
            }
        }

        let temp = tempfile::tempdir().expect("tempdir");
        let generator = ScriptedGenerator::new([clarify_response("low", "puzzle", &["Levels?"])]);
        let prompts = PromptBuilder::new(PromptLimits::default());

        let err = run_build(
            &generator,
            &mut Closed,
            &prompts,
            &options(temp.path()),
            |_| {},
        )
        .unwrap_err();

        assert!(err.downcast_ref::<crate::io::answers::InputClosed>().is_some());
        assert!(fs::read_dir(temp.path()).expect("read dir").next().is_none());
    }
}
