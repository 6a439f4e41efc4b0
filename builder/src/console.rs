//! Human-readable progress output for the CLI.

use std::io::{self, Write};

use crate::build::{BuildEvent, BuildOutcome};
use crate::core::types::{IterationOutcome, Phase};

/// Errors and logic issues shown per failed round.
const PREVIEW_ITEMS: usize = 3;
const RULE_WIDTH: usize = 60;

pub fn render_welcome<W: Write>(out: &mut W) -> io::Result<()> {
    banner(out, "GAME BUILDER")?;
    writeln!(
        out,
        "Describe a game and it will be planned, written and reviewed for you."
    )?;
    writeln!(out, "Output: index.html, style.css, game.js\n")
}

/// Write one progress event.
pub fn render_event<W: Write>(out: &mut W, event: &BuildEvent<'_>) -> io::Result<()> {
    match event {
        BuildEvent::PhaseStarted(phase) => banner(out, phase_title(*phase)),
        BuildEvent::Clarified {
            complexity,
            game_type,
        } => writeln!(out, "Detected: {game_type} game, {complexity} complexity"),
        BuildEvent::QuestionsReady { questions } => {
            if questions.is_empty() {
                return Ok(());
            }
            writeln!(
                out,
                "\nA few questions first (press Enter to leave a choice to the builder):"
            )
        }
        BuildEvent::Planned { plan_chars } => {
            writeln!(out, "Architecture plan ready ({plan_chars} chars)")
        }
        BuildEvent::IterationStarted {
            iteration,
            max_iterations,
        } => writeln!(out, "\n--- Iteration {iteration}/{max_iterations} ---"),
        BuildEvent::IterationFinished { outcome, .. } => render_round(out, outcome),
        BuildEvent::Exhausted { .. } => writeln!(
            out,
            "\n[warn] Max iterations reached. Using best available code..."
        ),
        BuildEvent::FilesWritten { dir, paths } => {
            writeln!(out, "\nFiles written to {}:", dir.display())?;
            for path in *paths {
                writeln!(out, "  {}", path.display())?;
            }
            Ok(())
        }
        BuildEvent::InstructionsReady { text } => writeln!(out, "{text}"),
    }
}

fn render_round<W: Write>(out: &mut W, outcome: &IterationOutcome) -> io::Result<()> {
    match outcome {
        IterationOutcome::IncompleteOutput { found } => {
            let names: Vec<&str> = found.iter().map(|file| file.name()).collect();
            let listed = if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            };
            writeln!(
                out,
                "[warn] Incomplete output: {}/3 files ({listed}). Retrying.",
                found.len()
            )
        }
        IterationOutcome::ValidationFailed { report } => {
            writeln!(
                out,
                "[fail] Validation failed: {} errors, {} logic issues, {} missing features",
                report.errors.len(),
                report.logic_issues.len(),
                report.missing_features.len()
            )?;
            preview(out, "Errors", &report.errors)?;
            preview(out, "Logic issues", &report.logic_issues)
        }
        IterationOutcome::Passed { report } => {
            writeln!(out, "[ok] Validation passed")?;
            preview(out, "Suggestions", &report.improvement_suggestions)
        }
    }
}

fn preview<W: Write>(out: &mut W, title: &str, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {title}:")?;
    for item in items.iter().take(PREVIEW_ITEMS) {
        writeln!(out, "    - {item}")?;
    }
    if items.len() > PREVIEW_ITEMS {
        writeln!(out, "    ... and {} more", items.len() - PREVIEW_ITEMS)?;
    }
    Ok(())
}

/// Final summary after a successful run.
pub fn render_summary<W: Write>(out: &mut W, outcome: &BuildOutcome) -> io::Result<()> {
    banner(out, "BUILD COMPLETE")?;
    let state = &outcome.state;
    writeln!(out, "Game type:  {}", state.detected_game_type)?;
    writeln!(out, "Complexity: {}", state.complexity_level)?;
    writeln!(
        out,
        "Iterations: {}/{}",
        state.iteration_count(),
        state.max_iterations()
    )?;
    if outcome.refine.passed() {
        writeln!(out, "Validation: passed")?;
    } else {
        writeln!(out, "Validation: not passed (best available code written)")?;
    }
    if let Some(index) = outcome
        .written
        .iter()
        .find(|path| path.file_name().is_some_and(|name| name == "index.html"))
    {
        writeln!(out, "\nOpen {} in a browser to play.", index.display())?;
    } else if outcome.written.is_empty() {
        writeln!(out, "\nNo files were generated.")?;
    }
    Ok(())
}

fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Clarify => "PHASE 1: CLARIFICATION",
        Phase::Plan => "PHASE 2: ARCHITECTURE PLANNING",
        Phase::Implement => "PHASE 3: IMPLEMENTATION & VALIDATION",
        Phase::Validate => "VALIDATION",
        Phase::Instructions => "PHASE 4: RUN INSTRUCTIONS",
    }
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::core::types::{CanonicalFile, ValidationReport};

    fn rendered(event: &BuildEvent<'_>) -> String {
        let mut out = Vec::new();
        render_event(&mut out, event).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn failed_round_previews_first_three_items() {
        let report = ValidationReport {
            errors: (1..=5).map(|n| format!("error {n}")).collect(),
            logic_issues: vec!["score never resets".to_string()],
            ..ValidationReport::default()
        };
        let outcome = IterationOutcome::ValidationFailed { report };

        let text = rendered(&BuildEvent::IterationFinished {
            iteration: 1,
            outcome: &outcome,
        });

        assert!(text.contains("5 errors, 1 logic issues, 0 missing features"));
        assert!(text.contains("    - error 3\n"));
        assert!(!text.contains("error 4"));
        assert!(text.contains("... and 2 more"));
        assert!(text.contains("    - score never resets"));
    }

    #[test]
    fn incomplete_round_lists_found_files() {
        let outcome = IterationOutcome::IncompleteOutput {
            found: vec![CanonicalFile::IndexHtml],
        };
        let text = rendered(&BuildEvent::IterationFinished {
            iteration: 2,
            outcome: &outcome,
        });
        assert!(text.contains("1/3 files (index.html)"));
    }

    #[test]
    fn exhaustion_warns_about_best_available_code() {
        let text = rendered(&BuildEvent::Exhausted { max_iterations: 3 });
        assert!(text.contains("Max iterations reached. Using best available code..."));
    }

    #[test]
    fn files_written_lists_paths() {
        let paths = vec![PathBuf::from("out/index.html"), PathBuf::from("out/game.js")];
        let text = rendered(&BuildEvent::FilesWritten {
            dir: Path::new("out"),
            paths: &paths,
        });
        assert!(text.contains("Files written to out:"));
        assert!(text.contains("  out/game.js"));
    }

    #[test]
    fn phase_banner_is_numbered() {
        let text = rendered(&BuildEvent::PhaseStarted(Phase::Plan));
        assert!(text.contains("PHASE 2: ARCHITECTURE PLANNING"));
    }
}
