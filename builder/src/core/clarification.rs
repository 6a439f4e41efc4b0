//! Clarify-phase output parsing.

use tracing::warn;

use crate::core::types::{ClarificationOutcome, ComplexityLevel};

const DEFAULT_GAME_TYPE: &str = "arcade";

/// Questions asked when the analyst response contains none.
pub const FALLBACK_QUESTIONS: [&str; 3] = [
    "What are the win and lose conditions for the game?",
    "What controls should the player use (keyboard, mouse, or both)?",
    "Should the game have a scoring system? If so, how is score earned?",
];

/// Parse `COMPLEXITY:`, `GAME_TYPE:` and a numbered `QUESTIONS:` block.
///
/// Never fails. Missing pieces fall back to `medium`, `arcade` and
/// [`FALLBACK_QUESTIONS`].
pub fn parse_clarification(raw: &str) -> ClarificationOutcome {
    let mut complexity = None;
    let mut game_type = None;
    let mut questions = Vec::new();
    let mut in_questions = false;

    for line in raw.trim().lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("COMPLEXITY:") {
            complexity = Some(value.trim().to_lowercase());
        } else if let Some(value) = line.strip_prefix("GAME_TYPE:") {
            game_type = Some(value.trim().to_string());
        } else if line.starts_with("QUESTIONS:") {
            in_questions = true;
        } else if in_questions {
            if let Some(question) = numbered_question(line) {
                questions.push(question.to_string());
            }
        }
    }

    if questions.is_empty() {
        questions = FALLBACK_QUESTIONS.iter().map(ToString::to_string).collect();
    }

    ClarificationOutcome {
        complexity_level: coerce_complexity(complexity.as_deref()),
        detected_game_type: game_type.unwrap_or_else(|| DEFAULT_GAME_TYPE.to_string()),
        clarification_questions: questions,
    }
}

/// Text after the first period of a line starting with a digit.
///
/// Numbering is not checked for order or uniqueness.
fn numbered_question(line: &str) -> Option<&str> {
    if !line.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let (_, question) = line.split_once('.')?;
    let question = question.trim();
    (!question.is_empty()).then_some(question)
}

fn coerce_complexity(raw: Option<&str>) -> ComplexityLevel {
    match raw {
        Some(value) => ComplexityLevel::parse(value).unwrap_or_else(|| {
            warn!(value, "unrecognized complexity level, using medium");
            ComplexityLevel::Medium
        }),
        None => ComplexityLevel::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complexity_type_and_questions() {
        let outcome = parse_clarification(
            "COMPLEXITY: high\nGAME_TYPE: shooter\nQUESTIONS:\n1. Single or multiplayer?\n2. Mobile friendly?",
        );

        assert_eq!(outcome.complexity_level, ComplexityLevel::High);
        assert_eq!(outcome.detected_game_type, "shooter");
        assert_eq!(
            outcome.clarification_questions,
            vec!["Single or multiplayer?", "Mobile friendly?"]
        );
    }

    #[test]
    fn missing_questions_section_uses_fallback() {
        let outcome = parse_clarification("COMPLEXITY: low\nGAME_TYPE: puzzle\n");

        assert_eq!(outcome.complexity_level, ComplexityLevel::Low);
        assert_eq!(outcome.clarification_questions, FALLBACK_QUESTIONS.to_vec());
    }

    #[test]
    fn numbered_lines_before_header_are_ignored() {
        let outcome = parse_clarification(
            "1. Not a question yet.\nQUESTIONS:\n3. Only one?\n- bullet\nfree text.\n3. Repeated number?",
        );
        assert_eq!(
            outcome.clarification_questions,
            vec!["Only one?", "Repeated number?"]
        );
    }

    #[test]
    fn only_first_period_splits_the_number() {
        let outcome = parse_clarification("QUESTIONS:\n1. Support 2.5D visuals?\n2.\n");
        assert_eq!(outcome.clarification_questions, vec!["Support 2.5D visuals?"]);
    }

    #[test]
    fn complexity_is_lowercased_and_coerced() {
        let outcome = parse_clarification("COMPLEXITY: HIGH\n");
        assert_eq!(outcome.complexity_level, ComplexityLevel::High);

        let outcome = parse_clarification("COMPLEXITY: extreme\n");
        assert_eq!(outcome.complexity_level, ComplexityLevel::Medium);
    }

    #[test]
    fn empty_response_uses_all_defaults() {
        let outcome = parse_clarification("");
        assert_eq!(outcome.complexity_level, ComplexityLevel::Medium);
        assert_eq!(outcome.detected_game_type, "arcade");
        assert_eq!(outcome.clarification_questions.len(), 3);
    }
}
