//! Validate-phase report parsing.
//!
//! The reviewer is asked for a fixed layout (`VALIDATION_STATUS:` followed by
//! five section headers). Parsing is lenient: unrecognized input degrades to a
//! failing report with empty lists.

use crate::core::types::{ValidationReport, ValidationStatus};

const STATUS_PREFIX: &str = "VALIDATION_STATUS:";
const NO_CHANGES: &str = "No changes needed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Errors,
    LogicIssues,
    MissingFeatures,
    Suggestions,
    Feedback,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        const HEADERS: [(&str, Section); 5] = [
            ("ERRORS", Section::Errors),
            ("LOGIC_ISSUES", Section::LogicIssues),
            ("MISSING_FEATURES", Section::MissingFeatures),
            ("IMPROVEMENT_SUGGESTIONS", Section::Suggestions),
            ("FEEDBACK_FOR_DEVELOPER", Section::Feedback),
        ];
        HEADERS
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, section)| *section)
    }
}

/// Parse a reviewer response into a [`ValidationReport`].
///
/// A missing or unrecognized status line yields [`ValidationStatus::Fail`].
pub fn parse_validation_report(raw: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut notes: Vec<&str> = Vec::new();
    let mut section: Option<Section> = None;

    for line in raw.lines().map(str::trim) {
        if let Some(verdict) = line.strip_prefix(STATUS_PREFIX) {
            report.status = if verdict.trim().to_uppercase().contains("PASS") {
                ValidationStatus::Pass
            } else {
                ValidationStatus::Fail
            };
            continue;
        }
        if let Some(next) = Section::from_header(line) {
            section = Some(next);
            continue;
        }

        let target = match section {
            None => continue,
            Some(Section::Feedback) => {
                if !line.is_empty() {
                    notes.push(line);
                }
                continue;
            }
            Some(Section::Errors) => &mut report.errors,
            Some(Section::LogicIssues) => &mut report.logic_issues,
            Some(Section::MissingFeatures) => &mut report.missing_features,
            Some(Section::Suggestions) => &mut report.improvement_suggestions,
        };
        if let Some(item) = list_item(line) {
            target.push(item.to_string());
        }
    }

    report.developer_notes = notes.join(" ");
    report.consolidated_feedback = consolidate_feedback(&report);
    report
}

/// A `- item` line with real content. `- None` placeholders are dropped.
fn list_item(line: &str) -> Option<&str> {
    let item = line.strip_prefix('-')?.trim();
    if item.is_empty() || item.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(item)
}

/// Build the feedback string handed to the next Implement call.
///
/// Blocking categories become titled blocks; developer notes are appended
/// last. Suggestions are advisory and never included.
pub fn consolidate_feedback(report: &ValidationReport) -> String {
    let mut blocks = Vec::new();
    push_block(&mut blocks, "CRITICAL ERRORS TO FIX:", &report.errors);
    push_block(&mut blocks, "LOGIC ISSUES TO FIX:", &report.logic_issues);
    push_block(&mut blocks, "MISSING FEATURES TO ADD:", &report.missing_features);

    let notes = report.developer_notes.trim();
    if !notes.is_empty() {
        blocks.push(format!("DEVELOPER NOTES:\n  {notes}"));
    }

    if blocks.is_empty() {
        NO_CHANGES.to_string()
    } else {
        blocks.join("\n\n")
    }
}

fn push_block(blocks: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let lines: Vec<String> = items.iter().map(|item| format!("  - {item}")).collect();
    blocks.push(format!("{title}\n{}", lines.join("\n")));
}
