//! Test-only helpers: a scripted generator and canned model responses.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::types::{CanonicalFile, Phase};
use crate::io::llm::{GenerateRequest, Generator};

/// One scripted reply: response text, or an error message to fail with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Generator that replays replies in order and records every request.
///
/// Running past the end of the script is an error, so tests notice when a
/// phase makes more calls than expected.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<ScriptedReply>>,
    requests: RefCell<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_replies(
            responses
                .into_iter()
                .map(|text| ScriptedReply::Text(text.into())),
        )
    }

    pub fn from_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.borrow().clone()
    }

    /// Prompts sent for `phase`, in call order.
    pub fn prompts_for(&self, phase: Phase) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.phase == phase)
            .map(|request| request.prompt.clone())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!(
                "scripted generator exhausted at {} request",
                request.phase
            )),
        }
    }
}

/// Clarify response with the given questions.
pub fn clarify_response(complexity: &str, game_type: &str, questions: &[&str]) -> String {
    let mut out = format!("COMPLEXITY: {complexity}\nGAME_TYPE: {game_type}\nQUESTIONS:\n");
    for (idx, question) in questions.iter().enumerate() {
        out.push_str(&format!("{}. {question}\n", idx + 1));
    }
    out
}

/// Implement response containing `files`, each body tagged with `marker`.
pub fn files_response(files: &[CanonicalFile], marker: &str) -> String {
    files
        .iter()
        .map(|file| {
            let lang = match file {
                CanonicalFile::IndexHtml => "html",
                CanonicalFile::StyleCss => "css",
                CanonicalFile::GameJs => "javascript",
            };
            format!("### {file}\n```{lang}\n/* {marker} {file} */\n```\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Implement response containing all three canonical files.
pub fn complete_files_response(marker: &str) -> String {
    files_response(&CanonicalFile::ALL, marker)
}

/// Body written by [`files_response`] for `file`.
pub fn file_body(file: CanonicalFile, marker: &str) -> String {
    format!("/* {marker} {file} */")
}

/// Validation report that passes.
pub fn passing_report() -> String {
    "VALIDATION_STATUS: PASS\nERRORS:\nLOGIC_ISSUES:\nMISSING_FEATURES:\nFEEDBACK_FOR_DEVELOPER:\nLooks complete.\n"
        .to_string()
}

/// Validation report that fails with the given errors.
pub fn failing_report(errors: &[&str]) -> String {
    let mut out = String::from("VALIDATION_STATUS: FAIL\nERRORS:\n");
    for error in errors {
        out.push_str(&format!("- {error}\n"));
    }
    out.push_str("LOGIC_ISSUES:\nMISSING_FEATURES:\n");
    out.push_str("FEEDBACK_FOR_DEVELOPER:\nFix the errors above.\n");
    out
}
