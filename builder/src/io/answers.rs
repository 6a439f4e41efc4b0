//! Interactive input: the game idea and answers to clarification questions.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use thiserror::Error;

/// The user interrupted the process (Ctrl-C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("build interrupted by user")]
pub struct Interrupted;

/// Standard input ended before a line could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("input closed before a line was read")]
pub struct InputClosed;

/// Source of answers to clarification questions.
pub trait AnswerSource {
    /// Answer question `number` (1-based). Blank answers are allowed.
    fn answer(&mut self, number: usize, question: &str) -> Result<String>;
}

/// Line-oriented terminal prompt.
///
/// Generic over reader and writer so tests can drive it with in-memory
/// buffers. End of input is reported as [`InputClosed`].
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` and read one line, without its trailing newline.
    pub fn prompt_line(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}").context("write prompt")?;
        self.output.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("read line")?;
        if read == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> AnswerSource for Terminal<R, W> {
    fn answer(&mut self, number: usize, question: &str) -> Result<String> {
        writeln!(self.output, "\n  Q{number}: {question}").context("write question")?;
        self.prompt_line("  Your answer: ")
    }
}

/// Answers supplied up front (`--answer`); questions beyond the list get a
/// blank answer.
#[derive(Debug, Clone, Default)]
pub struct PresetAnswers {
    answers: VecDeque<String>,
}

impl PresetAnswers {
    pub fn new(answers: impl IntoIterator<Item = String>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }
}

impl AnswerSource for PresetAnswers {
    fn answer(&mut self, _number: usize, _question: &str) -> Result<String> {
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
