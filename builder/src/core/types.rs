//! Shared deterministic types for the build pipeline.
//!
//! These types are the typed contracts between phases. Lenient text parsing
//! lives in the sibling modules; everything downstream of a parser only sees
//! these records.

use std::collections::BTreeMap;
use std::fmt;

/// One of the three files a build may produce.
///
/// This is the allow-list for everything extracted or written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalFile {
    IndexHtml,
    StyleCss,
    GameJs,
}

impl CanonicalFile {
    pub const ALL: [CanonicalFile; 3] = [
        CanonicalFile::IndexHtml,
        CanonicalFile::StyleCss,
        CanonicalFile::GameJs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalFile::IndexHtml => "index.html",
            CanonicalFile::StyleCss => "style.css",
            CanonicalFile::GameJs => "game.js",
        }
    }

    /// Map a filename to its canonical file, ignoring ASCII case.
    ///
    /// Returns `None` for anything outside the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|file| file.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CanonicalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Files recovered from one Implement response, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFiles {
    files: BTreeMap<CanonicalFile, String>,
}

impl GameFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file: CanonicalFile) -> Option<&str> {
        self.files.get(&file).map(String::as_str)
    }

    pub fn contains(&self, file: CanonicalFile) -> bool {
        self.files.contains_key(&file)
    }

    /// Insert `contents`, replacing any earlier body for `file`.
    pub fn insert(&mut self, file: CanonicalFile, contents: String) {
        self.files.insert(file, contents);
    }

    /// Insert `contents` unless `file` is already present.
    ///
    /// Returns `true` when the value was stored.
    pub fn insert_if_absent(&mut self, file: CanonicalFile, contents: String) -> bool {
        if self.files.contains_key(&file) {
            return false;
        }
        self.files.insert(file, contents);
        true
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All three canonical files are present.
    pub fn is_complete(&self) -> bool {
        self.files.len() == CanonicalFile::ALL.len()
    }

    pub fn present(&self) -> Vec<CanonicalFile> {
        self.files.keys().copied().collect()
    }

    pub fn missing(&self) -> Vec<CanonicalFile> {
        CanonicalFile::ALL
            .into_iter()
            .filter(|file| !self.files.contains_key(file))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalFile, &str)> {
        self.files.iter().map(|(file, body)| (*file, body.as_str()))
    }
}

impl FromIterator<(CanonicalFile, String)> for GameFiles {
    fn from_iter<I: IntoIterator<Item = (CanonicalFile, String)>>(iter: I) -> Self {
        let mut files = GameFiles::new();
        for (file, contents) in iter {
            files.insert(file, contents);
        }
        files
    }
}

/// Estimated size of the requested game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComplexityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        }
    }

    /// Parse a lower-cased level; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(ComplexityLevel::Low),
            "medium" => Some(ComplexityLevel::Medium),
            "high" => Some(ComplexityLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline progress. Ordered by declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStatus {
    #[default]
    Init,
    Clarifying,
    Planning,
    Implementing,
    Validating,
    Done,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Init => "init",
            BuildStatus::Clarifying => "clarifying",
            BuildStatus::Planning => "planning",
            BuildStatus::Implementing => "implementing",
            BuildStatus::Validating => "validating",
            BuildStatus::Done => "done",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline stage backed by exactly one generative call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Clarify,
    Plan,
    Implement,
    Validate,
    Instructions,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Clarify => "clarify",
            Phase::Plan => "plan",
            Phase::Implement => "implement",
            Phase::Validate => "validate",
            Phase::Instructions => "instructions",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationStatus {
    Pass,
    #[default]
    Fail,
}

/// Structured result of one Validate call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub errors: Vec<String>,
    pub logic_issues: Vec<String>,
    pub missing_features: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    /// Free text captured from the `FEEDBACK_FOR_DEVELOPER` section.
    pub developer_notes: String,
    /// Feedback handed to the next Implement call.
    pub consolidated_feedback: String,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }
}

/// Parsed Clarify output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClarificationOutcome {
    pub complexity_level: ComplexityLevel,
    pub detected_game_type: String,
    pub clarification_questions: Vec<String>,
}

/// Plan text produced once per build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchitecturePlan {
    raw: String,
}

impl ArchitecturePlan {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The first `max_chars` characters of the plan.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.raw.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.raw[..idx],
            None => &self.raw,
        }
    }
}

/// Result of one Implement↔Validate round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Implement returned fewer than three files; Validate was skipped.
    IncompleteOutput { found: Vec<CanonicalFile> },
    /// Validate rejected the files.
    ValidationFailed { report: ValidationReport },
    /// Validate accepted the files.
    Passed { report: ValidationReport },
}

impl IterationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, IterationOutcome::Passed { .. })
    }
}
