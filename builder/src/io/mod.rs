//! Side-effecting boundaries: model calls, prompt rendering, terminal input,
//! config and output files.

pub mod answers;
pub mod config;
pub mod llm;
pub mod output;
pub mod prompt;
