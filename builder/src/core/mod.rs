//! Deterministic, pure logic for the build pipeline.
//!
//! Core modules must be free of I/O side effects. The lenient parsers that
//! turn model text into typed records all live here, so orchestration code
//! never inspects raw response strings.

pub mod clarification;
pub mod extraction;
pub mod report;
pub mod state;
pub mod types;
