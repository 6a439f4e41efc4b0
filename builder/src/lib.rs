//! Browser game builder driven by a generative model.
//!
//! A game idea goes through clarification questions, an architecture plan,
//! and up to N rounds of implementation and review, ending in `index.html`,
//! `style.css` and `game.js` on disk.
//!
//! - **[`core`]**: Pure logic (response parsing, file extraction, build
//!   state). No I/O.
//! - **[`io`]**: Model calls, prompt templates, terminal input, config and
//!   output files.
//! - **[`agents`]**: One module per phase; each makes a single model call.
//!
//! [`build`] and [`refine`] orchestrate the phases; [`console`] renders
//! progress for the CLI.

pub mod agents;
pub mod build;
pub mod console;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod refine;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
