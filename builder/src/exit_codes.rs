//! Stable exit codes for the `game-builder` CLI.

/// Build finished, the user declined to enter an idea, or the run was
/// interrupted.
pub const OK: i32 = 0;
/// Invalid config, generation failure, or any other error.
pub const FAULT: i32 = 1;
