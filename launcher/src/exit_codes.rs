//! Stable exit codes for the launcher.
//!
//! After a successful handoff the launcher's exit status is the target's own,
//! so these only cover the cases where the target never ran.

/// Command succeeded (`plan`, `init`).
pub const OK: i32 = 0;
/// Invalid invocation, config, or base directory.
pub const INVALID: i32 = 1;
/// Both installation attempts failed; the target was not started.
pub const INSTALL_FAILED: i32 = 3;
/// The target could not be started.
pub const LAUNCH_FAILED: i32 = 4;
