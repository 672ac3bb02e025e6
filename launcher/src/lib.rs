//! Bootstrap launcher.
//!
//! Resolves its own directory, installs the dependencies declared in the
//! manifest beside it, then hands control to the entry point and never comes
//! back. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic types (phases, install modes, attempt
//!   outcomes, command lines). No I/O.
//! - **[`io`]**: Side-effecting operations (context capture, config file,
//!   child processes, installer, handoff). Behind traits so the sequence can be
//!   tested without spawning anything.
//!
//! [`plan`] turns context and config into concrete commands; [`bootstrap`]
//! runs them in order.

pub mod bootstrap;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
