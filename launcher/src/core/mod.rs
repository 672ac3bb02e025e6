//! Pure launcher logic: phase and outcome types, command lines.
//!
//! Nothing in here spawns processes or touches the filesystem.

pub mod command;
pub mod types;
