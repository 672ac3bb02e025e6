//! I/O adapters for the launcher.

pub mod config;
pub mod context;
pub mod handoff;
pub mod installer;
pub mod process;
