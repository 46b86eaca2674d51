//! brainseq CLI library.
//!
//! Command implementations, console display and logging setup for the
//! `brainseq` binary.

pub mod commands;
pub mod display;
pub mod logging;
