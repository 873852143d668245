//! Command-line runner for the pipeline validation steps.
//!
//! Reads a step event from disk, runs the step against a directory used as
//! the object store and writes the resulting step data as JSON.

pub mod commands;
pub mod logging;
pub mod summary;
