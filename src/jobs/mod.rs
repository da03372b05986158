//! Background mixing jobs with polled progress.

/// Single-job runner with supersession and cooperative cancel.
pub mod runner;
