//! Failure diagnosis
//!
//! When a compose fails, the [`escalator`] walks a fixed chain of log sources
//! (global compose log, osbuild watch-task logs, the Koji task's
//! `compose-status.json`) and asks the [`summarizer`] to explain the failure.
//! The outcome of each version ends up in a [`report`].

pub mod escalator;
pub mod prompts;
pub mod report;
pub mod summarizer;

pub use escalator::{DiagnosticEscalator, Diagnosis, DiagnosisSource, EscalationSettings};
pub use report::{DiagnosticReport, ReportOutcome};
pub use summarizer::AiSummarizer;
