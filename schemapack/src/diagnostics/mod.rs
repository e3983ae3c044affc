// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compile diagnostics
//!
//! Every message produced while compiling a project is collected as a
//! [`Feedback`] entry tagged with the file the compiler was processing at the
//! time. Entries are never removed; the sink is reset only when a new
//! top-level compile starts.

pub mod feedback;

pub use feedback::{Feedback, Severity};

/// Log target used to mirror feedback into the operational log
pub const LOG_TARGET: &str = "compiler";

/// Severity-tagged message sink for a single compile
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    feedback: Vec<Feedback>,
    current_file: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all collected feedback and the current-file cursor
    pub fn reset(&mut self) {
        self.feedback.clear();
        self.current_file = None;
    }

    /// Move the current-file cursor; subsequent feedback is tagged with it
    pub fn set_current_file<S: Into<String>>(&mut self, file: Option<S>) {
        self.current_file = file.map(Into::into);
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    pub fn info<S: Into<String>>(&mut self, message: S, line: Option<u32>) {
        self.push(Severity::Info, message.into(), line);
    }

    pub fn warn<S: Into<String>>(&mut self, message: S, line: Option<u32>) {
        self.push(Severity::Warning, message.into(), line);
    }

    pub fn error<S: Into<String>>(&mut self, message: S, line: Option<u32>) {
        self.push(Severity::Error, message.into(), line);
    }

    pub fn unexpected<S: Into<String>>(&mut self, message: S, line: Option<u32>) {
        self.push(Severity::Unexpected, message.into(), line);
    }

    fn push(&mut self, severity: Severity, message: String, line: Option<u32>) {
        let feedback = Feedback::new(severity, message, self.current_file.clone(), line);

        match severity {
            Severity::Info => log::info!(target: LOG_TARGET, "{}", feedback.log_string()),
            Severity::Warning => log::warn!(target: LOG_TARGET, "{}", feedback.log_string()),
            Severity::Error | Severity::Unexpected => {
                log::error!(target: LOG_TARGET, "{}", feedback.log_string())
            }
        }

        self.feedback.push(feedback);
    }

    /// True when at least one ERROR or UNEXPECTED entry was recorded
    pub fn has_errors(&self) -> bool {
        self.feedback.iter().any(|f| f.severity.is_error())
    }

    pub fn has_errors_or_warnings(&self) -> bool {
        self.feedback
            .iter()
            .any(|f| f.severity.is_error() || f.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback.iter().filter(|f| f.severity.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback.iter().filter(|f| f.severity == Severity::Info)
    }

    /// All feedback in the order it was recorded
    pub fn iter(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback.iter()
    }

    pub fn len(&self) -> usize {
        self.feedback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feedback.is_empty()
    }
}
