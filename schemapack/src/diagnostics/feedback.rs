// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Feedback entries produced during a compile

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Unexpected,
}

impl Severity {
    /// ERROR and UNEXPECTED both block a compile
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Unexpected)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Unexpected => "UNEXPECTED ERROR",
        };
        write!(f, "{}", s)
    }
}

/// A single immutable diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Feedback {
    pub fn new(
        severity: Severity,
        message: String,
        file: Option<String>,
        line: Option<u32>,
    ) -> Self {
        Self {
            severity,
            message,
            file,
            line,
        }
    }

    /// Location and message without the severity prefix, as written to the log
    pub fn log_string(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("[{}:{}]: {}", file, line, self.message),
            (Some(file), None) => format!("[{}]: {}", file, self.message),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_some() {
            write!(f, "{} {}", self.severity, self.log_string())
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_feedback_line() {
        let with_line = Feedback::new(
            Severity::Error,
            "unexpected token".to_string(),
            Some("ddl.sql".to_string()),
            Some(12),
        );
        assert_eq!(with_line.to_string(), "ERROR [ddl.sql:12]: unexpected token");

        let file_only = Feedback::new(
            Severity::Warning,
            "blank group".to_string(),
            Some("project.xml".to_string()),
            None,
        );
        assert_eq!(file_only.to_string(), "WARNING [project.xml]: blank group");

        let bare = Feedback::new(Severity::Unexpected, "boom".to_string(), None, Some(4));
        assert_eq!(bare.to_string(), "UNEXPECTED ERROR: boom");
    }
}
