// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog tree

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog path not found: {0}")]
    PathNotFound(String),

    #[error("Malformed catalog path: {0}")]
    MalformedPath(String),

    #[error("Node {path} has no collection named '{collection}'")]
    UnknownCollection { path: String, collection: String },

    #[error("Node {path} has no field named '{field}'")]
    UnknownField { path: String, field: String },

    #[error("Field '{field}' of {path} expects {expected}, got {got}")]
    TypeMismatch {
        path: String,
        field: String,
        expected: String,
        got: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Invalid catalog name: '{0}'")]
    InvalidName(String),

    #[error("Malformed catalog command on line {line}: {message}")]
    MalformedCommand { line: usize, message: String },
}

impl CatalogError {
    /// Attach a command-text line number to errors raised while executing text
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            CatalogError::MalformedCommand { .. } => self,
            other => CatalogError::MalformedCommand {
                line,
                message: other.to_string(),
            },
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
