// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for DDL compilation

use crate::catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DdlError {
    /// Schema text could not be parsed
    #[error("{message}")]
    Syntax {
        file: String,
        line: u32,
        message: String,
    },

    /// Parsed statement refers to something that does not exist or clashes
    #[error("{message}")]
    Semantic {
        file: String,
        line: u32,
        message: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl DdlError {
    /// Schema file and 1-based line the error was raised for
    pub fn location(&self) -> Option<(&str, u32)> {
        match self {
            DdlError::Syntax { file, line, .. } | DdlError::Semantic { file, line, .. } => {
                Some((file.as_str(), *line))
            }
            DdlError::Catalog(_) => None,
        }
    }
}

pub type DdlResult<T> = Result<T, DdlError>;
