// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for procedure compilation

use crate::artifact::PackageError;
use crate::catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcedureError {
    #[error("Procedure {procedure} has a group {group} that does not exist")]
    GroupNotFound { procedure: String, group: String },

    #[error("Cannot load class for procedure: {0}")]
    ClassNotRegistered(String),

    #[error("Procedure {0} is defined more than once")]
    Duplicate(String),

    #[error("Procedure {0} is single-partitioned but has no partition info")]
    MissingPartitionInfo(String),

    #[error("Invalid partition info for procedure {procedure}: {message}")]
    PartitionInfo { procedure: String, message: String },

    #[error("Failed to plan for statement {statement} in procedure {procedure}: {message}")]
    Statement {
        procedure: String,
        statement: String,
        message: String,
    },

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ProcedureError {
    /// True when the failure is an unresolvable reference rather than bad content
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            ProcedureError::GroupNotFound { .. }
                | ProcedureError::ClassNotRegistered(_)
                | ProcedureError::Package(_)
        )
    }
}

pub type ProcedureResult<T> = Result<T, ProcedureError>;
