// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compile error taxonomy
//!
//! Every failure surfaced by the compile driver is one of five kinds. The
//! rendered message is exactly the text of the ERROR feedback it becomes.

use crate::artifact::{ArchiveError, PackageError, ResolveError};
use crate::catalog::system_procedures::SystemProcedureError;
use crate::catalog::CatalogError;
use crate::ddl::DdlError;
use crate::procedure::ProcedureError;
use crate::project::ProjectError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Malformed descriptor shape or catalog structure
    #[error("{message}")]
    Structural { message: String, line: Option<u32> },

    /// Semantic rule violation
    #[error("{message}")]
    Validation { message: String, line: Option<u32> },

    /// Unresolvable class, table, column or group reference
    #[error("{message}")]
    Resolution { message: String, line: Option<u32> },

    /// Unreadable input or failed archive write
    #[error("{message}")]
    Io { message: String, line: Option<u32> },

    /// DDL or procedure compiler failure, surfaced verbatim
    #[error("{message}")]
    Collaborator { message: String, line: Option<u32> },
}

impl CompileError {
    pub fn structural<S: Into<String>>(message: S) -> Self {
        CompileError::Structural {
            message: message.into(),
            line: None,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        CompileError::Validation {
            message: message.into(),
            line: None,
        }
    }

    pub fn resolution<S: Into<String>>(message: S) -> Self {
        CompileError::Resolution {
            message: message.into(),
            line: None,
        }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        CompileError::Io {
            message: message.into(),
            line: None,
        }
    }

    pub fn collaborator<S: Into<String>>(message: S, line: Option<u32>) -> Self {
        CompileError::Collaborator {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            CompileError::Structural { line, .. }
            | CompileError::Validation { line, .. }
            | CompileError::Resolution { line, .. }
            | CompileError::Io { line, .. }
            | CompileError::Collaborator { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Structural { .. } => "structural",
            CompileError::Validation { .. } => "validation",
            CompileError::Resolution { .. } => "resolution",
            CompileError::Io { .. } => "io",
            CompileError::Collaborator { .. } => "collaborator",
        }
    }
}

impl From<CatalogError> for CompileError {
    fn from(err: CatalogError) -> Self {
        CompileError::structural(err.to_string())
    }
}

impl From<ProjectError> for CompileError {
    fn from(err: ProjectError) -> Self {
        let message = err.to_string();
        match err {
            ProjectError::NotFound { .. } | ProjectError::Io { .. } => CompileError::io(message),
            ProjectError::Schema(_) | ProjectError::EmptyAttribute { .. } => {
                CompileError::structural(message)
            }
            _ => CompileError::validation(message),
        }
    }
}

impl From<ArchiveError> for CompileError {
    fn from(err: ArchiveError) -> Self {
        CompileError::io(err.to_string())
    }
}

impl From<ResolveError> for CompileError {
    fn from(err: ResolveError) -> Self {
        CompileError::io(err.to_string())
    }
}

impl From<PackageError> for CompileError {
    fn from(err: PackageError) -> Self {
        let message = err.to_string();
        match err {
            PackageError::EmptyClassName => CompileError::structural(message),
            PackageError::NotOnClasspath(_) | PackageError::ClassNotFound(_) => {
                CompileError::resolution(message)
            }
            PackageError::Unreadable(_) | PackageError::Archive(_) => CompileError::io(message),
        }
    }
}

impl From<DdlError> for CompileError {
    fn from(err: DdlError) -> Self {
        let line = err.location().map(|(_, line)| line);
        CompileError::collaborator(err.to_string(), line)
    }
}

impl From<ProcedureError> for CompileError {
    fn from(err: ProcedureError) -> Self {
        CompileError::collaborator(err.to_string(), None)
    }
}

impl From<SystemProcedureError> for CompileError {
    fn from(err: SystemProcedureError) -> Self {
        CompileError::structural(err.to_string())
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
