// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for project descriptor loading and validation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("{path} (No such file or directory)")]
    NotFound { path: String },

    #[error("Unable to read project file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error schema validating project file. {0}")]
    Schema(String),

    #[error("Snapshot frequency {0} needs to end with time unit specified that is one of [s, m, h] (seconds, minutes, hours)")]
    SnapshotFrequencyUnit(String),

    #[error("Frequency {0} is not a non-negative integer")]
    SnapshotFrequencyValue(String),

    #[error("Snapshot prefix {0} is not a valid prefix")]
    SnapshotPrefixMissing(String),

    #[error("Snapshot prefix {0} cannot include , or -")]
    SnapshotPrefixInvalid(String),

    #[error("Snapshot path {0} is not a valid path")]
    SnapshotPath(String),

    #[error("Snapshot retain value not provided")]
    SnapshotRetainMissing,

    #[error("Snapshot retain value {0} is not a valid value. Must be 1 or greater.")]
    SnapshotRetain(i64),

    #[error("Class procedure {0} must declare partition info in its procedure registration and may not use the \"partitioninfo\" project file attribute.")]
    ClassProcedurePartitionInfo(String),

    #[error("\"{element}\" element has empty \"{attribute}\" attribute.")]
    EmptyAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

pub type ProjectResult<T> = Result<T, ProjectError>;
