// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for archive assembly and source resolution

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive already contains an entry named {0}")]
    DuplicateEntry(String),

    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive format error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry {entry} not found in {}", jar.display())]
    EntryNotFound { jar: PathBuf, entry: String },

    #[error("Unable to read {}: {message}", jar.display())]
    Zip { jar: PathBuf, message: String },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("\"classdependency\" element has empty \"class\" attribute.")]
    EmptyClassName,

    #[error("\"classdependency\" can not find class {0} in classpath")]
    NotOnClasspath(String),

    #[error("Unable to locate classfile for {0}")]
    ClassNotFound(String),

    #[error("Unable to read (or completely read) classfile for {0}")]
    Unreadable(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type PackageResult<T> = Result<T, PackageError>;
