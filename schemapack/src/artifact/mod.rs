// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Output archive assembly
//!
//! - [`Archive`]: write-once path to bytes map, written as a zip file
//! - [`SourceResolver`]: fetches plain files and jar entries
//! - [`Classpath`] / [`DependencyPackager`]: locate compiled classes and
//!   embed them with their member classes
//! - [`BuildInfo`]: the `buildinfo.txt` member

pub mod archive;
pub mod buildinfo;
pub mod classpath;
pub mod error;
pub mod packager;
pub mod resolver;

pub use archive::Archive;
pub use buildinfo::BuildInfo;
pub use classpath::Classpath;
pub use error::{
    ArchiveError, ArchiveResult, PackageError, PackageResult, ResolveError, ResolveResult,
};
pub use packager::DependencyPackager;
pub use resolver::{FsBackend, JarBackend, SourceBackend, SourceLocator, SourceResolver};

/// Canonical catalog serialization
pub const CATALOG_ENTRY: &str = "catalog.txt";

/// Build metadata
pub const BUILDINFO_ENTRY: &str = "buildinfo.txt";

/// Verbatim copy of the project descriptor
pub const PROJECT_ENTRY: &str = "project.xml";

/// Directory holding per-statement explain plans
pub const PLANS_DIR: &str = "plans";
