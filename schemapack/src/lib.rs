// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schemapack - a catalog compiler for partitioned SQL databases
//!
//! Schemapack reads a project descriptor (an XML file naming schema sources,
//! procedures, groups, partitions, export and snapshot settings), builds a
//! canonical catalog from it and packages everything a server needs into a
//! single archive.
//!
//! # Pipeline
//!
//! - **Project**: the descriptor is loaded and deserialized
//! - **Catalog**: a typed tree built from a replayable command log
//! - **DDL**: schema sources populate tables, indexes and views
//! - **Procedures**: each procedure is analysed, planned and registered
//! - **Archive**: catalog text, build info, sources, plans and classes
//!
//! # Usage
//!
//! ```bash
//! schemapack project.xml catalog.jar
//! schemapack inspect catalog.jar
//! ```

pub mod artifact;
pub mod catalog;
pub mod compiler;
pub mod ddl;
pub mod diagnostics;
pub mod logship;
pub mod procedure;
pub mod project;

pub use artifact::Archive;
pub use catalog::Catalog;
pub use compiler::{CompileError, CompileSummary, CompilerConfig, ProjectCompiler};
pub use diagnostics::{Diagnostics, Feedback, Severity};
pub use project::Project;

/// Schemapack version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schemapack crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
