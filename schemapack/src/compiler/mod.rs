// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Project compilation
//!
//! [`ProjectCompiler`] drives a compile from a project descriptor to an
//! output archive. The phase helpers for partitioning and export live in
//! their own modules so they can be exercised against a bare catalog.

pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod partition;
pub mod summary;

pub use config::{BuildIdentity, CompilerConfig, DescriptorStrictness, CLASSPATH_ENV};
pub use driver::{ProjectCompiler, SchemaFile, LOCAL_EPOCH};
pub use error::{CompileError, CompileResult};
pub use export::{compile_export, CONNECTOR_NAME};
pub use partition::{apply_partition, PartitionPair};
pub use summary::{sql_preview, CompileSummary, ProcedureSummary};
