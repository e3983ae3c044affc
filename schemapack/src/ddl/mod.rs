// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! DDL compilation
//!
//! The compile driver talks to the DDL collaborator only through
//! [`DdlCompiler`]; [`BuiltinDdlCompiler`] is the default implementation.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod parser;

pub use compiler::BuiltinDdlCompiler;
pub use error::{DdlError, DdlResult};
pub use parser::{parse_ddl, SyntaxError};

use crate::catalog::Catalog;

/// Collaborator turning schema text into tables, indexes and views
pub trait DdlCompiler {
    /// Load one schema source; syntax errors are reported here
    fn load_schema(&mut self, file_name: &str, text: &str) -> DdlResult<()>;

    /// Merge every loaded source into the catalog's database node
    fn compile_to_catalog(&mut self, catalog: &mut Catalog) -> DdlResult<()>;

    /// Release the parsing session
    fn close(&mut self);
}
