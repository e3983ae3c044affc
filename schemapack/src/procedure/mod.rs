// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure compilation
//!
//! The compile driver hands each [`ProcedureDescriptor`] to a
//! [`ProcedureCompiler`] together with a [`ProcedureContext`]. The built-in
//! compiler analyses each statement, estimates its cost, renders an explain
//! plan and registers the procedure under the database node.

pub mod compiler;
pub mod error;
pub mod estimates;
pub mod registry;
pub mod statement;

pub use compiler::{BuiltinProcedureCompiler, ProcedureContext};
pub use error::{ProcedureError, ProcedureResult};
pub use estimates::DatabaseEstimates;
pub use registry::{NamedStatement, ProcInfoData, ProcedureRegistry};
pub use statement::{analyze, QueryType, StatementAnalysis};

use crate::project::ProcedureDescriptor;

/// Collaborator compiling one procedure descriptor against the catalog
pub trait ProcedureCompiler {
    fn compile(
        &mut self,
        ctx: &mut ProcedureContext<'_>,
        descriptor: &ProcedureDescriptor,
    ) -> ProcedureResult<()>;
}
