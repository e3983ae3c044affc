// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table partitioning and replication propagation

use super::error::{CompileError, CompileResult};
use crate::catalog::{Catalog, CatalogError, DATABASE_NAME, DATABASE_PATH};
use crate::project::{PartitionElement, ProjectError};

/// A declared `(table, column)` partition pair, as written in the descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPair {
    pub table: String,
    pub column: String,
}

impl PartitionPair {
    pub fn from_element(element: &PartitionElement) -> CompileResult<Self> {
        if element.table.is_empty() {
            return Err(ProjectError::EmptyAttribute {
                element: "partition",
                attribute: "table",
            }
            .into());
        }
        if element.column.is_empty() {
            return Err(ProjectError::EmptyAttribute {
                element: "partition",
                attribute: "column",
            }
            .into());
        }
        Ok(Self {
            table: element.table.clone(),
            column: element.column.clone(),
        })
    }
}

/// Partition one table on one column
///
/// The column must exist and be NOT NULL. The table becomes non-replicated
/// and so does the destination table of every view maintained from it.
pub fn apply_partition(catalog: &mut Catalog, pair: &PartitionPair) -> CompileResult<()> {
    let prefix = format!("In database \"{}\", ", DATABASE_NAME);
    let (table_path, column_path, view_paths) = {
        let db = catalog
            .database()
            .ok_or_else(|| CatalogError::PathNotFound(DATABASE_PATH.to_string()))?;
        let table = db.table_ignore_case(&pair.table).ok_or_else(|| {
            CompileError::resolution(format!(
                "{}\"partition\" element has unknown \"table\" attribute '{}'",
                prefix, pair.table
            ))
        })?;
        let column = table.column_ignore_case(&pair.column).ok_or_else(|| {
            CompileError::resolution(format!(
                "{}\"partition\" element has unknown \"column\" attribute '{}'",
                prefix, pair.column
            ))
        })?;
        if column.is_nullable() {
            return Err(CompileError::validation(format!(
                "{}Partition column '{}.{}' is nullable. Partition columns must be constrained \"NOT NULL\".",
                prefix, pair.table, pair.column
            )));
        }

        let views: Vec<String> = table
            .views()
            .filter_map(|v| v.dest())
            .map(|dest| dest.path().to_string())
            .collect();
        (table.path().to_string(), column.path().to_string(), views)
    };

    catalog.set_ref(&table_path, "partitioncolumn", &column_path)?;
    catalog.set(&table_path, "isreplicated", false)?;
    for view in &view_paths {
        catalog.set(view, "isreplicated", false)?;
    }
    log::debug!(
        "Partitioned {} on {} ({} dependent views)",
        pair.table,
        pair.column,
        view_paths.len()
    );
    Ok(())
}
