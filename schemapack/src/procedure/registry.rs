// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Declarative capability metadata for class-based procedures
//!
//! A class procedure's partitioning and SQL statements are registered up
//! front instead of being discovered from the compiled class.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named SQL statement of a class procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedStatement {
    pub name: String,
    pub sql: String,
}

/// Capability metadata for a single procedure class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfoData {
    #[serde(default)]
    pub single_partition: bool,
    /// `TABLE.COLUMN: parameterIndex`
    #[serde(default)]
    pub partition_info: Option<String>,
    #[serde(default)]
    pub statements: Vec<NamedStatement>,
    /// Declared parameter types; inferred from the statements when empty
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl ProcInfoData {
    pub fn multi_partition() -> Self {
        Self::default()
    }

    pub fn single_partition(partition_info: &str) -> Self {
        Self {
            single_partition: true,
            partition_info: Some(partition_info.to_string()),
            ..Self::default()
        }
    }

    pub fn with_statement(mut self, name: &str, sql: &str) -> Self {
        self.statements.push(NamedStatement {
            name: name.to_string(),
            sql: sql.to_string(),
        });
        self
    }

    pub fn with_parameters<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Class name to [`ProcInfoData`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<String, ProcInfoData>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: Into<String>>(&mut self, class_name: S, info: ProcInfoData) {
        self.procedures.insert(class_name.into(), info);
    }

    pub fn with<S: Into<String>>(mut self, class_name: S, info: ProcInfoData) -> Self {
        self.register(class_name, info);
        self
    }

    pub fn get(&self, class_name: &str) -> Option<&ProcInfoData> {
        self.procedures.get(class_name)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}
