// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table size hints used for statement cost estimates

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEstimates {
    /// Tuple count assumed for tables without an override
    pub default_tuples: i64,
    /// Per-table overrides, keyed by upper-case table name
    #[serde(default)]
    pub tables: BTreeMap<String, i64>,
}

impl Default for DatabaseEstimates {
    fn default() -> Self {
        Self {
            default_tuples: 100_000,
            tables: BTreeMap::new(),
        }
    }
}

impl DatabaseEstimates {
    pub fn with_default(default_tuples: i64) -> Self {
        Self {
            default_tuples,
            ..Self::default()
        }
    }

    pub fn set_table(&mut self, table: &str, tuples: i64) {
        self.tables.insert(table.to_ascii_uppercase(), tuples);
    }

    pub fn tuples_for(&self, table: &str) -> i64 {
        self.tables
            .get(&table.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default_tuples)
    }
}
