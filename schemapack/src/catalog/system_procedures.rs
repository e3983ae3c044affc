// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Built-in system procedures seeded into every catalog
//!
//! Every compiled catalog carries the same fixed set of system procedures,
//! registered as `@ShortName` procedure nodes. Their capability metadata is
//! declared statically in [`SYSTEM_PROCEDURES`]; their code ships with the
//! database server and is never embedded in the output archive.

use super::error::CatalogError;
use super::{Catalog, DATABASE_PATH};
use std::collections::HashSet;
use thiserror::Error;

/// Capability metadata for one built-in procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemProcedureInfo {
    pub class_name: &'static str,
    pub readonly: bool,
    pub every_site: bool,
    pub single_partition: bool,
}

impl SystemProcedureInfo {
    const fn new(class_name: &'static str, readonly: bool, every_site: bool) -> Self {
        Self {
            class_name,
            readonly,
            every_site,
            single_partition: false,
        }
    }

    /// Catalog name: `@` followed by the class name without its package
    pub fn short_name(&self) -> String {
        let simple = self
            .class_name
            .rsplit('.')
            .next()
            .unwrap_or(self.class_name);
        format!("@{}", simple)
    }
}

/// The built-in procedure set, in registration order
pub static SYSTEM_PROCEDURES: &[SystemProcedureInfo] = &[
    SystemProcedureInfo::new("org.voltdb.sysprocs.AdHoc", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.LoadMultipartitionTable", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.Quiesce", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.Rejoin", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SnapshotSave", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SnapshotRestore", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SnapshotStatus", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SnapshotScan", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SnapshotDelete", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.Shutdown", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.ProfCtl", false, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.Statistics", true, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.SystemInformation", true, false),
    SystemProcedureInfo::new("org.voltdb.sysprocs.UpdateApplicationCatalog", false, true),
    SystemProcedureInfo::new("org.voltdb.sysprocs.UpdateLogging", false, true),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SystemProcedureError {
    #[error("Cannot load sysproc {0}")]
    InvalidClass(String),

    #[error("Cannot load sysproc {class_name}: {short_name} is already registered")]
    DuplicateShortName {
        class_name: String,
        short_name: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Register the built-in procedure set under the database node
pub fn register_system_procedures(catalog: &mut Catalog) -> Result<usize, SystemProcedureError> {
    register_procedures(catalog, SYSTEM_PROCEDURES)
}

/// Register an arbitrary procedure table; every entry is checked before
/// the catalog is touched
pub fn register_procedures(
    catalog: &mut Catalog,
    table: &[SystemProcedureInfo],
) -> Result<usize, SystemProcedureError> {
    let mut seen = HashSet::new();
    for info in table {
        if !is_valid_class_name(info.class_name) {
            return Err(SystemProcedureError::InvalidClass(
                info.class_name.to_string(),
            ));
        }
        let short_name = info.short_name();
        if !seen.insert(short_name.clone()) {
            return Err(SystemProcedureError::DuplicateShortName {
                class_name: info.class_name.to_string(),
                short_name,
            });
        }
    }

    for info in table {
        let path = catalog.add(DATABASE_PATH, "procedures", &info.short_name())?;
        catalog.set(&path, "classname", info.class_name)?;
        catalog.set(&path, "readonly", info.readonly)?;
        catalog.set(&path, "systemproc", true)?;
        catalog.set(&path, "hasjava", true)?;
        catalog.set(&path, "singlepartition", info.single_partition)?;
        catalog.set(&path, "everysite", info.every_site)?;
        log::debug!("Registered system procedure {}", info.short_name());
    }

    Ok(table.len())
}

/// Fully qualified class name: dot-separated, non-empty Java identifiers
pub fn is_valid_class_name(name: &str) -> bool {
    name.contains('.')
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() || first == '_' || first == '$' => chars
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$'),
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CLUSTER_NAME, CLUSTER_PATH, DATABASE_NAME};

    fn empty_database() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("/", "clusters", CLUSTER_NAME).unwrap();
        catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME).unwrap();
        catalog
    }

    #[test]
    fn test_registers_fixed_set() {
        let mut catalog = empty_database();
        assert_eq!(register_system_procedures(&mut catalog).unwrap(), 15);

        let db = catalog.database().unwrap();
        let stats = db.procedure("@Statistics").unwrap();
        assert!(stats.is_readonly());
        assert!(stats.is_system_procedure());
        assert!(stats.has_java());
        assert!(!stats.is_every_site());

        let update = db.procedure("@UpdateLogging").unwrap();
        assert!(update.is_every_site());
        assert!(!update.is_readonly());
        assert_eq!(update.class_name(), Some("org.voltdb.sysprocs.UpdateLogging"));
    }

    #[test]
    fn test_malformed_entries_are_rejected_before_mutation() {
        let mut catalog = empty_database();
        let before = catalog.commands().len();

        let table = [
            SystemProcedureInfo::new("org.voltdb.sysprocs.AdHoc", false, false),
            SystemProcedureInfo::new("not a class", false, false),
        ];
        let err = register_procedures(&mut catalog, &table).unwrap_err();
        assert_eq!(err.to_string(), "Cannot load sysproc not a class");
        assert_eq!(catalog.commands().len(), before);

        let table = [
            SystemProcedureInfo::new("a.b.Shutdown", false, false),
            SystemProcedureInfo::new("c.d.Shutdown", false, false),
        ];
        assert!(matches!(
            register_procedures(&mut catalog, &table),
            Err(SystemProcedureError::DuplicateShortName { .. })
        ));
    }

    #[test]
    fn test_class_name_validation() {
        assert!(is_valid_class_name("org.voltdb.sysprocs.AdHoc"));
        assert!(is_valid_class_name("com.example.Outer$Inner"));
        assert!(!is_valid_class_name("AdHoc"));
        assert!(!is_valid_class_name("org..AdHoc"));
        assert!(!is_valid_class_name("org.1bad"));
        assert!(!is_valid_class_name(""));
    }
}
