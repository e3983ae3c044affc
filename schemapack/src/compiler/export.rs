// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Export connector compilation
//!
//! At most one connector is accepted; it is registered under the name `0`.
//! Every rule is checked before the catalog is touched.

use super::error::{CompileError, CompileResult};
use crate::catalog::node::child_path;
use crate::catalog::{Catalog, CatalogError, DATABASE_PATH};
use crate::project::ConnectorElement;

/// Name of the single connector node
pub const CONNECTOR_NAME: &str = "0";

struct ExportTable {
    name: String,
    path: String,
    append_only: bool,
}

pub fn compile_export(
    catalog: &mut Catalog,
    connector: &ConnectorElement,
    groups: &[String],
) -> CompileResult<()> {
    let tables = {
        let db = catalog
            .database()
            .ok_or_else(|| CatalogError::PathNotFound(DATABASE_PATH.to_string()))?;

        for group in groups {
            if db.group(group).is_none() {
                return Err(CompileError::resolution(format!(
                    "Export connector {} has a group {} that does not exist",
                    connector.class, group
                )));
            }
        }

        let mut tables = Vec::new();
        for entry in connector.table_list() {
            let table = db.table_ignore_case(&entry.name).ok_or_else(|| {
                CompileError::resolution(format!(
                    "While configuring export, table {} was not present in the catalog.",
                    entry.name
                ))
            })?;
            if entry.exportonly && table.is_view_source() {
                return Err(CompileError::validation(format!(
                    "While configuring export, table {} is a source table for a materialized view. \
                     Export only tables do not support views.",
                    entry.name
                )));
            }
            if entry.exportonly && table.is_view() {
                return Err(CompileError::validation(format!(
                    "While configuring export, table {} is a materialized view. \
                     A view cannot be an export-only table.",
                    entry.name
                )));
            }
            tables.push(ExportTable {
                name: entry.name.clone(),
                path: table.path().to_string(),
                append_only: entry.exportonly,
            });
        }
        tables
    };

    if !connector.enabled {
        log::info!(
            "Export configuration is present and is configured to be disabled. Export will be disabled."
        );
    }

    let path = catalog.add(DATABASE_PATH, "connectors", CONNECTOR_NAME)?;
    catalog.set(&path, "loaderclass", connector.class.as_str())?;
    catalog.set(&path, "enabled", connector.enabled)?;
    for group in groups {
        let group_ref = catalog.add(&path, "authgroups", group)?;
        catalog.set_ref(&group_ref, "group", &child_path(DATABASE_PATH, "groups", group))?;
    }
    for table in &tables {
        let info = catalog.add(&path, "tableinfo", &table.name)?;
        catalog.set_ref(&info, "table", &table.path)?;
        catalog.set(&info, "appendonly", table.append_only)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CLUSTER_NAME, CLUSTER_PATH, DATABASE_NAME};
    use crate::ddl::{BuiltinDdlCompiler, DdlCompiler};
    use crate::project::model::{ExportTableElement, ExportTablesElement};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("/", "clusters", CLUSTER_NAME).unwrap();
        catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME).unwrap();
        catalog.add(DATABASE_PATH, "groups", "export").unwrap();
        let mut ddl = BuiltinDdlCompiler::new();
        ddl.load_schema(
            "ddl.sql",
            "CREATE TABLE events (id BIGINT NOT NULL, kind VARCHAR(8) NOT NULL);\n\
             CREATE TABLE audit (id BIGINT NOT NULL);\n\
             CREATE VIEW per_kind (kind, n) AS SELECT kind, COUNT(*) FROM events GROUP BY kind;",
        )
        .unwrap();
        ddl.compile_to_catalog(&mut catalog).unwrap();
        catalog
    }

    fn connector(tables: &[(&str, bool)]) -> ConnectorElement {
        ConnectorElement {
            class: "org.example.ExportLoader".to_string(),
            enabled: true,
            groups: None,
            tables: Some(ExportTablesElement {
                table: tables
                    .iter()
                    .map(|(name, exportonly)| ExportTableElement {
                        name: name.to_string(),
                        exportonly: *exportonly,
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_register_connector() {
        let mut catalog = catalog();
        let groups = vec!["export".to_string()];
        compile_export(&mut catalog, &connector(&[("audit", true), ("events", false)]), &groups)
            .unwrap();

        let db = catalog.database().unwrap();
        let conn = db.connectors().next().unwrap();
        assert_eq!(conn.name(), CONNECTOR_NAME);
        assert!(conn.is_enabled());
        assert_eq!(conn.loader_class(), Some("org.example.ExportLoader"));
        assert_eq!(conn.auth_groups().collect::<Vec<_>>(), vec!["export"]);
        let tables: Vec<_> = conn.tables().map(|(t, a)| (t.name().to_string(), a)).collect();
        assert_eq!(
            tables,
            vec![("AUDIT".to_string(), true), ("EVENTS".to_string(), false)]
        );

        // table info is keyed by the name as the descriptor spells it
        let text = catalog.serialize();
        assert!(text.contains(" tableinfo audit\n"));
        assert!(text.contains(" tableinfo events\n"));
    }

    #[test]
    fn test_export_only_view_rules() {
        let mut catalog = catalog();

        let err = compile_export(&mut catalog, &connector(&[("events", true)]), &[]).unwrap_err();
        assert!(err.to_string().contains("is a source table for a materialized view"));

        let err = compile_export(&mut catalog, &connector(&[("per_kind", true)]), &[]).unwrap_err();
        assert!(err.to_string().contains("is a materialized view"));

        let err = compile_export(&mut catalog, &connector(&[("missing", false)]), &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "While configuring export, table missing was not present in the catalog."
        );

        let groups = vec!["nobody".to_string()];
        let err = compile_export(&mut catalog, &connector(&[]), &groups).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Export connector org.example.ExportLoader has a group nobody that does not exist"
        );

        assert!(catalog.database().unwrap().connectors().next().is_none());
    }
}
