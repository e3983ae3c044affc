// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed read-only views over catalog nodes

use super::node::CatalogNode;
use super::Catalog;

macro_rules! node_view {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            catalog: &'a Catalog,
            node: &'a CatalogNode,
        }

        impl<'a> $name<'a> {
            pub(crate) fn new(catalog: &'a Catalog, node: &'a CatalogNode) -> Self {
                Self { catalog, node }
            }

            pub fn name(&self) -> &'a str {
                self.node.name()
            }

            pub fn path(&self) -> &'a str {
                self.node.path()
            }

            pub fn node(&self) -> &'a CatalogNode {
                self.node
            }
        }
    };
}

node_view!(Database);
node_view!(Table);
node_view!(Column);
node_view!(MaterializedView);
node_view!(Procedure);
node_view!(Statement);
node_view!(Group);
node_view!(Connector);

impl<'a> Database<'a> {
    pub fn tables(&self) -> impl Iterator<Item = Table<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("tables")
            .iter()
            .map(move |n| Table::new(catalog, n))
    }

    pub fn table(&self, name: &str) -> Option<Table<'a>> {
        self.node
            .child("tables", name)
            .map(|n| Table::new(self.catalog, n))
    }

    pub fn table_ignore_case(&self, name: &str) -> Option<Table<'a>> {
        self.node
            .child_ignore_case("tables", name)
            .map(|n| Table::new(self.catalog, n))
    }

    pub fn procedures(&self) -> impl Iterator<Item = Procedure<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("procedures")
            .iter()
            .map(move |n| Procedure::new(catalog, n))
    }

    pub fn procedure(&self, name: &str) -> Option<Procedure<'a>> {
        self.node
            .child("procedures", name)
            .map(|n| Procedure::new(self.catalog, n))
    }

    pub fn groups(&self) -> impl Iterator<Item = Group<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("groups")
            .iter()
            .map(move |n| Group::new(catalog, n))
    }

    pub fn group(&self, name: &str) -> Option<Group<'a>> {
        self.node
            .child("groups", name)
            .map(|n| Group::new(self.catalog, n))
    }

    pub fn connectors(&self) -> impl Iterator<Item = Connector<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("connectors")
            .iter()
            .map(move |n| Connector::new(catalog, n))
    }

    pub fn snapshot_schedule(&self) -> Option<&'a CatalogNode> {
        self.node.children("snapshotschedule").first()
    }
}

impl<'a> Table<'a> {
    pub fn is_replicated(&self) -> bool {
        self.node.get_bool("isreplicated")
    }

    pub fn estimated_tuple_count(&self) -> i64 {
        self.node.get_int("estimatedtuplecount")
    }

    pub fn columns(&self) -> impl Iterator<Item = Column<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("columns")
            .iter()
            .map(move |n| Column::new(catalog, n))
    }

    pub fn column(&self, name: &str) -> Option<Column<'a>> {
        self.node
            .child("columns", name)
            .map(|n| Column::new(self.catalog, n))
    }

    pub fn column_ignore_case(&self, name: &str) -> Option<Column<'a>> {
        self.node
            .child_ignore_case("columns", name)
            .map(|n| Column::new(self.catalog, n))
    }

    pub fn partition_column(&self) -> Option<Column<'a>> {
        self.node
            .field("partitioncolumn")
            .and_then(|v| self.catalog.resolve(v))
            .map(|n| Column::new(self.catalog, n))
    }

    /// Source table when this table is a materialized view destination
    pub fn materializer(&self) -> Option<Table<'a>> {
        self.node
            .field("materializer")
            .and_then(|v| self.catalog.resolve(v))
            .map(|n| Table::new(self.catalog, n))
    }

    pub fn is_view(&self) -> bool {
        self.node.get_ref("materializer").is_some()
    }

    /// Views maintained from this table
    pub fn views(&self) -> impl Iterator<Item = MaterializedView<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("views")
            .iter()
            .map(move |n| MaterializedView::new(catalog, n))
    }

    pub fn is_view_source(&self) -> bool {
        !self.node.children("views").is_empty()
    }

    pub fn index_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.node.children("indexes").iter().map(|n| n.name())
    }
}

impl<'a> Column<'a> {
    pub fn index(&self) -> i64 {
        self.node.get_int("index")
    }

    pub fn type_name(&self) -> &'a str {
        self.node.get_str("type").unwrap_or("")
    }

    pub fn size(&self) -> i64 {
        self.node.get_int("size")
    }

    pub fn is_nullable(&self) -> bool {
        self.node.get_bool("nullable")
    }
}

impl<'a> MaterializedView<'a> {
    pub fn dest(&self) -> Option<Table<'a>> {
        self.node
            .field("dest")
            .and_then(|v| self.catalog.resolve(v))
            .map(|n| Table::new(self.catalog, n))
    }
}

impl<'a> Procedure<'a> {
    pub fn class_name(&self) -> Option<&'a str> {
        self.node.get_str("classname")
    }

    pub fn is_readonly(&self) -> bool {
        self.node.get_bool("readonly")
    }

    pub fn is_single_partition(&self) -> bool {
        self.node.get_bool("singlepartition")
    }

    pub fn is_every_site(&self) -> bool {
        self.node.get_bool("everysite")
    }

    pub fn is_system_procedure(&self) -> bool {
        self.node.get_bool("systemproc")
    }

    pub fn has_java(&self) -> bool {
        self.node.get_bool("hasjava")
    }

    pub fn statements(&self) -> impl Iterator<Item = Statement<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children("statements")
            .iter()
            .map(move |n| Statement::new(catalog, n))
    }

    pub fn auth_groups(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.node.children("authgroups").iter().map(|n| n.name())
    }

    pub fn parameter_count(&self) -> usize {
        self.node.children("parameters").len()
    }
}

impl<'a> Statement<'a> {
    pub fn sql_text(&self) -> &'a str {
        self.node.get_str("sqltext").unwrap_or("")
    }

    pub fn query_type(&self) -> &'a str {
        self.node.get_str("querytype").unwrap_or("")
    }

    pub fn cost(&self) -> i64 {
        self.node.get_int("cost")
    }

    pub fn is_readonly(&self) -> bool {
        self.node.get_bool("readonly")
    }

    /// Explain plan text, decoded from its hex-encoded catalog form
    pub fn explain_plan(&self) -> String {
        self.node
            .get_str("explainplan")
            .and_then(|h| hex::decode(h).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl<'a> Group<'a> {
    pub fn adhoc(&self) -> bool {
        self.node.get_bool("adhoc")
    }

    pub fn sysproc(&self) -> bool {
        self.node.get_bool("sysproc")
    }
}

impl<'a> Connector<'a> {
    pub fn is_enabled(&self) -> bool {
        self.node.get_bool("enabled")
    }

    pub fn loader_class(&self) -> Option<&'a str> {
        self.node.get_str("loaderclass")
    }

    pub fn auth_groups(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.node.children("authgroups").iter().map(|n| n.name())
    }

    /// `(table, append-only)` pairs configured for export
    pub fn tables(&self) -> impl Iterator<Item = (Table<'a>, bool)> + 'a {
        let catalog = self.catalog;
        self.node.children("tableinfo").iter().filter_map(move |info| {
            let table = info.field("table").and_then(|v| catalog.resolve(v))?;
            Some((Table::new(catalog, table), info.get_bool("appendonly")))
        })
    }
}
