// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-built catalog tree
//!
//! The catalog is a rooted, typed tree addressed by paths such as
//! `/clusters[cluster]/databases[database]/tables[T]`. It is mutated only by
//! applying [`CatalogCommand`]s, and every applied command is appended to the
//! mutation log, so replaying the log from an empty catalog reproduces the
//! same tree.
//!
//! [`Catalog::serialize`] emits fields in schema order and children sorted by
//! name. Parsing that text into a fresh catalog therefore yields a tree whose
//! collections iterate in sorted order; this is the canonicalization step the
//! compiler performs before seeding system procedures.

pub mod entities;
pub mod error;
pub mod node;
pub mod operations;
pub mod schema;
pub mod system_procedures;

pub use entities::{
    Column, Connector, Database, Group, MaterializedView, Procedure, Statement, Table,
};
pub use error::{CatalogError, CatalogResult};
pub use node::CatalogNode;
pub use operations::{CatalogCommand, FieldValue};
pub use schema::{FieldType, NodeKind};

use std::fmt::Write;

/// Name of the only cluster node
pub const CLUSTER_NAME: &str = "cluster";

/// Name every database element must carry
pub const DATABASE_NAME: &str = "database";

/// Path of the cluster node
pub const CLUSTER_PATH: &str = "/clusters[cluster]";

/// Path of the database node
pub const DATABASE_PATH: &str = "/clusters[cluster]/databases[database]";

/// Catalog tree plus the mutation log it was built from
#[derive(Debug, Clone)]
pub struct Catalog {
    root: CatalogNode,
    log: Vec<CatalogCommand>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            root: CatalogNode::root(),
            log: Vec::new(),
        }
    }

    /// Apply a single command; the command is logged only if it succeeds
    pub fn apply(&mut self, command: CatalogCommand) -> CatalogResult<()> {
        match &command {
            CatalogCommand::Add {
                parent,
                collection,
                name,
            } => {
                self.node_mut(parent)?.add_child(collection, name)?;
            }
            CatalogCommand::Set { path, field, value } => {
                if let FieldValue::Ref(target) = value {
                    validate_ref(target)?;
                }
                self.node_mut(path)?.set_field(field, value.clone())?;
            }
        }
        self.log.push(command);
        Ok(())
    }

    /// Apply newline-separated command text; blank lines are ignored
    pub fn execute(&mut self, text: &str) -> CatalogResult<()> {
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let command = CatalogCommand::parse_line(line, i + 1)?;
            self.apply(command).map_err(|e| e.at_line(i + 1))?;
        }
        Ok(())
    }

    /// Add a child node, returning its path
    pub fn add(&mut self, parent: &str, collection: &str, name: &str) -> CatalogResult<String> {
        self.apply(CatalogCommand::add(parent, collection, name))?;
        Ok(node::child_path(parent, collection, name))
    }

    pub fn set<V: Into<FieldValue>>(
        &mut self,
        path: &str,
        field: &str,
        value: V,
    ) -> CatalogResult<()> {
        self.apply(CatalogCommand::set(path, field, value))
    }

    /// Point a reference field at another node
    pub fn set_ref(&mut self, path: &str, field: &str, target: &str) -> CatalogResult<()> {
        self.apply(CatalogCommand::set(
            path,
            field,
            FieldValue::Ref(target.to_string()),
        ))
    }

    /// Canonical text form of the tree
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        write_node(&self.root, &mut out);
        out
    }

    /// Build a fresh catalog from command text
    pub fn parse(text: &str) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        catalog.execute(text)?;
        Ok(catalog)
    }

    /// Build a fresh catalog by re-applying a mutation log
    pub fn replay(commands: &[CatalogCommand]) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for command in commands {
            catalog.apply(command.clone())?;
        }
        Ok(catalog)
    }

    /// Serialize and reparse, producing name-sorted collection order
    pub fn canonicalize(&self) -> CatalogResult<Self> {
        Self::parse(&self.serialize())
    }

    /// Commands applied so far, in order
    pub fn commands(&self) -> &[CatalogCommand] {
        &self.log
    }

    pub fn root(&self) -> &CatalogNode {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&CatalogNode> {
        let segments = node::split_path(path).ok()?;
        let mut current = &self.root;
        for (collection, name) in segments {
            current = current.child(collection, name)?;
        }
        Some(current)
    }

    /// Follow a reference field value
    pub fn resolve(&self, value: &FieldValue) -> Option<&CatalogNode> {
        value.as_ref_path().and_then(|p| self.get(p))
    }

    pub fn cluster(&self) -> Option<&CatalogNode> {
        self.get(CLUSTER_PATH)
    }

    pub fn database(&self) -> Option<Database<'_>> {
        self.get(DATABASE_PATH)
            .map(|node| Database::new(self, node))
    }

    fn node_mut(&mut self, path: &str) -> CatalogResult<&mut CatalogNode> {
        let segments = node::split_path(path)?;
        let mut current = &mut self.root;
        for (collection, name) in segments {
            current = current
                .child_mut(collection, name)
                .ok_or_else(|| CatalogError::PathNotFound(path.to_string()))?;
        }
        Ok(current)
    }
}

/// Reference targets are written bare, so they must read back as a path
fn validate_ref(target: &str) -> CatalogResult<()> {
    for (collection, name) in node::split_path(target)? {
        node::validate_name(collection)?;
        node::validate_name(name)?;
    }
    Ok(())
}

fn write_node(node: &CatalogNode, out: &mut String) {
    for (field, value) in node.fields() {
        let _ = writeln!(out, "set {} {} {}", node.path(), field, value);
    }
    for (collection, children) in node.collections() {
        let mut sorted: Vec<&CatalogNode> = children.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        for child in sorted {
            let _ = writeln!(out, "add {} {} {}", node.path(), collection, child.name());
            write_node(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("/", "clusters", CLUSTER_NAME).unwrap();
        catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME).unwrap();
        let t = catalog.add(DATABASE_PATH, "tables", "ZETA").unwrap();
        catalog.set(&t, "isreplicated", true).unwrap();
        let a = catalog.add(DATABASE_PATH, "tables", "ALPHA").unwrap();
        let c = catalog.add(&a, "columns", "ID").unwrap();
        catalog.set(&c, "type", "INTEGER").unwrap();
        catalog.set_ref(&a, "partitioncolumn", &c).unwrap();
        catalog
    }

    #[test]
    fn test_add_and_lookup() {
        let catalog = sample();
        let db = catalog.database().expect("database exists");
        assert_eq!(db.tables().count(), 2);
        let alpha = db.table("ALPHA").unwrap();
        assert_eq!(alpha.partition_column().unwrap().name(), "ID");
        assert!(db.table_ignore_case("alpha").is_some());
    }

    #[test]
    fn test_structural_errors() {
        let mut catalog = sample();
        assert!(matches!(
            catalog.add("/clusters[nope]", "databases", "x"),
            Err(CatalogError::PathNotFound(_))
        ));
        assert!(matches!(
            catalog.add(DATABASE_PATH, "widgets", "x"),
            Err(CatalogError::UnknownCollection { .. })
        ));
        assert!(matches!(
            catalog.set(CLUSTER_PATH, "color", "red"),
            Err(CatalogError::UnknownField { .. })
        ));
        assert!(matches!(
            catalog.set(CLUSTER_PATH, "securityenabled", 3i64),
            Err(CatalogError::TypeMismatch { .. })
        ));
        assert!(matches!(
            catalog.add(DATABASE_PATH, "tables", "ALPHA"),
            Err(CatalogError::DuplicateEntry(_))
        ));
    }

    #[test]
    fn test_failed_commands_are_not_logged() {
        let mut catalog = sample();
        let before = catalog.commands().len();
        let _ = catalog.set(CLUSTER_PATH, "color", "red");
        assert_eq!(catalog.commands().len(), before);
    }

    #[test]
    fn test_replay_reproduces_tree() {
        let catalog = sample();
        let replayed = Catalog::replay(catalog.commands()).unwrap();
        assert_eq!(replayed.root(), catalog.root());
    }

    #[test]
    fn test_canonicalize_sorts_collections() {
        let catalog = sample();
        let names: Vec<_> = catalog
            .database()
            .unwrap()
            .tables()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["ZETA", "ALPHA"]);

        let canonical = catalog.canonicalize().unwrap();
        let names: Vec<_> = canonical
            .database()
            .unwrap()
            .tables()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["ALPHA", "ZETA"]);
        assert_eq!(canonical.serialize(), catalog.serialize());
    }

    #[test]
    fn test_execute_reports_line_of_failure() {
        let mut catalog = Catalog::new();
        let err = catalog
            .execute("add / clusters cluster\n\nadd /clusters[x] databases database\n")
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedCommand { line: 3, .. }));
    }

    #[test]
    fn test_reference_must_be_a_path() {
        let mut catalog = sample();
        let table = node::child_path(DATABASE_PATH, "tables", "ZETA");
        let before = catalog.commands().len();

        for target in ["columns[ID]", "/tables[A B]", "/tables[]", ""] {
            let err = catalog
                .set_ref(&table, "partitioncolumn", target)
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    CatalogError::MalformedPath(_) | CatalogError::InvalidName(_)
                ),
                "{}: {:?}",
                target,
                err
            );
        }
        assert_eq!(catalog.commands().len(), before);

        let reparsed = Catalog::parse(&catalog.serialize()).unwrap();
        assert_eq!(reparsed.serialize(), catalog.serialize());
    }
}
