// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Materialized catalog nodes and path addressing

use super::error::{CatalogError, CatalogResult};
use super::operations::FieldValue;
use super::schema::NodeKind;

/// One node of the materialized catalog tree
///
/// Field values are stored parallel to `kind.fields()`, child collections
/// parallel to `kind.collections()`. Children keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogNode {
    kind: NodeKind,
    name: String,
    path: String,
    fields: Vec<FieldValue>,
    collections: Vec<Vec<CatalogNode>>,
}

impl CatalogNode {
    pub(crate) fn new(kind: NodeKind, name: &str, path: String) -> Self {
        Self {
            kind,
            name: name.to_string(),
            path,
            fields: kind.fields().iter().map(|(_, t)| t.default_value()).collect(),
            collections: kind.collections().iter().map(|_| Vec::new()).collect(),
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(NodeKind::Catalog, "", "/".to_string())
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        self.kind.field_index(field).map(|i| &self.fields[i])
    }

    /// Fields in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.kind
            .fields()
            .iter()
            .map(|(name, _)| *name)
            .zip(self.fields.iter())
    }

    pub fn get_bool(&self, field: &str) -> bool {
        self.field(field).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    pub fn get_int(&self, field: &str) -> i64 {
        self.field(field).and_then(FieldValue::as_int).unwrap_or(0)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.field(field).and_then(FieldValue::as_str)
    }

    pub fn get_ref(&self, field: &str) -> Option<&str> {
        self.field(field).and_then(FieldValue::as_ref_path)
    }

    /// Children of `collection` in storage order; unknown collections are empty
    pub fn children(&self, collection: &str) -> &[CatalogNode] {
        self.kind
            .collection_index(collection)
            .map(|i| self.collections[i].as_slice())
            .unwrap_or(&[])
    }

    pub fn child(&self, collection: &str, name: &str) -> Option<&CatalogNode> {
        self.children(collection).iter().find(|c| c.name == name)
    }

    pub fn child_ignore_case(&self, collection: &str, name: &str) -> Option<&CatalogNode> {
        self.children(collection)
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Collections in schema order, each with its children
    pub(crate) fn collections(&self) -> impl Iterator<Item = (&'static str, &Vec<CatalogNode>)> {
        self.kind
            .collections()
            .iter()
            .map(|(name, _)| *name)
            .zip(self.collections.iter())
    }

    pub(crate) fn set_field(&mut self, field: &str, value: FieldValue) -> CatalogResult<()> {
        let index = self
            .kind
            .field_index(field)
            .ok_or_else(|| CatalogError::UnknownField {
                path: self.path.clone(),
                field: field.to_string(),
            })?;
        let expected = self.kind.fields()[index].1;
        if !expected.accepts(&value) {
            return Err(CatalogError::TypeMismatch {
                path: self.path.clone(),
                field: field.to_string(),
                expected: expected.to_string(),
                got: value.type_name().to_string(),
            });
        }
        self.fields[index] = value;
        Ok(())
    }

    pub(crate) fn add_child(&mut self, collection: &str, name: &str) -> CatalogResult<String> {
        validate_name(name)?;
        let index = self
            .kind
            .collection_index(collection)
            .ok_or_else(|| CatalogError::UnknownCollection {
                path: self.path.clone(),
                collection: collection.to_string(),
            })?;
        let child_kind = self.kind.collections()[index].1;
        let path = child_path(&self.path, collection, name);

        if self.collections[index].iter().any(|c| c.name == name) {
            return Err(CatalogError::DuplicateEntry(path));
        }

        self.collections[index].push(CatalogNode::new(child_kind, name, path.clone()));
        Ok(path)
    }

    pub(crate) fn child_mut(&mut self, collection: &str, name: &str) -> Option<&mut CatalogNode> {
        let index = self.kind.collection_index(collection)?;
        self.collections[index].iter_mut().find(|c| c.name == name)
    }
}

/// Build the path of a child node
pub fn child_path(parent: &str, collection: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}[{}]", collection, name)
    } else {
        format!("{}/{}[{}]", parent, collection, name)
    }
}

/// Split an absolute path into `(collection, name)` segments
pub fn split_path(path: &str) -> CatalogResult<Vec<(&str, &str)>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| CatalogError::MalformedPath(path.to_string()))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    rest.split('/')
        .map(|segment| {
            segment
                .strip_suffix(']')
                .and_then(|s| s.split_once('['))
                .filter(|(collection, name)| !collection.is_empty() && !name.is_empty())
                .ok_or_else(|| CatalogError::MalformedPath(path.to_string()))
        })
        .collect()
}

/// Names become path segments, so they must not contain path syntax
pub fn validate_name(name: &str) -> CatalogResult<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '[' | ']' | '/' | '"'));
    if invalid {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert!(split_path("/").unwrap().is_empty());
        assert_eq!(
            split_path("/clusters[cluster]/databases[database]").unwrap(),
            vec![("clusters", "cluster"), ("databases", "database")]
        );
        assert!(split_path("clusters[cluster]").is_err());
        assert!(split_path("/clusters[]").is_err());
        assert!(split_path("/clusters").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("@AdHoc").is_ok());
        assert!(validate_name("Outer$Inner").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("x[1]").is_err());
    }
}
