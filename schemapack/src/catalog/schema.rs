// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fixed node schemas of the catalog tree
//!
//! Every node kind declares an ordered list of typed fields and an ordered
//! list of child collections. Field and collection order is the order used by
//! canonical serialization.

use super::operations::FieldValue;
use std::fmt;

/// Type of a catalog field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Str,
    Ref,
}

impl FieldType {
    /// Value a freshly added node starts with
    pub fn default_value(self) -> FieldValue {
        match self {
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::Int => FieldValue::Int(0),
            FieldType::Str | FieldType::Ref => FieldValue::Null,
        }
    }

    /// Whether `value` may be stored in a field of this type
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldType::Bool, FieldValue::Bool(_))
                | (FieldType::Int, FieldValue::Int(_))
                | (FieldType::Str, FieldValue::Str(_))
                | (FieldType::Str, FieldValue::Null)
                | (FieldType::Ref, FieldValue::Ref(_))
                | (FieldType::Ref, FieldValue::Null)
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Str => "string",
            FieldType::Ref => "reference",
        };
        write!(f, "{}", s)
    }
}

/// Node kinds of the catalog tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Catalog,
    Cluster,
    Database,
    Table,
    Column,
    Index,
    ColumnRef,
    MaterializedViewInfo,
    Procedure,
    ProcParameter,
    Statement,
    Group,
    GroupRef,
    Connector,
    ConnectorTableInfo,
    SnapshotSchedule,
}

use FieldType::{Bool, Int, Ref, Str};

impl NodeKind {
    /// Ordered field schema
    pub fn fields(self) -> &'static [(&'static str, FieldType)] {
        match self {
            NodeKind::Catalog => &[],
            NodeKind::Cluster => &[("securityenabled", Bool), ("localepoch", Int)],
            NodeKind::Database => &[],
            NodeKind::Table => &[
                ("isreplicated", Bool),
                ("partitioncolumn", Ref),
                ("materializer", Ref),
                ("estimatedtuplecount", Int),
            ],
            NodeKind::Column => &[
                ("index", Int),
                ("type", Str),
                ("size", Int),
                ("nullable", Bool),
                ("defaultvalue", Str),
            ],
            NodeKind::Index => &[("unique", Bool), ("assumeunique", Bool)],
            NodeKind::ColumnRef => &[("index", Int), ("column", Ref)],
            NodeKind::MaterializedViewInfo => &[("dest", Ref), ("predicate", Str)],
            NodeKind::Procedure => &[
                ("classname", Str),
                ("readonly", Bool),
                ("singlepartition", Bool),
                ("everysite", Bool),
                ("systemproc", Bool),
                ("hasjava", Bool),
                ("partitiontable", Ref),
                ("partitioncolumn", Ref),
                ("partitionparameter", Int),
            ],
            NodeKind::ProcParameter => &[("index", Int), ("type", Str)],
            NodeKind::Statement => &[
                ("sqltext", Str),
                ("querytype", Str),
                ("readonly", Bool),
                ("singlepartition", Bool),
                ("replicatedtabledml", Bool),
                ("cost", Int),
                ("explainplan", Str),
            ],
            NodeKind::Group => &[("adhoc", Bool), ("sysproc", Bool)],
            NodeKind::GroupRef => &[("group", Ref)],
            NodeKind::Connector => &[("loaderclass", Str), ("enabled", Bool)],
            NodeKind::ConnectorTableInfo => &[("table", Ref), ("appendonly", Bool)],
            NodeKind::SnapshotSchedule => &[
                ("frequencyunit", Str),
                ("frequencyvalue", Int),
                ("retain", Int),
                ("path", Str),
                ("prefix", Str),
            ],
        }
    }

    /// Ordered child collections
    pub fn collections(self) -> &'static [(&'static str, NodeKind)] {
        match self {
            NodeKind::Catalog => &[("clusters", NodeKind::Cluster)],
            NodeKind::Cluster => &[("databases", NodeKind::Database)],
            NodeKind::Database => &[
                ("tables", NodeKind::Table),
                ("procedures", NodeKind::Procedure),
                ("groups", NodeKind::Group),
                ("connectors", NodeKind::Connector),
                ("snapshotschedule", NodeKind::SnapshotSchedule),
            ],
            NodeKind::Table => &[
                ("columns", NodeKind::Column),
                ("indexes", NodeKind::Index),
                ("views", NodeKind::MaterializedViewInfo),
            ],
            NodeKind::Index => &[("columns", NodeKind::ColumnRef)],
            NodeKind::MaterializedViewInfo => &[("groupbycols", NodeKind::ColumnRef)],
            NodeKind::Procedure => &[
                ("authgroups", NodeKind::GroupRef),
                ("statements", NodeKind::Statement),
                ("parameters", NodeKind::ProcParameter),
            ],
            NodeKind::Connector => &[
                ("authgroups", NodeKind::GroupRef),
                ("tableinfo", NodeKind::ConnectorTableInfo),
            ],
            NodeKind::Column
            | NodeKind::ColumnRef
            | NodeKind::ProcParameter
            | NodeKind::Statement
            | NodeKind::Group
            | NodeKind::GroupRef
            | NodeKind::ConnectorTableInfo
            | NodeKind::SnapshotSchedule => &[],
        }
    }

    pub fn field_index(self, field: &str) -> Option<usize> {
        self.fields().iter().position(|(name, _)| *name == field)
    }

    pub fn collection_index(self, collection: &str) -> Option<usize> {
        self.collections()
            .iter()
            .position(|(name, _)| *name == collection)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Catalog => "catalog",
            NodeKind::Cluster => "cluster",
            NodeKind::Database => "database",
            NodeKind::Table => "table",
            NodeKind::Column => "column",
            NodeKind::Index => "index",
            NodeKind::ColumnRef => "column_ref",
            NodeKind::MaterializedViewInfo => "materialized_view_info",
            NodeKind::Procedure => "procedure",
            NodeKind::ProcParameter => "proc_parameter",
            NodeKind::Statement => "statement",
            NodeKind::Group => "group",
            NodeKind::GroupRef => "group_ref",
            NodeKind::Connector => "connector",
            NodeKind::ConnectorTableInfo => "connector_table_info",
            NodeKind::SnapshotSchedule => "snapshot_schedule",
        };
        write!(f, "{}", s)
    }
}
