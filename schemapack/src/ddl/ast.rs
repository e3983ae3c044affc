// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Statement nodes for the DDL subset understood by the built-in compiler

/// A parsed DDL statement with the 1-based line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub line: u32,
    pub node: T,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    CreateView(CreateView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
    pub size: Option<i64>,
    pub not_null: bool,
    pub default: Option<Literal>,
    pub primary_key: bool,
    pub unique: Option<Uniqueness>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    Unique,
    AssumeUnique,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        kind: Uniqueness,
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Number(String),
    Text(String),
}

impl Literal {
    /// Text stored as a column default; `None` for NULL
    pub fn default_text(&self) -> Option<String> {
        match self {
            Literal::Null => None,
            Literal::Number(n) => Some(n.clone()),
            Literal::Text(t) => Some(t.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: Option<Uniqueness>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub name: String,
    pub column_names: Vec<String>,
    pub items: Vec<SelectItem>,
    pub source: String,
    pub predicate: Option<String>,
    pub group_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: SelectExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectExpr {
    Column(String),
    CountStar,
    Aggregate { function: Aggregate, column: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}
