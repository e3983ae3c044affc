// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lightweight SQL statement analysis and explain plans
//!
//! Statements are not fully parsed: the query type comes from the leading
//! keyword, table references from the FROM/JOIN/INTO/UPDATE clauses and
//! parameter columns from `column <op> ?` comparisons and INSERT column
//! lists.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static FROM_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\bFROM\s+(.+?)(?:\bWHERE\b|\bGROUP\b|\bORDER\b|\bLIMIT\b|\bHAVING\b|\b(?:INNER\s+|LEFT\s+|RIGHT\s+|OUTER\s+|CROSS\s+)*JOIN\b|;|$)",
    )
    .expect("FROM clause pattern is valid")
});

static JOIN_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bJOIN\s+([A-Za-z_][A-Za-z0-9_]*)").expect("JOIN pattern is valid")
});

static DML_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(?:INSERT\s+INTO|UPDATE|DELETE\s+FROM)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("DML target pattern is valid")
});

static INSERT_COLUMNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*INSERT\s+INTO\s+[A-Za-z_][A-Za-z0-9_]*\s*(?:\(([^)]*)\))?\s*VALUES\s*\((.*)\)\s*;?\s*$")
        .expect("INSERT pattern is valid")
});

static COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:([A-Za-z_][A-Za-z0-9_]*)\.)?([A-Za-z_][A-Za-z0-9_]*)\s*(?:=|<>|!=|<=|>=|<|>)\s*\?")
        .expect("comparison pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
        }
    }

    pub fn is_read_only(self) -> bool {
        self == QueryType::Select
    }

    fn from_sql(sql: &str) -> Option<Self> {
        let keyword = sql
            .trim_start()
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()?
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" => Some(QueryType::Select),
            "INSERT" => Some(QueryType::Insert),
            "UPDATE" => Some(QueryType::Update),
            "DELETE" => Some(QueryType::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a `?` placeholder is bound to, when it can be told
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Compared with or assigned to a named column
    Column { table: Option<String>, column: String },
    /// Positional INSERT value without a column list
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAnalysis {
    pub query_type: QueryType,
    /// Upper-case table names in order of appearance; the first is the DML target
    pub tables: Vec<String>,
    /// One entry per `?` placeholder
    pub parameters: Vec<Option<ParamBinding>>,
}

impl StatementAnalysis {
    pub fn target(&self) -> Option<&str> {
        match self.query_type {
            QueryType::Select => None,
            _ => self.tables.first().map(String::as_str),
        }
    }
}

pub fn analyze(sql: &str) -> Result<StatementAnalysis, String> {
    let query_type = QueryType::from_sql(sql).ok_or_else(|| {
        let head: String = sql.trim().chars().take(20).collect();
        format!("Unsupported statement type: '{}'", head)
    })?;

    let masked = mask_literals(sql);
    let mut tables: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = name.to_ascii_uppercase();
        if !tables.contains(&name) {
            tables.push(name);
        }
    };

    if let Some(caps) = DML_TARGET.captures(&masked) {
        push(&caps[1]);
    }
    if query_type != QueryType::Insert {
        if let Some(caps) = FROM_CLAUSE.captures(&masked) {
            for item in caps[1].split(',') {
                if let Some(name) = item.split_whitespace().next() {
                    push(name.trim_matches(|c: char| c == '(' || c == ')'));
                }
            }
        }
        for caps in JOIN_TABLE.captures_iter(&masked) {
            push(&caps[1]);
        }
    }
    if tables.is_empty() {
        return Err("Statement does not reference any table".to_string());
    }

    let parameters = bind_parameters(&masked, query_type);
    Ok(StatementAnalysis {
        query_type,
        tables,
        parameters,
    })
}

/// Blank out string literals so their contents never match a pattern
fn mask_literals(sql: &str) -> String {
    let mut in_quote = false;
    sql.chars()
        .map(|c| {
            if c == '\'' {
                in_quote = !in_quote;
                c
            } else if in_quote {
                ' '
            } else {
                c
            }
        })
        .collect()
}

fn placeholder_offsets(masked: &str) -> Vec<usize> {
    masked
        .char_indices()
        .filter(|(_, c)| *c == '?')
        .map(|(i, _)| i)
        .collect()
}

fn bind_parameters(masked: &str, query_type: QueryType) -> Vec<Option<ParamBinding>> {
    let offsets = placeholder_offsets(masked);
    let mut bindings: Vec<Option<ParamBinding>> = vec![None; offsets.len()];
    let index_of = |end: usize| offsets.iter().position(|&o| o + 1 == end);

    if query_type == QueryType::Insert {
        if let Some(caps) = INSERT_COLUMNS.captures(masked) {
            let columns: Option<Vec<&str>> = caps
                .get(1)
                .map(|m| m.as_str().split(',').map(str::trim).collect());
            let values = caps.get(2).map_or("", |m| m.as_str());
            let mut param = 0;
            for (position, value) in values.split(',').map(str::trim).enumerate() {
                if value != "?" || param >= bindings.len() {
                    continue;
                }
                bindings[param] = Some(match &columns {
                    Some(cols) => match cols.get(position) {
                        Some(column) => ParamBinding::Column {
                            table: None,
                            column: column.to_ascii_uppercase(),
                        },
                        None => ParamBinding::Position(position),
                    },
                    None => ParamBinding::Position(position),
                });
                param += 1;
            }
        }
    }

    for caps in COMPARISON.captures_iter(masked) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(index) = index_of(whole.end()) {
            bindings[index].get_or_insert(ParamBinding::Column {
                table: caps.get(1).map(|m| m.as_str().to_ascii_uppercase()),
                column: caps[2].to_ascii_uppercase(),
            });
        }
    }
    bindings
}

/// A table scanned by a statement, with the facts the planner needs
#[derive(Debug, Clone)]
pub struct TableScan {
    pub name: String,
    pub replicated: bool,
    pub tuples: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub cost: i64,
    pub explain: String,
}

/// Build the explain text and cost estimate for an analysed statement
pub fn plan(analysis: &StatementAnalysis, scans: &[TableScan], single_partition: bool) -> Plan {
    let mut ops: Vec<(usize, String)> = vec![(0, "RETURN RESULTS TO STORED PROCEDURE".to_string())];
    let distributed = !single_partition && scans.iter().any(|s| !s.replicated);
    let target = analysis.tables.first().map(String::as_str).unwrap_or_default();
    let mut depth = 1;

    if distributed {
        ops.push((depth, "RECEIVE FROM ALL PARTITIONS".to_string()));
        depth += 1;
        ops.push((depth, "SEND PARTITION RESULTS TO COORDINATOR".to_string()));
        depth += 1;
    }

    let cost = match analysis.query_type {
        QueryType::Select => {
            if scans.len() > 1 {
                ops.push((depth, "NESTLOOP JOIN".to_string()));
                depth += 1;
            }
            for scan in scans {
                ops.push((
                    depth,
                    format!("SEQUENTIAL SCAN of \"{}\" ({} tuples)", scan.name, scan.tuples),
                ));
            }
            scans.iter().map(|s| s.tuples).sum()
        }
        QueryType::Insert => {
            ops.push((depth, format!("INSERT into \"{}\"", target)));
            ops.push((
                depth + 1,
                "MATERIALIZE TUPLE from parameters and/or literals".to_string(),
            ));
            1
        }
        QueryType::Update | QueryType::Delete => {
            ops.push((depth, format!("{} \"{}\"", analysis.query_type, target)));
            for scan in scans {
                ops.push((depth + 1, format!("SEQUENTIAL SCAN of \"{}\"", scan.name)));
            }
            1
        }
    };

    let explain = ops
        .into_iter()
        .map(|(depth, op)| format!("{}{}", "  ".repeat(depth), op))
        .collect::<Vec<_>>()
        .join("\n");
    Plan { cost, explain }
}
