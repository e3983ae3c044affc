// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure descriptors built from `<procedure>` elements

use super::error::{ProjectError, ProjectResult};
use super::model::ProcedureElement;
use serde::{Deserialize, Serialize};

/// One procedure to compile; the shape decides the compilation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcedureDescriptor {
    /// Compiled procedure class; partition info comes from its registration
    Class {
        groups: Vec<String>,
        class_name: String,
    },

    /// Single inline SQL statement
    Statement {
        groups: Vec<String>,
        class_name: String,
        sql: String,
        join_order: Option<String>,
        /// `None` means multi-partition
        partition: Option<String>,
    },
}

impl ProcedureDescriptor {
    pub fn from_element(element: &ProcedureElement) -> ProjectResult<Self> {
        let groups = split_list(element.groups.as_deref()).0;
        let class_name = element.class.trim().to_string();

        match &element.sql {
            Some(sql) => {
                let partition = element
                    .partitioninfo
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                Ok(ProcedureDescriptor::Statement {
                    groups,
                    class_name,
                    sql: sql.text.trim().to_string(),
                    join_order: sql.joinorder.clone().filter(|j| !j.trim().is_empty()),
                    partition,
                })
            }
            None => {
                if element.partitioninfo.is_some() {
                    return Err(ProjectError::ClassProcedurePartitionInfo(class_name));
                }
                Ok(ProcedureDescriptor::Class { groups, class_name })
            }
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            ProcedureDescriptor::Class { class_name, .. }
            | ProcedureDescriptor::Statement { class_name, .. } => class_name,
        }
    }

    /// Procedure name: the class name without its package
    pub fn name(&self) -> &str {
        let class_name = self.class_name();
        class_name.rsplit('.').next().unwrap_or(class_name)
    }

    pub fn groups(&self) -> &[String] {
        match self {
            ProcedureDescriptor::Class { groups, .. }
            | ProcedureDescriptor::Statement { groups, .. } => groups,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, ProcedureDescriptor::Statement { .. })
    }
}

/// Split a comma separated attribute, returning the non-blank trimmed
/// entries and the number of blank entries skipped
pub fn split_list(value: Option<&str>) -> (Vec<String>, usize) {
    let Some(value) = value else {
        return (Vec::new(), 0);
    };
    if value.trim().is_empty() {
        return (Vec::new(), 0);
    }

    let mut names = Vec::new();
    let mut blanks = 0;
    for entry in value.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            blanks += 1;
        } else {
            names.push(entry.to_string());
        }
    }
    (names, blanks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::model::SqlElement;

    fn element(class: &str, groups: Option<&str>, part: Option<&str>, sql: Option<&str>) -> ProcedureElement {
        ProcedureElement {
            class: class.to_string(),
            groups: groups.map(str::to_string),
            partitioninfo: part.map(str::to_string),
            sql: sql.map(|s| SqlElement {
                joinorder: None,
                text: s.to_string(),
            }),
        }
    }

    #[test]
    fn test_statement_procedure() {
        let proc = ProcedureDescriptor::from_element(&element(
            "com.example.GetT",
            Some("ops, admin"),
            Some(""),
            Some("  SELECT * FROM T  "),
        ))
        .unwrap();
        assert_eq!(proc.name(), "GetT");
        assert_eq!(proc.groups(), &["ops".to_string(), "admin".to_string()]);
        match proc {
            ProcedureDescriptor::Statement { sql, partition, .. } => {
                assert_eq!(sql, "SELECT * FROM T");
                assert_eq!(partition, None);
            }
            other => panic!("unexpected descriptor {:?}", other),
        }
    }

    #[test]
    fn test_class_procedure_rejects_partition_info() {
        let err = ProcedureDescriptor::from_element(&element(
            "com.example.Insert",
            None,
            Some("T.ID: 0"),
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, ProjectError::ClassProcedurePartitionInfo(_)));

        let proc =
            ProcedureDescriptor::from_element(&element("com.example.Insert", None, None, None))
                .unwrap();
        assert!(!proc.is_statement());
    }

    #[test]
    fn test_split_list_counts_blanks() {
        assert_eq!(split_list(None), (vec![], 0));
        assert_eq!(split_list(Some("")), (vec![], 0));
        assert_eq!(
            split_list(Some("a,,b, ")),
            (vec!["a".to_string(), "b".to_string()], 2)
        );
    }
}
