// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compile summaries printed by the command line front end

use crate::catalog::Catalog;
use crate::diagnostics::Feedback;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

const RULE: &str = "------------------------------------------";

/// Longest SQL text printed per statement before it is cut
pub const SQL_PREVIEW_CHARS: usize = 80;

/// Outcome of one compile in a serializable form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileSummary {
    pub success: bool,
    pub output: Option<String>,
    pub schemas: Vec<String>,
    pub procedures: Vec<ProcedureSummary>,
    pub feedback: Vec<Feedback>,
}

/// One user procedure of a compiled catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureSummary {
    pub name: String,
    pub single_partition: bool,
    pub readonly: bool,
    pub statements: Vec<String>,
}

impl ProcedureSummary {
    /// Every non-system procedure of `catalog`, in catalog order
    pub fn collect(catalog: &Catalog) -> Vec<Self> {
        let Some(db) = catalog.database() else {
            return Vec::new();
        };
        db.procedures()
            .filter(|p| !p.is_system_procedure())
            .map(|p| ProcedureSummary {
                name: p.name().to_string(),
                single_partition: p.is_single_partition(),
                readonly: p.is_readonly(),
                statements: p.statements().map(|s| s.sql_text().to_string()).collect(),
            })
            .collect()
    }

    /// `SP` or `MP`
    pub fn scope(&self) -> &'static str {
        if self.single_partition {
            "SP"
        } else {
            "MP"
        }
    }

    /// `RO` or `RW`
    pub fn access(&self) -> &'static str {
        if self.readonly {
            "RO"
        } else {
            "RW"
        }
    }
}

impl CompileSummary {
    pub fn write_success<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", RULE)?;
        if let Some(output) = &self.output {
            writeln!(out, "Successfully created {}", output)?;
        }
        for schema in &self.schemas {
            writeln!(out, "Includes schema: {}", schema)?;
        }
        writeln!(out)?;

        for procedure in &self.procedures {
            writeln!(
                out,
                "[{}][{}] {}",
                procedure.scope(),
                procedure.access(),
                procedure.name
            )?;
            for sql in &procedure.statements {
                writeln!(out, "  {}", sql_preview(sql))?;
            }
            writeln!(out)?;
        }

        writeln!(out, "{}", RULE)
    }

    pub fn write_failure<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", RULE)?;
        writeln!(out, "Project compilation failed. See log for errors.")?;
        writeln!(out, "{}", RULE)
    }
}

/// SQL text as written, cut to [`SQL_PREVIEW_CHARS`] characters
pub fn sql_preview(sql: &str) -> String {
    if sql.chars().count() > SQL_PREVIEW_CHARS {
        let cut: String = sql.chars().take(SQL_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        sql.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_preview_truncates() {
        assert_eq!(sql_preview("SELECT *\n  FROM T"), "SELECT *\n  FROM T");
        let long = format!("SELECT {}  FROM T", "A,\n ".repeat(40));
        let preview = sql_preview(&long);
        assert_eq!(preview, format!("{}...", &long[..SQL_PREVIEW_CHARS]));
    }

    #[test]
    fn test_success_layout() {
        let summary = CompileSummary {
            success: true,
            output: Some("out.jar".to_string()),
            schemas: vec!["ddl.sql".to_string()],
            procedures: vec![ProcedureSummary {
                name: "GetT".to_string(),
                single_partition: false,
                readonly: true,
                statements: vec!["SELECT * FROM T".to_string()],
            }],
            feedback: Vec::new(),
        };
        let mut out = Vec::new();
        summary.write_success(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!(
                "{rule}\nSuccessfully created out.jar\nIncludes schema: ddl.sql\n\n\
                 [MP][RO] GetT\n  SELECT * FROM T\n\n{rule}\n",
                rule = RULE
            )
        );
    }

    #[test]
    fn test_failure_banner() {
        let mut out = Vec::new();
        CompileSummary::default().write_failure(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(
            text.lines().nth(1),
            Some("Project compilation failed. See log for errors.")
        );
    }
}
