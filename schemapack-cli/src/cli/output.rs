// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Report formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use schemapack::compiler::ProcedureSummary;
use schemapack::{Archive, Catalog, CompileSummary};
use serde::Serialize;
use std::io::{self, Write};

/// JSON rendering of compile summaries
pub struct SummaryFormatter;

impl SummaryFormatter {
    pub fn write_json<W: Write>(summary: &CompileSummary, out: &mut W) -> io::Result<()> {
        let text = serde_json::to_string_pretty(summary).unwrap_or_else(|_| {
            "{\"success\": false, \"error\": \"Could not serialize summary to JSON\"}".to_string()
        });
        writeln!(out, "{}", text)
    }
}

#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub path: String,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct TableRow {
    pub name: String,
    pub replicated: bool,
    pub partition_column: Option<String>,
    pub columns: usize,
    pub view_of: Option<String>,
}

/// Everything `inspect` shows about an archive
#[derive(Debug, Serialize)]
pub struct ArchiveReport {
    pub entries: Vec<EntryRow>,
    pub tables: Vec<TableRow>,
    pub procedures: Vec<ProcedureSummary>,
}

impl ArchiveReport {
    pub fn build(archive: &Archive, catalog: Option<&Catalog>) -> Self {
        let entries = archive
            .iter()
            .map(|(path, bytes)| EntryRow {
                path: path.to_string(),
                bytes: bytes.len(),
            })
            .collect();

        let tables = catalog
            .and_then(|c| c.database())
            .map(|db| {
                db.tables()
                    .map(|t| TableRow {
                        name: t.name().to_string(),
                        replicated: t.is_replicated(),
                        partition_column: t.partition_column().map(|c| c.name().to_string()),
                        columns: t.columns().count(),
                        view_of: t.materializer().map(|m| m.name().to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let procedures = catalog.map(ProcedureSummary::collect).unwrap_or_default();

        Self {
            entries,
            tables,
            procedures,
        }
    }

    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Archive Entries".bold().green()));
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Path").fg(Color::Green),
            Cell::new("Bytes").fg(Color::Green),
        ]);
        for entry in &self.entries {
            table.add_row(vec![entry.path.clone(), entry.bytes.to_string()]);
        }
        output.push_str(&table.to_string());
        output.push('\n');

        if self.tables.is_empty() {
            output.push_str(&format!("\n{}\n", "No tables found".yellow()));
        } else {
            output.push_str(&format!("\n{}\n", "Tables".bold().green()));
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Name").fg(Color::Green),
                Cell::new("Replicated").fg(Color::Green),
                Cell::new("Partition Column").fg(Color::Green),
                Cell::new("Columns").fg(Color::Green),
                Cell::new("View Of").fg(Color::Green),
            ]);
            for row in &self.tables {
                table.add_row(vec![
                    row.name.clone(),
                    row.replicated.to_string(),
                    row.partition_column.clone().unwrap_or_default(),
                    row.columns.to_string(),
                    row.view_of.clone().unwrap_or_default(),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
        }

        if !self.procedures.is_empty() {
            output.push_str(&format!("\n{}\n", "Procedures".bold().green()));
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Name").fg(Color::Green),
                Cell::new("Scope").fg(Color::Green),
                Cell::new("Access").fg(Color::Green),
                Cell::new("Statements").fg(Color::Green),
            ]);
            for procedure in &self.procedures {
                table.add_row(vec![
                    procedure.name.clone(),
                    procedure.scope().to_string(),
                    procedure.access().to_string(),
                    procedure.statements.len().to_string(),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_catalog() {
        let catalog = Catalog::parse(
            "add / clusters cluster\n\
             add /clusters[cluster] databases database\n\
             add /clusters[cluster]/databases[database] tables T\n\
             set /clusters[cluster]/databases[database]/tables[T] isreplicated true\n",
        )
        .unwrap();
        let mut archive = Archive::new();
        archive.put("catalog.txt", b"x".to_vec()).unwrap();

        let report = ArchiveReport::build(&archive, Some(&catalog));
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.tables[0].name, "T");
        assert!(report.tables[0].replicated);
        assert!(report.procedures.is_empty());
        assert!(report.to_text().contains("catalog.txt"));
    }
}
