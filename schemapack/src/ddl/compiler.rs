// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Built-in DDL compiler
//!
//! Schema sources are parsed when loaded and merged into the catalog's
//! database node on [`DdlCompiler::compile_to_catalog`]. Tables start out
//! replicated; partitioning is applied later by the compile driver.

use super::ast::*;
use super::error::{DdlError, DdlResult};
use super::parser::parse_ddl;
use super::DdlCompiler;
use crate::catalog::{Catalog, CatalogResult, DATABASE_PATH};

/// Column types accepted in table definitions, with their default sizes
const COLUMN_TYPES: &[(&str, i64)] = &[
    ("TINYINT", 1),
    ("SMALLINT", 2),
    ("INTEGER", 4),
    ("BIGINT", 8),
    ("FLOAT", 8),
    ("DECIMAL", 16),
    ("TIMESTAMP", 8),
    ("VARCHAR", 1),
    ("VARBINARY", 1),
];

fn normalize_type(name: &str) -> Option<(&'static str, i64)> {
    let name = match name {
        "INT" => "INTEGER",
        "DOUBLE" | "REAL" => "FLOAT",
        other => other,
    };
    COLUMN_TYPES.iter().find(|(t, _)| *t == name).copied()
}

fn is_integral(type_name: &str) -> bool {
    matches!(type_name, "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT")
}

#[derive(Debug)]
struct SchemaSource {
    file: String,
    statements: Vec<Located<DdlStatement>>,
}

/// nom-backed [`DdlCompiler`]
#[derive(Debug, Default)]
pub struct BuiltinDdlCompiler {
    pending: Vec<SchemaSource>,
}

impl BuiltinDdlCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loaded statements not yet merged into a catalog
    pub fn pending_statements(&self) -> usize {
        self.pending.iter().map(|s| s.statements.len()).sum()
    }
}

impl DdlCompiler for BuiltinDdlCompiler {
    fn load_schema(&mut self, file_name: &str, text: &str) -> DdlResult<()> {
        let statements = parse_ddl(text).map_err(|e| DdlError::Syntax {
            file: file_name.to_string(),
            line: e.line,
            message: e.message,
        })?;
        log::debug!(
            "Parsed {} DDL statements from {}",
            statements.len(),
            file_name
        );
        self.pending.push(SchemaSource {
            file: file_name.to_string(),
            statements,
        });
        Ok(())
    }

    fn compile_to_catalog(&mut self, catalog: &mut Catalog) -> DdlResult<()> {
        let sources = std::mem::take(&mut self.pending);
        for source in &sources {
            for statement in &source.statements {
                let mut ctx = StatementContext {
                    catalog: &mut *catalog,
                    loc: Location {
                        file: &source.file,
                        line: statement.line,
                    },
                };
                match &statement.node {
                    DdlStatement::CreateTable(table) => ctx.create_table(table)?,
                    DdlStatement::CreateIndex(index) => ctx.create_index(index)?,
                    DdlStatement::CreateView(view) => ctx.create_view(view)?,
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        self.pending.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Location<'a> {
    file: &'a str,
    line: u32,
}

impl Location<'_> {
    fn fail(&self, message: String) -> DdlError {
        DdlError::Semantic {
            file: self.file.to_string(),
            line: self.line,
            message,
        }
    }

    fn check<T>(&self, result: CatalogResult<T>) -> DdlResult<T> {
        result.map_err(|e| self.fail(e.to_string()))
    }
}

struct StatementContext<'a> {
    catalog: &'a mut Catalog,
    loc: Location<'a>,
}

#[derive(Debug, Clone)]
struct SourceColumn {
    path: String,
    type_name: String,
    size: i64,
    nullable: bool,
}

impl StatementContext<'_> {
    fn table_path(&self, name: &str) -> Option<String> {
        self.catalog
            .database()
            .and_then(|db| db.table(name))
            .map(|t| t.path().to_string())
    }

    fn source_column(&self, table: &str, column: &str) -> DdlResult<SourceColumn> {
        self.catalog
            .database()
            .and_then(|db| db.table(table))
            .and_then(|t| t.column(column))
            .map(|c| SourceColumn {
                path: c.path().to_string(),
                type_name: c.type_name().to_string(),
                size: c.size(),
                nullable: c.is_nullable(),
            })
            .ok_or_else(|| {
                self.loc.fail(format!("Column {} not found in table {}", column, table))
            })
    }

    fn create_table(&mut self, table: &CreateTable) -> DdlResult<()> {
        if self.table_path(&table.name).is_some() {
            return Err(self.loc.fail(format!("Table {} already exists", table.name)));
        }

        let mut primary_key: Option<(Option<String>, Vec<String>)> = None;
        let mut unique_keys: Vec<(Option<String>, Uniqueness, Vec<String>)> = Vec::new();

        for column in &table.columns {
            if column.primary_key {
                let columns = vec![column.name.clone()];
                self.set_primary_key(&mut primary_key, &table.name, None, columns)?;
            }
            if let Some(kind) = column.unique {
                unique_keys.push((None, kind, vec![column.name.clone()]));
            }
        }
        for constraint in &table.constraints {
            match constraint {
                TableConstraint::PrimaryKey { name, columns } => {
                    let (name, columns) = (name.clone(), columns.clone());
                    self.set_primary_key(&mut primary_key, &table.name, name, columns)?;
                }
                TableConstraint::Unique {
                    name,
                    kind,
                    columns,
                } => unique_keys.push((name.clone(), *kind, columns.clone())),
            }
        }

        let key_columns: Vec<&str> = primary_key
            .iter()
            .flat_map(|(_, cols)| cols.iter().map(String::as_str))
            .collect();

        let path = self.loc.check(self.catalog.add(DATABASE_PATH, "tables", &table.name))?;
        self.loc.check(self.catalog.set(&path, "isreplicated", true))?;

        for (index, column) in table.columns.iter().enumerate() {
            let (type_name, default_size) = normalize_type(&column.type_name).ok_or_else(|| {
                self.loc.fail(format!(
                    "Unsupported type {} for column {}.{}",
                    column.type_name, table.name, column.name
                ))
            })?;
            let nullable = !column.not_null && !key_columns.contains(&column.name.as_str());

            let column_path = self.loc.check(self.catalog.add(&path, "columns", &column.name))?;
            self.loc.check(self.catalog.set(&column_path, "index", index))?;
            self.loc.check(self.catalog.set(&column_path, "type", type_name))?;
            self.loc.check(self.catalog.set(
                &column_path,
                "size",
                column.size.unwrap_or(default_size),
            ))?;
            self.loc.check(self.catalog.set(&column_path, "nullable", nullable))?;
            if let Some(default) = column.default.as_ref().and_then(Literal::default_text) {
                self.loc.check(self.catalog.set(&column_path, "defaultvalue", default))?;
            }
        }

        if let Some((name, columns)) = primary_key {
            let name = name.unwrap_or_else(|| format!("SYS_IDX_PK_{}", table.name));
            self.add_index(&table.name, &name, &columns, Some(Uniqueness::Unique))?;
        }
        for (n, (name, kind, columns)) in unique_keys.into_iter().enumerate() {
            let name = name.unwrap_or_else(|| format!("SYS_IDX_UQ_{}_{}", table.name, n + 1));
            self.add_index(&table.name, &name, &columns, Some(kind))?;
        }
        Ok(())
    }

    fn set_primary_key(
        &self,
        slot: &mut Option<(Option<String>, Vec<String>)>,
        table: &str,
        name: Option<String>,
        columns: Vec<String>,
    ) -> DdlResult<()> {
        if slot.is_some() {
            return Err(self.loc.fail(format!("Table {} has more than one primary key", table)));
        }
        *slot = Some((name, columns));
        Ok(())
    }

    fn create_index(&mut self, index: &CreateIndex) -> DdlResult<()> {
        if self.table_path(&index.table).is_none() {
            return Err(self.loc.fail(format!(
                "Index {} refers to unknown table {}",
                index.name, index.table
            )));
        }
        self.add_index(&index.table, &index.name, &index.columns, index.unique)
    }

    fn add_index(
        &mut self,
        table: &str,
        name: &str,
        columns: &[String],
        unique: Option<Uniqueness>,
    ) -> DdlResult<()> {
        let table_path = self
            .table_path(table)
            .ok_or_else(|| self.loc.fail(format!("Table {} not found", table)))?;
        let resolved = columns
            .iter()
            .map(|c| self.source_column(table, c).map(|col| (c, col.path)))
            .collect::<DdlResult<Vec<_>>>()?;

        let index_path = self
            .catalog
            .add(&table_path, "indexes", name)
            .map_err(|_| self.loc.fail(format!("Index {} already exists on table {}", name, table)))?;
        self.loc.check(self.catalog.set(
            &index_path,
            "unique",
            unique == Some(Uniqueness::Unique),
        ))?;
        self.loc.check(self.catalog.set(
            &index_path,
            "assumeunique",
            unique == Some(Uniqueness::AssumeUnique),
        ))?;
        for (i, (column, column_path)) in resolved.into_iter().enumerate() {
            let ref_path = self.loc.check(self.catalog.add(&index_path, "columns", column))?;
            self.loc.check(self.catalog.set(&ref_path, "index", i))?;
            self.loc.check(self.catalog.set_ref(&ref_path, "column", &column_path))?;
        }
        Ok(())
    }

    fn create_view(&mut self, view: &CreateView) -> DdlResult<()> {
        let source_path = self.table_path(&view.source).ok_or_else(|| {
            self.loc.fail(format!(
                "Materialized view {} refers to unknown source table {}",
                view.name, view.source
            ))
        })?;
        if self.table_path(&view.name).is_some() {
            return Err(self.loc.fail(format!("Table {} already exists", view.name)));
        }
        if !view.column_names.is_empty() && view.column_names.len() != view.items.len() {
            return Err(self.loc.fail(format!(
                "Materialized view {} names {} columns but selects {}",
                view.name,
                view.column_names.len(),
                view.items.len()
            )));
        }
        if !view.items.iter().any(|i| i.expr == SelectExpr::CountStar) {
            return Err(self.loc.fail(format!(
                "Materialized view {} must include COUNT(*)",
                view.name
            )));
        }

        let group_by = view
            .group_by
            .iter()
            .map(|c| self.source_column(&view.source, c).map(|col| (c.clone(), col)))
            .collect::<DdlResult<Vec<_>>>()?;

        let mut dest_columns = Vec::with_capacity(view.items.len());
        for (i, item) in view.items.iter().enumerate() {
            let (default_name, type_name, size, nullable) = match &item.expr {
                SelectExpr::Column(column) => {
                    let (_, source) = group_by
                        .iter()
                        .find(|(name, _)| name == column)
                        .ok_or_else(|| {
                            self.loc.fail(format!(
                                "Column {} of materialized view {} must appear in GROUP BY",
                                column, view.name
                            ))
                        })?;
                    (column.clone(), source.type_name.clone(), source.size, source.nullable)
                }
                SelectExpr::CountStar => ("CNT".to_string(), "BIGINT".to_string(), 8, false),
                SelectExpr::Aggregate { function, column } => {
                    let source = self.source_column(&view.source, column)?;
                    let name = format!("{}_{}", function.as_str(), column);
                    match function {
                        Aggregate::Count => (name, "BIGINT".to_string(), 8, false),
                        Aggregate::Sum if is_integral(&source.type_name) => {
                            (name, "BIGINT".to_string(), 8, true)
                        }
                        _ => (name, source.type_name, source.size, true),
                    }
                }
            };
            let name = view
                .column_names
                .get(i)
                .or(item.alias.as_ref())
                .cloned()
                .unwrap_or(default_name);
            dest_columns.push((name, type_name, size, nullable));
        }

        let replicated = self
            .catalog
            .database()
            .and_then(|db| db.table(&view.source))
            .map(|t| t.is_replicated())
            .unwrap_or(true);

        let dest_path = self.loc.check(self.catalog.add(DATABASE_PATH, "tables", &view.name))?;
        self.loc.check(self.catalog.set(&dest_path, "isreplicated", replicated))?;
        self.loc.check(self.catalog.set_ref(&dest_path, "materializer", &source_path))?;
        for (index, (name, type_name, size, nullable)) in dest_columns.into_iter().enumerate() {
            let column_path = self
                .catalog
                .add(&dest_path, "columns", &name)
                .map_err(|_| {
                    self.loc.fail(format!(
                        "Materialized view {} has duplicate column {}",
                        view.name, name
                    ))
                })?;
            self.loc.check(self.catalog.set(&column_path, "index", index))?;
            self.loc.check(self.catalog.set(&column_path, "type", type_name))?;
            self.loc.check(self.catalog.set(&column_path, "size", size))?;
            self.loc.check(self.catalog.set(&column_path, "nullable", nullable))?;
        }

        let info_path = self.loc.check(self.catalog.add(&source_path, "views", &view.name))?;
        self.loc.check(self.catalog.set_ref(&info_path, "dest", &dest_path))?;
        if let Some(predicate) = &view.predicate {
            self.loc.check(self.catalog.set(&info_path, "predicate", predicate.as_str()))?;
        }
        for (i, (name, column)) in group_by.into_iter().enumerate() {
            let ref_path = self.loc.check(self.catalog.add(&info_path, "groupbycols", &name))?;
            self.loc.check(self.catalog.set(&ref_path, "index", i))?;
            self.loc.check(self.catalog.set_ref(&ref_path, "column", &column.path))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CLUSTER_NAME, CLUSTER_PATH, DATABASE_NAME};

    fn empty_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add("/", "clusters", CLUSTER_NAME).unwrap();
        catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME).unwrap();
        catalog
    }

    fn compile(text: &str) -> DdlResult<Catalog> {
        let mut catalog = empty_catalog();
        let mut compiler = BuiltinDdlCompiler::new();
        compiler.load_schema("ddl.sql", text)?;
        compiler.compile_to_catalog(&mut catalog)?;
        Ok(catalog)
    }

    #[test]
    fn test_tables_and_indexes() {
        let catalog = compile(
            "CREATE TABLE orders (\n\
               id INT NOT NULL PRIMARY KEY,\n\
               customer VARCHAR(64),\n\
               total DECIMAL DEFAULT 0\n\
             );\n\
             CREATE UNIQUE INDEX idx_customer ON orders (customer);",
        )
        .unwrap();

        let db = catalog.database().unwrap();
        let orders = db.table("ORDERS").unwrap();
        assert!(orders.is_replicated());

        let id = orders.column("ID").unwrap();
        assert_eq!(id.type_name(), "INTEGER");
        assert_eq!(id.size(), 4);
        assert!(!id.is_nullable());

        let customer = orders.column("CUSTOMER").unwrap();
        assert_eq!(customer.size(), 64);
        assert!(customer.is_nullable());
        assert_eq!(customer.index(), 1);

        let total = orders.column("TOTAL").unwrap();
        assert_eq!(total.node().get_str("defaultvalue"), Some("0"));

        let indexes: Vec<_> = orders.index_names().collect();
        assert_eq!(indexes, vec!["SYS_IDX_PK_ORDERS", "IDX_CUSTOMER"]);
    }

    #[test]
    fn test_view_creates_destination_table() {
        let catalog = compile(
            "CREATE TABLE votes (phone BIGINT NOT NULL, state VARCHAR(2) NOT NULL, n INTEGER);\n\
             CREATE VIEW by_state (state, total, votes) AS \
               SELECT state, SUM(n), COUNT(*) FROM votes GROUP BY state;",
        )
        .unwrap();

        let db = catalog.database().unwrap();
        let source = db.table("VOTES").unwrap();
        assert!(source.is_view_source());

        let dest = db.table("BY_STATE").unwrap();
        assert!(dest.is_view());
        assert_eq!(dest.materializer().unwrap().name(), "VOTES");
        assert_eq!(dest.column("TOTAL").unwrap().type_name(), "BIGINT");
        assert_eq!(dest.column("STATE").unwrap().type_name(), "VARCHAR");
        assert!(!dest.column("VOTES").unwrap().is_nullable());

        let view = source.views().next().unwrap();
        assert_eq!(view.dest().unwrap().name(), "BY_STATE");
    }

    #[test]
    fn test_semantic_errors_carry_location() {
        let err = compile("CREATE TABLE a (x INTEGER);\nCREATE INDEX i ON a (y);").unwrap_err();
        assert_eq!(err.location(), Some(("ddl.sql", 2)));
        assert_eq!(err.to_string(), "Column Y not found in table A");

        let err = compile("CREATE TABLE a (x GEOGRAPHY);").unwrap_err();
        assert!(err.to_string().starts_with("Unsupported type GEOGRAPHY"));

        let err = compile(
            "CREATE TABLE a (x INTEGER);\nCREATE VIEW v AS SELECT x FROM a GROUP BY x;",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must include COUNT(*)"));

        let err = compile("CREATE TABLE a (x INTEGER);\nCREATE TABLE A (y INTEGER);").unwrap_err();
        assert_eq!(err.to_string(), "Table A already exists");
    }

    #[test]
    fn test_syntax_error_is_reported_at_load() {
        let mut compiler = BuiltinDdlCompiler::new();
        let err = compiler
            .load_schema("bad.sql", "CREATE TABLE a (x INTEGER);\nCREATE TABLE")
            .unwrap_err();
        assert!(matches!(err, DdlError::Syntax { line: 2, .. }));
        assert_eq!(compiler.pending_statements(), 0);
    }
}
