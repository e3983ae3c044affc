// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Built-in procedure compiler

use super::error::{ProcedureError, ProcedureResult};
use super::estimates::DatabaseEstimates;
use super::registry::{NamedStatement, ProcedureRegistry};
use super::statement::{analyze, plan, ParamBinding, QueryType, StatementAnalysis, TableScan};
use super::ProcedureCompiler;
use crate::artifact::{Archive, DependencyPackager};
use crate::catalog::{Catalog, CatalogError, Database, Table, DATABASE_PATH};
use crate::project::ProcedureDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;

static PARTITION_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(\d+)\s*$")
        .expect("partition info pattern is valid")
});

/// Everything a procedure compiler may read or mutate for one procedure
pub struct ProcedureContext<'a> {
    pub catalog: &'a mut Catalog,
    pub packager: &'a mut DependencyPackager,
    pub archive: &'a mut Archive,
    pub estimates: &'a DatabaseEstimates,
    pub registry: &'a ProcedureRegistry,
}

/// Default [`ProcedureCompiler`]
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProcedureCompiler;

impl BuiltinProcedureCompiler {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
struct PartitionTarget {
    table_path: String,
    column_path: String,
    parameter: usize,
}

#[derive(Debug)]
struct CompiledStatement {
    name: String,
    sql: String,
    query_type: QueryType,
    replicated_dml: bool,
    cost: i64,
    explain: String,
}

#[derive(Debug)]
struct CompiledProcedure {
    name: String,
    class_name: String,
    has_java: bool,
    single_partition: bool,
    partition: Option<PartitionTarget>,
    groups: Vec<String>,
    statements: Vec<CompiledStatement>,
    parameters: Vec<Option<String>>,
}

impl CompiledProcedure {
    fn is_readonly(&self) -> bool {
        self.statements.iter().all(|s| s.query_type.is_read_only())
    }
}

impl ProcedureCompiler for BuiltinProcedureCompiler {
    fn compile(
        &mut self,
        ctx: &mut ProcedureContext<'_>,
        descriptor: &ProcedureDescriptor,
    ) -> ProcedureResult<()> {
        let compiled = {
            let db = ctx.catalog.database().ok_or_else(|| {
                CatalogError::PathNotFound(DATABASE_PATH.to_string())
            })?;
            build(&db, ctx, descriptor)?
        };

        if let ProcedureDescriptor::Class { class_name, .. } = descriptor {
            ctx.packager.add_class(class_name, ctx.archive)?;
        }
        register(ctx.catalog, &compiled)?;
        log::debug!(
            "Compiled procedure {} ({} statements)",
            compiled.name,
            compiled.statements.len()
        );
        Ok(())
    }
}

fn build(
    db: &Database<'_>,
    ctx: &ProcedureContext<'_>,
    descriptor: &ProcedureDescriptor,
) -> ProcedureResult<CompiledProcedure> {
    let name = descriptor.name().to_string();
    if db.procedure(&name).is_some() {
        return Err(ProcedureError::Duplicate(name));
    }
    for group in descriptor.groups() {
        if db.group(group).is_none() {
            return Err(ProcedureError::GroupNotFound {
                procedure: name,
                group: group.clone(),
            });
        }
    }

    let (statements, single_partition, partition_info, declared_parameters, has_java) =
        match descriptor {
            ProcedureDescriptor::Statement { sql, partition, .. } => (
                vec![NamedStatement {
                    name: "sql".to_string(),
                    sql: sql.clone(),
                }],
                partition.is_some(),
                partition.clone(),
                Vec::new(),
                false,
            ),
            ProcedureDescriptor::Class { class_name, .. } => {
                let info = ctx
                    .registry
                    .get(class_name)
                    .ok_or_else(|| ProcedureError::ClassNotRegistered(class_name.clone()))?;
                if info.single_partition && info.partition_info.is_none() {
                    return Err(ProcedureError::MissingPartitionInfo(name));
                }
                (
                    info.statements.clone(),
                    info.single_partition,
                    info.partition_info.clone(),
                    info.parameters.clone(),
                    true,
                )
            }
        };

    let mut analyses = Vec::with_capacity(statements.len());
    for statement in &statements {
        let analysis = analyze(&statement.sql).map_err(|message| ProcedureError::Statement {
            procedure: name.clone(),
            statement: statement.name.clone(),
            message,
        })?;
        analyses.push(analysis);
    }

    let parameters = if declared_parameters.is_empty() {
        infer_parameters(db, &analyses)
    } else {
        declared_parameters.into_iter().map(Some).collect()
    };

    let partition = partition_info
        .map(|info| resolve_partition(db, &name, &info, parameters.len()))
        .transpose()?;

    let mut compiled = Vec::with_capacity(statements.len());
    for (statement, analysis) in statements.into_iter().zip(analyses) {
        let fail = |message: String| ProcedureError::Statement {
            procedure: name.clone(),
            statement: statement.name.clone(),
            message,
        };
        let scans = check_statement(db, ctx.estimates, &analysis, single_partition).map_err(fail)?;
        let replicated_dml = analysis.target().is_some() && scans.first().is_some_and(|s| s.replicated);
        let plan = plan(&analysis, &scans, single_partition);
        compiled.push(CompiledStatement {
            name: statement.name,
            sql: statement.sql,
            query_type: analysis.query_type,
            replicated_dml,
            cost: plan.cost,
            explain: plan.explain,
        });
    }

    Ok(CompiledProcedure {
        name,
        class_name: descriptor.class_name().to_string(),
        has_java,
        single_partition,
        partition,
        groups: descriptor.groups().to_vec(),
        statements: compiled,
        parameters,
    })
}

fn is_export_only(db: &Database<'_>, table: &Table<'_>) -> bool {
    db.connectors().any(|connector| {
        connector
            .tables()
            .any(|(t, append_only)| append_only && t.path() == table.path())
    })
}

/// Validate table access rules and collect scan facts
fn check_statement(
    db: &Database<'_>,
    estimates: &DatabaseEstimates,
    analysis: &StatementAnalysis,
    single_partition: bool,
) -> Result<Vec<TableScan>, String> {
    let mut scans = Vec::with_capacity(analysis.tables.len());
    for name in &analysis.tables {
        let table = db
            .table(name)
            .ok_or_else(|| format!("Table {} does not exist", name))?;
        let is_target = analysis.target() == Some(name.as_str());

        if is_export_only(db, &table) {
            match analysis.query_type {
                QueryType::Insert if is_target => {}
                QueryType::Update | QueryType::Delete if is_target => {
                    return Err(format!(
                        "Illegal to update or delete from export-only table {}",
                        name
                    ));
                }
                _ => {
                    return Err(format!("Illegal to read export-only table {}", name));
                }
            }
        }
        if is_target && single_partition && table.is_replicated() {
            return Err(format!(
                "Single-partition procedures may not write to replicated table {}",
                name
            ));
        }

        scans.push(TableScan {
            name: name.clone(),
            replicated: table.is_replicated(),
            tuples: estimates.tuples_for(name),
        });
    }
    Ok(scans)
}

fn infer_parameters(db: &Database<'_>, analyses: &[StatementAnalysis]) -> Vec<Option<String>> {
    let count = analyses.iter().map(|a| a.parameters.len()).max().unwrap_or(0);
    (0..count)
        .map(|i| {
            analyses.iter().find_map(|analysis| {
                let binding = analysis.parameters.get(i)?.as_ref()?;
                column_type(db, analysis, binding)
            })
        })
        .collect()
}

fn column_type(
    db: &Database<'_>,
    analysis: &StatementAnalysis,
    binding: &ParamBinding,
) -> Option<String> {
    let tables = || analysis.tables.iter().filter_map(|t| db.table(t));
    match binding {
        ParamBinding::Column { table, column } => {
            let qualified = table.as_deref().and_then(|t| db.table(t));
            qualified
                .into_iter()
                .chain(tables())
                .find_map(|t| t.column(column))
                .map(|c| c.type_name().to_string())
        }
        ParamBinding::Position(position) => tables()
            .next()?
            .columns()
            .find(|c| c.index() == *position as i64)
            .map(|c| c.type_name().to_string()),
    }
}

fn resolve_partition(
    db: &Database<'_>,
    procedure: &str,
    info: &str,
    parameter_count: usize,
) -> ProcedureResult<PartitionTarget> {
    let fail = |message: String| ProcedureError::PartitionInfo {
        procedure: procedure.to_string(),
        message,
    };

    let caps = PARTITION_INFO
        .captures(info)
        .ok_or_else(|| fail(format!("'{}' is not of the form TABLE.COLUMN: parameter", info)))?;
    let table_name = caps[1].to_ascii_uppercase();
    let column_name = caps[2].to_ascii_uppercase();
    let parameter: usize = caps[3]
        .parse()
        .map_err(|_| fail(format!("invalid parameter index {}", &caps[3])))?;

    let table = db
        .table(&table_name)
        .ok_or_else(|| fail(format!("table {} does not exist", table_name)))?;
    let column = table
        .column(&column_name)
        .ok_or_else(|| fail(format!("column {}.{} does not exist", table_name, column_name)))?;
    match table.partition_column() {
        Some(partition) if partition.path() == column.path() => {}
        _ => {
            return Err(fail(format!(
                "{}.{} is not the partition column of table {}",
                table_name, column_name, table_name
            )))
        }
    }
    if parameter >= parameter_count {
        return Err(fail(format!(
            "parameter index {} is out of range ({} parameters)",
            parameter, parameter_count
        )));
    }

    Ok(PartitionTarget {
        table_path: table.path().to_string(),
        column_path: column.path().to_string(),
        parameter,
    })
}

fn register(catalog: &mut Catalog, compiled: &CompiledProcedure) -> ProcedureResult<()> {
    let path = catalog.add(DATABASE_PATH, "procedures", &compiled.name)?;
    catalog.set(&path, "classname", compiled.class_name.as_str())?;
    catalog.set(&path, "readonly", compiled.is_readonly())?;
    catalog.set(&path, "singlepartition", compiled.single_partition)?;
    catalog.set(&path, "hasjava", compiled.has_java)?;
    if let Some(partition) = &compiled.partition {
        catalog.set_ref(&path, "partitiontable", &partition.table_path)?;
        catalog.set_ref(&path, "partitioncolumn", &partition.column_path)?;
        catalog.set(&path, "partitionparameter", partition.parameter)?;
    }

    for group in &compiled.groups {
        let group_ref = catalog.add(&path, "authgroups", group)?;
        let target = crate::catalog::node::child_path(DATABASE_PATH, "groups", group);
        catalog.set_ref(&group_ref, "group", &target)?;
    }

    for (index, parameter) in compiled.parameters.iter().enumerate() {
        let param_path = catalog.add(&path, "parameters", &index.to_string())?;
        catalog.set(&param_path, "index", index)?;
        catalog.set(&param_path, "type", parameter.clone())?;
    }

    for statement in &compiled.statements {
        let stmt_path = catalog.add(&path, "statements", &statement.name)?;
        catalog.set(&stmt_path, "sqltext", statement.sql.as_str())?;
        catalog.set(&stmt_path, "querytype", statement.query_type.as_str())?;
        catalog.set(&stmt_path, "readonly", statement.query_type.is_read_only())?;
        catalog.set(&stmt_path, "singlepartition", compiled.single_partition)?;
        catalog.set(&stmt_path, "replicatedtabledml", statement.replicated_dml)?;
        catalog.set(&stmt_path, "cost", statement.cost)?;
        catalog.set(&stmt_path, "explainplan", hex::encode(statement.explain.as_bytes()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Classpath;
    use crate::catalog::{CLUSTER_NAME, CLUSTER_PATH, DATABASE_NAME};
    use crate::procedure::ProcInfoData;

    struct Fixture {
        catalog: Catalog,
        packager: DependencyPackager,
        archive: Archive,
        estimates: DatabaseEstimates,
        registry: ProcedureRegistry,
        _classes: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let mut catalog = Catalog::new();
            catalog.add("/", "clusters", CLUSTER_NAME).unwrap();
            catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME).unwrap();
            catalog.execute(&format!(
                "add {db} groups users\n\
                 add {db} tables VOTES\n\
                 add {db}/tables[VOTES] columns PHONE\n\
                 set {db}/tables[VOTES]/columns[PHONE] type \"BIGINT\"\n\
                 add {db}/tables[VOTES] columns STATE\n\
                 set {db}/tables[VOTES]/columns[STATE] index 1\n\
                 set {db}/tables[VOTES]/columns[STATE] type \"VARCHAR\"\n\
                 set {db}/tables[VOTES] partitioncolumn {db}/tables[VOTES]/columns[PHONE]\n\
                 add {db} tables AREAS\n\
                 set {db}/tables[AREAS] isreplicated true\n\
                 add {db}/tables[AREAS] columns CODE\n\
                 set {db}/tables[AREAS]/columns[CODE] type \"SMALLINT\"\n",
                db = DATABASE_PATH
            ))
            .unwrap();

            let classes = tempfile::tempdir().unwrap();
            let package = classes.path().join("com/example");
            std::fs::create_dir_all(&package).unwrap();
            std::fs::write(package.join("Vote.class"), [0xCA, 0xFE]).unwrap();

            Self {
                catalog,
                packager: DependencyPackager::new(Classpath::new([classes.path()])),
                archive: Archive::new(),
                estimates: DatabaseEstimates::with_default(1000),
                registry: ProcedureRegistry::new().with(
                    "com.example.Vote",
                    ProcInfoData::single_partition("VOTES.PHONE: 0")
                        .with_statement("insert", "INSERT INTO votes (phone, state) VALUES (?, ?)"),
                ),
                _classes: classes,
            }
        }

        fn compile(&mut self, descriptor: &ProcedureDescriptor) -> ProcedureResult<()> {
            let mut ctx = ProcedureContext {
                catalog: &mut self.catalog,
                packager: &mut self.packager,
                archive: &mut self.archive,
                estimates: &self.estimates,
                registry: &self.registry,
            };
            BuiltinProcedureCompiler::new().compile(&mut ctx, descriptor)
        }
    }

    fn statement(class: &str, sql: &str, partition: Option<&str>) -> ProcedureDescriptor {
        ProcedureDescriptor::Statement {
            groups: vec!["users".to_string()],
            class_name: class.to_string(),
            sql: sql.to_string(),
            join_order: None,
            partition: partition.map(str::to_string),
        }
    }

    #[test]
    fn test_statement_procedure() {
        let mut fixture = Fixture::new();
        fixture
            .compile(&statement(
                "app.CountVotes",
                "SELECT COUNT(*) FROM votes v, areas a WHERE v.state = ?",
                None,
            ))
            .unwrap();

        let db = fixture.catalog.database().unwrap();
        let proc = db.procedure("CountVotes").unwrap();
        assert!(proc.is_readonly());
        assert!(!proc.is_single_partition());
        assert!(!proc.has_java());
        assert_eq!(proc.auth_groups().collect::<Vec<_>>(), vec!["users"]);
        assert_eq!(proc.parameter_count(), 1);

        let stmt = proc.statements().next().unwrap();
        assert_eq!(stmt.name(), "sql");
        assert_eq!(stmt.query_type(), "SELECT");
        assert_eq!(stmt.cost(), 2000);
        assert!(stmt.explain_plan().contains("SEQUENTIAL SCAN of \"VOTES\""));
        assert!(fixture.archive.is_empty());
    }

    #[test]
    fn test_class_procedure_embeds_class() {
        let mut fixture = Fixture::new();
        let descriptor = ProcedureDescriptor::Class {
            groups: Vec::new(),
            class_name: "com.example.Vote".to_string(),
        };
        fixture.compile(&descriptor).unwrap();

        let db = fixture.catalog.database().unwrap();
        let proc = db.procedure("Vote").unwrap();
        assert!(proc.is_single_partition());
        assert!(!proc.is_readonly());
        assert!(proc.has_java());
        assert_eq!(proc.node().get_int("partitionparameter"), 0);
        assert_eq!(proc.statements().next().unwrap().cost(), 1);
        assert!(fixture.archive.contains("com/example/Vote.class"));
    }

    #[test]
    fn test_rule_violations() {
        let mut fixture = Fixture::new();

        let err = fixture
            .compile(&ProcedureDescriptor::Statement {
                groups: vec!["admins".to_string()],
                class_name: "app.P".to_string(),
                sql: "SELECT * FROM votes".to_string(),
                join_order: None,
                partition: None,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Procedure P has a group admins that does not exist");

        let err = fixture
            .compile(&statement("app.Missing", "SELECT * FROM nowhere", None))
            .unwrap_err();
        assert!(err.to_string().contains("Table NOWHERE does not exist"));

        let err = fixture
            .compile(&statement(
                "app.WriteAreas",
                "INSERT INTO areas VALUES (?)",
                Some("VOTES.PHONE: 0"),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("may not write to replicated table AREAS"));

        let err = fixture
            .compile(&statement("app.BadPart", "SELECT * FROM votes WHERE phone = ?", Some("AREAS.CODE: 0")))
            .unwrap_err();
        assert!(matches!(err, ProcedureError::PartitionInfo { .. }));

        let err = fixture
            .compile(&ProcedureDescriptor::Class {
                groups: Vec::new(),
                class_name: "com.example.Unknown".to_string(),
            })
            .unwrap_err();
        assert!(err.is_resolution());

        assert!(fixture.catalog.database().unwrap().procedures().next().is_none());
    }
}
