// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Project compile driver
//!
//! [`ProjectCompiler`] turns a project descriptor into a catalog and an
//! output archive. Building the catalog runs a fixed sequence of phases;
//! every phase failure except a procedure compile error aborts the rest.
//! Procedure errors are collected so that one run reports every broken
//! procedure.

use super::config::CompilerConfig;
use super::error::{CompileError, CompileResult};
use super::export::compile_export;
use super::partition::{apply_partition, PartitionPair};
use super::summary::{CompileSummary, ProcedureSummary};
use crate::artifact::{
    Archive, BuildInfo, Classpath, DependencyPackager, SourceLocator, SourceResolver,
    BUILDINFO_ENTRY, CATALOG_ENTRY, PLANS_DIR, PROJECT_ENTRY,
};
use crate::catalog::system_procedures::register_system_procedures;
use crate::catalog::{Catalog, CLUSTER_NAME, CLUSTER_PATH, DATABASE_NAME, DATABASE_PATH};
use crate::ddl::{BuiltinDdlCompiler, DdlCompiler};
use crate::diagnostics::Diagnostics;
use crate::procedure::{BuiltinProcedureCompiler, ProcedureCompiler, ProcedureContext};
use crate::project::{split_list, DatabaseElement, ProcedureDescriptor, Project, ProjectError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Transaction id epoch written to the cluster node: 2008-01-01T00:00:00Z
pub const LOCAL_EPOCH: i64 = 1_199_145_600;

/// A schema source copied into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// Archive entry name
    pub name: String,
    /// Location as written in the descriptor, anchored at its directory
    pub source: String,
    /// Local file the entry is read from
    pub path: PathBuf,
}

pub struct ProjectCompiler {
    config: CompilerConfig,
    ddl: Box<dyn DdlCompiler>,
    procedures: Box<dyn ProcedureCompiler>,
    diagnostics: Diagnostics,
    catalog: Option<Catalog>,
    archive: Archive,
    packager: DependencyPackager,
    resolver: SourceResolver,
    schema_files: Vec<SchemaFile>,
    // Jar-sourced schemas stay on disk until the next compile
    temp_files: Vec<NamedTempFile>,
    output: Option<PathBuf>,
    succeeded: bool,
}

impl ProjectCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(BuiltinDdlCompiler::new()),
            Box::new(BuiltinProcedureCompiler::new()),
        )
    }

    pub fn with_collaborators(
        config: CompilerConfig,
        ddl: Box<dyn DdlCompiler>,
        procedures: Box<dyn ProcedureCompiler>,
    ) -> Self {
        let packager = DependencyPackager::new(Classpath::new(config.classpath.clone()));
        Self {
            config,
            ddl,
            procedures,
            diagnostics: Diagnostics::new(),
            catalog: None,
            archive: Archive::new(),
            packager,
            resolver: SourceResolver::new(),
            schema_files: Vec::new(),
            temp_files: Vec::new(),
            output: None,
            succeeded: false,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `project_path` and write the archive to `output`
    ///
    /// Returns true when no ERROR feedback was produced and the archive was
    /// written. A failed compile may leave a partial file at `output`.
    pub fn compile<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, project_path: P, output: Q) -> bool {
        let output = output.as_ref();
        let Some(project) = self.compile_project(project_path.as_ref()) else {
            return false;
        };
        self.output = Some(output.to_path_buf());

        if let Err(err) = self.write_archive(&project, output) {
            self.report(&err);
            return false;
        }
        self.succeeded = true;
        log::info!("Wrote {} entries to {}", self.archive.len(), output.display());
        true
    }

    /// Build only the catalog; `None` when any ERROR was reported
    pub fn compile_catalog<P: AsRef<Path>>(&mut self, project_path: P) -> Option<&Catalog> {
        self.compile_project(project_path.as_ref())?;
        self.succeeded = true;
        self.catalog.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Catalog of the last successful build
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn schema_files(&self) -> &[SchemaFile] {
        &self.schema_files
    }

    pub fn summary(&self) -> CompileSummary {
        let procedures = match (&self.catalog, self.succeeded) {
            (Some(catalog), true) => ProcedureSummary::collect(catalog),
            _ => Vec::new(),
        };
        CompileSummary {
            success: self.succeeded,
            output: self.output.as_ref().map(|p| p.display().to_string()),
            schemas: self.schema_files.iter().map(|s| s.source.clone()).collect(),
            procedures,
            feedback: self.diagnostics.iter().cloned().collect(),
        }
    }

    pub fn summarize_success<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.summary().write_success(out)
    }

    pub fn summarize_errors<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.summary().write_failure(out)
    }

    fn reset(&mut self) {
        self.diagnostics.reset();
        self.catalog = None;
        self.archive = Archive::new();
        self.packager.reset();
        self.schema_files.clear();
        self.temp_files.clear();
        self.output = None;
        self.succeeded = false;
    }

    fn report(&mut self, err: &CompileError) {
        self.diagnostics.error(err.to_string(), err.line());
    }

    fn compile_project(&mut self, path: &Path) -> Option<Project> {
        self.reset();

        let project = match Project::load(path) {
            Ok(project) => project,
            Err(err) => {
                self.report(&err.into());
                return None;
            }
        };
        self.diagnostics.set_current_file(Some(project.file_name()));
        log::info!("Compiling project {}", project.path().display());

        let result = self.build_catalog(&project);
        self.ddl.close();

        match result {
            Ok(catalog) if !self.diagnostics.has_errors() => {
                self.catalog = Some(catalog);
                Some(project)
            }
            Ok(_) => None,
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    fn build_catalog(&mut self, project: &Project) -> CompileResult<Catalog> {
        let mut catalog = Catalog::new();
        catalog.add("/", "clusters", CLUSTER_NAME)?;
        catalog.set(CLUSTER_PATH, "securityenabled", project.security_enabled())?;

        let db = project.database().ok_or_else(|| {
            CompileError::structural("Project file is missing its \"database\" element")
        })?;
        if db.name != DATABASE_NAME {
            return Err(CompileError::structural(format!(
                "Database elements must be named \"{}\" (found: \"{}\")",
                DATABASE_NAME, db.name
            )));
        }
        catalog.add(CLUSTER_PATH, "databases", DATABASE_NAME)?;

        if let Some(snapshot) = &db.snapshot {
            let schedule = snapshot.validate()?;
            let path = catalog.add(DATABASE_PATH, "snapshotschedule", "default")?;
            catalog.set(&path, "frequencyunit", schedule.frequency_unit.as_str())?;
            catalog.set(&path, "frequencyvalue", schedule.frequency_value)?;
            catalog.set(&path, "retain", schedule.retain)?;
            catalog.set(&path, "path", schedule.path.as_str())?;
            catalog.set(&path, "prefix", schedule.prefix.as_str())?;
        }

        for group in db.group_list() {
            if group.name.trim().is_empty() {
                return Err(ProjectError::EmptyAttribute {
                    element: "group",
                    attribute: "name",
                }
                .into());
            }
            let path = catalog.add(DATABASE_PATH, "groups", group.name.trim())?;
            catalog.set(&path, "adhoc", group.adhoc)?;
            catalog.set(&path, "sysproc", group.sysproc)?;
        }

        let descriptors = self.procedure_descriptors(db)?;
        let dependencies = self.class_dependencies(db)?;
        let partitions = self.partition_pairs(db)?;

        if descriptors.is_empty() {
            return Err(CompileError::structural(format!(
                "Database \"{}\" needs at least one \"procedure\" element (currently has 0)",
                DATABASE_NAME
            )));
        }

        self.compile_schemas(project, db, &mut catalog)?;
        self.diagnostics.set_current_file(Some(project.file_name()));

        for pair in &partitions {
            apply_partition(&mut catalog, pair)?;
        }

        let mut catalog = catalog.canonicalize()?;

        let seeded = register_system_procedures(&mut catalog)?;
        log::debug!("Seeded {} system procedures", seeded);

        if let Some(connector) = db.connector() {
            let (groups, blanks) = split_list(connector.groups.as_deref());
            if blanks > 0 {
                self.descriptor_warning(format!(
                    "Export connector {} lists an empty group name",
                    connector.class
                ))?;
            }
            compile_export(&mut catalog, connector, &groups)?;
        }

        self.apply_estimates(&mut catalog)?;
        for descriptor in &descriptors {
            self.compile_procedure(&mut catalog, descriptor);
        }

        self.diagnostics.set_current_file(Some(project.file_name()));
        for class_name in &dependencies {
            self.packager.add_class(class_name, &mut self.archive)?;
        }

        if !self.diagnostics.has_errors() {
            catalog.set(CLUSTER_PATH, "localepoch", LOCAL_EPOCH)?;
        }
        Ok(catalog)
    }

    fn procedure_descriptors(
        &mut self,
        db: &DatabaseElement,
    ) -> CompileResult<Vec<ProcedureDescriptor>> {
        let mut descriptors = Vec::new();
        for element in db.procedure_list() {
            if element.class.trim().is_empty() {
                return Err(ProjectError::EmptyAttribute {
                    element: "procedure",
                    attribute: "class",
                }
                .into());
            }
            let (_, blanks) = split_list(element.groups.as_deref());
            if blanks > 0 {
                self.descriptor_warning(format!(
                    "Procedure {} lists an empty group name",
                    element.class.trim()
                ))?;
            }
            descriptors.push(ProcedureDescriptor::from_element(element)?);
        }
        Ok(descriptors)
    }

    fn class_dependencies(&mut self, db: &DatabaseElement) -> CompileResult<Vec<String>> {
        let mut classes: Vec<String> = Vec::new();
        for element in db.class_dependency_list() {
            let class_name = element.class.trim();
            self.packager.resolve(class_name)?;
            if classes.iter().any(|c| c == class_name) {
                self.descriptor_warning(format!(
                    "Class dependency {} is declared more than once",
                    class_name
                ))?;
                continue;
            }
            classes.push(class_name.to_string());
        }
        Ok(classes)
    }

    fn partition_pairs(&mut self, db: &DatabaseElement) -> CompileResult<Vec<PartitionPair>> {
        let mut pairs: Vec<PartitionPair> = Vec::new();
        for element in db.partition_list() {
            let pair = PartitionPair::from_element(element)?;
            if let Some(first) = pairs
                .iter()
                .find(|p| p.table.eq_ignore_ascii_case(&pair.table))
            {
                let message = format!(
                    "Table {} is partitioned more than once; keeping column {}",
                    pair.table, first.column
                );
                self.descriptor_warning(message)?;
                continue;
            }
            pairs.push(pair);
        }
        Ok(pairs)
    }

    fn compile_schemas(
        &mut self,
        project: &Project,
        db: &DatabaseElement,
        catalog: &mut Catalog,
    ) -> CompileResult<()> {
        let base = project.base_dir();
        for text in db.schema_paths() {
            let locator = SourceLocator::parse(text).resolved_against(&base);
            let name = locator.file_name();
            let bytes = self.resolver.fetch(&locator)?;

            let path = match &locator {
                SourceLocator::File(path) => path.clone(),
                SourceLocator::JarEntry { .. } => self.materialize(&name, &bytes)?,
            };
            let source = match &locator {
                SourceLocator::File(path) => path.display().to_string(),
                SourceLocator::JarEntry { jar, entry } => format!("{}!{}", jar.display(), entry),
            };

            self.diagnostics.set_current_file(Some(name.as_str()));
            self.ddl
                .load_schema(&name, &String::from_utf8_lossy(&bytes))?;
            log::debug!("Loaded schema {}", source);
            self.schema_files.push(SchemaFile { name, source, path });
        }

        if let Err(err) = self.ddl.compile_to_catalog(catalog) {
            if let Some((file, _)) = err.location() {
                self.diagnostics.set_current_file(Some(file));
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn materialize(&mut self, name: &str, bytes: &[u8]) -> CompileResult<PathBuf> {
        let io_error = |e: io::Error| {
            CompileError::io(format!("Unable to write a local copy of {}: {}", name, e))
        };
        let mut file = tempfile::Builder::new()
            .prefix("schemapack-")
            .suffix(&format!("-{}", name))
            .tempfile()
            .map_err(io_error)?;
        file.write_all(bytes).map_err(io_error)?;
        file.flush().map_err(io_error)?;

        let path = file.path().to_path_buf();
        self.temp_files.push(file);
        Ok(path)
    }

    fn apply_estimates(&self, catalog: &mut Catalog) -> CompileResult<()> {
        let tables: Vec<(String, i64)> = catalog
            .database()
            .map(|db| {
                db.tables()
                    .map(|t| (t.path().to_string(), self.config.estimates.tuples_for(t.name())))
                    .collect()
            })
            .unwrap_or_default();
        for (path, tuples) in tables {
            catalog.set(&path, "estimatedtuplecount", tuples)?;
        }
        Ok(())
    }

    fn compile_procedure(&mut self, catalog: &mut Catalog, descriptor: &ProcedureDescriptor) {
        self.diagnostics
            .set_current_file(Some(format!("{}.class", descriptor.name())));

        let mut ctx = ProcedureContext {
            catalog,
            packager: &mut self.packager,
            archive: &mut self.archive,
            estimates: &self.config.estimates,
            registry: &self.config.procedures,
        };
        if let Err(err) = self.procedures.compile(&mut ctx, descriptor) {
            let err: CompileError = err.into();
            self.report(&err);
        }
    }

    fn descriptor_warning(&mut self, message: String) -> CompileResult<()> {
        if self.config.is_strict() {
            return Err(CompileError::validation(message));
        }
        self.diagnostics.warn(message, None);
        Ok(())
    }

    fn write_archive(&mut self, project: &Project, output: &Path) -> CompileResult<()> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| CompileError::structural("No catalog was compiled"))?;

        let text = catalog.serialize();
        let info = BuildInfo::collect(
            &self.config.build.version,
            &self.config.build.build_string,
            &text,
        );
        let plans = explain_plans(catalog);

        self.archive.put(CATALOG_ENTRY, text.into_bytes())?;
        self.archive.put(BUILDINFO_ENTRY, info.render().into_bytes())?;
        self.archive.put(PROJECT_ENTRY, project.raw().to_vec())?;
        for schema in &self.schema_files {
            self.archive.put_file(schema.name.clone(), &schema.path)?;
        }
        for (entry, plan) in plans {
            self.archive.put(entry, plan.into_bytes())?;
        }
        self.archive.write_to(output)?;
        Ok(())
    }
}

/// `plans/<Procedure>_<Statement>.txt` entries for every user statement
fn explain_plans(catalog: &Catalog) -> Vec<(String, String)> {
    let Some(db) = catalog.database() else {
        return Vec::new();
    };
    let mut plans = Vec::new();
    for procedure in db.procedures().filter(|p| !p.is_system_procedure()) {
        for statement in procedure.statements() {
            let entry = format!(
                "{}/{}_{}.txt",
                PLANS_DIR,
                procedure.name(),
                statement.name()
            );
            let text = format!(
                "SQL: {}\nCOST: {}\nPLAN:\n\n{}\n",
                statement.sql_text(),
                statement.cost(),
                statement.explain_plan()
            );
            plans.push((entry, text));
        }
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::DescriptorStrictness;
    use chrono::{TimeZone, Utc};
    use std::fs;

    fn write_project(dir: &Path, database: &str, body: &str) -> PathBuf {
        fs::write(
            dir.join("ddl.sql"),
            "CREATE TABLE T (ID INTEGER NOT NULL, VAL INTEGER);\n",
        )
        .unwrap();
        let path = dir.join("project.xml");
        fs::write(
            &path,
            format!(
                "<?xml version=\"1.0\"?>\n<project>\n  <database name=\"{}\">\n    \
                 <schemas><schema path=\"ddl.sql\"/></schemas>\n{}\n  </database>\n</project>\n",
                database, body
            ),
        )
        .unwrap();
        path
    }

    const ONE_PROC: &str = r#"    <procedures>
      <procedure class="demo.GetT"><sql>SELECT * FROM T</sql></procedure>
    </procedures>"#;

    #[test]
    fn test_local_epoch_is_2008() {
        let epoch = Utc.with_ymd_and_hms(2008, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(epoch.timestamp(), LOCAL_EPOCH);
    }

    #[test]
    fn test_compile_catalog_sets_cluster_fields() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_project(dir.path(), "database", ONE_PROC);

        let mut compiler = ProjectCompiler::new(CompilerConfig::default());
        let catalog = compiler.compile_catalog(&project).unwrap();
        let cluster = catalog.cluster().unwrap();
        assert_eq!(cluster.get_int("localepoch"), LOCAL_EPOCH);
        assert!(!cluster.get_bool("securityenabled"));

        let db = catalog.database().unwrap();
        assert_eq!(db.table("T").unwrap().estimated_tuple_count(), 100_000);
        assert!(db.procedure("GetT").is_some());
    }

    #[test]
    fn test_wrong_database_name_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_project(dir.path(), "other", ONE_PROC);

        let mut compiler = ProjectCompiler::new(CompilerConfig::default());
        assert!(compiler.compile_catalog(&project).is_none());
        let error = compiler.diagnostics().errors().next().unwrap();
        assert_eq!(
            error.message,
            "Database elements must be named \"database\" (found: \"other\")"
        );
        assert_eq!(error.file.as_deref(), Some("project.xml"));
        assert!(compiler.catalog().is_none());
    }

    #[test]
    fn test_duplicate_partition_warns_or_fails() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{}\n    <partitions>\n      <partition table=\"T\" column=\"ID\"/>\n      \
             <partition table=\"t\" column=\"VAL\"/>\n    </partitions>",
            ONE_PROC
        );
        let project = write_project(dir.path(), "database", &body);

        let mut lenient = ProjectCompiler::new(CompilerConfig::default());
        let catalog = lenient.compile_catalog(&project).unwrap();
        let table = catalog.database().unwrap().table("T").unwrap();
        assert_eq!(table.partition_column().unwrap().name(), "ID");
        assert_eq!(lenient.diagnostics().warnings().count(), 1);

        let mut strict = ProjectCompiler::new(CompilerConfig {
            strictness: DescriptorStrictness::Strict,
            ..CompilerConfig::default()
        });
        assert!(strict.compile_catalog(&project).is_none());
        assert!(strict
            .diagnostics()
            .errors()
            .any(|f| f.message.contains("partitioned more than once")));
    }

    #[test]
    fn test_plan_entries_written() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_project(dir.path(), "database", ONE_PROC);
        let output = dir.path().join("out.jar");

        let mut compiler = ProjectCompiler::new(CompilerConfig::default());
        assert!(compiler.compile(&project, &output));
        let plan = compiler.archive().get_str("plans/GetT_sql.txt").unwrap();
        assert!(plan.starts_with("SQL: SELECT * FROM T\nCOST: 100000\nPLAN:\n\n"));

        let mut out = Vec::new();
        compiler.summarize_success(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[MP][RO] GetT\n  SELECT * FROM T\n"));
    }
}
