// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Project descriptor loading
//!
//! A project file is an XML document naming the schema sources, groups,
//! procedures, partitions, export connector and snapshot schedule of one
//! database. [`Project::load`] reads it verbatim (the raw bytes are copied
//! into the output archive) and deserializes it into [`ProjectFile`].

pub mod error;
pub mod model;
pub mod procedure;
pub mod snapshot;

pub use error::{ProjectError, ProjectResult};
pub use model::{
    ConnectorElement, DatabaseElement, ExportTableElement, GroupElement, PartitionElement,
    ProcedureElement, ProjectFile, SnapshotElement,
};
pub use procedure::{split_list, ProcedureDescriptor};
pub use snapshot::SnapshotSchedule;

use std::path::{Path, PathBuf};

/// A loaded project descriptor together with its source bytes
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    raw: Vec<u8>,
    descriptor: ProjectFile,
}

impl Project {
    pub fn load<P: AsRef<Path>>(path: P) -> ProjectResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ProjectError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ProjectError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        Self::from_bytes(path, raw)
    }

    /// Parse descriptor bytes as if they had been read from `path`
    pub fn from_bytes<P: Into<PathBuf>>(path: P, raw: Vec<u8>) -> ProjectResult<Self> {
        let text = std::str::from_utf8(&raw).map_err(|e| ProjectError::Schema(e.to_string()))?;
        let descriptor: ProjectFile =
            quick_xml::de::from_str(text).map_err(|e| ProjectError::Schema(e.to_string()))?;
        Ok(Self {
            path: path.into(),
            raw,
            descriptor,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used to tag descriptor diagnostics
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Directory relative schema paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn descriptor(&self) -> &ProjectFile {
        &self.descriptor
    }

    pub fn security_enabled(&self) -> bool {
        self.descriptor
            .security
            .as_ref()
            .map(|s| s.enabled)
            .unwrap_or(false)
    }

    pub fn database(&self) -> Option<&DatabaseElement> {
        self.descriptor.database.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<?xml version="1.0"?>
<project>
  <security enabled="true"/>
  <database name="database">
    <snapshot frequency="5m" retain="3" path="/tmp/snaps" prefix="auto"/>
    <schemas>
      <schema path="ddl.sql"/>
      <schema path="lib.jar!schema/extra.sql"/>
    </schemas>
    <groups>
      <group name="ops" adhoc="true"/>
      <group name="admin" sysproc="true"/>
    </groups>
    <procedures>
      <procedure class="com.example.GetT" groups="ops">
        <sql joinorder="T,U">SELECT * FROM T</sql>
      </procedure>
      <procedure class="com.example.Insert"/>
    </procedures>
    <classdependencies>
      <classdependency class="com.example.Util"/>
    </classdependencies>
    <partitions>
      <partition table="T" column="ID"/>
    </partitions>
    <exports>
      <connector class="com.example.Loader" enabled="false" groups="ops">
        <tables><table name="T" exportonly="true"/></tables>
      </connector>
    </exports>
  </database>
</project>
"#;

    #[test]
    fn test_parse_full_descriptor() {
        let project = Project::from_bytes("/work/project.xml", PROJECT.as_bytes().to_vec()).unwrap();
        assert!(project.security_enabled());
        assert_eq!(project.file_name(), "project.xml");
        assert_eq!(project.base_dir(), PathBuf::from("/work"));

        let db = project.database().unwrap();
        assert_eq!(db.name, "database");
        assert_eq!(
            db.schema_paths().collect::<Vec<_>>(),
            vec!["ddl.sql", "lib.jar!schema/extra.sql"]
        );
        assert_eq!(db.group_list().len(), 2);
        assert!(db.group_list()[0].adhoc);
        assert!(db.group_list()[1].sysproc);

        let procs = db.procedure_list();
        assert_eq!(procs.len(), 2);
        let sql = procs[0].sql.as_ref().unwrap();
        assert_eq!(sql.text.trim(), "SELECT * FROM T");
        assert_eq!(sql.joinorder.as_deref(), Some("T,U"));
        assert!(procs[1].sql.is_none());

        assert_eq!(db.class_dependency_list()[0].class, "com.example.Util");
        assert_eq!(db.partition_list()[0].column, "ID");

        let connector = db.connector().unwrap();
        assert!(!connector.enabled);
        assert!(connector.table_list()[0].exportonly);

        let schedule = db.snapshot.as_ref().unwrap().validate().unwrap();
        assert_eq!(schedule.prefix, "auto");
    }

    #[test]
    fn test_malformed_descriptor_is_schema_error() {
        let err = Project::from_bytes("p.xml", b"<project><database>".to_vec()).unwrap_err();
        assert!(err.to_string().starts_with("Error schema validating project file."));
    }

    #[test]
    fn test_missing_file() {
        let err = Project::load("/definitely/not/here/project.xml").unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
