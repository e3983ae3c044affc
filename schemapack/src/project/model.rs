// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Serde model of the XML project descriptor
//!
//! ```xml
//! <project>
//!   <security enabled="false"/>
//!   <database name="database">
//!     <schemas><schema path="ddl.sql"/></schemas>
//!     <procedures>
//!       <procedure class="com.example.Select" groups="ops">
//!         <sql>SELECT * FROM T</sql>
//!       </procedure>
//!     </procedures>
//!     <partitions><partition table="T" column="ID"/></partitions>
//!   </database>
//! </project>
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "project")]
pub struct ProjectFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityElement {
    #[serde(rename = "@enabled", default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseElement {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotElement>,

    #[serde(default)]
    pub schemas: SchemasElement,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupsElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedures: Option<ProceduresElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classdependencies: Option<ClassDependenciesElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<PartitionsElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<ExportsElement>,
}

impl DatabaseElement {
    pub fn schema_paths(&self) -> impl Iterator<Item = &str> {
        self.schemas.schema.iter().map(|s| s.path.as_str())
    }

    pub fn group_list(&self) -> &[GroupElement] {
        self.groups.as_ref().map(|g| g.group.as_slice()).unwrap_or(&[])
    }

    pub fn procedure_list(&self) -> &[ProcedureElement] {
        self.procedures
            .as_ref()
            .map(|p| p.procedure.as_slice())
            .unwrap_or(&[])
    }

    pub fn class_dependency_list(&self) -> &[ClassDependencyElement] {
        self.classdependencies
            .as_ref()
            .map(|c| c.classdependency.as_slice())
            .unwrap_or(&[])
    }

    pub fn partition_list(&self) -> &[PartitionElement] {
        self.partitions
            .as_ref()
            .map(|p| p.partition.as_slice())
            .unwrap_or(&[])
    }

    pub fn connector(&self) -> Option<&ConnectorElement> {
        self.exports.as_ref().and_then(|e| e.connector.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    #[serde(rename = "@frequency", default)]
    pub frequency: String,

    #[serde(rename = "@retain", default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<i64>,

    #[serde(rename = "@path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "@prefix", default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemasElement {
    #[serde(default)]
    pub schema: Vec<SchemaElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaElement {
    #[serde(rename = "@path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsElement {
    #[serde(default)]
    pub group: Vec<GroupElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@adhoc", default)]
    pub adhoc: bool,

    #[serde(rename = "@sysproc", default)]
    pub sysproc: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProceduresElement {
    #[serde(default)]
    pub procedure: Vec<ProcedureElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureElement {
    #[serde(rename = "@class")]
    pub class: String,

    #[serde(rename = "@groups", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,

    #[serde(
        rename = "@partitioninfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub partitioninfo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlElement {
    #[serde(rename = "@joinorder", default, skip_serializing_if = "Option::is_none")]
    pub joinorder: Option<String>,

    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDependenciesElement {
    #[serde(default)]
    pub classdependency: Vec<ClassDependencyElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDependencyElement {
    #[serde(rename = "@class", default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionsElement {
    #[serde(default)]
    pub partition: Vec<PartitionElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionElement {
    #[serde(rename = "@table", default)]
    pub table: String,

    #[serde(rename = "@column", default)]
    pub column: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportsElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<ConnectorElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorElement {
    #[serde(rename = "@class")]
    pub class: String,

    #[serde(rename = "@enabled", default = "default_enabled")]
    pub enabled: bool,

    #[serde(rename = "@groups", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<ExportTablesElement>,
}

fn default_enabled() -> bool {
    true
}

impl ConnectorElement {
    pub fn table_list(&self) -> &[ExportTableElement] {
        self.tables.as_ref().map(|t| t.table.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTablesElement {
    #[serde(default)]
    pub table: Vec<ExportTableElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTableElement {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@exportonly", default)]
    pub exportonly: bool,
}
