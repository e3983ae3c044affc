// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Compiler configuration

use crate::procedure::{DatabaseEstimates, ProcedureRegistry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding extra classpath roots
pub const CLASSPATH_ENV: &str = "SCHEMAPACK_CLASSPATH";

/// How descriptor warnings are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorStrictness {
    /// Suspicious but usable descriptor content is a WARNING
    #[default]
    Lenient,
    /// Suspicious descriptor content is an ERROR
    Strict,
}

/// Version and build strings written to `buildinfo.txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdentity {
    pub version: String,
    pub build_string: String,
}

impl Default for BuildIdentity {
    fn default() -> Self {
        Self {
            version: crate::VERSION.to_string(),
            build_string: format!("schemapack-{}", crate::VERSION),
        }
    }
}

/// Configuration for a [`ProjectCompiler`](super::ProjectCompiler)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directories and jars searched for compiled classes
    #[serde(default)]
    pub classpath: Vec<PathBuf>,

    #[serde(default)]
    pub strictness: DescriptorStrictness,

    /// Size hints handed to the procedure compiler
    #[serde(default)]
    pub estimates: DatabaseEstimates,

    /// Capability metadata of class-based procedures
    #[serde(default)]
    pub procedures: ProcedureRegistry,

    #[serde(default)]
    pub build: BuildIdentity,
}

impl CompilerConfig {
    /// Default configuration with descriptor warnings promoted to errors
    pub fn strict() -> Self {
        Self {
            strictness: DescriptorStrictness::Strict,
            ..Self::default()
        }
    }

    /// Default configuration plus classpath roots from `SCHEMAPACK_CLASSPATH`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = std::env::var_os(CLASSPATH_ENV) {
            config.classpath.extend(std::env::split_paths(&paths));
        }
        config
    }

    pub fn with_classpath<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn with_procedures(mut self, procedures: ProcedureRegistry) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == DescriptorStrictness::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let config = CompilerConfig::default();
        assert!(!config.is_strict());
        assert!(config.classpath.is_empty());
        assert_eq!(config.build.version, crate::VERSION);

        assert!(CompilerConfig::strict().is_strict());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{"classpath": ["lib/app.jar"], "strictness": "strict"}"#)
                .unwrap();
        assert!(config.is_strict());
        assert_eq!(config.classpath, vec![PathBuf::from("lib/app.jar")]);
        assert_eq!(config.estimates, DatabaseEstimates::default());
    }
}
