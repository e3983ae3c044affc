// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Appender settings

use super::error::LogShipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How rows reach the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMethod {
    /// Rows are buffered and loaded in batches
    #[default]
    BulkLoader,
    /// One `LogInsert` call per row
    Procedure,
}

impl FromStr for InsertMethod {
    type Err = LogShipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulkloader" => Ok(InsertMethod::BulkLoader),
            "procedure" => Ok(InsertMethod::Procedure),
            _ => Err(LogShipError::UnknownInsertMethod(s.to_string())),
        }
    }
}

impl fmt::Display for InsertMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertMethod::BulkLoader => write!(f, "bulkloader"),
            InsertMethod::Procedure => write!(f, "procedure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppenderConfig {
    pub server: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub table: String,
    pub insert: InsertMethod,
    /// Rows buffered by the bulk loader before a flush
    pub batch_size: usize,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 21212,
            user: None,
            password: None,
            table: "log4j".to_string(),
            insert: InsertMethod::BulkLoader,
            batch_size: 1,
        }
    }
}

impl AppenderConfig {
    /// User and password, only when both are non-blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.user.as_deref().filter(|u| !u.trim().is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.trim().is_empty())?;
        Some((user, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_method_parse() {
        assert_eq!("BulkLoader".parse::<InsertMethod>().unwrap(), InsertMethod::BulkLoader);
        assert_eq!(" PROCEDURE ".parse::<InsertMethod>().unwrap(), InsertMethod::Procedure);
        let err = "rows".parse::<InsertMethod>().unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized insert method: 'rows'");
    }

    #[test]
    fn test_credentials_need_both() {
        let mut config = AppenderConfig {
            user: Some("ops".to_string()),
            ..AppenderConfig::default()
        };
        assert_eq!(config.credentials(), None);
        config.password = Some("  ".to_string());
        assert_eq!(config.credentials(), None);
        config.password = Some("secret".to_string());
        assert_eq!(config.credentials(), Some(("ops", "secret")));
    }
}
