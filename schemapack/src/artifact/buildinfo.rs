// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! `buildinfo.txt` contents

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Informational build metadata, one value per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub build_string: String,
    pub user: String,
    pub working_dir: String,
    pub timestamp_ms: i64,
    pub build_id: String,
    /// CRC32 of the serialized catalog
    pub catalog_crc: u32,
}

impl BuildInfo {
    /// Collect the invoking user, working directory and current time
    pub fn collect(version: &str, build_string: &str, catalog_text: &str) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();
        let working_dir = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        Self {
            version: version.to_string(),
            build_string: build_string.to_string(),
            user,
            working_dir,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            build_id: Uuid::new_v4().to_string(),
            catalog_crc: crc32fast::hash(catalog_text.as_bytes()),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{:08x}\n",
            self.version,
            self.build_string,
            self.user,
            self.working_dir,
            self.timestamp_ms,
            self.build_id,
            self.catalog_crc
        )
    }

    /// Read back a rendered file; `None` when a line is missing or malformed
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let version = lines.next()?.to_string();
        let build_string = lines.next()?.to_string();
        let user = lines.next()?.to_string();
        let working_dir = lines.next()?.to_string();
        let timestamp_ms = lines.next()?.parse().ok()?;
        let build_id = lines.next()?.to_string();
        let catalog_crc = u32::from_str_radix(lines.next()?, 16).ok()?;
        Some(Self {
            version,
            build_string,
            user,
            working_dir,
            timestamp_ms,
            build_id,
            catalog_crc,
        })
    }
}
