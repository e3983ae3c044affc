// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Logical source locators and the backends that fetch them
//!
//! A locator is either a plain file path or an entry inside a jar, written
//! `outer.jar!path/inside/jar`. Jar entries are looked up through the jar's
//! central directory, so entries whose sizes only follow the data (as the
//! `jar` tool writes them) read the same as any other.

use super::error::{ResolveError, ResolveResult};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Where a schema source or class file lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocator {
    File(PathBuf),
    JarEntry { jar: PathBuf, entry: String },
}

impl SourceLocator {
    /// Parse `path` or `outer.jar!entry`; a `file:` scheme on the jar and a
    /// leading `/` on the entry are dropped
    pub fn parse(text: &str) -> Self {
        match text.split_once(".jar!") {
            Some((jar, entry)) => {
                let jar = jar.strip_prefix("file:").unwrap_or(jar);
                SourceLocator::JarEntry {
                    jar: PathBuf::from(format!("{}.jar", jar)),
                    entry: entry.trim_start_matches('/').to_string(),
                }
            }
            None => SourceLocator::File(PathBuf::from(text)),
        }
    }

    /// Anchor a relative file or jar path at `base`
    pub fn resolved_against(self, base: &Path) -> Self {
        match self {
            SourceLocator::File(path) if path.is_relative() => SourceLocator::File(base.join(path)),
            SourceLocator::JarEntry { jar, entry } if jar.is_relative() => SourceLocator::JarEntry {
                jar: base.join(jar),
                entry,
            },
            other => other,
        }
    }

    pub fn is_jar_entry(&self) -> bool {
        matches!(self, SourceLocator::JarEntry { .. })
    }

    /// Last path component of the file or jar entry
    pub fn file_name(&self) -> String {
        match self {
            SourceLocator::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            SourceLocator::JarEntry { entry, .. } => entry
                .rsplit('/')
                .next()
                .unwrap_or(entry.as_str())
                .to_string(),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::File(path) => write!(f, "{}", path.display()),
            SourceLocator::JarEntry { jar, entry } => write!(f, "{}!{}", jar.display(), entry),
        }
    }
}

/// Fetches the bytes behind one kind of locator
pub trait SourceBackend {
    fn fetch(&self, locator: &SourceLocator) -> ResolveResult<Vec<u8>>;
}

/// Reads plain files
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl SourceBackend for FsBackend {
    fn fetch(&self, locator: &SourceLocator) -> ResolveResult<Vec<u8>> {
        let path = match locator {
            SourceLocator::File(path) => path,
            SourceLocator::JarEntry { jar, .. } => jar,
        };
        std::fs::read(path).map_err(|source| ResolveError::Io {
            path: path.clone(),
            source,
        })
    }
}

/// Reads named entries out of jar files
#[derive(Debug, Default, Clone, Copy)]
pub struct JarBackend;

impl JarBackend {
    pub fn read_entry(&self, jar: &Path, entry: &str) -> ResolveResult<Vec<u8>> {
        let file = File::open(jar).map_err(|source| ResolveError::Io {
            path: jar.to_path_buf(),
            source,
        })?;
        let zip_error = |e: ZipError| ResolveError::Zip {
            jar: jar.to_path_buf(),
            message: e.to_string(),
        };

        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(zip_error)?;
        let mut current = match archive.by_name(entry) {
            Ok(current) => current,
            Err(ZipError::FileNotFound) => {
                return Err(ResolveError::EntryNotFound {
                    jar: jar.to_path_buf(),
                    entry: entry.to_string(),
                })
            }
            Err(e) => return Err(zip_error(e)),
        };

        let mut bytes = Vec::with_capacity(current.size() as usize);
        current
            .read_to_end(&mut bytes)
            .map_err(|source| ResolveError::Io {
                path: jar.to_path_buf(),
                source,
            })?;
        Ok(bytes)
    }
}

impl SourceBackend for JarBackend {
    fn fetch(&self, locator: &SourceLocator) -> ResolveResult<Vec<u8>> {
        match locator {
            SourceLocator::JarEntry { jar, entry } => self.read_entry(jar, entry),
            SourceLocator::File(path) => Err(ResolveError::EntryNotFound {
                jar: path.clone(),
                entry: String::new(),
            }),
        }
    }
}

/// Fetches any locator through the matching backend
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceResolver {
    fs: FsBackend,
    jar: JarBackend,
}

impl SourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch(&self, locator: &SourceLocator) -> ResolveResult<Vec<u8>> {
        match locator {
            SourceLocator::File(_) => self.fs.fetch(locator),
            SourceLocator::JarEntry { .. } => self.jar.fetch(locator),
        }
    }

    pub fn fetch_string(&self, locator: &SourceLocator) -> ResolveResult<String> {
        let bytes = self.fetch(locator)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
