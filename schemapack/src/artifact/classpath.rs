// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compiled class lookup over directory and jar roots

use super::resolver::SourceLocator;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Ordered classpath roots
///
/// A root is either a directory holding `package/path/Name.class` files or a
/// `.jar` archive holding the same layout as entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classpath {
    roots: Vec<PathBuf>,
}

impl Classpath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push<P: Into<PathBuf>>(&mut self, root: P) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Archive path of a class: `a.b.C` becomes `a/b/C.class`
    pub fn entry_path(class_name: &str) -> String {
        format!("{}.class", class_name.replace('.', "/"))
    }

    /// Find a class, preferring loose class files over jar entries
    pub fn locate(&self, class_name: &str) -> Option<SourceLocator> {
        let entry = Self::entry_path(class_name);

        let loose = self
            .directories()
            .map(|dir| dir.join(&entry))
            .find(|candidate| candidate.is_file());
        if let Some(path) = loose {
            return Some(SourceLocator::File(path));
        }

        self.jars()
            .find(|jar| jar_entry_names(jar).iter().any(|name| name == &entry))
            .map(|jar| SourceLocator::JarEntry {
                jar: jar.to_path_buf(),
                entry,
            })
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.locate(class_name).is_some()
    }

    /// Direct member classes of `class_name` (`Outer$Inner`); anonymous and
    /// local classes (`Outer$1`, `Outer$1Local`) are not members
    pub fn nested_classes(&self, class_name: &str) -> Vec<String> {
        let entry = Self::entry_path(class_name);
        let stem = entry.trim_end_matches(".class");
        let prefix = format!("{}$", stem);
        let mut found = BTreeSet::new();

        for dir in self.directories() {
            let package_dir = match Path::new(stem).parent() {
                Some(parent) => dir.join(parent),
                None => dir.to_path_buf(),
            };
            let Ok(listing) = std::fs::read_dir(&package_dir) else {
                continue;
            };
            let outer = Path::new(stem)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            for file in listing.flatten() {
                let name = file.file_name().to_string_lossy().into_owned();
                if let Some(member) = member_name(&name, &format!("{}$", outer)) {
                    found.insert(format!("{}${}", class_name, member));
                }
            }
        }

        for jar in self.jars() {
            for name in jar_entry_names(jar) {
                if let Some(member) = member_name(&name, &prefix) {
                    found.insert(format!("{}${}", class_name, member));
                }
            }
        }

        found.into_iter().collect()
    }

    fn directories(&self) -> impl Iterator<Item = &Path> {
        self.roots
            .iter()
            .map(PathBuf::as_path)
            .filter(|root| root.is_dir())
    }

    fn jars(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path).filter(|root| {
            root.is_file()
                && root
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("jar"))
                    .unwrap_or(false)
        })
    }
}

/// `prefix` + `Member.class` with a named, direct member
fn member_name(file_name: &str, prefix: &str) -> Option<String> {
    let member = file_name.strip_prefix(prefix)?.strip_suffix(".class")?;
    let named = member
        .chars()
        .next()
        .map(|c| !c.is_ascii_digit())
        .unwrap_or(false);
    if named && !member.contains('$') {
        Some(member.to_string())
    } else {
        None
    }
}

fn jar_entry_names(jar: &Path) -> Vec<String> {
    let names: Vec<String> = File::open(jar)
        .ok()
        .and_then(|file| ZipArchive::new(file).ok())
        .map(|zip| zip.file_names().map(str::to_string).collect())
        .unwrap_or_default();
    if names.is_empty() {
        log::debug!("Classpath jar {} has no readable entries", jar.display());
    }
    names
}
