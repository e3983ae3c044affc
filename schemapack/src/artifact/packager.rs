// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Class dependency packaging

use super::archive::Archive;
use super::classpath::Classpath;
use super::error::{PackageError, PackageResult};
use super::resolver::{SourceLocator, SourceResolver};
use std::collections::HashSet;

/// Embeds compiled classes and their member classes into an archive
///
/// The set of classes already embedded is owned by the packager and must be
/// reset at the start of every top-level compile; within one compile each
/// class is resolved and written at most once.
#[derive(Debug, Default, Clone)]
pub struct DependencyPackager {
    classpath: Classpath,
    resolver: SourceResolver,
    embedded: HashSet<String>,
}

impl DependencyPackager {
    pub fn new(classpath: Classpath) -> Self {
        Self {
            classpath,
            resolver: SourceResolver::new(),
            embedded: HashSet::new(),
        }
    }

    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    /// Forget every class embedded by a previous compile
    pub fn reset(&mut self) {
        self.embedded.clear();
    }

    /// Check that a declared class dependency can be found
    pub fn resolve(&self, class_name: &str) -> PackageResult<SourceLocator> {
        if class_name.trim().is_empty() {
            return Err(PackageError::EmptyClassName);
        }
        self.classpath
            .locate(class_name)
            .ok_or_else(|| PackageError::NotOnClasspath(class_name.to_string()))
    }

    /// Embed `class_name` and, recursively, its member classes
    pub fn add_class(&mut self, class_name: &str, archive: &mut Archive) -> PackageResult<()> {
        if !self.embedded.insert(class_name.to_string()) {
            return Ok(());
        }

        for nested in self.classpath.nested_classes(class_name) {
            self.add_class(&nested, archive)?;
        }

        let locator = self
            .classpath
            .locate(class_name)
            .ok_or_else(|| PackageError::ClassNotFound(class_name.to_string()))?;
        let bytes = self
            .resolver
            .fetch(&locator)
            .map_err(|e| {
                log::debug!("Reading {} failed: {}", locator, e);
                PackageError::Unreadable(class_name.to_string())
            })?;
        if bytes.is_empty() {
            return Err(PackageError::Unreadable(class_name.to_string()));
        }

        archive.put(Classpath::entry_path(class_name), bytes)?;
        log::debug!("Embedded class {} from {}", class_name, locator);
        Ok(())
    }

    pub fn is_embedded(&self, class_name: &str) -> bool {
        self.embedded.contains(class_name)
    }

    /// Classes embedded during the current compile, sorted
    pub fn embedded(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.embedded.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("com/example");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("Util.class"), [0xCA, 0xFE, 0x01]).unwrap();
        std::fs::write(package.join("Util$Helper.class"), [0xCA, 0xFE, 0x02]).unwrap();
        std::fs::write(package.join("Empty.class"), b"").unwrap();
        dir
    }

    #[test]
    fn test_add_class_embeds_members_once() {
        let dir = classes_dir();
        let mut packager = DependencyPackager::new(Classpath::new([dir.path()]));
        let mut archive = Archive::new();

        packager.add_class("com.example.Util", &mut archive).unwrap();
        packager.add_class("com.example.Util", &mut archive).unwrap();

        assert_eq!(archive.len(), 2);
        assert_eq!(archive.get("com/example/Util.class"), Some(&[0xCA, 0xFE, 0x01][..]));
        assert!(archive.contains("com/example/Util$Helper.class"));
        assert_eq!(
            packager.embedded(),
            vec!["com.example.Util", "com.example.Util$Helper"]
        );
    }

    #[test]
    fn test_reset_allows_embedding_into_a_fresh_archive() {
        let dir = classes_dir();
        let mut packager = DependencyPackager::new(Classpath::new([dir.path()]));

        let mut first = Archive::new();
        packager.add_class("com.example.Util", &mut first).unwrap();

        packager.reset();
        let mut second = Archive::new();
        packager.add_class("com.example.Util", &mut second).unwrap();
        assert!(second.contains("com/example/Util.class"));
    }

    #[test]
    fn test_missing_and_empty_classes() {
        let dir = classes_dir();
        let mut packager = DependencyPackager::new(Classpath::new([dir.path()]));
        let mut archive = Archive::new();

        let err = packager.add_class("com.example.Gone", &mut archive).unwrap_err();
        assert_eq!(err.to_string(), "Unable to locate classfile for com.example.Gone");

        let err = packager.add_class("com.example.Empty", &mut archive).unwrap_err();
        assert!(matches!(err, PackageError::Unreadable(_)));

        assert!(matches!(packager.resolve(""), Err(PackageError::EmptyClassName)));
        assert!(matches!(
            packager.resolve("com.example.Gone"),
            Err(PackageError::NotOnClasspath(_))
        ));
        assert!(packager.resolve("com.example.Util").is_ok());
    }
}
