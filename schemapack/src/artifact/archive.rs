// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory output archive

use super::error::{ArchiveError, ArchiveResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Write-once mapping from archive path to content
///
/// Entries are kept sorted by path so the written archive lists them in a
/// stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Archive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; an existing entry with the same path is an error
    pub fn put<P: Into<String>>(&mut self, path: P, bytes: Vec<u8>) -> ArchiveResult<()> {
        let path = path.into();
        if self.entries.contains_key(&path) {
            return Err(ArchiveError::DuplicateEntry(path));
        }
        log::debug!("Archive entry {} ({} bytes)", path, bytes.len());
        self.entries.insert(path, bytes);
        Ok(())
    }

    /// Add the contents of a file on disk
    pub fn put_file<P: Into<String>, F: AsRef<Path>>(&mut self, path: P, file: F) -> ArchiveResult<()> {
        let bytes = std::fs::read(file)?;
        self.put(path, bytes)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write the archive as a zip file at `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> ArchiveResult<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.write_zip(&mut out)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> ArchiveResult<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (path, bytes) in &self.entries {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Load every file entry of a zip archive
    pub fn read_from<P: AsRef<Path>>(path: P) -> ArchiveResult<Self> {
        Self::read_zip(File::open(path)?)
    }

    pub fn read_zip<R: Read + Seek>(reader: R) -> ArchiveResult<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut archive = Archive::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            archive.put(name, bytes)?;
        }
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_duplicate_entries_are_refused() {
        let mut archive = Archive::new();
        archive.put("catalog.txt", b"a".to_vec()).unwrap();
        let err = archive.put("catalog.txt", b"b".to_vec()).unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateEntry(ref p) if p == "catalog.txt"));
        assert_eq!(archive.get("catalog.txt"), Some(&b"a"[..]));
    }

    #[test]
    fn test_zip_round_trip_keeps_sorted_paths() {
        let mut archive = Archive::new();
        archive.put("plans/P_sql.txt", b"SQL: x".to_vec()).unwrap();
        archive.put("buildinfo.txt", b"0.0.1".to_vec()).unwrap();
        archive.put("com/example/A.class", vec![0xCA, 0xFE, 0xBA, 0xBE]).unwrap();

        let mut buffer = Cursor::new(Vec::new());
        archive.write_zip(&mut buffer).unwrap();
        buffer.set_position(0);

        let read = Archive::read_zip(buffer).unwrap();
        assert_eq!(read, archive);
        assert_eq!(
            read.paths().collect::<Vec<_>>(),
            vec!["buildinfo.txt", "com/example/A.class", "plans/P_sql.txt"]
        );
    }
}
