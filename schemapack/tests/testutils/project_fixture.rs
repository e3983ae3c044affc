//! Temporary project directories for compile tests

use schemapack::{Archive, CompilerConfig, ProjectCompiler};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Schema used by most tests: one partitionable table, one replicated table
pub const BASIC_DDL: &str = "\
-- votes and areas
CREATE TABLE T (id INT NOT NULL, val INT);
CREATE TABLE AREAS (code SMALLINT NOT NULL, name VARCHAR(32), PRIMARY KEY (code));
";

/// One read-only inline statement procedure
pub const SELECT_PROC: &str = r#"<procedures>
      <procedure class="demo.GetT"><sql>SELECT * FROM T</sql></procedure>
    </procedures>"#;

pub struct ProjectFixture {
    dir: tempfile::TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project directory
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Write a loose class file under `classes/`
    pub fn write_class(&self, class_name: &str, contents: &[u8]) -> PathBuf {
        let relative = format!("classes/{}.class", class_name.replace('.', "/"));
        self.write(&relative, contents)
    }

    pub fn classes_dir(&self) -> PathBuf {
        self.dir.path().join("classes")
    }

    /// Write a jar holding the given entries
    pub fn write_jar(&self, relative: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        let file = std::fs::File::create(&path).expect("Failed to create jar");
        let mut zip = zip::ZipWriter::new(file);
        for (name, bytes) in entries {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("Failed to start jar entry");
            zip.write_all(bytes).expect("Failed to write jar entry");
        }
        zip.finish().expect("Failed to finish jar");
        path
    }

    /// Write a jar laid out the way the JDK `jar` tool streams it: every
    /// entry has flag bit 3 set, zero sizes in its local header and a data
    /// descriptor after the data. Only the central directory has the sizes.
    pub fn write_streamed_jar(&self, relative: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        const FLAGS: u16 = 0x0808;
        const DOS_DATE: u16 = (1 << 5) | 1;

        let mut body = Vec::new();
        let mut central = Vec::new();
        for (name, bytes) in entries {
            let offset = body.len() as u32;
            let crc = crc32fast::hash(bytes);
            let size = bytes.len() as u32;

            body.extend_from_slice(&0x04034b50u32.to_le_bytes());
            body.extend_from_slice(&20u16.to_le_bytes());
            body.extend_from_slice(&FLAGS.to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes()); // stored
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&DOS_DATE.to_le_bytes());
            body.extend_from_slice(&[0u8; 12]); // crc and sizes follow the data
            body.extend_from_slice(&(name.len() as u16).to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(name.as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(&0x08074b50u32.to_le_bytes());
            body.extend_from_slice(&crc.to_le_bytes());
            body.extend_from_slice(&size.to_le_bytes());
            body.extend_from_slice(&size.to_le_bytes());

            central.extend_from_slice(&0x02014b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&FLAGS.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&DOS_DATE.to_le_bytes());
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&size.to_le_bytes());
            central.extend_from_slice(&size.to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0u8; 12]); // extra, comment, disk, attributes
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let central_offset = body.len() as u32;
        let count = entries.len() as u16;
        body.extend_from_slice(&central);
        body.extend_from_slice(&0x06054b50u32.to_le_bytes());
        body.extend_from_slice(&[0u8; 4]);
        body.extend_from_slice(&count.to_le_bytes());
        body.extend_from_slice(&count.to_le_bytes());
        body.extend_from_slice(&(central.len() as u32).to_le_bytes());
        body.extend_from_slice(&central_offset.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());

        self.write(relative, &body)
    }

    /// Write `project.xml` wrapping `body` in a database element
    pub fn project(&self, database: &str, schemas: &[&str], body: &str) -> PathBuf {
        let schemas: String = schemas
            .iter()
            .map(|s| format!("      <schema path=\"{}\"/>\n", s))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<project>\n  <database name=\"{}\">\n    <schemas>\n{}    </schemas>\n    {}\n  </database>\n</project>\n",
            database, schemas, body
        );
        self.write("project.xml", xml.as_bytes())
    }

    /// `BASIC_DDL` in `ddl.sql` plus a project with `body`
    pub fn basic_project(&self, body: &str) -> PathBuf {
        self.write("ddl.sql", BASIC_DDL.as_bytes());
        self.project("database", &["ddl.sql"], body)
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("out.jar")
    }

    /// Compiler searching `classes/` and any extra roots
    pub fn compiler(&self, config: CompilerConfig) -> ProjectCompiler {
        ProjectCompiler::new(config.with_classpath([self.classes_dir()]))
    }

    pub fn read_output(&self) -> Archive {
        Archive::read_from(self.output()).expect("Failed to read archive")
    }
}

/// Messages of every ERROR feedback
pub fn error_messages(compiler: &ProjectCompiler) -> Vec<String> {
    compiler
        .diagnostics()
        .errors()
        .map(|f| f.message.clone())
        .collect()
}
