#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use lio_import::{LoggerOpt, Opt};

pub fn setup() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
}

/// Builder of a lio2024 task directory inside a temporary directory.
pub struct LioTask {
    root: TempDir,
    name: String,
    yaml: String,
    tests: Vec<(String, String)>,
    statements: Vec<String>,
}

impl LioTask {
    pub fn new(name: &str) -> LioTask {
        LioTask {
            root: TempDir::new().unwrap(),
            name: name.to_string(),
            yaml: String::new(),
            tests: vec![],
            statements: vec!["uzdevums.pdf".to_string()],
        }
    }

    pub fn yaml(mut self, yaml: &str) -> Self {
        self.yaml = yaml.to_string();
        self
    }

    /// Add a file to the tests archive, its content is its own name.
    pub fn test_files(mut self, names: &[&str]) -> Self {
        for name in names {
            self.tests.push((name.to_string(), format!("content of {name}")));
        }
        self
    }

    pub fn statements(mut self, names: &[&str]) -> Self {
        self.statements = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Write everything on disk, returning the source and the destination directories.
    pub fn build(self) -> BuiltTask {
        let source = self.root.path().join("src").join(&self.name);
        fs::create_dir_all(source.join("testi")).unwrap();
        fs::create_dir_all(source.join("teksts")).unwrap();
        fs::write(source.join("task.yaml"), &self.yaml).unwrap();

        let mut zip = ZipWriter::new(File::create(source.join("testi/tests.zip")).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in &self.tests {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();

        for statement in &self.statements {
            fs::write(source.join("teksts").join(statement), "%PDF-1.7").unwrap();
        }

        let dest = self.root.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        BuiltTask {
            _root: self.root,
            source,
            dest,
        }
    }
}

pub struct BuiltTask {
    _root: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl BuiltTask {
    pub fn opt(&self) -> Opt {
        Opt {
            source: self.source.clone(),
            format: "lio2024".to_string(),
            dest: self.dest.clone(),
            dry_run: false,
            logger: LoggerOpt { verbose: 0 },
        }
    }

    pub fn package(&self) -> PathBuf {
        let name = self.source.file_name().unwrap().to_string_lossy();
        self.dest.join(format!("{name}_proglv"))
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.package().join(path)).unwrap()
    }

    pub fn problem_toml(&self) -> toml::Table {
        toml::from_str(&self.read("problem.toml")).unwrap()
    }

    pub fn dest_is_empty(&self) -> bool {
        is_empty_dir(&self.dest)
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}
