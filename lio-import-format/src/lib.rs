//! Conversion of olympiad tasks into proglv task packages.
//!
//! This crate parses a task in one of the supported source formats into a [`Task`], and writes it
//! on disk as a package with [`write_package`]. The only source format supported for now is
//! [`lio2024`], the one of the Latvian Olympiad in Informatics.

#![deny(missing_docs)]

#[macro_use]
extern crate log;

use std::path::Path;
use std::str::FromStr;

pub use error::ImportError;
pub use package::{write_package, ProblemToml};
pub use task::{Task, TestFiles, TestGroup, TestGroupId, TestId};

mod error;
pub mod lio2024;
pub mod package;
pub mod task;

/// The source formats that can be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// The format of the Latvian Olympiad in Informatics, since 2024.
    Lio2024,
}

impl SourceFormat {
    /// The name of the format, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Lio2024 => "lio2024",
        }
    }

    /// Check whether `task_dir` looks like a task in this format.
    pub fn is_valid<P: AsRef<Path>>(&self, task_dir: P) -> bool {
        match self {
            SourceFormat::Lio2024 => lio2024::is_valid(task_dir),
        }
    }

    /// Parse the task at `task_dir` assuming it is in this format.
    pub fn parse_task<P: AsRef<Path>>(&self, task_dir: P) -> Result<Task, ImportError> {
        match self {
            SourceFormat::Lio2024 => lio2024::parse_task_dir(task_dir),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lio2024" => Ok(SourceFormat::Lio2024),
            _ => Err(format!(
                "Unsupported source format {:?}. Only 'lio2024' is supported.",
                s
            )),
        }
    }
}
