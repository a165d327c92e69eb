//! Writing a [`Task`] as a proglv task package.
//!
//! The package is a directory with this structure:
//! * `problem.toml` - title, limits, test groups and metadata
//! * `tests/` - the scored tests, `<name>.in` and `<name>.out`
//! * `examples/` - the examples, `001.in`, `001.out`, `002.in`, ...
//! * `statements/pdf/<language>.pdf` - the statements

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::IoContext;
use crate::task::{Task, Test, TestId};
use crate::ImportError;

/// Version of the `problem.toml` format written by this crate.
pub const PROBLEM_TOML_SPECIFICATION: &str = "v2.2";
/// The name of the metadata file inside the package.
pub const PROBLEM_TOML: &str = "problem.toml";

/// Content of the `problem.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemToml {
    /// Version of the format.
    pub specification: String,
    /// The full title of the task.
    pub task_name: String,
    /// The subtasks whose inputs are shown to the contestants.
    pub visible_input_subtasks: Vec<u32>,
    /// Descriptive information about the task.
    pub metadata: ProblemMetadata,
    /// The execution limits.
    pub constraints: ProblemConstraints,
    /// The scored test groups, sorted by id.
    pub test_groups: Vec<ProblemTestGroup>,
}

/// The `[metadata]` table of `problem.toml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemMetadata {
    /// Free-form tags.
    pub problem_tags: Vec<String>,
    /// Difficulty, from 1 to 5, 0 if unknown.
    pub difficulty_1_to_5: u32,
    /// The authors of the task.
    pub task_authors: Vec<String>,
    /// The olympiad the task comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_olympiad: Option<String>,
}

/// The `[constraints]` table of `problem.toml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemConstraints {
    /// Memory limit, in MiB.
    pub memory_megabytes: u32,
    /// CPU time limit, in seconds.
    pub cpu_time_seconds: f64,
}

/// An entry of `[[test_groups]]` of `problem.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemTestGroup {
    /// The id of the group.
    pub group_id: u32,
    /// The points of the group.
    pub points: u32,
    /// The subtask the group contributes to.
    pub subtask: u32,
    /// Whether the group is public.
    pub public: bool,
    /// The names of the input files of the group, inside `tests/`.
    pub test_filenames: Vec<String>,
}

/// The name (without extension) of the files of a test inside `tests/`.
fn test_name(test: &Test) -> String {
    test.filename
        .clone()
        .unwrap_or_else(|| format!("{:03}", test.id))
}

impl ProblemToml {
    /// Build the content of `problem.toml` for the task.
    ///
    /// Fails if two tests would be written to the same files.
    pub fn from_task(task: &Task) -> Result<ProblemToml, ImportError> {
        let mut names = HashSet::new();
        for test in &task.tests {
            let name = test_name(test);
            if !names.insert(name.clone()) {
                return Err(ImportError::DuplicateTestName(name));
            }
        }
        let mut test_groups = Vec::with_capacity(task.test_groups.len());
        for group in task.test_groups.values() {
            let test_filenames = group
                .tests
                .iter()
                .map(|&id| input_filename(task, group.id, id))
                .collect::<Result<_, _>>()?;
            test_groups.push(ProblemTestGroup {
                group_id: group.id,
                points: group.points,
                subtask: group.subtask,
                public: group.public,
                test_filenames,
            });
        }
        Ok(ProblemToml {
            specification: PROBLEM_TOML_SPECIFICATION.to_string(),
            task_name: task.title.clone(),
            visible_input_subtasks: task.visible_input_subtasks.clone(),
            metadata: ProblemMetadata {
                problem_tags: vec![],
                difficulty_1_to_5: 0,
                task_authors: vec![],
                origin_olympiad: task.origin_olympiad.clone(),
            },
            constraints: ProblemConstraints {
                memory_megabytes: task.memory_limit,
                cpu_time_seconds: task.cpu_time_limit,
            },
            test_groups,
        })
    }

    /// Serialize to the TOML text.
    pub fn to_toml_string(&self) -> Result<String, ImportError> {
        toml::to_string_pretty(self).io_context(|| format!("Failed to serialize {PROBLEM_TOML}"))
    }
}

fn input_filename(task: &Task, group: u32, id: TestId) -> Result<String, ImportError> {
    task.test(id)
        .map(|test| format!("{}.in", test_name(test)))
        .ok_or(ImportError::UnknownTest { group, test: id })
}

/// Write the task as a package inside `dest`, which must exist and should be empty.
pub fn write_package<P: AsRef<Path>>(task: &Task, dest: P) -> Result<(), ImportError> {
    let dest = dest.as_ref();
    let problem_toml = ProblemToml::from_task(task)?.to_toml_string()?;

    let write = |path: &Path, content: &[u8]| -> Result<(), ImportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .io_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, content).io_context(|| format!("Failed to write {}", path.display()))
    };

    let tests_dir = dest.join("tests");
    fs::create_dir_all(&tests_dir)
        .io_context(|| format!("Failed to create directory {}", tests_dir.display()))?;
    for test in &task.tests {
        let name = test_name(test);
        write(&tests_dir.join(format!("{name}.in")), &test.files.input)?;
        write(&tests_dir.join(format!("{name}.out")), &test.files.answer)?;
    }
    debug!("Written {} tests", task.tests.len());

    for (index, example) in task.examples.iter().enumerate() {
        let examples_dir = dest.join("examples");
        let name = format!("{:03}", index + 1);
        write(&examples_dir.join(format!("{name}.in")), &example.input)?;
        write(&examples_dir.join(format!("{name}.out")), &example.answer)?;
    }
    debug!("Written {} examples", task.examples.len());

    for (language, content) in &task.pdf_statements {
        let path = dest
            .join("statements")
            .join("pdf")
            .join(format!("{language}.pdf"));
        write(&path, content)?;
    }

    write(&dest.join(PROBLEM_TOML), problem_toml.as_bytes())?;
    info!("Package written at {}", dest.display());
    Ok(())
}
