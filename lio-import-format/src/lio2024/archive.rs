//! Reading the tests of a lio2024 task from its zip archive.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::IoContext;
use crate::lio2024::filename::{TestFileName, TestFileRole};
use crate::ImportError;

/// A test read from the archive of a lio2024 task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LioTest {
    /// The task name in the file names.
    pub task_name: String,
    /// The file name of the input file.
    pub input_filename: String,
    /// The group of the test, 0 for the examples.
    pub test_group: u32,
    /// The 1-based position of the test inside its group.
    pub no_in_test_group: u32,
    /// Position of the input file in the lexicographic order of the input file names.
    pub no_in_lex_fname_order: usize,
    /// Content of the input file.
    pub input: Vec<u8>,
    /// Content of the answer file.
    pub answer: Vec<u8>,
}

/// A file of the tests directory, with its parsed name.
struct TestFile {
    path: PathBuf,
    name: TestFileName,
}

impl TestFile {
    fn filename(&self) -> String {
        self.name.to_string()
    }

    /// Input and answer files of the same test share this key.
    fn pairing_key(&self) -> (&str, u32, u32) {
        (&self.name.task_name, self.name.group, self.name.ordinal())
    }

    fn sorting_key(&self) -> ((&str, u32, u32), &str) {
        (self.pairing_key(), &self.name.group_digits)
    }
}

/// Extract the zip archive at `zip_path` in a temporary directory and read the tests from there.
///
/// The temporary directory is removed before returning, even on failure.
pub fn read_tests_from_zip<P: AsRef<Path>>(zip_path: P) -> Result<Vec<LioTest>, ImportError> {
    let zip_path = zip_path.as_ref();
    let tmp = TempDir::with_prefix("lio-tests")
        .io_context(|| "Failed to create the temporary directory for the tests")?;
    debug!(
        "Extracting {} into {}",
        zip_path.display(),
        tmp.path().display()
    );
    unzip(zip_path, tmp.path())?;
    read_tests_from_dir(tmp.path())
}

/// Read the tests from a directory containing only the test files, with no sub-directories.
///
/// Every input file (`<task>.i<group>[<letter>]`) must have a matching answer file
/// (`<task>.o<group>[<letter>]`) with the same task name, group and letter. The returned tests are
/// in the lexicographic order of their input file names.
pub fn read_tests_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<LioTest>, ImportError> {
    let dir = dir.as_ref();
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).io_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry.io_context(|| format!("Failed to read directory {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .io_context(|| format!("Failed to stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            return Err(ImportError::UnexpectedDirectory(entry.path()));
        }
        entries.push(entry.path());
    }
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if entries.len() % 2 != 0 {
        return Err(ImportError::OddFileCount(entries.len()));
    }

    let mut inputs = Vec::new();
    let mut answers = Vec::new();
    for path in entries {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let name: TestFileName = filename.parse()?;
        let file = TestFile { path, name };
        match file.name.role {
            TestFileRole::Input => inputs.push(file),
            TestFileRole::Answer => answers.push(file),
        }
    }
    let inputs = inputs
        .into_iter()
        .enumerate()
        .sorted_by(|(_, a), (_, b)| a.sorting_key().cmp(&b.sorting_key()))
        .collect_vec();
    answers.sort_by(|a, b| a.sorting_key().cmp(&b.sorting_key()));

    if inputs.len() != answers.len() {
        let inputs = inputs.iter().map(|(_, file)| file).collect_vec();
        let answers = answers.iter().collect_vec();
        return Err(find_unpaired(&inputs, &answers));
    }

    let mut tests = Vec::with_capacity(inputs.len());
    let mut names: HashMap<(u32, u32), String> = HashMap::new();
    for ((lex_index, input), answer) in inputs.into_iter().zip(answers) {
        check_pair(&input, &answer)?;
        check_unique(&mut names, input.name.group, input.name.ordinal(), input.filename())?;
        let read = |path: &Path| {
            fs::read(path).io_context(|| format!("Failed to read test file {}", path.display()))
        };
        tests.push(LioTest {
            task_name: input.name.task_name.clone(),
            input_filename: input.filename(),
            test_group: input.name.group,
            no_in_test_group: input.name.ordinal(),
            no_in_lex_fname_order: lex_index,
            input: read(&input.path)?,
            answer: read(&answer.path)?,
        });
    }
    tests.sort_by_key(|test| test.no_in_lex_fname_order);
    debug!("Read {} tests from {}", tests.len(), dir.display());
    Ok(tests)
}

/// Check that an input and an answer file describe the same test.
fn check_pair(input: &TestFile, answer: &TestFile) -> Result<(), ImportError> {
    let (i, a) = (&input.name, &answer.name);
    if i.task_name != a.task_name {
        return Err(ImportError::TaskNameMismatch {
            input: input.filename(),
            answer: answer.filename(),
        });
    }
    if i.group != a.group {
        return Err(ImportError::GroupMismatch {
            input: input.filename(),
            answer: answer.filename(),
            input_group: i.group,
            answer_group: a.group,
        });
    }
    if i.ordinal() != a.ordinal() {
        return Err(ImportError::OrdinalMismatch {
            input: input.filename(),
            answer: answer.filename(),
            input_ordinal: i.ordinal(),
            answer_ordinal: a.ordinal(),
        });
    }
    Ok(())
}

/// Record the test `(group, ordinal)`, failing if another test already has them.
pub(crate) fn check_unique(
    names: &mut HashMap<(u32, u32), String>,
    group: u32,
    ordinal: u32,
    filename: String,
) -> Result<(), ImportError> {
    match names.get(&(group, ordinal)) {
        Some(first) => Err(ImportError::DuplicateTest {
            first: first.clone(),
            second: filename,
            group,
            ordinal,
        }),
        None => {
            names.insert((group, ordinal), filename);
            Ok(())
        }
    }
}

/// Find the first file without a counterpart, given the input and answer files sorted by key.
fn find_unpaired(inputs: &[&TestFile], answers: &[&TestFile]) -> ImportError {
    let unpaired = |file: &TestFile, missing| ImportError::RoleMismatch {
        filename: file.filename(),
        missing,
    };
    let (mut i, mut a) = (0, 0);
    loop {
        match (inputs.get(i), answers.get(a)) {
            (Some(input), Some(answer)) => match input.pairing_key().cmp(&answer.pairing_key()) {
                Ordering::Equal => {
                    i += 1;
                    a += 1;
                }
                Ordering::Less => return unpaired(*input, "answer"),
                Ordering::Greater => return unpaired(*answer, "input"),
            },
            (Some(input), None) => return unpaired(*input, "answer"),
            (None, Some(answer)) => return unpaired(*answer, "input"),
            (None, None) => {
                unreachable!("lists of different length always have an unpaired file")
            }
        }
    }
}

/// Extract the zip archive at `src` inside `dest`.
///
/// Entries whose path would end up outside `dest` make the extraction fail.
pub fn unzip<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dest: Q) -> Result<(), ImportError> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    let file = File::open(src).io_context(|| format!("Failed to open {}", src.display()))?;
    let mut archive =
        ZipArchive::new(file).io_context(|| format!("Failed to read zip {}", src.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .io_context(|| format!("Failed to read entry {index} of {}", src.display()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ImportError::io(
                format!("Failed to unzip {}", src.display()),
                format!("illegal file path: {}", entry.name()),
            ));
        };
        let path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&path)
                .io_context(|| format!("Failed to create {}", path.display()))?;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .io_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut out =
            File::create(&path).io_context(|| format!("Failed to create {}", path.display()))?;
        io::copy(&mut entry, &mut out)
            .io_context(|| format!("Failed to extract {}", path.display()))?;
    }
    Ok(())
}
