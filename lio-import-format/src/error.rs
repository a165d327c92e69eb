use std::path::PathBuf;

use thiserror::Error;

use crate::task::TestId;

/// All the ways the conversion of a task can fail.
///
/// Every variant carries the identifiers (file names, group ids, paths) needed to locate the
/// problem in the source task directory.
#[derive(Error, Debug)]
pub enum ImportError {
    /// A file inside the tests archive does not follow the `<task>.<i|o><group>[<letter>]` naming.
    #[error("Malformed test file name {filename:?}: {reason}")]
    MalformedFilename {
        /// The offending file name.
        filename: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The tests archive contains an odd number of files, so they cannot be paired.
    #[error("Unexpected number of files in the tests directory: {0}")]
    OddFileCount(usize),
    /// The tests archive contains a directory.
    #[error("Unexpected directory in the tests directory: {0}")]
    UnexpectedDirectory(PathBuf),
    /// An input and an answer file were paired but belong to different tasks.
    #[error("Input and answer task names do not match: {input} and {answer}")]
    TaskNameMismatch {
        /// File name of the input file.
        input: String,
        /// File name of the answer file.
        answer: String,
    },
    /// A file has no counterpart with the opposite role.
    #[error("Test file {filename} has no matching {missing} file")]
    RoleMismatch {
        /// File name of the unpaired file.
        filename: String,
        /// The role of the missing file, either `input` or `answer`.
        missing: &'static str,
    },
    /// An input and an answer file were paired but belong to different groups.
    #[error("Input and answer groups do not match: {input} is in group {input_group}, {answer} is in group {answer_group}")]
    GroupMismatch {
        /// File name of the input file.
        input: String,
        /// File name of the answer file.
        answer: String,
        /// Group of the input file.
        input_group: u32,
        /// Group of the answer file.
        answer_group: u32,
    },
    /// An input and an answer file were paired but have different ordinals inside the group.
    #[error("Input and answer ordinals do not match: {input} is test {input_ordinal}, {answer} is test {answer_ordinal}")]
    OrdinalMismatch {
        /// File name of the input file.
        input: String,
        /// File name of the answer file.
        answer: String,
        /// Ordinal of the input file.
        input_ordinal: u32,
        /// Ordinal of the answer file.
        answer_ordinal: u32,
    },
    /// Two tests of the archive have the same group and ordinal, so they would get the same name.
    #[error("Test files {first} and {second} are both test {ordinal} of group {group}")]
    DuplicateTest {
        /// File name of the input of the first test.
        first: String,
        /// File name of the input of the second test.
        second: String,
        /// The group of both tests.
        group: u32,
        /// The ordinal of both tests.
        ordinal: u32,
    },
    /// The `groups` field of a test group entry has a shape that is not supported.
    #[error("Unsupported groups in tests group #{entry}: {value}")]
    UnsupportedGroupEncoding {
        /// Index of the entry inside `tests_groups`.
        entry: usize,
        /// The value, as found in the descriptor.
        value: String,
    },
    /// The `public` field of a test group entry has a shape that is not supported.
    #[error("Unsupported public groups in tests group #{entry}: {value}")]
    UnsupportedPublicEncoding {
        /// Index of the entry inside `tests_groups`.
        entry: usize,
        /// The value, as found in the descriptor.
        value: String,
    },
    /// Zero or more than one PDF statement were found.
    #[error("Expected exactly one PDF statement in {dir}, found {found}")]
    MissingOrAmbiguousStatement {
        /// The directory searched.
        dir: PathBuf,
        /// How many PDF files were found.
        found: usize,
    },
    /// The task uses something this tool cannot convert yet.
    #[error("{feature} {path} found, but {feature}s are not implemented yet")]
    UnimplementedFeature {
        /// Name of the feature (e.g. `checker`).
        feature: &'static str,
        /// Path of the file, relative to the task directory.
        path: String,
    },
    /// Reading, writing or extracting a file failed.
    #[error("{context}")]
    IOFailure {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// The task title is empty.
    #[error("The task title cannot be empty")]
    EmptyTitle,
    /// The same test group was added twice to the task.
    #[error("Test group {0} is defined more than once")]
    DuplicateTestGroup(u32),
    /// A test group references a test that was never added.
    #[error("Test group {group} references the unknown test {test}")]
    UnknownTest {
        /// The group id.
        group: u32,
        /// The missing test id.
        test: TestId,
    },
    /// A test belongs to more than one group.
    #[error("Test {test} is in both group {first} and group {second}")]
    TestInMultipleGroups {
        /// The test id.
        test: TestId,
        /// The group the test was first assigned to.
        first: u32,
        /// The group trying to take the test again.
        second: u32,
    },
    /// Two tests of the task have the same file name.
    #[error("More than one test is named {0}")]
    DuplicateTestName(String),
    /// The same statement language was added twice.
    #[error("A PDF statement in language {0:?} is already present")]
    DuplicateStatement(String),
}

impl ImportError {
    /// Build an `IOFailure` from any error, describing what was being done.
    pub fn io<S, E>(context: S, source: E) -> ImportError
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        ImportError::IOFailure {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Extension for attaching a description to the errors of the external collaborators (filesystem,
/// zip, yaml, toml), turning them into `ImportError::IOFailure`.
pub(crate) trait IoContext<T> {
    /// Wrap the error with the lazily computed description.
    fn io_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T, ImportError>;
}

impl<T, E> IoContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn io_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T, ImportError> {
        self.map_err(|e| ImportError::io(f(), e))
    }
}
