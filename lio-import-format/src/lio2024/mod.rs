//! The lio2024 task format, used by the Latvian Olympiad in Informatics.
//!
//! A lio2024 task directory looks like this:
//! * `task.yaml` - limits, title and the points of the test groups
//! * `testi/tests.zip` - the test files (the path is specified in `task.yaml`), named
//!   `<task>.i<group>[<letter>]` for the inputs and `<task>.o<group>[<letter>]` for the answers.
//!   Group 0 contains the examples of the statement.
//! * `teksts/*.pdf` - the statement, in Latvian
//!
//! Checkers and interactors are not supported yet.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use glob::Pattern;
use itertools::Itertools;

use archive::check_unique;
pub use archive::{read_tests_from_dir, read_tests_from_zip, unzip, LioTest};
pub use descriptor::{parse_descriptor, Lio2024Descriptor, Selector, TestGroupSpec};
pub use filename::{TestFileName, TestFileRole};

use crate::error::IoContext;
use crate::task::{Task, TestId};
use crate::ImportError;

mod archive;
mod descriptor;
mod filename;

/// The name of the descriptor inside the task directory.
pub const DESCRIPTOR_FILE: &str = "task.yaml";
/// The directory with the statement.
pub const STATEMENT_DIR: &str = "teksts";
/// The language of the statements of the lio2024 tasks.
pub const STATEMENT_LANGUAGE: &str = "lv";
/// The olympiad the lio2024 tasks come from.
pub const ORIGIN_OLYMPIAD: &str = "LIO";

/// Check whether the directory looks like a lio2024 task.
pub fn is_valid<P: AsRef<Path>>(task_dir: P) -> bool {
    task_dir.as_ref().join(DESCRIPTOR_FILE).is_file()
}

/// Parse the lio2024 task inside `task_dir`.
///
/// Nothing is written on disk, except for the temporary directory used to extract the tests.
pub fn parse_task_dir<P: AsRef<Path>>(task_dir: P) -> Result<Task, ImportError> {
    let task_dir = task_dir.as_ref();
    let descriptor_path = task_dir.join(DESCRIPTOR_FILE);
    let content = fs::read(&descriptor_path)
        .io_context(|| format!("Failed to read {}", descriptor_path.display()))?;
    let descriptor = parse_descriptor(&content)?;
    debug!("The descriptor is {:#?}", descriptor);

    if let Some(checker) = &descriptor.checker {
        return Err(ImportError::UnimplementedFeature {
            feature: "checker",
            path: checker.display().to_string(),
        });
    }
    if let Some(interactor) = &descriptor.interactor {
        return Err(ImportError::UnimplementedFeature {
            feature: "interactor",
            path: interactor.display().to_string(),
        });
    }

    let tests = read_tests_from_zip(task_dir.join(&descriptor.tests_archive))?;
    info!("Found {} test pairs in the archive", tests.len());

    let statement = read_statement(&task_dir.join(STATEMENT_DIR))?;
    let mut statements = BTreeMap::new();
    statements.insert(STATEMENT_LANGUAGE.to_string(), statement);

    assemble_task(&descriptor, tests, statements)
}

/// Read the only PDF file inside `dir`.
fn read_statement(dir: &Path) -> Result<Vec<u8>, ImportError> {
    let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy())).join("*.pdf");
    let paths: Vec<_> = glob::glob(&pattern.to_string_lossy())
        .io_context(|| format!("Invalid statement pattern {}", pattern.display()))?
        .map(|path| path.io_context(|| format!("Failed to list {}", dir.display())))
        .collect::<Result<_, _>>()?;
    let [path] = paths.as_slice() else {
        return Err(ImportError::MissingOrAmbiguousStatement {
            dir: dir.to_path_buf(),
            found: paths.len(),
        });
    };
    debug!("Using statement at {}", path.display());
    fs::read(path).io_context(|| format!("Failed to read statement {}", path.display()))
}

/// Build the task from the parsed descriptor, the tests of the archive and the statements.
///
/// The tests of group 0 become the examples, the others are assigned to the groups of the
/// descriptor, in the order of their letter. A group of the descriptor without tests is kept
/// empty. Two tests with the same group and ordinal are rejected.
pub fn assemble_task(
    descriptor: &Lio2024Descriptor,
    mut tests: Vec<LioTest>,
    statements: BTreeMap<String, Vec<u8>>,
) -> Result<Task, ImportError> {
    let mut task = Task::new(descriptor.full_task_name.clone())?;
    task.set_cpu_time_limit(descriptor.cpu_time_limit);
    task.set_memory_limit(descriptor.memory_limit);

    tests.sort_by_key(|t| (t.test_group, t.no_in_test_group, t.no_in_lex_fname_order));

    let mut names = HashMap::new();
    let mut group_tests: HashMap<u32, Vec<TestId>> = HashMap::new();
    for test in tests {
        check_unique(
            &mut names,
            test.test_group,
            test.no_in_test_group,
            test.input_filename.clone(),
        )?;
        if test.test_group == 0 {
            task.add_example(test.input, test.answer);
            continue;
        }
        let name = format!("{:03}_{}", test.test_group, test.no_in_test_group);
        let group = test.test_group;
        let id = task.add_test(test.input, test.answer);
        task.assign_filename_to_test(name, id);
        group_tests.entry(group).or_default().push(id);
    }

    for spec in descriptor.test_groups.iter().filter(|g| g.group_id != 0) {
        let tests = group_tests.remove(&spec.group_id).unwrap_or_default();
        if tests.is_empty() {
            warn!("Test group {} has no tests", spec.group_id);
        }
        task.add_test_group_with_id(spec.group_id, spec.points, spec.public, tests, spec.subtask)?;
    }
    for group in group_tests.keys().sorted() {
        warn!(
            "Test group {} is in the archive but not in {}, its tests are not scored",
            group, DESCRIPTOR_FILE
        );
    }
    for warning in subtask_points_warnings(descriptor) {
        warn!("{}", warning);
    }

    for (language, content) in statements {
        task.add_pdf_statement(language, content)?;
    }
    task.add_visible_input_subtask(1);
    task.set_origin_olympiad(ORIGIN_OLYMPIAD);
    Ok(task)
}

/// Compare the points of the subtasks with the sum of the points of their groups.
fn subtask_points_warnings(descriptor: &Lio2024Descriptor) -> Vec<String> {
    if descriptor.subtask_points.is_empty() {
        return vec![];
    }
    let mut sums: BTreeMap<u32, u64> = BTreeMap::new();
    for spec in descriptor.test_groups.iter().filter(|g| g.group_id != 0) {
        *sums.entry(spec.subtask).or_default() += u64::from(spec.points);
    }
    let mut warnings = vec![];
    for (index, &expected) in descriptor.subtask_points.iter().enumerate() {
        let subtask = index as u32 + 1;
        let actual = sums.remove(&subtask).unwrap_or(0);
        if actual != u64::from(expected) {
            warnings.push(format!(
                "Subtask {subtask} is worth {expected} points, but its groups sum up to {actual}"
            ));
        }
    }
    for (subtask, points) in sums {
        if subtask != 0 {
            warnings.push(format!(
                "Groups worth {points} points refer to the unknown subtask {subtask}"
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn lio_test(group: u32, ordinal: u32, lex: usize) -> LioTest {
        LioTest {
            task_name: "t".into(),
            input_filename: format!("t.i{group:02}{}", (b'a' + ordinal as u8 - 1) as char),
            test_group: group,
            no_in_test_group: ordinal,
            no_in_lex_fname_order: lex,
            input: format!("in {group} {ordinal}").into_bytes(),
            answer: format!("out {group} {ordinal}").into_bytes(),
        }
    }

    fn spec(group_id: u32, points: u32, public: bool, subtask: u32) -> TestGroupSpec {
        TestGroupSpec {
            group_id,
            points,
            public,
            subtask,
            comment: None,
        }
    }

    fn descriptor(test_groups: Vec<TestGroupSpec>) -> Lio2024Descriptor {
        Lio2024Descriptor {
            cpu_time_limit: 0.5,
            memory_limit: 256,
            short_name: "t".into(),
            full_task_name: "The Task".into(),
            tests_archive: PathBuf::from("testi/tests.zip"),
            checker: None,
            interactor: None,
            subtask_points: vec![],
            test_groups,
        }
    }

    fn statements() -> BTreeMap<String, Vec<u8>> {
        let mut statements = BTreeMap::new();
        statements.insert("lv".to_string(), b"%PDF-1.4".to_vec());
        statements
    }

    #[test]
    fn test_three_groups() {
        let descriptor = descriptor(vec![
            spec(1, 10, false, 1),
            spec(2, 10, true, 1),
            spec(3, 10, false, 1),
        ]);
        let tests = vec![lio_test(1, 1, 0), lio_test(2, 1, 1), lio_test(3, 1, 2)];
        let task = assemble_task(&descriptor, tests, statements()).unwrap();

        assert_eq!(task.title, "The Task");
        assert_eq!(task.cpu_time_limit, 0.5);
        assert_eq!(task.memory_limit, 256);
        assert_that!(task.examples).is_empty();
        assert_that!(task.tests).has_length(3);
        let groups: Vec<_> = task.test_groups.values().collect();
        assert_that!(groups).has_length(3);
        for (index, group) in groups.iter().enumerate() {
            assert_eq!(group.id, index as u32 + 1);
            assert_eq!(group.points, 10);
            assert_eq!(group.subtask, 1);
            assert_eq!(group.tests, vec![index as TestId + 1]);
            assert_eq!(group.public, group.id == 2);
        }
        assert_eq!(task.origin_olympiad.as_deref(), Some("LIO"));
        assert_eq!(task.visible_input_subtasks, vec![1]);
        assert_eq!(task.pdf_statements["lv"], b"%PDF-1.4");
    }

    #[test]
    fn test_examples() {
        let descriptor = descriptor(vec![spec(1, 100, false, 1)]);
        let tests = vec![lio_test(0, 1, 0), lio_test(1, 1, 1), lio_test(0, 2, 2)];
        let task = assemble_task(&descriptor, tests, statements()).unwrap();
        assert_that!(task.examples).has_length(2);
        assert_eq!(task.examples[0].input, b"in 0 1");
        assert_eq!(task.examples[1].input, b"in 0 2");
        assert_that!(task.tests).has_length(1);
        assert_eq!(task.test_groups[&1].tests, vec![1]);
        assert_eq!(task.test(1).unwrap().files.input, b"in 1 1");
    }

    #[test]
    fn test_group_zero_in_descriptor_is_skipped() {
        let descriptor = descriptor(vec![spec(0, 0, true, 0), spec(1, 100, false, 1)]);
        let tests = vec![lio_test(0, 1, 0), lio_test(1, 1, 1)];
        let task = assemble_task(&descriptor, tests, statements()).unwrap();
        assert_eq!(task.test_groups.keys().copied().collect_vec(), vec![1]);
        assert_that!(task.examples).has_length(1);
    }

    #[test]
    fn test_ordinal_order() {
        let descriptor = descriptor(vec![spec(1, 100, false, 1)]);
        // the archive order does not matter, the letters do
        let tests = vec![lio_test(1, 3, 0), lio_test(1, 1, 1), lio_test(1, 2, 2)];
        let task = assemble_task(&descriptor, tests, statements()).unwrap();
        let names = task.test_groups[&1]
            .tests
            .iter()
            .map(|id| task.test(*id).unwrap().filename.clone().unwrap())
            .collect_vec();
        assert_eq!(names, vec!["001_1", "001_2", "001_3"]);
    }

    #[test]
    fn test_empty_group() {
        let descriptor = descriptor(vec![spec(1, 50, false, 1), spec(2, 50, false, 1)]);
        let task = assemble_task(&descriptor, vec![lio_test(1, 1, 0)], statements()).unwrap();
        assert_that!(task.test_groups[&2].tests).is_empty();
    }

    #[test]
    fn test_duplicate_group() {
        let descriptor = descriptor(vec![spec(1, 50, false, 1), spec(1, 50, false, 2)]);
        let err = assemble_task(&descriptor, vec![lio_test(1, 1, 0)], statements());
        assert!(matches!(err, Err(ImportError::DuplicateTestGroup(1))));
    }

    #[test]
    fn test_deterministic() {
        let descriptor = descriptor(vec![
            spec(2, 30, true, 2),
            spec(1, 20, false, 1),
            spec(3, 50, false, 2),
        ]);
        let tests = || {
            vec![
                lio_test(3, 2, 0),
                lio_test(1, 1, 1),
                lio_test(0, 1, 2),
                lio_test(3, 1, 3),
                lio_test(2, 1, 4),
            ]
        };
        let first = assemble_task(&descriptor, tests(), statements()).unwrap();
        let second = assemble_task(&descriptor, tests(), statements()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.test_groups.keys().copied().collect_vec(), vec![1, 2, 3]);
        assert_eq!(first.test_groups[&3].tests, vec![3, 4]);
    }

    #[test]
    fn test_subtask_points_warnings() {
        let mut descriptor = descriptor(vec![
            spec(0, 0, true, 0),
            spec(1, 20, false, 1),
            spec(2, 30, false, 2),
            spec(3, 50, false, 2),
        ]);
        descriptor.subtask_points = vec![20, 80];
        assert_that!(subtask_points_warnings(&descriptor)).is_empty();
        descriptor.subtask_points = vec![20, 70];
        assert_that!(subtask_points_warnings(&descriptor)).has_length(1);
        descriptor.subtask_points = vec![20];
        assert_that!(subtask_points_warnings(&descriptor)).has_length(1);
    }

    #[test]
    fn test_huge_subtask_points() {
        let mut descriptor = descriptor(vec![
            spec(1, 3_000_000_000, false, 1),
            spec(2, 3_000_000_000, false, 1),
        ]);
        descriptor.subtask_points = vec![100];
        let warnings = subtask_points_warnings(&descriptor);
        assert_that!(warnings).has_length(1);
        assert!(warnings[0].contains("6000000000"));
        let tests = vec![lio_test(1, 1, 0), lio_test(2, 1, 1)];
        assert!(assemble_task(&descriptor, tests, statements()).is_ok());
    }

    #[test]
    fn test_same_group_and_ordinal() {
        let descriptor = descriptor(vec![spec(1, 100, false, 1)]);
        let mut second = lio_test(1, 1, 1);
        second.task_name = "ab".into();
        second.input_filename = "ab.i01".into();
        let tests = vec![lio_test(1, 1, 0), second];
        match assemble_task(&descriptor, tests, statements()) {
            Err(ImportError::DuplicateTest {
                first,
                second,
                group,
                ordinal,
            }) => {
                assert_eq!(first, "t.i01a");
                assert_eq!(second, "ab.i01");
                assert_eq!((group, ordinal), (1, 1));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    fn make_task_dir(yaml: &str, pdfs: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTOR_FILE), yaml).unwrap();
        fs::create_dir(dir.path().join(STATEMENT_DIR)).unwrap();
        for pdf in pdfs {
            fs::write(dir.path().join(STATEMENT_DIR).join(pdf), "%PDF").unwrap();
        }
        dir
    }

    const YAML: &str = "time_limit: 1\nmemory_limit: 64\ntitle: T\ntests_archive: testi/tests.zip\n";

    #[test]
    fn test_checker_is_unimplemented() {
        let dir = make_task_dir(&format!("{YAML}checker: check.cpp\n"), &["t.pdf"]);
        let err = parse_task_dir(dir.path());
        assert!(matches!(
            err,
            Err(ImportError::UnimplementedFeature {
                feature: "checker",
                ..
            })
        ));
    }

    #[test]
    fn test_interactor_is_unimplemented() {
        let dir = make_task_dir(&format!("{YAML}interactor: inter.cpp\n"), &["t.pdf"]);
        let err = parse_task_dir(dir.path());
        assert!(matches!(
            err,
            Err(ImportError::UnimplementedFeature {
                feature: "interactor",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_descriptor() {
        let dir = TempDir::new().unwrap();
        assert!(!is_valid(dir.path()));
        let err = parse_task_dir(dir.path());
        assert!(matches!(err, Err(ImportError::IOFailure { .. })));
    }

    #[test]
    fn test_statement_lookup() {
        let dir = make_task_dir(YAML, &["a.pdf"]);
        assert_eq!(read_statement(&dir.path().join(STATEMENT_DIR)).unwrap(), b"%PDF");

        let dir = make_task_dir(YAML, &[]);
        let err = read_statement(&dir.path().join(STATEMENT_DIR));
        assert!(matches!(
            err,
            Err(ImportError::MissingOrAmbiguousStatement { found: 0, .. })
        ));

        let dir = make_task_dir(YAML, &["a.pdf", "b.pdf"]);
        let err = read_statement(&dir.path().join(STATEMENT_DIR));
        assert!(matches!(
            err,
            Err(ImportError::MissingOrAmbiguousStatement { found: 2, .. })
        ));
    }

    #[test]
    fn test_statement_lookup_with_special_characters() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("kp[1]*").join(STATEMENT_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("kp.pdf"), "%PDF").unwrap();
        assert_eq!(read_statement(&dir).unwrap(), b"%PDF");
    }
}
