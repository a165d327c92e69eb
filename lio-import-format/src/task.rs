//! The normalized task, ready to be written as a package.
//!
//! A [`Task`] is built in a single pass: the limits are set, the examples and the tests are added
//! to their pools, and only after all the tests are known the scored groups are added, referencing
//! the tests by their [`TestId`].

use std::collections::{BTreeMap, HashMap};

use crate::ImportError;

/// Tests are numbered from 1, in the order they are added to the task.
pub type TestId = u32;
/// Identifier of a scored test group, as numbered in the source task.
pub type TestGroupId = u32;

/// A pair of input and answer files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFiles {
    /// Content of the input file.
    pub input: Vec<u8>,
    /// Content of the correct answer.
    pub answer: Vec<u8>,
}

/// A test of the task, part of the evaluation pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    /// The id of the test.
    pub id: TestId,
    /// The name to give to the files of this test, if one was assigned.
    pub filename: Option<String>,
    /// The content of the test.
    pub files: TestFiles,
}

/// A scored group of tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    /// The id of the group.
    pub id: TestGroupId,
    /// The points awarded for solving every test of the group.
    pub points: u32,
    /// The subtask this group contributes to.
    pub subtask: u32,
    /// Whether the results of this group are shown to the contestants during the contest.
    pub public: bool,
    /// The tests of the group, in evaluation order.
    pub tests: Vec<TestId>,
}

/// A task converted from a source format.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// The full title of the task.
    pub title: String,
    /// CPU time limit of a single execution, in seconds.
    pub cpu_time_limit: f64,
    /// Memory limit of a single execution, in MiB.
    pub memory_limit: u32,
    /// The examples shown in the statement, not scored.
    pub examples: Vec<TestFiles>,
    /// The pool of the scored tests.
    pub tests: Vec<Test>,
    /// The scored groups, sorted by id.
    pub test_groups: BTreeMap<TestGroupId, TestGroup>,
    /// The olympiad the task comes from.
    pub origin_olympiad: Option<String>,
    /// The subtasks whose inputs are shown to the contestants.
    pub visible_input_subtasks: Vec<u32>,
    /// The PDF statements, indexed by language code.
    pub pdf_statements: BTreeMap<String, Vec<u8>>,
    /// The group owning each test.
    test_owners: HashMap<TestId, TestGroupId>,
}

impl Task {
    /// Make an empty task with the provided title.
    pub fn new<S: Into<String>>(title: S) -> Result<Task, ImportError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ImportError::EmptyTitle);
        }
        Ok(Task {
            title,
            cpu_time_limit: 0.0,
            memory_limit: 0,
            examples: Vec::new(),
            tests: Vec::new(),
            test_groups: BTreeMap::new(),
            origin_olympiad: None,
            visible_input_subtasks: Vec::new(),
            pdf_statements: BTreeMap::new(),
            test_owners: HashMap::new(),
        })
    }

    /// Set the CPU time limit, in seconds.
    pub fn set_cpu_time_limit(&mut self, seconds: f64) {
        self.cpu_time_limit = seconds;
    }

    /// Set the memory limit, in MiB.
    pub fn set_memory_limit(&mut self, megabytes: u32) {
        self.memory_limit = megabytes;
    }

    /// Append an example to the task.
    pub fn add_example(&mut self, input: Vec<u8>, answer: Vec<u8>) {
        self.examples.push(TestFiles { input, answer });
    }

    /// Add a test to the pool, returning its id.
    pub fn add_test(&mut self, input: Vec<u8>, answer: Vec<u8>) -> TestId {
        let id = self.tests.len() as TestId + 1;
        self.tests.push(Test {
            id,
            filename: None,
            files: TestFiles { input, answer },
        });
        id
    }

    /// Name the files of a test. Returns `false` if there is no such test.
    pub fn assign_filename_to_test<S: Into<String>>(&mut self, filename: S, id: TestId) -> bool {
        match self.test_mut(id) {
            Some(test) => {
                test.filename = Some(filename.into());
                true
            }
            None => false,
        }
    }

    /// Get a test by its id.
    pub fn test(&self, id: TestId) -> Option<&Test> {
        id.checked_sub(1).and_then(|i| self.tests.get(i as usize))
    }

    fn test_mut(&mut self, id: TestId) -> Option<&mut Test> {
        id.checked_sub(1)
            .and_then(move |i| self.tests.get_mut(i as usize))
    }

    /// Add a scored group with the specified id.
    ///
    /// The group id must be new, and all the tests must exist and must not be already part of
    /// another group.
    pub fn add_test_group_with_id(
        &mut self,
        id: TestGroupId,
        points: u32,
        public: bool,
        tests: Vec<TestId>,
        subtask: u32,
    ) -> Result<(), ImportError> {
        if self.test_groups.contains_key(&id) {
            return Err(ImportError::DuplicateTestGroup(id));
        }
        for &test in &tests {
            if self.test(test).is_none() {
                return Err(ImportError::UnknownTest { group: id, test });
            }
            if let Some(&first) = self.test_owners.get(&test) {
                return Err(ImportError::TestInMultipleGroups {
                    test,
                    first,
                    second: id,
                });
            }
        }
        for &test in &tests {
            self.test_owners.insert(test, id);
        }
        self.test_groups.insert(
            id,
            TestGroup {
                id,
                points,
                subtask,
                public,
                tests,
            },
        );
        Ok(())
    }

    /// The group a test belongs to, if any.
    pub fn test_group_of(&self, test: TestId) -> Option<TestGroupId> {
        self.test_owners.get(&test).copied()
    }

    /// Add the PDF statement in the specified language.
    pub fn add_pdf_statement<S: Into<String>>(
        &mut self,
        language: S,
        content: Vec<u8>,
    ) -> Result<(), ImportError> {
        let language = language.into();
        if self.pdf_statements.contains_key(&language) {
            return Err(ImportError::DuplicateStatement(language));
        }
        self.pdf_statements.insert(language, content);
        Ok(())
    }

    /// Mark the inputs of a subtask as visible to the contestants.
    pub fn add_visible_input_subtask(&mut self, subtask: u32) {
        if !self.visible_input_subtasks.contains(&subtask) {
            self.visible_input_subtasks.push(subtask);
        }
    }

    /// Set the olympiad the task comes from.
    pub fn set_origin_olympiad<S: Into<String>>(&mut self, olympiad: S) {
        self.origin_olympiad = Some(olympiad.into());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;

    use super::*;

    fn task_with_tests(num: usize) -> Task {
        let mut task = Task::new("The Task").unwrap();
        for i in 0..num {
            task.add_test(format!("in{i}").into_bytes(), format!("out{i}").into_bytes());
        }
        task
    }

    #[test]
    fn test_empty_title() {
        assert_that!(Task::new("  ")).is_err();
    }

    #[test]
    fn test_ids_start_from_one() {
        let mut task = task_with_tests(2);
        assert_eq!(task.add_test(vec![], vec![]), 3);
        assert_eq!(task.test(1).unwrap().files.input, b"in0");
        assert_that!(task.test(0)).is_none();
        assert_that!(task.test(4)).is_none();
    }

    #[test]
    fn test_assign_filename() {
        let mut task = task_with_tests(1);
        assert!(task.assign_filename_to_test("001_1", 1));
        assert!(!task.assign_filename_to_test("002_1", 2));
        assert_eq!(task.test(1).unwrap().filename.as_deref(), Some("001_1"));
    }

    #[test]
    fn test_groups_are_sorted() {
        let mut task = task_with_tests(3);
        task.add_test_group_with_id(3, 10, false, vec![3], 2).unwrap();
        task.add_test_group_with_id(1, 5, true, vec![1, 2], 1).unwrap();
        let ids: Vec<_> = task.test_groups.keys().copied().collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(task.test_group_of(2), Some(1));
        assert_eq!(task.test_group_of(3), Some(3));
    }

    #[test]
    fn test_empty_group() {
        let mut task = task_with_tests(0);
        task.add_test_group_with_id(1, 5, false, vec![], 1).unwrap();
        assert_that!(task.test_groups[&1].tests).is_empty();
    }

    #[test]
    fn test_duplicate_group() {
        let mut task = task_with_tests(2);
        task.add_test_group_with_id(1, 5, false, vec![1], 1).unwrap();
        let err = task.add_test_group_with_id(1, 5, false, vec![2], 1);
        assert!(matches!(err, Err(ImportError::DuplicateTestGroup(1))));
    }

    #[test]
    fn test_unknown_test() {
        let mut task = task_with_tests(1);
        let err = task.add_test_group_with_id(1, 5, false, vec![1, 2], 1);
        assert!(matches!(
            err,
            Err(ImportError::UnknownTest { group: 1, test: 2 })
        ));
        assert!(task.test_groups.is_empty());
    }

    #[test]
    fn test_test_in_two_groups() {
        let mut task = task_with_tests(2);
        task.add_test_group_with_id(1, 5, false, vec![1], 1).unwrap();
        let err = task.add_test_group_with_id(2, 5, false, vec![2, 1], 1);
        assert!(matches!(
            err,
            Err(ImportError::TestInMultipleGroups {
                test: 1,
                first: 1,
                second: 2
            })
        ));
        assert_eq!(task.test_group_of(2), None);
    }

    #[test]
    fn test_statements() {
        let mut task = task_with_tests(0);
        task.add_pdf_statement("lv", b"%PDF".to_vec()).unwrap();
        assert_that!(task.add_pdf_statement("lv", vec![])).is_err();
        assert_eq!(task.pdf_statements["lv"], b"%PDF");
    }

    #[test]
    fn test_visible_input_subtasks() {
        let mut task = task_with_tests(0);
        task.add_visible_input_subtask(1);
        task.add_visible_input_subtask(1);
        assert_eq!(task.visible_input_subtasks, vec![1]);
    }
}
