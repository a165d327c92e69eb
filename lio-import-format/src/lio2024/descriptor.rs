//! Parsing of the `task.yaml` of a lio2024 task.
//!
//! The interesting part is `tests_groups`: each entry assigns points, a subtask and a visibility
//! to one or more test groups, in a compact form:
//!
//! ```yaml
//! tests_groups:
//!   - groups: [1, 5]     # groups from 1 to 5, inclusive
//!     points: 4
//!     subtask: 1
//!     public: [1, 2]     # only groups 1 and 2 are public
//!   - groups: 6          # just group 6
//!     points: 10
//!     subtask: 2
//!     public: true       # every group of this entry is public
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;

use crate::ImportError;

/// The maximum number of groups a single range selector can span.
pub const MAX_RANGE_LEN: u32 = 1000;

/// The content of the `task.yaml` of a lio2024 task, with the test groups expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct Lio2024Descriptor {
    /// The CPU time limit, in seconds.
    pub cpu_time_limit: f64,
    /// The memory limit, in MiB.
    pub memory_limit: u32,
    /// The short code of the task.
    pub short_name: String,
    /// The full title of the task.
    pub full_task_name: String,
    /// Path of the tests archive, relative to the task directory.
    pub tests_archive: PathBuf,
    /// Path of the checker, relative to the task directory.
    pub checker: Option<PathBuf>,
    /// Path of the interactor, relative to the task directory.
    pub interactor: Option<PathBuf>,
    /// The points of each subtask.
    pub subtask_points: Vec<u32>,
    /// One entry per test group, in the order of `tests_groups`.
    pub test_groups: Vec<TestGroupSpec>,
}

/// The scoring information of a single test group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroupSpec {
    /// The group number, as used in the test file names. Group 0 contains the examples.
    pub group_id: u32,
    /// The points of the group.
    pub points: u32,
    /// Whether the group is public.
    pub public: bool,
    /// The subtask the group contributes to.
    pub subtask: u32,
    /// A free-form comment about the group.
    pub comment: Option<String>,
}

/// A selection of group ids, as written in `groups` and `public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `groups: 3`
    Scalar(u32),
    /// `groups: [3]`
    List([u32; 1]),
    /// `groups: [3, 7]`, from 3 to 7 inclusive, at most [`MAX_RANGE_LEN`] groups.
    Range([u32; 2]),
    /// `public: true`, every group of the entry.
    BoolAll(bool),
}

impl Selector {
    /// Decode a selector from the yaml value, `None` if the shape is not supported.
    fn from_yaml(value: &Value) -> Option<Selector> {
        let as_id = |value: &Value| value.as_u64().and_then(|v| u32::try_from(v).ok());
        match value {
            Value::Bool(all) => Some(Selector::BoolAll(*all)),
            Value::Number(_) => as_id(value).map(Selector::Scalar),
            Value::Sequence(list) => match list.as_slice() {
                [id] => Some(Selector::List([as_id(id)?])),
                [from, to] => {
                    let (from, to) = (as_id(from)?, as_id(to)?);
                    let fits = from <= to && to - from < MAX_RANGE_LEN;
                    fits.then_some(Selector::Range([from, to]))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// The group ids selected, `None` for `BoolAll`.
    fn ids(&self) -> Option<Vec<u32>> {
        match *self {
            Selector::Scalar(id) | Selector::List([id]) => Some(vec![id]),
            Selector::Range([from, to]) => Some((from..=to).collect()),
            Selector::BoolAll(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    time_limit: f64,
    memory_limit: u32,
    #[serde(default)]
    name: String,
    title: String,
    tests_archive: String,
    #[serde(default)]
    checker: Option<String>,
    #[serde(default)]
    interactor: Option<String>,
    #[serde(default)]
    subtask_points: Vec<u32>,
    #[serde(default)]
    tests_groups: Vec<RawTestGroup>,
}

#[derive(Debug, Deserialize)]
struct RawTestGroup {
    groups: Value,
    points: u32,
    #[serde(default)]
    public: Value,
    subtask: u32,
    #[serde(default)]
    comment: Option<String>,
}

impl RawTestGroup {
    /// Expand this entry into one spec per selected group.
    fn expand(&self, entry: usize) -> Result<Vec<TestGroupSpec>, ImportError> {
        let groups = Selector::from_yaml(&self.groups)
            .and_then(|selector| selector.ids())
            .ok_or_else(|| ImportError::UnsupportedGroupEncoding {
                entry,
                value: describe(&self.groups),
            })?;

        let public = match &self.public {
            Value::Null => Selector::BoolAll(false),
            value => {
                Selector::from_yaml(value).ok_or_else(|| ImportError::UnsupportedPublicEncoding {
                    entry,
                    value: describe(value),
                })?
            }
        };
        let all_public = public == Selector::BoolAll(true);
        let public_ids: BTreeSet<u32> = public.ids().unwrap_or_default().into_iter().collect();

        let comment = self.comment.clone().filter(|c| !c.is_empty());
        Ok(groups
            .into_iter()
            .map(|group_id| TestGroupSpec {
                group_id,
                points: self.points,
                public: all_public || public_ids.contains(&group_id),
                subtask: self.subtask,
                comment: comment.clone(),
            })
            .collect())
    }
}

/// Compact, single line, representation of a yaml value for the error messages.
fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim().replace('\n', " "))
        .unwrap_or_else(|_| format!("{:?}", value))
}

/// Parse the content of the `task.yaml` of a lio2024 task.
pub fn parse_descriptor(content: &[u8]) -> Result<Lio2024Descriptor, ImportError> {
    let raw: RawDescriptor = serde_yaml::from_slice(content)
        .map_err(|e| ImportError::io("Failed to deserialize task.yaml", e))?;
    trace!("The raw task.yaml is {:#?}", raw);

    let mut test_groups = Vec::new();
    for (entry, group) in raw.tests_groups.iter().enumerate() {
        test_groups.extend(group.expand(entry)?);
    }

    let path = |path: Option<String>| path.filter(|p| !p.is_empty()).map(PathBuf::from);
    Ok(Lio2024Descriptor {
        cpu_time_limit: raw.time_limit,
        memory_limit: raw.memory_limit,
        short_name: raw.name,
        full_task_name: raw.title,
        tests_archive: raw.tests_archive.into(),
        checker: path(raw.checker),
        interactor: path(raw.interactor),
        subtask_points: raw.subtask_points,
        test_groups,
    })
}
