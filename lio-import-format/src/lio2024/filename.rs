//! Parsing of the names of the test files inside a lio2024 tests archive.
//!
//! The names look like `kp.i00`, `kp.o00`, `kp.i01a`, `kp.o01a`, `kp.i01b`, ...: the task name,
//! a dot, the role (`i` for the input, `o` for the answer), the group number and an optional
//! lowercase letter numbering the tests inside the same group (`a` is the first one).

use std::fmt;
use std::str::FromStr;

use crate::ImportError;

/// Whether a test file holds the input or the answer of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestFileRole {
    /// The `i` files.
    Input,
    /// The `o` files.
    Answer,
}

impl TestFileRole {
    /// The character identifying the role in the file extension.
    pub fn as_char(self) -> char {
        match self {
            TestFileRole::Input => 'i',
            TestFileRole::Answer => 'o',
        }
    }
}

/// The information encoded in the name of a test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFileName {
    /// The name of the task, the part before the dot.
    pub task_name: String,
    /// Whether this is an input or an answer file.
    pub role: TestFileRole,
    /// The group number as written in the file name, leading zeros included.
    pub group_digits: String,
    /// The group number.
    pub group: u32,
    /// The letter numbering the test inside its group, if any.
    pub ordinal_letter: Option<char>,
}

impl TestFileName {
    /// The 1-based position of the test inside its group: 1 without a letter, otherwise `a` is 1,
    /// `b` is 2 and so on.
    pub fn ordinal(&self) -> u32 {
        match self.ordinal_letter {
            Some(letter) => letter as u32 - 'a' as u32 + 1,
            None => 1,
        }
    }
}

impl FromStr for TestFileName {
    type Err = ImportError;

    fn from_str(filename: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| ImportError::MalformedFilename {
            filename: filename.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = filename.split('.').collect();
        let [task_name, ext] = parts.as_slice() else {
            return Err(malformed("expected exactly one dot"));
        };

        let mut chars = ext.chars();
        let role = match chars.next() {
            Some('i') => TestFileRole::Input,
            Some('o') => TestFileRole::Answer,
            _ => return Err(malformed("the extension must start with 'i' or 'o'")),
        };
        let rest = chars.as_str();

        let digits_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (group_digits, suffix) = rest.split_at(digits_len);
        if group_digits.is_empty() {
            return Err(malformed("missing the group number"));
        }
        let group = group_digits
            .parse()
            .map_err(|_| malformed("the group number is too big"))?;

        let mut suffix = suffix.chars();
        let ordinal_letter = match (suffix.next(), suffix.next()) {
            (None, _) => None,
            (Some(letter), None) if letter.is_ascii_lowercase() => Some(letter),
            (Some(_), None) => return Err(malformed("the test letter must be lowercase")),
            (Some(_), Some(_)) => return Err(malformed("the test letter must be a single letter")),
        };

        Ok(TestFileName {
            task_name: task_name.to_string(),
            role,
            group_digits: group_digits.to_string(),
            group,
            ordinal_letter,
        })
    }
}

impl fmt::Display for TestFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.task_name,
            self.role.as_char(),
            self.group_digits
        )?;
        if let Some(letter) = self.ordinal_letter {
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}
