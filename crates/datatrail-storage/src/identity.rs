//! Upload identity → file pair mapping.
//!
//! Identity components become file and directory names, so they are
//! validated against path traversal before any path is built.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pair::FilePair;

/// Selects which index + data file pair an append targets.
///
/// The minimal form is a user identifier; the extended form adds a course
/// namespace that becomes a directory prefix:
///
/// ```text
/// <data_dir>/<user>.idx              (no course)
/// <data_dir>/<course>/<user>.idx     (with course)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogIdentity {
    user: String,
    course: Option<String>,
}

impl LogIdentity {
    /// Build an identity, rejecting components unsafe to use as file names.
    pub fn new(user: impl Into<String>, course: Option<String>) -> Result<Self> {
        let user = user.into();
        validate_component(&user)?;
        if let Some(ref course) = course {
            validate_component(course)?;
        }
        Ok(Self { user, course })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn course(&self) -> Option<&str> {
        self.course.as_deref()
    }

    /// Resolve this identity's file pair under the given data directory.
    pub fn file_pair(&self, data_dir: &Path) -> FilePair {
        let dir = match self.course {
            Some(ref course) => data_dir.join(course),
            None => data_dir.to_path_buf(),
        };
        FilePair::new(
            dir.join(format!("{}.idx", self.user)),
            dir.join(format!("{}.dat", self.user)),
        )
    }

    /// Directory holding this identity's file pair.
    pub fn dir(&self, data_dir: &Path) -> PathBuf {
        match self.course {
            Some(ref course) => data_dir.join(course),
            None => data_dir.to_path_buf(),
        }
    }
}

/// Identity components are used verbatim as file names, so anything that
/// could escape the data directory is rejected outright.
fn validate_component(s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(Error::InvalidIdentity("empty component".to_string()));
    }
    if s.starts_with('.') {
        return Err(Error::InvalidIdentity(format!(
            "component starts with '.': {s:?}"
        )));
    }
    if s.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidIdentity(format!(
            "component contains a path separator: {s:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_usernames() {
        assert!(LogIdentity::new("alice", None).is_ok());
        assert!(LogIdentity::new("john.doe", None).is_ok());
        assert!(LogIdentity::new("bob", Some("algo-101".to_string())).is_ok());
    }

    #[test]
    fn rejects_traversal_attempts() {
        assert!(LogIdentity::new("", None).is_err());
        assert!(LogIdentity::new("..", None).is_err());
        assert!(LogIdentity::new(".hidden", None).is_err());
        assert!(LogIdentity::new("a/b", None).is_err());
        assert!(LogIdentity::new("a\\b", None).is_err());
        assert!(LogIdentity::new("ok", Some("../escape".to_string())).is_err());
    }

    #[test]
    fn maps_to_file_pair_paths() {
        let id = LogIdentity::new("alice", None).unwrap();
        let pair = id.file_pair(Path::new("/data"));
        assert_eq!(pair.index_path(), Path::new("/data/alice.idx"));
        assert_eq!(pair.data_path(), Path::new("/data/alice.dat"));

        let id = LogIdentity::new("alice", Some("rust-201".to_string())).unwrap();
        let pair = id.file_pair(Path::new("/data"));
        assert_eq!(pair.index_path(), Path::new("/data/rust-201/alice.idx"));
    }
}
