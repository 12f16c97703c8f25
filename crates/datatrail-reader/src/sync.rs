//! Remote mirroring collaborator interface.
//!
//! The reader itself never talks to the collection host; it only needs a
//! valid index + data pair on the local filesystem. Fetching that mirror
//! is delegated to a [`RemoteSync`] implementation (in production, a
//! wrapper around a file-transfer tool). The trait is the boundary: this
//! crate consumes it and ships no production implementation.

use std::ops::Range;
use std::path::{Path, PathBuf};

use datatrail_storage::FilePair;

use crate::error::Result;

/// Lists and fetches remote log files into a local mirror.
pub trait RemoteSync {
    /// Relative paths of the files under `path` on the remote side.
    fn list_directory(&self, path: &Path) -> std::io::Result<Vec<PathBuf>>;

    /// Copy a remote file to `local`, optionally restricted to a byte
    /// range. Returns the number of bytes written.
    fn fetch(&self, remote: &Path, local: &Path, range: Option<Range<u64>>)
        -> std::io::Result<u64>;

    /// Continue a previous fetch from the local file's current length.
    /// Returns the number of bytes appended.
    fn resume_fetch(&self, remote: &Path, local: &Path) -> std::io::Result<u64>;
}

/// Mirror a remote directory and resolve the file pairs it contains.
///
/// Uses `resume_fetch` so a rerun only transfers what grew since the last
/// mirror — both halves of a pair are append-only on the remote side.
pub fn mirror_pairs<R: RemoteSync>(
    remote: &R,
    remote_dir: &Path,
    local_dir: &Path,
) -> Result<Vec<FilePair>> {
    std::fs::create_dir_all(local_dir)?;

    let mut pairs: Vec<FilePair> = Vec::new();
    for rel in remote.list_directory(remote_dir)? {
        let local = local_dir.join(&rel);
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        remote.resume_fetch(&remote_dir.join(&rel), &local)?;

        if let Some(pair) = FilePair::from_either(&local) {
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Test double: "remote" is just another local directory.
    struct LocalMirror;

    impl RemoteSync for LocalMirror {
        fn list_directory(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
            let mut out = Vec::new();
            for entry in fs::read_dir(path)? {
                out.push(PathBuf::from(entry?.file_name()));
            }
            out.sort();
            Ok(out)
        }

        fn fetch(
            &self,
            remote: &Path,
            local: &Path,
            range: Option<Range<u64>>,
        ) -> std::io::Result<u64> {
            let bytes = fs::read(remote)?;
            let bytes = match range {
                Some(r) => bytes[r.start as usize..(r.end as usize).min(bytes.len())].to_vec(),
                None => bytes,
            };
            fs::write(local, &bytes)?;
            Ok(bytes.len() as u64)
        }

        fn resume_fetch(&self, remote: &Path, local: &Path) -> std::io::Result<u64> {
            let offset = match fs::metadata(local) {
                Ok(m) => m.len(),
                Err(_) => 0,
            };
            let bytes = fs::read(remote)?;
            let tail = &bytes[(offset as usize).min(bytes.len())..];
            use std::io::Write;
            let mut f = fs::OpenOptions::new().create(true).append(true).open(local)?;
            f.write_all(tail)?;
            Ok(tail.len() as u64)
        }
    }

    #[test]
    fn mirrors_pairs_and_resumes_grown_files() {
        let remote_dir = TempDir::new().unwrap();
        let local_dir = TempDir::new().unwrap();

        fs::write(remote_dir.path().join("alice.idx"), "0 5\n").unwrap();
        fs::write(remote_dir.path().join("alice.dat"), "hello").unwrap();

        let pairs = mirror_pairs(&LocalMirror, remote_dir.path(), local_dir.path()).unwrap();
        assert_eq!(pairs.len(), 1, "idx and dat resolve to one pair");
        assert_eq!(
            fs::read(local_dir.path().join("alice.dat")).unwrap(),
            b"hello"
        );

        // The remote log grows; a rerun transfers only the tail.
        fs::write(remote_dir.path().join("alice.idx"), "0 5\n5 6\n").unwrap();
        fs::write(remote_dir.path().join("alice.dat"), "helloworld!").unwrap();

        mirror_pairs(&LocalMirror, remote_dir.path(), local_dir.path()).unwrap();
        assert_eq!(
            fs::read(local_dir.path().join("alice.dat")).unwrap(),
            b"helloworld!"
        );
        assert_eq!(
            fs::read_to_string(local_dir.path().join("alice.idx")).unwrap(),
            "0 5\n5 6\n"
        );
    }
}
