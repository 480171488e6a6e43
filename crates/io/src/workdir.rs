//! Scoped staging directory for one run's outputs.
//!
//! Artifacts are written into a hidden temporary directory inside the
//! output directory and moved into place only by [`StagingDir::commit`].
//! A staging directory dropped without commit is removed with everything in
//! it, so a failed run never leaves a partial output set behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::IoError;

const STAGING_PREFIX: &str = ".aiglist-staging-";
const PREVIOUS_DIR: &str = ".previous";

#[derive(Debug)]
pub struct StagingDir {
    out_dir: PathBuf,
    temp: TempDir,
}

impl StagingDir {
    /// Create `out_dir` if needed and a fresh staging directory inside it.
    pub fn new(out_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(out_dir).map_err(|e| IoError::output(out_dir, e))?;
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(out_dir)
            .map_err(|e| IoError::output(out_dir, e))?;
        debug!(staging = %temp.path().display(), "created staging dir");
        Ok(Self { out_dir: out_dir.to_path_buf(), temp })
    }

    /// Staging path for an output file name.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.temp.path().join(file_name)
    }

    pub fn write(&self, file_name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf, IoError> {
        let path = self.path(file_name);
        fs::write(&path, contents).map_err(|e| IoError::output(&path, e))?;
        Ok(path)
    }

    /// Move every staged file into the output directory, replacing files of
    /// the same name, and delete `stale` outputs this run did not produce.
    /// Returns the final paths in file-name order.
    ///
    /// Replaced files are set aside first. If any move fails, the files
    /// already moved are taken out again and the set-aside files restored,
    /// so the output directory keeps its previous contents.
    pub fn commit(self, stale: &[&str]) -> Result<Vec<PathBuf>, IoError> {
        let mut staged: Vec<PathBuf> = fs::read_dir(self.temp.path())
            .map_err(|e| IoError::output(self.temp.path(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        staged.sort();

        let previous = self.temp.path().join(PREVIOUS_DIR);
        fs::create_dir(&previous).map_err(|e| IoError::output(&previous, e))?;

        let mut moves = Moves::default();
        for from in &staged {
            if let Err(err) = self.move_into_place(from, &previous, &mut moves) {
                moves.roll_back(&self.out_dir, &previous);
                return Err(err);
            }
        }

        for name in stale {
            let path = self.out_dir.join(name);
            if path.is_file() && !moves.committed.contains(&path) {
                fs::remove_file(&path).map_err(|e| IoError::output(&path, e))?;
                debug!(path = %path.display(), "removed stale output");
            }
        }

        Ok(moves.committed)
    }

    fn move_into_place(&self, from: &Path, previous: &Path, moves: &mut Moves) -> Result<(), IoError> {
        let Some(name) = from.file_name() else {
            return Ok(());
        };
        let to = self.out_dir.join(name);
        if to.is_file() {
            let kept = previous.join(name);
            fs::rename(&to, &kept).map_err(|e| IoError::output(&to, e))?;
            moves.replaced.push(name.to_os_string());
        }
        fs::rename(from, &to).map_err(|e| IoError::output(&to, e))?;
        moves.committed.push(to);
        Ok(())
    }
}

/// Bookkeeping for one commit.
#[derive(Default)]
struct Moves {
    committed: Vec<PathBuf>,
    replaced: Vec<OsString>,
}

impl Moves {
    fn roll_back(&self, out_dir: &Path, previous: &Path) {
        for path in &self.committed {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), "rollback could not remove output: {e}");
            }
        }
        for name in &self.replaced {
            let to = out_dir.join(name);
            if let Err(e) = fs::rename(previous.join(name), &to) {
                warn!(path = %to.display(), "rollback could not restore output: {e}");
            }
        }
    }
}
