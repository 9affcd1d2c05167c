//! Whole-file atomic replacement
//!
//! Artifacts are written to a temporary file in the destination directory and
//! renamed over the target, so readers see either the old or the new file.
//!
//! Files that must change together are staged first and committed as a group
//! ([`stage_bytes`] + [`commit_all`]); a failed commit restores every target
//! already replaced.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::{Error, Result};

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace `path` with the bytes produced by `write`.
///
/// Parent directories are created as needed. On error the target is left
/// untouched and the temporary file is removed.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = target_dir(path);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Replace `path` with `bytes`
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic(path, |file| {
        file.write_all(bytes)?;
        Ok(())
    })
}

/// Fully written temporary file waiting to replace its target
pub struct StagedFile {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Write `bytes` next to `path` without touching `path` itself
pub fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<StagedFile> {
    let dir = target_dir(path);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(StagedFile {
        target: path.to_path_buf(),
        tmp,
    })
}

/// Rename every staged file over its target, in order.
///
/// If any rename fails, targets replaced so far get their previous content
/// back (or are removed if they did not exist) and the rename error is
/// returned. Staged files not yet committed are deleted.
pub fn commit_all(staged: Vec<StagedFile>) -> Result<()> {
    let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());

    for file in staged {
        let previous = if file.target.is_file() {
            Some(fs::read(&file.target)?)
        } else {
            None
        };

        if let Err(e) = file.tmp.persist(&file.target) {
            rollback(committed);
            return Err(Error::Io(e.error));
        }
        committed.push((file.target, previous));
    }
    Ok(())
}

fn rollback(committed: Vec<(PathBuf, Option<Vec<u8>>)>) {
    for (target, previous) in committed.into_iter().rev() {
        let restored = match &previous {
            Some(bytes) => write_bytes_atomic(&target, bytes),
            None => fs::remove_file(&target).map_err(Error::from),
        };
        if let Err(e) = restored {
            warn!("Could not roll back {}: {}", target.display(), e);
        }
    }
}
