use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ragdb_core::error::{Error, Result};

/// A fully written and synced sibling of `target`, waiting to replace it.
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    /// Write `bytes` next to `target` under a `.tmp` name and sync it to disk.
    /// `target` itself is not touched; a failed write removes the temp file.
    pub fn stage(target: &Path, bytes: &[u8]) -> Result<Self> {
        let temp = temp_path(target);
        let written = File::create(&temp).and_then(|file| {
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
            writer.get_ref().sync_all()
        });
        match written {
            Ok(()) => Ok(Self { temp, target: target.to_path_buf() }),
            Err(e) => {
                let _ = fs::remove_file(&temp);
                Err(Error::persistence(&temp, e))
            }
        }
    }

    /// Atomically replace the target with the staged content. On failure the
    /// temp file is removed and the target keeps its previous content.
    pub fn commit(self) -> Result<()> {
        fs::rename(&self.temp, &self.target).map_err(|e| {
            let _ = fs::remove_file(&self.temp);
            Error::persistence(&self.target, e)
        })
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Make completed renames in `dir` durable. Not every platform lets a
/// directory be opened for syncing, so failures are ignored.
pub fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

/// Stage `bytes` and replace `target` in one step.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    StagedFile::stage(target, bytes)?.commit()?;
    if let Some(parent) = target.parent() {
        sync_dir(parent);
    }
    Ok(())
}
