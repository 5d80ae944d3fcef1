//! Write-to-staging then rename-into-place helpers

use crate::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Hidden, unique sibling of `dest` for staging writes
pub fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple());
    match dest.parent() {
        Some(parent) => parent.join(staged),
        None => PathBuf::from(staged),
    }
}

/// Write a gzip file so that `dest` either does not exist or is complete.
///
/// Concurrent writers of the same `dest` each use their own staging file;
/// the last rename wins and readers never see a partial file.
pub fn write_gz_atomic<F>(dest: &Path, level: Compression, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let staged = staging_path(dest);
    let result: Result<()> = (|| {
        let file = File::create(&staged)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), level);
        write(&mut encoder)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        fs::rename(&staged, dest)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result
}
