use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use plotmap_logging::plot_info;
use tempfile::NamedTempFile;

use crate::{DownloadError, Fetcher, PersistError};

/// File name the downloaded overlay is saved under.
pub const DOWNLOAD_FILENAME: &str = "interpolation.svg";

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a sibling temp file and a rename, so a
/// failed write never leaves a truncated file behind.
pub fn write_atomically(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    ensure_output_dir(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target)
}

/// GETs the overlay and saves the raw bytes as [`DOWNLOAD_FILENAME`] in `dir`.
pub async fn download_overlay(
    fetcher: &dyn Fetcher,
    url: &str,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let output = fetcher.fetch(url).await?;
    let path = write_atomically(dir, DOWNLOAD_FILENAME, &output.bytes)?;
    plot_info!("saved {} bytes from {} to {:?}", output.bytes.len(), url, path);
    Ok(path)
}
