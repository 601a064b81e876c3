use std::fs;
use std::path::Path;

use anyhow::Context;
use plotmap_core::InputFile;

/// Loads a file from disk as it would arrive from the drop zone.
pub fn read_input_file(path: &Path) -> anyhow::Result<InputFile> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    let content = fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
    Ok(InputFile::new(name, content))
}

pub fn read_input_files(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<InputFile>> {
    paths.iter().map(|path| read_input_file(path.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_base_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Samples.CSV");
        fs::write(&path, "x,y,v\n").unwrap();

        let file = read_input_file(&path).unwrap();
        assert_eq!(file.name(), "Samples.CSV");
        assert_eq!(file.content().as_ref(), b"x,y,v\n");
        assert_eq!(file.extension().as_deref(), Some("csv"));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = read_input_files(&["/nonexistent/plots.shp"]).unwrap_err();
        assert!(err.to_string().contains("plots.shp"));
    }
}
