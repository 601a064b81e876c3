use std::path::Path;

use bytes::Bytes;

use crate::ValidationError;

/// A user-supplied file: its display name and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    name: String,
    content: Bytes,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Lower-cased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        lowercase_extension(&self.name)
    }
}

pub(crate) fn lowercase_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Pending submission: the geometry bundle and the sample table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSlots {
    geometry: Vec<InputFile>,
    sample: Option<InputFile>,
}

impl InputSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry_files(&self) -> &[InputFile] {
        &self.geometry
    }

    pub fn sample_file(&self) -> Option<&InputFile> {
        self.sample.as_ref()
    }

    pub(crate) fn replace_geometry(&mut self, files: Vec<InputFile>) {
        debug_assert!(!files.is_empty());
        self.geometry = files;
    }

    pub(crate) fn replace_sample(&mut self, file: InputFile) {
        self.sample = Some(file);
    }

    /// Packages both slots for upload; fails without touching the network
    /// when either slot is empty.
    pub fn submission(&self) -> Result<Submission, ValidationError> {
        if self.geometry.is_empty() {
            return Err(ValidationError::MissingPlotFiles);
        }
        let sample_file = self
            .sample
            .clone()
            .ok_or(ValidationError::MissingSampleFile)?;
        Ok(Submission {
            plot_files: self.geometry.clone(),
            sample_file,
        })
    }
}

/// A validated upload request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub plot_files: Vec<InputFile>,
    pub sample_file: InputFile,
}

impl Submission {
    /// Bytes of file content carried by the request.
    pub fn total_bytes(&self) -> u64 {
        self.plot_files.iter().map(InputFile::len).sum::<u64>() + self.sample_file.len()
    }
}
