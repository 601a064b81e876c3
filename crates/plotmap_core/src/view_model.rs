use crate::BoundingBox;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub plot_files: Vec<String>,
    pub sample_file: Option<String>,
    pub uploading: bool,
    pub progress: u8,
    pub analysis_done: bool,
    pub overlay_url: Option<String>,
    pub bounds: BoundingBox,
    pub warnings: Vec<String>,
    pub dirty: bool,
}
