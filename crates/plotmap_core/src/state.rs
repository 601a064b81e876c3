use crate::view_model::AppViewModel;
use crate::{
    classify, AnalysisResult, BoundingBox, BoundsController, ClassifyOutcome, InputFile,
    InputSlots, RequestId, UploadState,
};

/// The single in-memory analysis session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    slots: InputSlots,
    upload: Option<UploadState>,
    next_request_id: RequestId,
    result: Option<AnalysisResult>,
    bounds: BoundingBox,
    bounds_controller: BoundsController,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            plot_files: self
                .slots
                .geometry_files()
                .iter()
                .map(|file| file.name().to_string())
                .collect(),
            sample_file: self.slots.sample_file().map(|file| file.name().to_string()),
            uploading: self.upload.is_some(),
            progress: self.upload.map_or(0, |upload| upload.percent_complete()),
            analysis_done: self.result.as_ref().is_some_and(AnalysisResult::is_complete),
            overlay_url: self
                .result
                .as_ref()
                .and_then(|result| result.overlay_url().map(ToOwned::to_owned)),
            bounds: self.bounds,
            warnings: self
                .result
                .as_ref()
                .map(|result| result.warnings().to_vec())
                .unwrap_or_default(),
            dirty: self.dirty,
        }
    }

    pub fn slots(&self) -> &InputSlots {
        &self.slots
    }

    pub fn upload(&self) -> Option<&UploadState> {
        self.upload.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload.is_some()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Returns and clears the re-render flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Back to an empty session. Request ids keep counting so that an
    /// outcome of a request sent before the reset is never mistaken for a new one.
    pub(crate) fn reset(&mut self) {
        let next_request_id = self.next_request_id;
        *self = Self {
            next_request_id,
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn classify_drop(&mut self, files: Vec<InputFile>) -> ClassifyOutcome {
        let outcome = classify(&mut self.slots, files);
        if outcome.changed() {
            self.mark_dirty();
        }
        outcome
    }

    pub(crate) fn begin_upload(&mut self) -> RequestId {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.upload = Some(UploadState::new(request_id));
        self.mark_dirty();
        request_id
    }

    pub(crate) fn record_progress(&mut self, request_id: RequestId, loaded: u64, total: u64) {
        if let Some(upload) = self.upload.as_mut() {
            if upload.record(request_id, loaded, total) {
                self.dirty = true;
            }
        }
    }

    /// Clears the in-flight upload if `request_id` is the active one.
    pub(crate) fn finish_upload(&mut self, request_id: RequestId) -> bool {
        match self.upload {
            Some(upload) if upload.request_id() == request_id => {
                self.upload = None;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Swaps in a new result and returns the previous one.
    pub(crate) fn replace_result(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        self.bounds = result.bounding_box();
        self.mark_dirty();
        self.result.replace(result)
    }

    pub(crate) fn bounds_controller_mut(&mut self) -> &mut BoundsController {
        &mut self.bounds_controller
    }
}
