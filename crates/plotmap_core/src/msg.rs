use std::path::PathBuf;

use crate::{AnalysisError, AnalysisResponse, InputFile, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Files dropped onto (or selected in) the drop zone, as one event.
    FilesDropped(Vec<InputFile>),
    /// User clicked "Upload & Analyze".
    SubmitClicked,
    /// Request-body bytes handed to the transport.
    UploadProgress {
        request_id: RequestId,
        loaded: u64,
        total: u64,
    },
    /// Terminal outcome of an upload; always delivered once per request.
    UploadFinished {
        request_id: RequestId,
        result: Result<AnalysisResponse, AnalysisError>,
    },
    /// The current overlay could not be fetched or materialized.
    OverlayFailed { url: String, message: String },
    /// User clicked "Download".
    DownloadClicked,
    /// Download effect finished.
    DownloadFinished(Result<PathBuf, AnalysisError>),
    /// Session is ending; release everything held on the map.
    Teardown,
}
