//! Multipart upload to the analysis service with byte-level progress.
//!
//! File parts are streamed in fixed-size chunks; each chunk reports
//! progress as the transport pulls it, so 100% means every file byte was
//! handed to the connection, not that a response arrived.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use plotmap_core::{content_type_for_name, AnalysisResponse, InputFile, RequestId, Submission};
use plotmap_logging::{plot_debug, plot_info};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode, Url};

use crate::{EngineEvent, UploadError, UploadProgress};

/// Repeated multipart field carrying the geometry files.
pub const PLOT_FILES_FIELD: &str = "plotFiles";
/// Single multipart field carrying the sample table.
pub const SAMPLE_FILE_FIELD: &str = "sampleFile";

const UPLOAD_PATH: &str = "upload";

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub api_base: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            chunk_size: 64 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn submit(
        &self,
        request_id: RequestId,
        submission: &Submission,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<AnalysisResponse, UploadError>;
}

/// `{api_base}upload`, tolerating a base without trailing slash.
pub fn upload_endpoint(api_base: &str) -> Result<Url, UploadError> {
    let mut base = Url::parse(api_base.trim())
        .map_err(|err| UploadError::Transport(format!("invalid api url '{api_base}': {err}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(UPLOAD_PATH)
        .map_err(|err| UploadError::Transport(format!("invalid api url '{api_base}': {err}")))
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, UploadError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| UploadError::Transport(err.to_string()))
    }

    fn build_form(&self, submission: &Submission, counter: &Arc<ByteCounter>) -> Result<Form, UploadError> {
        let mut form = Form::new();
        for file in &submission.plot_files {
            form = form.part(PLOT_FILES_FIELD, self.counted_part(file, counter)?);
        }
        form = form.part(
            SAMPLE_FILE_FIELD,
            self.counted_part(&submission.sample_file, counter)?,
        );
        Ok(form)
    }

    fn counted_part(&self, file: &InputFile, counter: &Arc<ByteCounter>) -> Result<Part, UploadError> {
        let chunks = split_chunks(file.content(), self.settings.chunk_size);
        let counter = Arc::clone(counter);
        let stream = futures_util::stream::iter(chunks).map(move |chunk| {
            counter.advance(chunk.len() as u64);
            Ok::<Bytes, std::io::Error>(chunk)
        });
        Part::stream_with_length(Body::wrap_stream(stream), file.len())
            .file_name(file.name().to_string())
            .mime_str(content_type_for_name(file.name()))
            .map_err(|err| UploadError::Transport(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn submit(
        &self,
        request_id: RequestId,
        submission: &Submission,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<AnalysisResponse, UploadError> {
        let endpoint = upload_endpoint(&self.settings.api_base)?;
        let client = self.build_client()?;
        let counter = Arc::new(ByteCounter::new(request_id, submission.total_bytes(), sink));
        let form = self.build_form(submission, &counter)?;

        plot_info!(
            "POST {} ({} bytes of file content)",
            endpoint,
            submission.total_bytes()
        );
        counter.advance(0);
        let response = client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        counter.finish();

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        plot_debug!("upload {} answered {} ({} bytes)", request_id, status, body.len());
        parse_upload_response(status, &body)
    }
}

/// Interprets the service answer; an `error` field wins over any status.
pub(crate) fn parse_upload_response(
    status: StatusCode,
    body: &[u8],
) -> Result<AnalysisResponse, UploadError> {
    let failed_status = || {
        UploadError::Service(format!(
            "Request failed with status code {}",
            status.as_u16()
        ))
    };
    match serde_json::from_slice::<AnalysisResponse>(body) {
        Ok(AnalysisResponse {
            error: Some(message),
            ..
        }) => Err(UploadError::Service(message)),
        Ok(response) if status.is_success() => Ok(response),
        Ok(_) => Err(failed_status()),
        Err(err) if status.is_success() => Err(UploadError::Service(format!(
            "malformed response from analysis service: {err}"
        ))),
        Err(_) => Err(failed_status()),
    }
}

fn split_chunks(content: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..content.len())
        .step_by(chunk_size)
        .map(|start| content.slice(start..(start + chunk_size).min(content.len())))
        .collect()
}

/// Shared across all parts of one request; emits cumulative progress.
///
/// File bytes handed to the transport are not the whole request, so the
/// reported count stays one byte short of the total until the service answers.
struct ByteCounter {
    request_id: RequestId,
    total: u64,
    loaded: AtomicU64,
    sink: Arc<dyn ProgressSink>,
}

impl ByteCounter {
    fn new(request_id: RequestId, total: u64, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            request_id,
            total,
            loaded: AtomicU64::new(0),
            sink,
        }
    }

    fn advance(&self, bytes: u64) {
        let loaded = self.loaded.fetch_add(bytes, Ordering::AcqRel) + bytes;
        self.emit(loaded.min(self.total.saturating_sub(1)));
    }

    fn finish(&self) {
        self.emit(self.total);
    }

    fn emit(&self, loaded: u64) {
        self.sink.emit(EngineEvent::UploadProgress(UploadProgress {
            request_id: self.request_id,
            loaded,
            total: self.total,
        }));
    }
}
