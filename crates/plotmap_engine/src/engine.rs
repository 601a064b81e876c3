use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use plotmap_core::{RequestId, Submission};

use crate::download::download_overlay;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::upload::{ChannelProgressSink, ProgressSink, ReqwestUploader, UploadSettings, Uploader};
use crate::{EngineEvent, Generation};

enum EngineCommand {
    Upload {
        request_id: RequestId,
        submission: Submission,
    },
    FetchOverlay {
        generation: Generation,
        url: String,
    },
    Download {
        url: String,
        dir: PathBuf,
    },
}

/// Runs network work on a background runtime; results come back as events.
///
/// Every command produces exactly one completion event.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Overlays are fetched under `fetch`; downloads keep its limits but
    /// accept any content type.
    pub fn new(upload: UploadSettings, fetch: FetchSettings) -> std::io::Result<Self> {
        let downloader = Arc::new(ReqwestFetcher::new(fetch.for_download()));
        Self::with_backends(
            Arc::new(ReqwestUploader::new(upload)),
            Arc::new(ReqwestFetcher::new(fetch)),
            downloader,
        )
    }

    pub fn with_backends(
        uploader: Arc<dyn Uploader>,
        fetcher: Arc<dyn Fetcher>,
        downloader: Arc<dyn Fetcher>,
    ) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("plotmap-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let uploader = uploader.clone();
                    let fetcher = fetcher.clone();
                    let downloader = downloader.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(uploader, fetcher, downloader, command, event_tx).await;
                    });
                }
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, request_id: RequestId, submission: Submission) {
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            request_id,
            submission,
        });
    }

    pub fn fetch_overlay(&self, generation: Generation, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchOverlay {
            generation,
            url: url.into(),
        });
    }

    pub fn download(&self, url: impl Into<String>, dir: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            url: url.into(),
            dir: dir.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    uploader: Arc<dyn Uploader>,
    fetcher: Arc<dyn Fetcher>,
    downloader: Arc<dyn Fetcher>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Upload {
            request_id,
            submission,
        } => {
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let result = uploader.submit(request_id, &submission, sink).await;
            EngineEvent::UploadCompleted { request_id, result }
        }
        EngineCommand::FetchOverlay { generation, url } => {
            let result = fetcher.fetch(&url).await;
            EngineEvent::OverlayFetched {
                generation,
                url,
                result,
            }
        }
        EngineCommand::Download { url, dir } => {
            let result = download_overlay(downloader.as_ref(), &url, &dir).await;
            EngineEvent::DownloadCompleted { url, result }
        }
    };
    let _ = event_tx.send(event);
}
