use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use plotmap_core::{update, AnalysisError, AppState, AppViewModel, Effect, Msg, Notification};
use plotmap_engine::{
    BitmapStore, DownloadError, EngineEvent, EngineHandle, MapSurface, OverlayManager,
    OverlayOutcome, UploadError, VectorLayerRenderer,
};
use plotmap_logging::{plot_debug, plot_info, plot_warn};

/// Owns the state, the map and everything attached to it, and runs effects.
///
/// Single-threaded: engine events are only applied from [`Session::pump`].
pub struct Session<M: MapSurface, B: BitmapStore> {
    state: AppState,
    engine: EngineHandle,
    overlay: OverlayManager<B>,
    vectors: VectorLayerRenderer,
    map: M,
    output_dir: PathBuf,
    notifications: Vec<Notification>,
    pending: usize,
}

impl<M: MapSurface, B: BitmapStore> Session<M, B> {
    pub fn new(engine: EngineHandle, map: M, store: B, output_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(),
            engine,
            overlay: OverlayManager::new(store),
            vectors: VectorLayerRenderer::new(),
            map,
            output_dir,
            notifications: Vec::new(),
            pending: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn overlay(&self) -> &OverlayManager<B> {
        &self.overlay
    }

    /// Engine commands whose completion has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// The view model, if anything changed since the last call.
    pub fn take_render(&mut self) -> Option<AppViewModel> {
        if self.state.consume_dirty() {
            Some(self.state.view())
        } else {
            None
        }
    }

    /// Runs `msg` through `update` and executes the resulting effects.
    /// Effects that fail synchronously feed their messages back in.
    pub fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect) {
                    inbox.push_back(follow_up);
                }
            }
        }
    }

    /// Applies at most one engine event, waiting up to `timeout` for it.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        match self.engine.recv_timeout(timeout) {
            Some(event) => {
                if let Some(msg) = self.on_engine_event(event) {
                    self.dispatch(msg);
                }
                true
            }
            None => false,
        }
    }

    /// Pumps until no engine command is outstanding; false on timeout.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.pump(remaining) {
                return false;
            }
        }
        true
    }

    /// Releases the overlay and vector layers; late completions are ignored.
    pub fn teardown(&mut self) {
        self.dispatch(Msg::Teardown);
        self.overlay.teardown(&mut self.map);
    }

    fn run_effect(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::Upload {
                request_id,
                submission,
            } => {
                self.pending += 1;
                self.engine.upload(request_id, submission);
            }
            Effect::ShowOverlay { url, bounds } => {
                match self.overlay.begin(&mut self.map, &url, bounds) {
                    Ok(ticket) => {
                        self.pending += 1;
                        self.engine.fetch_overlay(ticket.generation, ticket.url);
                    }
                    Err(err) => {
                        return Some(Msg::OverlayFailed {
                            url,
                            message: err.to_string(),
                        })
                    }
                }
            }
            Effect::ReleaseOverlay => self.overlay.release(&mut self.map),
            Effect::FitBounds(bounds) => {
                plot_debug!("fitting map to {:?}", bounds);
                self.map.fit_bounds(bounds);
            }
            Effect::RenderVectors(collection) => {
                let drawn = self.vectors.render(&mut self.map, collection.as_ref());
                plot_debug!("{} vector layer(s) drawn", drawn);
            }
            Effect::Download { url } => {
                self.pending += 1;
                self.engine.download(url, self.output_dir.clone());
            }
            Effect::Notify(notification) => self.notifications.push(notification),
        }
        None
    }

    fn on_engine_event(&mut self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::UploadProgress(progress) => Some(Msg::UploadProgress {
                request_id: progress.request_id,
                loaded: progress.loaded,
                total: progress.total,
            }),
            EngineEvent::UploadCompleted { request_id, result } => {
                self.complete_command();
                Some(Msg::UploadFinished {
                    request_id,
                    result: result.map_err(upload_failure),
                })
            }
            EngineEvent::OverlayFetched {
                generation,
                url,
                result,
            } => {
                self.complete_command();
                let fetched = match &result {
                    Ok(output) => Ok(&output.bytes[..]),
                    Err(err) => Err(err.to_string()),
                };
                match self.overlay.complete(&mut self.map, generation, fetched) {
                    OverlayOutcome::Attached { layer } => {
                        plot_info!("overlay layer {} shown", layer);
                        None
                    }
                    OverlayOutcome::Stale => None,
                    OverlayOutcome::Failed(err) => Some(Msg::OverlayFailed {
                        url,
                        message: err.to_string(),
                    }),
                }
            }
            EngineEvent::DownloadCompleted { url, result } => {
                self.complete_command();
                if let Err(err) = &result {
                    plot_warn!("download of {} failed: {}", url, err);
                }
                Some(Msg::DownloadFinished(result.map_err(download_failure)))
            }
        }
    }

    fn complete_command(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

impl<M: MapSurface, B: BitmapStore> Drop for Session<M, B> {
    fn drop(&mut self) {
        self.vectors.clear(&mut self.map);
        self.overlay.teardown(&mut self.map);
    }
}

fn upload_failure(err: UploadError) -> AnalysisError {
    match err {
        UploadError::Transport(message) => AnalysisError::Transport(message),
        UploadError::Service(message) => AnalysisError::Service(message),
    }
}

fn download_failure(err: DownloadError) -> AnalysisError {
    AnalysisError::Download(err.to_string())
}
