use plotmap_logging::{plot_debug, plot_info, plot_warn};

use crate::{AnalysisError, AnalysisResponse, AnalysisResult, AppState, Effect, Msg, Notification};

const UPLOAD_IN_PROGRESS: &str = "An upload is already in progress.";
const ANALYSIS_COMPLETED: &str = "Interpolation completed";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesDropped(files) => {
            let outcome = state.classify_drop(files);
            if !outcome.ignored.is_empty() {
                plot_debug!("ignored dropped files: {:?}", outcome.ignored);
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.is_uploading() {
                return (
                    state,
                    vec![Effect::Notify(Notification::warning(UPLOAD_IN_PROGRESS))],
                );
            }
            match state.slots().submission() {
                Ok(submission) => {
                    let request_id = state.begin_upload();
                    plot_info!(
                        "upload {} started: {} plot file(s), sample {}",
                        request_id,
                        submission.plot_files.len(),
                        submission.sample_file.name()
                    );
                    vec![Effect::Upload {
                        request_id,
                        submission,
                    }]
                }
                Err(err) => vec![error_notice(&AnalysisError::from(err))],
            }
        }
        Msg::UploadProgress {
            request_id,
            loaded,
            total,
        } => {
            state.record_progress(request_id, loaded, total);
            Vec::new()
        }
        Msg::UploadFinished { request_id, result } => {
            if !state.finish_upload(request_id) {
                plot_debug!("dropping outcome of stale upload {}", request_id);
                return (state, Vec::new());
            }
            match result {
                Ok(response) => apply_response(&mut state, response),
                Err(err) => {
                    plot_warn!("upload {} failed: {}", request_id, err);
                    vec![error_notice(&err)]
                }
            }
        }
        Msg::OverlayFailed { url, message } => {
            plot_warn!("overlay {} failed: {}", url, message);
            vec![error_notice(&AnalysisError::ResourceFetch(message))]
        }
        Msg::DownloadClicked => match state.result().and_then(AnalysisResult::overlay_url) {
            Some(url) => vec![Effect::Download {
                url: url.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::DownloadFinished(Ok(path)) => vec![Effect::Notify(Notification::info(format!(
            "Saved {}",
            path.display()
        )))],
        Msg::DownloadFinished(Err(err)) => vec![error_notice(&err)],
        Msg::Teardown => {
            state.reset();
            vec![Effect::ReleaseOverlay, Effect::RenderVectors(None)]
        }
    };

    (state, effects)
}

fn apply_response(state: &mut AppState, response: AnalysisResponse) -> Vec<Effect> {
    let result = match AnalysisResult::from_response(response, state.bounds()) {
        Ok(result) => result,
        Err(err) => {
            plot_warn!("rejecting analysis response: {}", err);
            return vec![error_notice(&err)];
        }
    };

    let mut effects = Vec::new();
    let bounds = result.bounding_box();
    if let Some(fit) = state
        .bounds_controller_mut()
        .on_bounds_changed(bounds, result.has_map_content())
    {
        effects.push(Effect::FitBounds(fit));
    }

    let had_svg_overlay = state
        .result()
        .is_some_and(|previous| previous.svg_overlay_url().is_some());
    let had_vectors = state
        .result()
        .is_some_and(|previous| previous.vector_features().is_some());

    match result.svg_overlay_url() {
        Some(url) => effects.push(Effect::ShowOverlay {
            url: url.to_string(),
            bounds,
        }),
        None => {
            if let Some(url) = result.overlay_url() {
                plot_info!("overlay {} is not SVG; not drawn as an image overlay", url);
            }
            if had_svg_overlay {
                effects.push(Effect::ReleaseOverlay);
            }
        }
    }

    if result.vector_features().is_some() || had_vectors {
        effects.push(Effect::RenderVectors(result.vector_features().cloned()));
    }

    effects.extend(
        result
            .warnings()
            .iter()
            .map(|warning| Effect::Notify(Notification::warning(warning.clone()))),
    );
    if result.is_complete() {
        effects.push(Effect::Notify(Notification::info(ANALYSIS_COMPLETED)));
    }

    state.replace_result(result);
    effects
}

fn error_notice(err: &AnalysisError) -> Effect {
    Effect::Notify(Notification::error(err.to_string()))
}
