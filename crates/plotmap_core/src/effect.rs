use geojson::FeatureCollection;

use crate::{BoundingBox, Notification, RequestId, Submission};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the multipart request.
    Upload {
        request_id: RequestId,
        submission: Submission,
    },
    /// Fetch an SVG overlay and attach it to the map, replacing any previous one.
    ShowOverlay { url: String, bounds: BoundingBox },
    /// Release the attached or pending overlay.
    ReleaseOverlay,
    /// Fit the map viewport to the box.
    FitBounds(BoundingBox),
    /// Replace the vector layers; `None` clears them.
    RenderVectors(Option<FeatureCollection>),
    /// Save the overlay bytes as a local file.
    Download { url: String },
    Notify(Notification),
}
