use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, BoundingBox};

/// JSON body returned by `POST {apiBase}upload`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[[f64; 2]; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<FeatureCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful analysis, built atomically from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    overlay_url: Option<String>,
    bounding_box: BoundingBox,
    vector_features: Option<FeatureCollection>,
    warnings: Vec<String>,
}

impl AnalysisResult {
    /// Validates a response; `current_bounds` is kept when the service sends none.
    pub fn from_response(
        response: AnalysisResponse,
        current_bounds: BoundingBox,
    ) -> Result<Self, AnalysisError> {
        let bounding_box = match response.bounds {
            Some(pairs) => BoundingBox::from_pairs(pairs)
                .map_err(|err| AnalysisError::Service(format!("invalid bounds: {err}")))?,
            None => current_bounds,
        };
        Ok(Self {
            overlay_url: response.overlay_url.filter(|url| !url.trim().is_empty()),
            bounding_box,
            vector_features: response.geojson,
            warnings: response.warnings.unwrap_or_default(),
        })
    }

    pub fn overlay_url(&self) -> Option<&str> {
        self.overlay_url.as_deref()
    }

    /// Overlay URL when it names an SVG resource rendered as an image overlay.
    pub fn svg_overlay_url(&self) -> Option<&str> {
        self.overlay_url().filter(|url| is_svg_resource(url))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn vector_features(&self) -> Option<&FeatureCollection> {
        self.vector_features.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// An overlay reference is the sole completion signal.
    pub fn is_complete(&self) -> bool {
        self.overlay_url.is_some()
    }

    /// Whether anything in the result is drawn on the map.
    pub fn has_map_content(&self) -> bool {
        self.overlay_url.is_some() || self.vector_features.is_some()
    }
}

/// True when the URL path ends in `.svg`, ignoring case, query and fragment.
pub fn is_svg_resource(url: &str) -> bool {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    path.to_ascii_lowercase().ends_with(".svg")
}
