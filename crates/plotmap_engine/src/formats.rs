use std::sync::OnceLock;

use plotmap_logging::plot_debug;

/// An image format that can be materialized as a georeferenced overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayFormat {
    pub extension: &'static str,
    pub mime_type: &'static str,
}

pub const SVG: OverlayFormat = OverlayFormat {
    extension: "svg",
    mime_type: "image/svg+xml",
};

#[derive(Debug)]
pub struct OverlayFormats {
    formats: Vec<OverlayFormat>,
}

impl OverlayFormats {
    pub fn formats(&self) -> &[OverlayFormat] {
        &self.formats
    }

    /// Looks up the format by the extension of the URL path.
    pub fn for_url(&self, url: &str) -> Option<&OverlayFormat> {
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_ascii_lowercase(),
            Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase(),
        };
        let extension = path.rsplit_once('.').map(|(_, ext)| ext)?;
        self.formats
            .iter()
            .find(|format| format.extension == extension)
    }
}

static REGISTRY: OnceLock<OverlayFormats> = OnceLock::new();

/// Registers the overlay formats for the process and returns them.
///
/// The first call builds the registry; later calls return the same one.
pub fn register_overlay_formats() -> &'static OverlayFormats {
    REGISTRY.get_or_init(|| {
        plot_debug!("registering overlay formats");
        OverlayFormats {
            formats: vec![SVG],
        }
    })
}
