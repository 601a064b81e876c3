//! Lifecycle of the single georeferenced image overlay.
//!
//! `Idle -> Fetching -> Attached`, back to `Idle` on release. Every `begin`
//! releases what is held before anything new is acquired, and bumps the
//! generation so a fetch completing after being superseded is discarded.

use plotmap_core::BoundingBox;
use plotmap_logging::{plot_debug, plot_info, plot_warn};

use crate::{
    register_overlay_formats, BitmapHandle, BitmapStore, LayerId, MapSurface, OverlayFormat,
    OverlayFormats,
};

pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    Idle,
    Fetching,
    Attached,
}

/// Identifies the fetch a completion belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTicket {
    pub generation: Generation,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    #[error("unsupported overlay format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Fetch(String),
    #[error("could not materialize overlay: {0}")]
    Bitmap(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Attached { layer: LayerId },
    /// Completion for a superseded or released fetch; nothing changed.
    Stale,
    Failed(OverlayError),
}

#[derive(Debug)]
enum Phase {
    Idle,
    Fetching {
        generation: Generation,
        url: String,
        format: &'static OverlayFormat,
        bounds: BoundingBox,
    },
    Attached {
        generation: Generation,
        url: String,
        bitmap: BitmapHandle,
        layer: LayerId,
    },
}

pub struct OverlayManager<B: BitmapStore> {
    store: B,
    formats: &'static OverlayFormats,
    phase: Phase,
    generation: Generation,
}

impl<B: BitmapStore> OverlayManager<B> {
    pub fn new(store: B) -> Self {
        Self {
            store,
            formats: register_overlay_formats(),
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn status(&self) -> OverlayStatus {
        match self.phase {
            Phase::Idle => OverlayStatus::Idle,
            Phase::Fetching { .. } => OverlayStatus::Fetching,
            Phase::Attached { .. } => OverlayStatus::Attached,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn attached_layer(&self) -> Option<LayerId> {
        match self.phase {
            Phase::Attached { layer, .. } => Some(layer),
            _ => None,
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Fetching { url, .. } | Phase::Attached { url, .. } => Some(url.as_str()),
        }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// Releases what is held, then starts tracking a fetch for `url`.
    pub fn begin(
        &mut self,
        map: &mut dyn MapSurface,
        url: &str,
        bounds: BoundingBox,
    ) -> Result<OverlayTicket, OverlayError> {
        self.release(map);
        self.generation += 1;

        let formats: &'static OverlayFormats = self.formats;
        let format = formats
            .for_url(url)
            .ok_or_else(|| OverlayError::UnsupportedFormat(url.to_string()))?;
        plot_debug!("overlay {} fetching {}", self.generation, url);
        self.phase = Phase::Fetching {
            generation: self.generation,
            url: url.to_string(),
            format,
            bounds,
        };
        Ok(OverlayTicket {
            generation: self.generation,
            url: url.to_string(),
        })
    }

    /// Applies the outcome of the fetch started for `generation`.
    pub fn complete(
        &mut self,
        map: &mut dyn MapSurface,
        generation: Generation,
        fetched: Result<&[u8], String>,
    ) -> OverlayOutcome {
        let is_current = matches!(
            self.phase,
            Phase::Fetching { generation: pending, .. } if pending == generation
        );
        if !is_current {
            plot_debug!(
                "discarding stale overlay completion {} (current {})",
                generation,
                self.generation
            );
            return OverlayOutcome::Stale;
        }

        let Phase::Fetching {
            url, format, bounds, ..
        } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return OverlayOutcome::Stale;
        };

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(message) => {
                plot_warn!("overlay {} fetch failed: {}", url, message);
                return OverlayOutcome::Failed(OverlayError::Fetch(message));
            }
        };
        let bitmap = match self.store.allocate(bytes, format) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                plot_warn!("overlay {} could not be materialized: {}", url, err);
                return OverlayOutcome::Failed(OverlayError::Bitmap(err.to_string()));
            }
        };

        let layer = map.add_image_layer(bitmap.locator(), bounds);
        plot_info!("overlay {} attached as layer {}", url, layer);
        self.phase = Phase::Attached {
            generation,
            url,
            bitmap,
            layer,
        };
        OverlayOutcome::Attached { layer }
    }

    /// Drops any pending fetch and detaches any attached overlay.
    pub fn release(&mut self, map: &mut dyn MapSurface) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Fetching {
                generation, url, ..
            } => {
                plot_debug!("overlay {} abandoned while fetching {}", generation, url);
            }
            Phase::Attached {
                generation,
                url,
                bitmap,
                layer,
            } => {
                map.remove_layer(layer);
                self.store.release(bitmap);
                plot_debug!("overlay {} ({}) released", generation, url);
            }
        }
    }

    /// Synchronous cleanup when the session ends.
    pub fn teardown(&mut self, map: &mut dyn MapSurface) {
        self.release(map);
        // Outstanding completions become stale.
        self.generation += 1;
    }
}

impl<B: BitmapStore> Drop for OverlayManager<B> {
    fn drop(&mut self) {
        if let Phase::Attached { bitmap, .. } = std::mem::replace(&mut self.phase, Phase::Idle) {
            self.store.release(bitmap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessMap, MemoryBitmapStore};

    const SVG_BYTES: &[u8] = b"<svg xmlns='http://www.w3.org/2000/svg'/>";

    fn bbox(low: f64, high: f64) -> BoundingBox {
        BoundingBox::from_pairs([[low, low], [high, high]]).unwrap()
    }

    fn attach(
        manager: &mut OverlayManager<MemoryBitmapStore>,
        map: &mut HeadlessMap,
        url: &str,
        bounds: BoundingBox,
    ) -> LayerId {
        let ticket = manager.begin(map, url, bounds).unwrap();
        match manager.complete(map, ticket.generation, Ok(SVG_BYTES)) {
            OverlayOutcome::Attached { layer } => layer,
            other => panic!("expected attach, got {other:?}"),
        }
    }

    #[test]
    fn fetch_then_attach() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        assert_eq!(manager.status(), OverlayStatus::Idle);

        let ticket = manager.begin(&mut map, "http://x/o.svg", bbox(1.0, 2.0)).unwrap();
        assert_eq!(manager.status(), OverlayStatus::Fetching);
        assert_eq!(map.layer_count(), 0);

        let outcome = manager.complete(&mut map, ticket.generation, Ok(SVG_BYTES));
        assert!(matches!(outcome, OverlayOutcome::Attached { .. }));
        assert_eq!(manager.status(), OverlayStatus::Attached);
        let images = map.image_layers();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].2, bbox(1.0, 2.0));
        assert_eq!(manager.store().live_count(), 1);
    }

    #[test]
    fn replacement_releases_exactly_one_handle() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        let first = attach(&mut manager, &mut map, "http://x/a.svg", bbox(1.0, 2.0));
        let second = attach(&mut manager, &mut map, "http://x/b.svg", bbox(3.0, 4.0));

        assert_ne!(first, second);
        assert_eq!(manager.store().allocated(), 2);
        assert_eq!(manager.store().released(), 1);
        assert_eq!(manager.store().live_count(), 1);
        assert_eq!(map.image_layers().len(), 1);
        assert!(map.layer(first).is_none());
        assert_eq!(manager.attached_layer(), Some(second));
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        let old = manager.begin(&mut map, "http://x/a.svg", bbox(1.0, 2.0)).unwrap();
        let new = manager.begin(&mut map, "http://x/b.svg", bbox(3.0, 4.0)).unwrap();

        // The newer fetch lands first, the older one after it.
        assert!(matches!(
            manager.complete(&mut map, new.generation, Ok(SVG_BYTES)),
            OverlayOutcome::Attached { .. }
        ));
        assert_eq!(
            manager.complete(&mut map, old.generation, Ok(SVG_BYTES)),
            OverlayOutcome::Stale
        );
        assert_eq!(map.image_layers().len(), 1);
        assert_eq!(map.image_layers()[0].2, bbox(3.0, 4.0));
        assert_eq!(manager.store().allocated(), 1);
    }

    #[test]
    fn new_reference_while_attached_releases_before_fetching() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        attach(&mut manager, &mut map, "http://x/a.svg", bbox(1.0, 2.0));

        manager.begin(&mut map, "http://x/b.svg", bbox(1.0, 2.0)).unwrap();
        assert_eq!(manager.status(), OverlayStatus::Fetching);
        assert_eq!(map.layer_count(), 0);
        assert_eq!(manager.store().live_count(), 0);
    }

    #[test]
    fn failed_fetch_returns_to_idle() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        let ticket = manager.begin(&mut map, "http://x/a.svg", bbox(1.0, 2.0)).unwrap();

        let outcome = manager.complete(&mut map, ticket.generation, Err("http status 404".into()));
        assert_eq!(
            outcome,
            OverlayOutcome::Failed(OverlayError::Fetch("http status 404".into()))
        );
        assert_eq!(manager.status(), OverlayStatus::Idle);
        assert_eq!(map.layer_count(), 0);
        assert_eq!(manager.store().allocated(), 0);
    }

    #[test]
    fn empty_body_is_a_bitmap_failure() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        let ticket = manager.begin(&mut map, "http://x/a.svg", bbox(1.0, 2.0)).unwrap();
        assert!(matches!(
            manager.complete(&mut map, ticket.generation, Ok(&b""[..])),
            OverlayOutcome::Failed(OverlayError::Bitmap(_))
        ));
        assert_eq!(manager.status(), OverlayStatus::Idle);
    }

    #[test]
    fn unsupported_format_leaves_idle() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        attach(&mut manager, &mut map, "http://x/a.svg", bbox(1.0, 2.0));

        let err = manager
            .begin(&mut map, "http://x/a.tiff", bbox(1.0, 2.0))
            .unwrap_err();
        assert_eq!(err, OverlayError::UnsupportedFormat("http://x/a.tiff".into()));
        assert_eq!(manager.status(), OverlayStatus::Idle);
        assert_eq!(manager.store().live_count(), 0);
    }

    #[test]
    fn teardown_releases_and_stales_pending_fetches() {
        let mut map = HeadlessMap::new();
        let mut manager = OverlayManager::new(MemoryBitmapStore::new());
        attach(&mut manager, &mut map, "http://x/a.svg", bbox(1.0, 2.0));
        manager.teardown(&mut map);
        assert_eq!(map.layer_count(), 0);
        assert_eq!(manager.store().live_count(), 0);

        let ticket = manager.begin(&mut map, "http://x/b.svg", bbox(1.0, 2.0)).unwrap();
        manager.teardown(&mut map);
        assert_eq!(
            manager.complete(&mut map, ticket.generation, Ok(SVG_BYTES)),
            OverlayOutcome::Stale
        );
        assert_eq!(map.layer_count(), 0);
    }
}
