use crate::BoundingBox;

/// Decides when the map viewport should be refitted.
///
/// A fit is requested when the box differs by value from the last fitted
/// one and the session already shows an analysis on the map, so the
/// placeholder box never moves the viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundsController {
    last_fitted: Option<BoundingBox>,
}

impl BoundsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fitted(&self) -> Option<BoundingBox> {
        self.last_fitted
    }

    /// Returns the box to fit, if any.
    pub fn on_bounds_changed(
        &mut self,
        bounds: BoundingBox,
        has_map_content: bool,
    ) -> Option<BoundingBox> {
        if !has_map_content || self.last_fitted == Some(bounds) {
            return None;
        }
        self.last_fitted = Some(bounds);
        Some(bounds)
    }
}
