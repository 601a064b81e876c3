use std::collections::BTreeMap;

use plotmap_core::{BoundingBox, LatLng};
use plotmap_logging::{plot_debug, plot_info};

use crate::vector::point_in_polygon;

pub type LayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonStyle {
    pub color: &'static str,
    pub weight: f32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            color: "#ff7800",
            weight: 2.0,
            opacity: 1.0,
            fill_opacity: 0.0,
        }
    }
}

/// One polygon with its popup label; rings are `[outer, holes...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonLayer {
    pub label: String,
    pub rings: Vec<Vec<LatLng>>,
    pub style: PolygonStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapLayer {
    Image { source: String, bounds: BoundingBox },
    Polygon(PolygonLayer),
}

/// The interactive map the session draws on.
pub trait MapSurface {
    fn add_image_layer(&mut self, source: &str, bounds: BoundingBox) -> LayerId;
    fn add_polygon_layer(&mut self, layer: PolygonLayer) -> LayerId;
    /// Returns false when no such layer is attached.
    fn remove_layer(&mut self, id: LayerId) -> bool;
    fn fit_bounds(&mut self, bounds: BoundingBox);
}

/// Map without a display: keeps the layer list and viewport, logs changes.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    next_id: LayerId,
    layers: BTreeMap<LayerId, MapLayer>,
    viewport: Option<BoundingBox>,
    fit_requests: Vec<BoundingBox>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: LayerId) -> Option<&MapLayer> {
        self.layers.get(&id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn image_layers(&self) -> Vec<(LayerId, &str, BoundingBox)> {
        self.layers
            .iter()
            .filter_map(|(id, layer)| match layer {
                MapLayer::Image { source, bounds } => Some((*id, source.as_str(), *bounds)),
                MapLayer::Polygon(_) => None,
            })
            .collect()
    }

    pub fn polygon_layers(&self) -> Vec<&PolygonLayer> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                MapLayer::Polygon(polygon) => Some(polygon),
                MapLayer::Image { .. } => None,
            })
            .collect()
    }

    pub fn viewport(&self) -> Option<BoundingBox> {
        self.viewport
    }

    pub fn fit_requests(&self) -> &[BoundingBox] {
        &self.fit_requests
    }

    /// Label a click at `point` would open, topmost polygon first.
    pub fn popup_at(&self, point: LatLng) -> Option<&str> {
        self.polygon_layers()
            .into_iter()
            .rev()
            .find(|polygon| point_in_polygon(point, &polygon.rings))
            .map(|polygon| polygon.label.as_str())
    }

    fn insert(&mut self, layer: MapLayer) -> LayerId {
        self.next_id += 1;
        self.layers.insert(self.next_id, layer);
        self.next_id
    }
}

impl MapSurface for HeadlessMap {
    fn add_image_layer(&mut self, source: &str, bounds: BoundingBox) -> LayerId {
        let id = self.insert(MapLayer::Image {
            source: source.to_string(),
            bounds,
        });
        plot_info!("map: image layer {} from {} at {:?}", id, source, bounds.to_pairs());
        id
    }

    fn add_polygon_layer(&mut self, layer: PolygonLayer) -> LayerId {
        let label = layer.label.clone();
        let id = self.insert(MapLayer::Polygon(layer));
        plot_debug!("map: polygon layer {} '{}'", id, label);
        id
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        let removed = self.layers.remove(&id).is_some();
        if removed {
            plot_debug!("map: removed layer {}", id);
        }
        removed
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        plot_info!("map: fit viewport to {:?}", bounds.to_pairs());
        self.viewport = Some(bounds);
        self.fit_requests.push(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(label: &str, from: f64, to: f64) -> PolygonLayer {
        PolygonLayer {
            label: label.to_string(),
            rings: vec![vec![
                LatLng::new(from, from),
                LatLng::new(from, to),
                LatLng::new(to, to),
                LatLng::new(to, from),
                LatLng::new(from, from),
            ]],
            style: PolygonStyle::default(),
        }
    }

    #[test]
    fn layers_are_added_and_removed() {
        let mut map = HeadlessMap::new();
        let bbox = BoundingBox::from_pairs([[1.0, 1.0], [2.0, 2.0]]).unwrap();
        let image = map.add_image_layer("memory://bitmap/1.svg", bbox);
        let polygon = map.add_polygon_layer(square("A", 0.0, 1.0));
        assert_eq!(map.layer_count(), 2);
        assert_eq!(map.image_layers(), vec![(image, "memory://bitmap/1.svg", bbox)]);

        assert!(map.remove_layer(polygon));
        assert!(!map.remove_layer(polygon));
        assert_eq!(map.layer_count(), 1);
    }

    #[test]
    fn popup_prefers_topmost_polygon() {
        let mut map = HeadlessMap::new();
        map.add_polygon_layer(square("outer", 0.0, 10.0));
        map.add_polygon_layer(square("inner", 2.0, 4.0));
        assert_eq!(map.popup_at(LatLng::new(3.0, 3.0)), Some("inner"));
        assert_eq!(map.popup_at(LatLng::new(8.0, 8.0)), Some("outer"));
        assert_eq!(map.popup_at(LatLng::new(20.0, 20.0)), None);
    }

    #[test]
    fn fit_updates_viewport() {
        let mut map = HeadlessMap::new();
        let bbox = BoundingBox::from_pairs([[1.0, 1.0], [2.0, 2.0]]).unwrap();
        assert_eq!(map.viewport(), None);
        map.fit_bounds(bbox);
        assert_eq!(map.viewport(), Some(bbox));
        assert_eq!(map.fit_requests(), &[bbox]);
    }
}
