use geojson::{FeatureCollection, JsonObject, Value};
use plotmap_core::LatLng;
use plotmap_logging::plot_debug;

use crate::{LayerId, MapSurface, PolygonLayer, PolygonStyle};

pub const FALLBACK_LABEL: &str = "Polygon";

/// Popup label: the `name` property under any casing, else [`FALLBACK_LABEL`].
pub fn feature_label(properties: Option<&JsonObject>) -> String {
    let Some(properties) = properties else {
        return FALLBACK_LABEL.to_string();
    };
    let exact = properties.get("name");
    let any_case = || {
        properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("name"))
            .map(|(_, value)| value)
    };
    let label = match exact.or_else(any_case) {
        Some(serde_json::Value::String(text)) => text.trim().to_string(),
        Some(serde_json::Value::Number(number)) => number.to_string(),
        _ => String::new(),
    };
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}

/// Flattens the collection into one layer per polygon. Multi-polygons share
/// their feature's label; other geometry types are skipped.
pub fn polygon_layers(collection: &FeatureCollection) -> Vec<PolygonLayer> {
    let mut layers = Vec::new();
    for feature in &collection.features {
        let label = feature_label(feature.properties.as_ref());
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        match &geometry.value {
            Value::Polygon(rings) => layers.push(to_layer(&label, rings)),
            Value::MultiPolygon(polygons) => {
                layers.extend(polygons.iter().map(|rings| to_layer(&label, rings)));
            }
            _ => plot_debug!("skipping non-polygon geometry in feature '{}'", label),
        }
    }
    layers
}

fn to_layer(label: &str, rings: &[Vec<Vec<f64>>]) -> PolygonLayer {
    PolygonLayer {
        label: label.to_string(),
        rings: rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .filter_map(|position| match position.as_slice() {
                        [lon, lat, ..] => Some(LatLng::new(*lat, *lon)),
                        _ => None,
                    })
                    .collect()
            })
            .collect(),
        style: PolygonStyle::default(),
    }
}

/// Even-odd test against the outer ring, excluding holes.
pub fn point_in_polygon(point: LatLng, rings: &[Vec<LatLng>]) -> bool {
    match rings.split_first() {
        Some((outer, holes)) => {
            ring_contains(outer, point) && !holes.iter().any(|hole| ring_contains(hole, point))
        }
        None => false,
    }
}

fn ring_contains(ring: &[LatLng], point: LatLng) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Owns the polygon layers drawn for the current feature collection.
#[derive(Debug, Default)]
pub struct VectorLayerRenderer {
    layers: Vec<LayerId>,
}

impl VectorLayerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_ids(&self) -> &[LayerId] {
        &self.layers
    }

    /// Replaces every rendered layer with the new collection.
    pub fn render(&mut self, map: &mut dyn MapSurface, collection: Option<&FeatureCollection>) -> usize {
        self.clear(map);
        if let Some(collection) = collection {
            self.layers = polygon_layers(collection)
                .into_iter()
                .map(|layer| map.add_polygon_layer(layer))
                .collect();
        }
        plot_debug!("rendered {} polygon layer(s)", self.layers.len());
        self.layers.len()
    }

    pub fn clear(&mut self, map: &mut dyn MapSurface) {
        for id in self.layers.drain(..) {
            map.remove_layer(id);
        }
    }
}
