use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundsError {
    #[error("coordinate is not a finite number")]
    NonFinite,
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("south latitude {south} is north of north latitude {north}")]
    InvertedLatitude { south: f64, north: f64 },
    #[error("west longitude {west} is east of east longitude {east}")]
    InvertedLongitude { west: f64, east: f64 },
}

/// Geographic rectangle given by its south-west and north-east corners.
///
/// Always valid once constructed: finite coordinates in range, south not
/// above north, west not east of east. Boxes crossing the antimeridian are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    south_west: LatLng,
    north_east: LatLng,
}

/// Viewport shown before any analysis completes.
const PLACEHOLDER: BoundingBox = BoundingBox {
    south_west: LatLng::new(51.49, -0.12),
    north_east: LatLng::new(51.51, -0.06),
};

impl BoundingBox {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Result<Self, BoundsError> {
        for corner in [south_west, north_east] {
            if !corner.lat.is_finite() || !corner.lon.is_finite() {
                return Err(BoundsError::NonFinite);
            }
            if !(-90.0..=90.0).contains(&corner.lat) {
                return Err(BoundsError::LatitudeOutOfRange(corner.lat));
            }
            if !(-180.0..=180.0).contains(&corner.lon) {
                return Err(BoundsError::LongitudeOutOfRange(corner.lon));
            }
        }
        if south_west.lat > north_east.lat {
            return Err(BoundsError::InvertedLatitude {
                south: south_west.lat,
                north: north_east.lat,
            });
        }
        if south_west.lon > north_east.lon {
            return Err(BoundsError::InvertedLongitude {
                west: south_west.lon,
                east: north_east.lon,
            });
        }
        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Parses the wire form `[[lat, lon], [lat, lon]]`.
    pub fn from_pairs(pairs: [[f64; 2]; 2]) -> Result<Self, BoundsError> {
        let [[south, west], [north, east]] = pairs;
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    pub fn placeholder() -> Self {
        PLACEHOLDER
    }

    pub fn south_west(&self) -> LatLng {
        self.south_west
    }

    pub fn north_east(&self) -> LatLng {
        self.north_east
    }

    pub fn to_pairs(&self) -> [[f64; 2]; 2] {
        [
            [self.south_west.lat, self.south_west.lon],
            [self.north_east.lat, self.north_east.lon],
        ]
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&point.lon)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        PLACEHOLDER
    }
}
