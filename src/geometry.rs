use geo::{BoundingRect, Coord, LineString, Simplify};

/// Ramer-Douglas-Peucker tolerance in degrees, roughly 1m at the equator.
pub const SIMPLIFY_TOLERANCE: f64 = 0.00001;

/// Keeps both endpoints and every point deviating more than
/// [`SIMPLIFY_TOLERANCE`] from the simplified line.
pub fn simplify_track(line: &LineString) -> LineString {
    if line.0.len() < 2 {
        return line.clone();
    }
    line.simplify(SIMPLIFY_TOLERANCE)
}

/// South-west and north-east corners as (lon, lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coord,
    pub max: Coord,
}

impl BoundingBox {
    pub const DEGENERATE: BoundingBox = BoundingBox {
        min: Coord { x: 0.0, y: 0.0 },
        max: Coord { x: 0.0, y: 0.0 },
    };
}

/// Empty geometry gives [`BoundingBox::DEGENERATE`]; there is no separate
/// "no geometry" signal.
pub fn bounding_box(line: Option<&LineString>) -> BoundingBox {
    line.and_then(|line| line.bounding_rect())
        .map(|rect| BoundingBox {
            min: rect.min(),
            max: rect.max(),
        })
        .unwrap_or(BoundingBox::DEGENERATE)
}
