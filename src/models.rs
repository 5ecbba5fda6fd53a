use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use serde::Serialize;

/// Bounding box in source image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Box covering the whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_full_image(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }

    /// Non-empty and fully contained in a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= width
            && self.bottom() <= height
    }
}

/// Outcome of one detection call.
///
/// Both variants carry a geometrically valid box; `Fallback` always holds
/// the full-image box and means no candidate survived the filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    Detected(BoundingBox),
    Fallback(BoundingBox),
}

impl Detection {
    pub fn bbox(&self) -> BoundingBox {
        match self {
            Detection::Detected(bbox) | Detection::Fallback(bbox) => *bbox,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Detection::Fallback(_))
    }
}

/// Closed boundary traced from an edge map
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed area of the polygon through the points, regardless of orientation
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        contour_area(&self.points).abs()
    }

    /// Length of the closed curve
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        arc_length(&self.points, true)
    }

    /// Douglas-Peucker approximation of the closed curve.
    ///
    /// The curve is split at the point farthest from its first point and
    /// both halves are simplified as open chains, so the result lists every
    /// vertex once. A non-positive `epsilon` or a curve of fewer than three
    /// points leaves the points as they are.
    pub fn approximate(&self, epsilon: f64) -> Vec<Point<i32>> {
        let points = &self.points;
        if epsilon <= 0.0 || points.len() < 3 {
            return points.clone();
        }

        let origin = points[0];
        let (far, far_dist) = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, squared_distance(origin, *p)))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if far_dist == 0 {
            return vec![origin];
        }

        let mut back_half = points[far..].to_vec();
        back_half.push(origin);

        // Both chains keep their endpoints: drop the shared far point and the closing origin
        let mut polygon = approximate_polygon_dp(&points[..=far], epsilon, false);
        polygon.pop();
        let back = approximate_polygon_dp(&back_half, epsilon, false);
        if let Some((_, rest)) = back.split_last() {
            polygon.extend_from_slice(rest);
        }
        polygon
    }

    /// Smallest axis-aligned rectangle containing every point.
    ///
    /// Returns `None` for an empty contour. Contours come from an edge map,
    /// so all coordinates are non-negative.
    pub fn bounding_rect(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    dx * dx + dy * dy
}
