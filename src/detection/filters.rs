//! Greedy candidate selection over contours ranked by area.
//!
//! The first contour (largest area first) that passes every rule wins and
//! the scan stops; smaller contours are never examined.

use crate::models::{BoundingBox, Contour};
use super::contours::sort_by_area_desc;

/// Minimum contour area as fraction of total image (10%)
pub const MIN_AREA_RATIO: f64 = 0.10;

/// Polygon approximation epsilon as fraction of perimeter (2%)
pub const POLY_APPROX_EPSILON: f64 = 0.02;

/// Exclusive bounds on bounding-rect width / height
pub const MIN_ASPECT_RATIO: f64 = 0.5;
pub const MAX_ASPECT_RATIO: f64 = 2.0;

/// Distance in pixels a candidate must keep from every image edge
pub const BORDER_MARGIN: u32 = 5;

/// Why a contour above the area floor was passed over
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Polygon approximation did not have exactly four vertices
    NotQuadrilateral { vertices: usize },
    /// Bounding rectangle has no height
    ZeroHeight,
    /// Width / height outside the open interval
    AspectRatio { ratio: f64 },
    /// Bounding rectangle is within the margin of an image edge
    TouchesBorder,
}

/// Contour that survived the whole chain
#[derive(Debug, Clone)]
pub struct Candidate {
    pub contour: Contour,
    pub bbox: BoundingBox,
    pub area: f64,
    /// Rank in the area-sorted list (0 = largest)
    pub rank: usize,
}

/// Smallest enclosed area a contour may have in a `width` x `height` image
pub fn min_area(width: u32, height: u32) -> f64 {
    MIN_AREA_RATIO * width as f64 * height as f64
}

/// Apply the shape, aspect and margin rules to one contour
pub fn check_candidate(contour: &Contour, width: u32, height: u32) -> Result<BoundingBox, Rejection> {
    let epsilon = POLY_APPROX_EPSILON * contour.perimeter();
    let vertices = contour.approximate(epsilon).len();
    if vertices != 4 {
        return Err(Rejection::NotQuadrilateral { vertices });
    }

    let bbox = contour
        .bounding_rect()
        .ok_or(Rejection::NotQuadrilateral { vertices: 0 })?;
    if bbox.height == 0 {
        return Err(Rejection::ZeroHeight);
    }

    let ratio = bbox.width as f64 / bbox.height as f64;
    if !(ratio > MIN_ASPECT_RATIO && ratio < MAX_ASPECT_RATIO) {
        return Err(Rejection::AspectRatio { ratio });
    }

    let far_x = width.saturating_sub(BORDER_MARGIN);
    let far_y = height.saturating_sub(BORDER_MARGIN);
    if bbox.x <= BORDER_MARGIN
        || bbox.y <= BORDER_MARGIN
        || bbox.right() >= far_x
        || bbox.bottom() >= far_y
    {
        return Err(Rejection::TouchesBorder);
    }

    Ok(bbox)
}

/// Pick the largest contour that passes every rule, or `None`
pub fn select_candidate(contours: Vec<Contour>, width: u32, height: u32) -> Option<Candidate> {
    let floor = min_area(width, height);

    for (rank, (area, contour)) in sort_by_area_desc(contours).into_iter().enumerate() {
        if area < floor {
            log::trace!("contour #{rank}: area {area:.0} below floor {floor:.0}, stopping scan");
            break;
        }

        match check_candidate(&contour, width, height) {
            Ok(bbox) => {
                return Some(Candidate { contour, bbox, area, rank });
            }
            Err(rejection) => {
                log::trace!("contour #{rank}: area {area:.0} rejected: {rejection:?}");
            }
        }
    }

    None
}
