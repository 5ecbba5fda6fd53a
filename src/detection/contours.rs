use image::GrayImage;
use imageproc::contours::find_contours as trace_borders;
use crate::models::Contour;

/// Find every border (outer and hole) in a binary edge image.
///
/// Nesting information is dropped; the result is a flat list in tracing order.
pub fn find_contours(edges: &GrayImage) -> Vec<Contour> {
    trace_borders::<i32>(edges)
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Sort contours by enclosed area, largest first.
///
/// The sort is stable so equal areas keep their tracing order.
pub fn sort_by_area_desc(contours: Vec<Contour>) -> Vec<(f64, Contour)> {
    let mut with_area: Vec<(f64, Contour)> = contours
        .into_iter()
        .map(|c| (c.area(), c))
        .collect();
    with_area.sort_by(|a, b| b.0.total_cmp(&a.0));
    with_area
}
