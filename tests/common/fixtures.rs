use drawbox::BoundingBox;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Color constants for tests
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const MID_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Routes library logging through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a uniformly colored image.
pub fn blank_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Creates a white page with a dark filled rectangle covering `bbox`.
///
/// The outermost ring of the rectangle is mid-gray so the intensity ramp
/// peaks on a single pixel and the traced edge lands on the ring.
pub fn page_with_rect(width: u32, height: u32, bbox: BoundingBox) -> RgbImage {
    let mut img = blank_image(width, height, WHITE);
    for y in bbox.y..bbox.bottom() {
        for x in bbox.x..bbox.right() {
            let on_ring =
                x == bbox.x || y == bbox.y || x + 1 == bbox.right() || y + 1 == bbox.bottom();
            img.put_pixel(x, y, if on_ring { MID_GRAY } else { BLACK });
        }
    }
    img
}

/// Creates a `background` image with `bbox` filled in a single `fill` color.
pub fn solid_block(width: u32, height: u32, bbox: BoundingBox, background: Rgb<u8>, fill: Rgb<u8>) -> RgbImage {
    let mut img = blank_image(width, height, background);
    for y in bbox.y..bbox.bottom() {
        for x in bbox.x..bbox.right() {
            img.put_pixel(x, y, fill);
        }
    }
    img
}

/// Creates a `background` image with a one-pixel outline of `bbox`.
pub fn thin_frame(width: u32, height: u32, bbox: BoundingBox, background: Rgb<u8>, line: Rgb<u8>) -> RgbImage {
    let mut img = blank_image(width, height, background);
    let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
    draw_hollow_rect_mut(&mut img, rect, line);
    img
}

/// Creates an edge map with a one-pixel rectangular loop per box.
///
/// Each loop traces to a contour whose bounding rectangle is the box itself
/// and whose enclosed area is `(width - 1) * (height - 1)`.
pub fn edge_map_with_rects(width: u32, height: u32, boxes: &[BoundingBox]) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    for bbox in boxes {
        let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        draw_hollow_rect_mut(&mut edges, rect, Luma([255u8]));
    }
    edges
}

/// Creates an edge map with a closed triangle outline.
pub fn edge_map_with_triangle(width: u32, height: u32, corners: [(f32, f32); 3]) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    for i in 0..3 {
        draw_line_segment_mut(&mut edges, corners[i], corners[(i + 1) % 3], Luma([255u8]));
    }
    edges
}

/// Saves an image into `dir` and returns its path.
pub fn save_image(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("Failed to save test image");
    path
}

/// Asserts two boxes agree within `tolerance` pixels on every field.
pub fn assert_box_near(actual: BoundingBox, expected: BoundingBox, tolerance: u32) {
    let close = |a: u32, b: u32| a.abs_diff(b) <= tolerance;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "Expected {:?} within {}px, got {:?}",
        expected,
        tolerance,
        actual
    );
}
