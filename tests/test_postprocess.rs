//! Cropping and dominant-color block simplification.

mod common;

use common::*;
use drawbox::postprocess::{crop, simplify_blocks};
use image::{Rgb, RgbImage};

#[test]
fn test_crop_copies_region() {
    let img = RgbImage::from_fn(50, 40, |x, y| Rgb([x as u8, y as u8, 7]));

    let cropped = crop(&img, BoundingBox::new(10, 5, 20, 15));

    assert_eq!(cropped.dimensions(), (20, 15));
    assert_eq!(*cropped.get_pixel(0, 0), Rgb([10, 5, 7]));
    assert_eq!(*cropped.get_pixel(19, 14), Rgb([29, 19, 7]));
}

#[test]
fn test_crop_to_fallback_is_whole_image() {
    let img = page_with_rect(60, 40, BoundingBox::new(10, 10, 20, 20));

    let cropped = crop(&img, BoundingBox::full(60, 40));

    assert_eq!(cropped, img);
}

#[test]
fn test_tile_takes_dominant_channel_values() -> anyhow::Result<()> {
    // 2x2 tile: three red pixels and one blue
    let mut img = blank_image(4, 4, WHITE);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.put_pixel(1, 0, Rgb([255, 0, 0]));
    img.put_pixel(0, 1, Rgb([255, 0, 0]));
    img.put_pixel(1, 1, Rgb([0, 0, 255]));

    let simplified = simplify_blocks(&img, 2)?;

    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(*simplified.get_pixel(x, y), Rgb([255, 0, 0]));
    }
    assert_eq!(*simplified.get_pixel(3, 3), WHITE);
    Ok(())
}

#[test]
fn test_ties_pick_lowest_value() -> anyhow::Result<()> {
    let img = RgbImage::from_fn(2, 2, |x, _| if x == 0 { Rgb([200, 200, 200]) } else { Rgb([10, 10, 10]) });

    let simplified = simplify_blocks(&img, 2)?;

    assert!(simplified.pixels().all(|p| *p == Rgb([10, 10, 10])));
    Ok(())
}

#[test]
fn test_partial_tiles_replicate_edge() -> anyhow::Result<()> {
    // 5x5 with 2px tiles: column 4 and row 4 are not covered by a whole tile
    let img = RgbImage::from_fn(5, 5, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 0]));

    let simplified = simplify_blocks(&img, 2)?;

    for y in 0..4 {
        assert_eq!(simplified.get_pixel(4, y), simplified.get_pixel(3, y));
    }
    for x in 0..5 {
        assert_eq!(simplified.get_pixel(x, 4), simplified.get_pixel(x, 3));
    }
    Ok(())
}

#[test]
fn test_image_smaller_than_tile_is_one_tile() -> anyhow::Result<()> {
    let mut img = blank_image(3, 3, BLACK);
    img.put_pixel(1, 1, WHITE);

    let simplified = simplify_blocks(&img, 32)?;

    assert_eq!(simplified.dimensions(), (3, 3));
    assert!(simplified.pixels().all(|p| *p == BLACK));
    Ok(())
}

#[test]
fn test_zero_block_size_is_an_error() {
    let img = blank_image(4, 4, WHITE);

    assert!(simplify_blocks(&img, 0).is_err());
}
