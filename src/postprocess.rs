use anyhow::Result;
use image::{Rgb, RgbImage};

use crate::models::BoundingBox;

/// Copy the region covered by `bbox` out of `img`
pub fn crop(img: &RgbImage, bbox: BoundingBox) -> RgbImage {
    image::imageops::crop_imm(img, bbox.x, bbox.y, bbox.width, bbox.height).to_image()
}

/// Flatten an image into square tiles of their dominant color.
///
/// Each channel of a tile takes the most frequent value of that channel in
/// the tile (lowest value on ties). Pixels past the last whole tile copy
/// the nearest tiled row or column. An image smaller than one tile in a
/// dimension is treated as a single tile in that dimension.
pub fn simplify_blocks(img: &RgbImage, block_size: u32) -> Result<RgbImage> {
    if block_size == 0 {
        anyhow::bail!("Block size must be positive");
    }

    let (width, height) = img.dimensions();
    let mut output = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return Ok(output);
    }

    let tile_w = block_size.min(width);
    let tile_h = block_size.min(height);
    let covered_w = (width / tile_w) * tile_w;
    let covered_h = (height / tile_h) * tile_h;

    for ty in (0..covered_h).step_by(tile_h as usize) {
        for tx in (0..covered_w).step_by(tile_w as usize) {
            let color = dominant_color(img, tx, ty, tile_w, tile_h);
            for y in ty..ty + tile_h {
                for x in tx..tx + tile_w {
                    output.put_pixel(x, y, color);
                }
            }
        }
    }

    // Right strip: replicate the last tiled column
    for y in 0..covered_h {
        let edge = *output.get_pixel(covered_w - 1, y);
        for x in covered_w..width {
            output.put_pixel(x, y, edge);
        }
    }

    // Bottom strip: replicate the last tiled row, corner included
    for y in covered_h..height {
        for x in 0..width {
            let edge = *output.get_pixel(x, covered_h - 1);
            output.put_pixel(x, y, edge);
        }
    }

    Ok(output)
}

fn dominant_color(img: &RgbImage, x0: u32, y0: u32, w: u32, h: u32) -> Rgb<u8> {
    let mut histograms = [[0u32; 256]; 3];
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let px = img.get_pixel(x, y);
            for (channel, hist) in histograms.iter_mut().enumerate() {
                hist[px[channel] as usize] += 1;
            }
        }
    }

    let mut color = [0u8; 3];
    for (channel, hist) in histograms.iter().enumerate() {
        let mut best = 0usize;
        for (value, count) in hist.iter().enumerate() {
            if *count > hist[best] {
                best = value;
            }
        }
        color[channel] = best as u8;
    }
    Rgb(color)
}
