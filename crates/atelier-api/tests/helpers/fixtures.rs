//! Test fixtures: synthesized PNG sources.

use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;

/// Encode a gradient PNG of the given dimensions.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}
