//! Test image generation.
//!
//! Encodes small in-memory images so tests can feed real blobs to the loader.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

/// Encode a `width` x `height` gradient in the given format.
pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 128, 255])
    });

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("in-memory encode cannot fail");
    bytes
}

/// Encode a PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}
