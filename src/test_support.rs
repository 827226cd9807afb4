use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

/// PNG bytes of a `width` x `height` image filled with one RGBA pixel.
pub(crate) fn png(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(px)));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png fixture");
    bytes.into_inner()
}
