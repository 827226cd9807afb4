pub mod color;
pub mod image_ref;

pub use color::Color;
pub use image_ref::ImageRef;
