use image::{DynamicImage, RgbaImage};

use crate::common::Color;
use crate::config::{ExtractionConfig, ResizeFilter};
use crate::error::ExtractionError;
use crate::pipeline::frequency::FrequencyTable;

const BYTES_PER_PIXEL: usize = 4;

/// Downsamples an image and picks its most frequent qualifying color.
#[derive(Debug, Clone)]
pub struct ColorSampler {
    width: u32,
    height: u32,
    pixel_stride: usize,
    alpha_threshold: u8,
    dark_cutoff: u8,
    light_cutoff: u8,
    filter: ResizeFilter,
}

impl ColorSampler {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            width: config.sample_width,
            height: config.sample_height,
            pixel_stride: config.pixel_stride,
            alpha_threshold: config.alpha_threshold,
            dark_cutoff: config.dark_cutoff,
            light_cutoff: config.light_cutoff,
            filter: config.resize_filter,
        }
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pixel_stride(mut self, stride: usize) -> Self {
        self.pixel_stride = stride.max(1);
        self
    }

    /// Stretches `image` onto the fixed sample raster, ignoring aspect ratio.
    pub fn rasterize(&self, image: &DynamicImage) -> Result<RgbaImage, ExtractionError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ExtractionError::Raster(format!(
                "source image is {}x{}",
                image.width(),
                image.height()
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ExtractionError::Raster(format!(
                "sample raster is {}x{}",
                self.width, self.height
            )));
        }

        let raster = image
            .resize_exact(self.width, self.height, self.filter.into())
            .to_rgba8();
        Ok(raster)
    }

    /// Scans a flat RGBA buffer. `None` means no pixel survived the filters.
    pub fn scan(&self, rgba: &[u8]) -> Option<Color> {
        let mut table = FrequencyTable::new();

        for pixel in rgba
            .chunks_exact(BYTES_PER_PIXEL)
            .step_by(self.pixel_stride.max(1))
        {
            let [r, g, b, a] = [pixel[0], pixel[1], pixel[2], pixel[3]];
            if !self.qualifies(r, g, b, a) {
                continue;
            }
            table.record(Color::new(r, g, b));
        }

        tracing::trace!(
            empty = table.is_empty(),
            distinct = table.distinct(),
            max_count = table.max_count(),
            "Scanned sample raster"
        );
        table.dominant()
    }

    pub fn dominant_color(&self, image: &DynamicImage) -> Result<Option<Color>, ExtractionError> {
        let raster = self.rasterize(image)?;
        Ok(self.scan(raster.as_raw()))
    }

    fn qualifies(&self, r: u8, g: u8, b: u8, a: u8) -> bool {
        if a < self.alpha_threshold {
            return false;
        }
        let near_black = r < self.dark_cutoff && g < self.dark_cutoff && b < self.dark_cutoff;
        let near_white = r > self.light_cutoff && g > self.light_cutoff && b > self.light_cutoff;
        !near_black && !near_white
    }
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn solid(width: u32, height: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(px)))
    }

    #[test]
    fn solid_qualifying_color_is_dominant() {
        let sampler = ColorSampler::new();
        let image = solid(640, 480, [0x3a, 0x7b, 0xc4, 255]);
        assert_eq!(
            sampler.dominant_color(&image).unwrap(),
            Some(Color::new(0x3a, 0x7b, 0xc4))
        );
    }

    #[test]
    fn rgb_images_are_opaque() {
        let sampler = ColorSampler::new();
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(10, 10, Rgb([10, 245, 128])));
        assert_eq!(
            sampler.dominant_color(&image).unwrap(),
            Some(Color::new(10, 245, 128))
        );
    }

    #[test]
    fn black_white_and_transparent_are_skipped() {
        let sampler = ColorSampler::new();
        for px in [
            [0, 0, 0, 255],
            [9, 9, 9, 255],
            [255, 255, 255, 255],
            [246, 250, 255, 255],
            [120, 40, 200, 127],
            [120, 40, 200, 0],
        ] {
            assert_eq!(sampler.dominant_color(&solid(50, 50, px)).unwrap(), None);
        }
    }

    #[test]
    fn filters_need_every_channel() {
        let sampler = ColorSampler::new();
        // one channel outside the near-black band keeps the pixel
        assert_eq!(
            sampler.dominant_color(&solid(4, 4, [9, 9, 10, 255])).unwrap(),
            Some(Color::new(9, 9, 10))
        );
        assert_eq!(
            sampler.dominant_color(&solid(4, 4, [255, 255, 245, 128])).unwrap(),
            Some(Color::new(255, 255, 245))
        );
    }

    #[test]
    fn scan_visits_every_fourth_pixel() {
        let sampler = ColorSampler::new();
        let red = [200, 30, 30, 255];
        let blue = [30, 30, 200, 255];
        // blue everywhere except the visited positions 0, 4, 8
        let mut raw = Vec::new();
        for i in 0..12 {
            raw.extend_from_slice(if i % 4 == 0 { &red } else { &blue });
        }
        assert_eq!(sampler.scan(&raw), Some(Color::new(200, 30, 30)));
    }

    #[test]
    fn scan_keeps_first_leader_on_tie() {
        let sampler = ColorSampler::new().with_pixel_stride(1);
        let raw = [
            [50, 60, 70, 255],
            [80, 90, 100, 255],
            [80, 90, 100, 255],
            [50, 60, 70, 255],
        ]
        .concat();
        assert_eq!(sampler.scan(&raw), Some(Color::new(80, 90, 100)));
    }

    #[test]
    fn scan_ignores_trailing_partial_pixel() {
        let sampler = ColorSampler::new();
        assert_eq!(sampler.scan(&[100, 100, 100]), None);
        assert_eq!(sampler.scan(&[]), None);
    }

    #[test]
    fn rasterize_is_fixed_size() {
        let sampler = ColorSampler::new().with_filter(ResizeFilter::Nearest);
        let raster = sampler.rasterize(&solid(1024, 3, [1, 2, 3, 4])).unwrap();
        assert_eq!(raster.dimensions(), (50, 50));
        assert_eq!(raster.as_raw().len(), 50 * 50 * 4);
    }

    #[test]
    fn empty_image_is_a_raster_error() {
        let sampler = ColorSampler::new();
        let image = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            sampler.dominant_color(&image),
            Err(ExtractionError::Raster(_))
        ));
    }

    #[test]
    fn majority_color_wins_after_downsampling() {
        let sampler = ColorSampler::new().with_filter(ResizeFilter::Nearest);
        let image = ImageBuffer::from_fn(100, 100, |x, _| {
            if x < 75 {
                Rgba([30, 140, 90, 255])
            } else {
                Rgba([220, 60, 40, 255])
            }
        });
        assert_eq!(
            sampler
                .dominant_color(&DynamicImage::ImageRgba8(image))
                .unwrap(),
            Some(Color::new(30, 140, 90))
        );
    }
}
