use std::path::Path;
use std::time::Duration;

use image::imageops::FilterType;
use serde::Deserialize;

use crate::common::Color;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub extraction: ExtractionConfig,
    pub storage: StorageConfig,
    /// Extractions allowed in flight at once.
    pub concurrency_limit: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub fallback_color: Color,
    pub sample_width: u32,
    pub sample_height: u32,
    /// Visit one pixel out of every `pixel_stride` in the flat raster.
    pub pixel_stride: usize,
    /// Pixels with alpha below this are transparent.
    pub alpha_threshold: u8,
    /// Pixels with every channel below this are near-black.
    pub dark_cutoff: u8,
    /// Pixels with every channel above this are near-white.
    pub light_cutoff: u8,
    pub resize_filter: ResizeFilter,
    pub load_timeout_ms: u64,
    pub max_image_bytes: u64,
    /// Largest width or height the decoder will accept, read from the header.
    pub max_decode_dimension: u32,
    /// Upper bound on what the decoder may allocate for one image.
    pub max_decode_alloc_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Object storage endpoint prepended to bare paths. Bare paths stay local when unset.
    pub base_url: Option<String>,
    pub bucket: String,
    pub allowed_image_formats: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            storage: StorageConfig::default(),
            concurrency_limit: 8,
            log_level: "info".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_color: Color::FALLBACK,
            sample_width: 50,
            sample_height: 50,
            pixel_stride: 4,
            alpha_threshold: 128,
            dark_cutoff: 10,
            light_cutoff: 245,
            resize_filter: ResizeFilter::Triangle,
            load_timeout_ms: 10_000,
            max_image_bytes: 50 * 1024 * 1024,
            max_decode_dimension: 8192,
            max_decode_alloc_bytes: 256 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bucket: "cloudsong-files".to_string(),
            allowed_image_formats: ["jpg", "jpeg", "png", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ExtractionConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn decode_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_decode_dimension);
        limits.max_image_height = Some(self.max_decode_dimension);
        limits.max_alloc = Some(self.max_decode_alloc_bytes);
        limits
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Configuration {
    /// Defaults, then the optional file, then `CLOUDSONG__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let configuration: Self = builder
            .add_source(
                config::Environment::with_prefix("CLOUDSONG")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("storage.allowed_image_formats")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let extraction = &self.extraction;
        if extraction.sample_width == 0 || extraction.sample_height == 0 {
            return Err(ConfigError::Invalid {
                key: "extraction.sample_width",
                reason: format!(
                    "sample raster must be non-empty, got {}x{}",
                    extraction.sample_width, extraction.sample_height
                ),
            });
        }
        if extraction.pixel_stride == 0 {
            return Err(ConfigError::Invalid {
                key: "extraction.pixel_stride",
                reason: "stride must be at least 1".to_string(),
            });
        }
        if extraction.max_decode_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "extraction.max_decode_dimension",
                reason: "decoder must accept at least one pixel".to_string(),
            });
        }
        if extraction.dark_cutoff > extraction.light_cutoff {
            return Err(ConfigError::Invalid {
                key: "extraction.dark_cutoff",
                reason: format!(
                    "dark cutoff {} is above light cutoff {}",
                    extraction.dark_cutoff, extraction.light_cutoff
                ),
            });
        }
        if self.concurrency_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "concurrency_limit",
                reason: "at least one extraction must be allowed".to_string(),
            });
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid {
                key: "log_level",
                reason: format!("unknown level '{}'", self.log_level),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_album_art_sampling() {
        let configuration = Configuration::default();
        assert_eq!(configuration.extraction.fallback_color, Color::FALLBACK);
        assert_eq!(configuration.extraction.sample_width, 50);
        assert_eq!(configuration.extraction.pixel_stride, 4);
        assert_eq!(configuration.extraction.alpha_threshold, 128);
        assert_eq!(configuration.storage.bucket, "cloudsong-files");
        assert!(configuration.validate().is_ok());

        let limits = configuration.extraction.decode_limits();
        assert_eq!(limits.max_image_width, Some(8192));
        assert_eq!(limits.max_image_height, Some(8192));
        assert_eq!(limits.max_alloc, Some(256 * 1024 * 1024));
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "concurrency_limit = 2\n\n[extraction]\nfallback_color = \"#FF0000\"\nresize_filter = \"nearest\""
        )
        .unwrap();

        let configuration = Configuration::load(Some(file.path())).unwrap();
        assert_eq!(configuration.concurrency_limit, 2);
        assert_eq!(configuration.extraction.fallback_color, Color::new(255, 0, 0));
        assert_eq!(configuration.extraction.resize_filter, ResizeFilter::Nearest);
        assert_eq!(configuration.extraction.sample_height, 50);
    }

    #[test]
    fn rejects_bad_fallback_color() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[extraction]\nfallback_color = \"purple\"").unwrap();
        assert!(matches!(
            Configuration::load(Some(file.path())),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn validation_catches_degenerate_values() {
        let mut configuration = Configuration::default();
        configuration.extraction.pixel_stride = 0;
        assert!(matches!(
            configuration.validate(),
            Err(ConfigError::Invalid { key: "extraction.pixel_stride", .. })
        ));

        let mut configuration = Configuration::default();
        configuration.extraction.dark_cutoff = 250;
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.log_level = "loud".to_string();
        assert!(configuration.validate().is_err());
    }
}
