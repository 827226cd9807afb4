use crate::common::ImageRef;
use crate::config::StorageConfig;
use crate::error::ExtractionError;

/// Turns the raw image strings stored on tracks into fetchable references.
#[derive(Debug, Clone)]
pub struct StorageResolver {
    base_url: Option<String>,
    bucket: String,
    allowed_formats: Vec<String>,
}

impl StorageResolver {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            bucket: config.bucket.trim_matches('/').to_string(),
            allowed_formats: config
                .allowed_image_formats
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Absolute URLs pass through untouched, whatever their path looks like,
    /// and the decoder settles their format. Other strings are uploaded object
    /// keys: they resolve into the bucket when a storage endpoint is configured,
    /// or to local paths otherwise, and must carry an allowed extension.
    pub fn resolve(&self, raw: &str) -> Result<ImageRef, ExtractionError> {
        if is_url(raw) {
            return Ok(ImageRef::remote(raw));
        }

        let image = if let Some(base) = &self.base_url {
            ImageRef::remote(format!(
                "{}/{}/{}",
                base,
                self.bucket,
                raw.trim_start_matches('/')
            ))
        } else {
            ImageRef::local(raw)
        };

        self.validate(&image)?;
        Ok(image)
    }

    pub fn validate(&self, image: &ImageRef) -> Result<(), ExtractionError> {
        match image.extension() {
            Some(ext) if self.allowed_formats.iter().any(|allowed| *allowed == ext) => Ok(()),
            _ => Err(ExtractionError::UnsupportedFormat(image.to_string())),
        }
    }
}

impl Default for StorageResolver {
    fn default() -> Self {
        Self::new(&StorageConfig::default())
    }
}

fn is_url(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
