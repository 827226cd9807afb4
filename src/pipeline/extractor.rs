use std::convert::Infallible;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use ::image::{DynamicImage, ImageError, ImageReader, Limits};
use futures::Future;
use tower::Service;
use tracing::{debug, instrument, warn};

use crate::common::{Color, ImageRef};
use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use crate::pipeline::sampler::ColorSampler;
use crate::source::ImageSource;

/// Resolves an image reference to its dominant color, falling back to the
/// configured brand color on any failure.
pub struct ColorExtractor<S> {
    source: Arc<S>,
    sampler: ColorSampler,
    fallback: Color,
    load_timeout: Duration,
    limits: Limits,
}

impl<S> Clone for ColorExtractor<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            sampler: self.sampler.clone(),
            fallback: self.fallback,
            load_timeout: self.load_timeout,
            limits: self.limits.clone(),
        }
    }
}

impl<S> ColorExtractor<S>
where
    S: ImageSource + 'static,
{
    pub fn new(source: S, config: &ExtractionConfig) -> Self {
        Self::from_shared(Arc::new(source), config)
    }

    pub fn from_shared(source: Arc<S>, config: &ExtractionConfig) -> Self {
        Self {
            source,
            sampler: ColorSampler::from_config(config),
            fallback: config.fallback_color,
            load_timeout: config.load_timeout(),
            limits: config.decode_limits(),
        }
    }

    /// Dominant color of `image`. Never fails.
    #[instrument(skip_all, fields(image = %image))]
    pub async fn extract(&self, image: &ImageRef) -> Color {
        let start = Instant::now();
        match self.try_extract(image).await {
            Ok(Some(color)) => {
                debug!(
                    "Extracted {} in {}us",
                    color,
                    start.elapsed().as_micros()
                );
                color
            }
            Ok(None) => {
                debug!("No qualifying pixels, using fallback {}", self.fallback);
                self.fallback
            }
            Err(e) => {
                warn!("Color extraction failed, using fallback {}: {}", self.fallback, e);
                self.fallback
            }
        }
    }

    /// Like `extract` but reports why no color was found. `Ok(None)` means the
    /// image loaded but every sampled pixel was filtered out.
    pub async fn try_extract(&self, image: &ImageRef) -> Result<Option<Color>, ExtractionError> {
        let bytes = tokio::time::timeout(self.load_timeout, self.source.fetch(image))
            .await
            .map_err(|_| ExtractionError::Timeout(image.to_string()))??;

        let sampler = self.sampler.clone();
        let limits = self.limits.clone();
        tokio::task::spawn_blocking(move || {
            let decoded = decode(&bytes, limits)?;
            sampler.dominant_color(&decoded)
        })
        .await
        .map_err(|e| ExtractionError::Raster(e.to_string()))?
    }
}

/// Sniffs the format from the bytes and decodes within `limits`, which are
/// checked against the header before any pixel buffer is allocated.
fn decode(bytes: &[u8], limits: Limits) -> Result<DynamicImage, ExtractionError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?;
    reader.limits(limits);
    Ok(reader.decode()?)
}

impl<S> Service<ImageRef> for ColorExtractor<S>
where
    S: ImageSource + 'static,
{
    type Response = Color;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: ImageRef) -> Self::Future {
        let extractor = self.clone();
        Box::pin(async move { Ok(extractor.extract(&image).await) })
    }
}
