use async_trait::async_trait;

use crate::common::ImageRef;
use crate::error::ExtractionError;
use crate::source::{check_size, ImageSource};

#[derive(Debug, Clone)]
pub struct FsSource {
    max_bytes: u64,
}

impl FsSource {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl ImageSource for FsSource {
    async fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>, ExtractionError> {
        let path = match image {
            ImageRef::Local(path) => path,
            ImageRef::Remote(_) => return Err(ExtractionError::Unroutable(image.to_string())),
        };

        let io_error = |source| ExtractionError::Io {
            reference: image.to_string(),
            source,
        };
        let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
        check_size(image, metadata.len(), self.max_bytes)?;

        tokio::fs::read(path).await.map_err(io_error)
    }
}
