pub mod fs;
pub mod http;
pub mod memory;
pub mod storage;

use async_trait::async_trait;

use crate::common::ImageRef;
use crate::error::ExtractionError;

pub use fs::FsSource;
pub use http::HttpSource;
pub use memory::MemorySource;
pub use storage::StorageResolver;

/// Fetches the encoded bytes of an image. Decoding happens downstream.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>, ExtractionError>;
}

/// Sends local references to the filesystem and remote ones over HTTP.
#[derive(Debug, Clone)]
pub struct RoutingSource {
    fs: FsSource,
    http: HttpSource,
}

impl RoutingSource {
    pub fn new(max_bytes: u64) -> Result<Self, ExtractionError> {
        Ok(Self {
            fs: FsSource::new(max_bytes),
            http: HttpSource::new(max_bytes)?,
        })
    }
}

#[async_trait]
impl ImageSource for RoutingSource {
    async fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>, ExtractionError> {
        match image {
            ImageRef::Local(_) => self.fs.fetch(image).await,
            ImageRef::Remote(_) => self.http.fetch(image).await,
        }
    }
}

pub(crate) fn check_size(image: &ImageRef, size: u64, limit: u64) -> Result<(), ExtractionError> {
    if size > limit {
        return Err(ExtractionError::TooLarge {
            reference: image.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}
