use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::common::ImageRef;
use crate::error::ExtractionError;
use crate::source::ImageSource;

/// Encoded images held in memory, keyed by reference. Backs mock catalogs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    images: Arc<RwLock<HashMap<ImageRef, Vec<u8>>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, image: ImageRef, bytes: Vec<u8>) -> Self {
        self.insert(image, bytes);
        self
    }

    pub fn insert(&self, image: ImageRef, bytes: Vec<u8>) {
        let mut images = self.images.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        images.insert(image, bytes);
    }

    #[cfg(test)]
    pub fn remove(&self, image: &ImageRef) -> bool {
        let mut images = self.images.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        images.remove(image).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.images
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageSource for MemorySource {
    async fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>, ExtractionError> {
        let images = self.images.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        images
            .get(image)
            .cloned()
            .ok_or_else(|| ExtractionError::NotFound(image.to_string()))
    }
}
