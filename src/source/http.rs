use async_trait::async_trait;

use crate::common::ImageRef;
use crate::error::ExtractionError;
use crate::source::{check_size, ImageSource};

/// Anonymous HTTP fetch of album art. No cookies or credentials are sent.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpSource {
    const USER_AGENT: &'static str = concat!("cloudsong-color/", env!("CARGO_PKG_VERSION"));

    pub fn new(max_bytes: u64) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(ExtractionError::Client)?;
        Ok(Self::with_client(client, max_bytes))
    }

    pub fn with_client(client: reqwest::Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl ImageSource for HttpSource {
    async fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>, ExtractionError> {
        let url = match image {
            ImageRef::Remote(url) => url,
            ImageRef::Local(_) => return Err(ExtractionError::Unroutable(image.to_string())),
        };

        let http_error = |source| ExtractionError::Http {
            reference: image.to_string(),
            source,
        };
        let mut response = self.client.get(url).send().await.map_err(http_error)?;

        if !response.status().is_success() {
            return Err(ExtractionError::Status {
                reference: image.to_string(),
                status: response.status().as_u16(),
            });
        }
        if let Some(length) = response.content_length() {
            check_size(image, length, self.max_bytes)?;
        }

        // Content-Length may be absent or wrong, so the limit is enforced while streaming too.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            body.extend_from_slice(&chunk);
            check_size(image, body.len() as u64, self.max_bytes)?;
        }
        Ok(body)
    }
}
