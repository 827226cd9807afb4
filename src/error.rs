use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Color Error: {0}")]
    Color(#[from] ColorError),
    #[error("Source Error: {0}")]
    Source(#[from] ExtractionError),
    #[error("Output Error: {0}")]
    Output(#[from] serde_json::Error),
}

// Hex color parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Color '{0}' must start with '#'")]
    MissingHash(String),
    #[error("Color '{0}' has {1} hex digits, expected 6 or 8")]
    InvalidLength(String, usize),
    #[error("Color '{0}' contains a non-hex digit")]
    InvalidDigit(String),
}

// Everything that can go wrong between an image reference and a scanned raster.
// None of these reach the caller of `ColorExtractor::extract`.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read image {reference}: {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch image {reference}: {source}")]
    Http {
        reference: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Image {reference} returned status {status}")]
    Status { reference: String, status: u16 },
    #[error("Image {0} is not in the in-memory source")]
    NotFound(String),
    #[error("Image {0} cannot be fetched by this source")]
    Unroutable(String),
    #[error("Image {reference} is {size} bytes (limit {limit})")]
    TooLarge {
        reference: String,
        size: u64,
        limit: u64,
    },
    #[error("Image {0} has an unsupported format")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to rasterize image: {0}")]
    Raster(String),
    #[error("Loading image {0} timed out")]
    Timeout(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration value {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
