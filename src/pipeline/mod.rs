pub mod extractor;
pub mod frequency;
pub mod palette;
pub mod sampler;

pub use extractor::ColorExtractor;
pub use frequency::FrequencyTable;
pub use palette::Palette;
pub use sampler::ColorSampler;
