//! Configuration errors
//!
//! Every error here is raised while configuring or creating a buffer, never
//! while stars are being offered.

use thiserror::Error;

/// Errors raised by [`StarBufferConfig`](crate::builder::StarBufferConfig)
/// and [`FrequencyBandTable`](crate::bands::FrequencyBandTable)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("star density factor must be finite and > 0, got {0}")]
    NonPositiveDensity(f64),

    #[error("band sizes and weights differ in length ({sizes} sizes, {weights} weights)")]
    MismatchedBandLengths { sizes: usize, weights: usize },

    #[error("at least one band is required")]
    NoBands,

    #[error("band size {index} must be finite and > 0, got {value}")]
    InvalidBandSize { index: usize, value: f64 },

    #[error("band weight {index} must be finite and >= 0, got {value}")]
    InvalidBandWeight { index: usize, value: f64 },

    #[error("band sizes sum to {0}, which exceeds the frequency axis (1.0)")]
    BandSizesExceedAxis(f64),

    #[error("band weights sum to zero")]
    ZeroTotalWeight,

    #[error("{0} window must span at least one cell")]
    ZeroWindow(&'static str),

    #[error("spectrogram has no cells ({num_frames} frames x {num_bins} bins)")]
    EmptySpectrogram { num_frames: usize, num_bins: usize },

    #[error("spectrogram frame {frame} has {found} bins, expected {expected}")]
    RaggedSpectrogram {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
