//! Star buffer configuration
//!
//! A [`StarBufferConfig`] picks one of five retention strategies and a star
//! density factor, then binds them to a spectrogram with
//! [`StarBufferConfig::create`]. All validation happens here, before any star
//! is offered.
//!
//! The density factor is measured in retained stars per spectrogram cell:
//! every strategy uses the spectrogram area (`frames x bins`) as its
//! reference unit and gives each bucket a weight that is its share of 1.0, so
//! bucket capacity is `max(1, round(density x weight x area))` whatever the
//! strategy.

use crate::bands::{validate_manual_bands, FrequencyBandTable, FAIR_BAND_SIZES, FAIR_BAND_WEIGHTS};
use crate::bucket::Bucket;
use crate::buffer::{BucketKeying, StarBuffer};
use crate::error::{ConfigError, Result};
use crate::spectrogram::{SpectrogramBounds, SpectrogramDims};
use serde::{Deserialize, Serialize};

/// Default retained stars per spectrogram cell
pub const DEFAULT_STAR_DENSITY_FACTOR: f64 = 0.02;

/// Default width of a time window, in frames
pub const DEFAULT_TIME_WINDOW_FRAMES: usize = 32;

/// Default width of a frequency window, in bins
pub const DEFAULT_FREQUENCY_WINDOW_BINS: usize = 16;

/// How candidates are partitioned into buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// One global bucket, coordinates ignored
    CoordinateAgnostic,
    /// One bucket per run of `window_frames` time frames
    EvenlySpreadInTime {
        #[serde(default = "default_time_window_frames")]
        window_frames: usize,
    },
    /// One bucket per run of `window_bins` frequency bins, equal density
    EvenlySpreadInFrequency {
        #[serde(default = "default_frequency_window_bins")]
        window_bins: usize,
    },
    /// `num_bands` equal frequency bands with equal weights
    EvenlyBanded { num_bands: usize },
    /// Explicit band sizes (fractions of the axis) and relative weights
    ManuallyBanded {
        #[serde(default = "fair_sizes")]
        sizes: Vec<f64>,
        #[serde(default = "fair_weights")]
        weights: Vec<f64>,
    },
}

fn default_time_window_frames() -> usize {
    DEFAULT_TIME_WINDOW_FRAMES
}
fn default_frequency_window_bins() -> usize {
    DEFAULT_FREQUENCY_WINDOW_BINS
}
fn fair_sizes() -> Vec<f64> {
    FAIR_BAND_SIZES.to_vec()
}
fn fair_weights() -> Vec<f64> {
    FAIR_BAND_WEIGHTS.to_vec()
}
fn default_star_density_factor() -> f64 {
    DEFAULT_STAR_DENSITY_FACTOR
}

impl Strategy {
    /// The fair preset: bands of {5%, 15%, 40%} weighted {10%, 70%, 20%}
    pub fn fair() -> Self {
        Strategy::ManuallyBanded {
            sizes: fair_sizes(),
            weights: fair_weights(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CoordinateAgnostic => "coordinate_agnostic",
            Strategy::EvenlySpreadInTime { .. } => "evenly_spread_in_time",
            Strategy::EvenlySpreadInFrequency { .. } => "evenly_spread_in_frequency",
            Strategy::EvenlyBanded { .. } => "evenly_banded",
            Strategy::ManuallyBanded { .. } => "manually_banded",
        }
    }

    /// Check the strategy parameters, independent of any spectrogram
    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::CoordinateAgnostic => Ok(()),
            Strategy::EvenlySpreadInTime { window_frames } if *window_frames == 0 => {
                Err(ConfigError::ZeroWindow("time"))
            }
            Strategy::EvenlySpreadInFrequency { window_bins } if *window_bins == 0 => {
                Err(ConfigError::ZeroWindow("frequency"))
            }
            Strategy::EvenlySpreadInTime { .. } | Strategy::EvenlySpreadInFrequency { .. } => {
                Ok(())
            }
            Strategy::EvenlyBanded { num_bands } if *num_bands == 0 => Err(ConfigError::NoBands),
            Strategy::EvenlyBanded { .. } => Ok(()),
            Strategy::ManuallyBanded { sizes, weights } => validate_manual_bands(sizes, weights),
        }
    }

    /// Bucket keying and per-bucket weights for concrete bounds
    fn layout(&self, dims: SpectrogramDims) -> Result<(BucketKeying, Vec<f64>)> {
        match self {
            Strategy::CoordinateAgnostic => Ok((BucketKeying::Global, vec![1.0])),
            Strategy::EvenlySpreadInTime { window_frames } => Ok((
                BucketKeying::TimeWindows {
                    window_frames: *window_frames,
                },
                window_weights(dims.num_frames, *window_frames),
            )),
            Strategy::EvenlySpreadInFrequency { window_bins } => Ok((
                BucketKeying::FrequencyWindows {
                    window_bins: *window_bins,
                },
                window_weights(dims.num_bins, *window_bins),
            )),
            Strategy::EvenlyBanded { num_bands } => {
                let table = FrequencyBandTable::evenly(*num_bands, dims.num_bins)?;
                Ok(band_layout(table))
            }
            Strategy::ManuallyBanded { sizes, weights } => {
                let table = FrequencyBandTable::manual(sizes, weights, dims.num_bins)?;
                Ok(band_layout(table))
            }
        }
    }
}

fn band_layout(table: FrequencyBandTable) -> (BucketKeying, Vec<f64>) {
    let weights = table.bands().iter().map(|band| band.weight).collect();
    (BucketKeying::Bands(table), weights)
}

/// Weight of each window along an axis: its width over the axis length
fn window_weights(axis_len: usize, window: usize) -> Vec<f64> {
    (0..axis_len.div_ceil(window))
        .map(|i| {
            let width = window.min(axis_len - i * window);
            width as f64 / axis_len as f64
        })
        .collect()
}

/// Number of stars a bucket may hold
pub fn bucket_capacity(star_density_factor: f64, weight: f64, reference_unit: usize) -> usize {
    let capacity = (star_density_factor * weight * reference_unit as f64).round();
    (capacity as usize).max(1)
}

/// Validated configuration for a [`StarBuffer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarBufferConfig {
    /// Retained stars per spectrogram cell
    #[serde(default = "default_star_density_factor")]
    pub star_density_factor: f64,
    #[serde(default = "Strategy::fair")]
    pub strategy: Strategy,
}

impl Default for StarBufferConfig {
    fn default() -> Self {
        Self::banded(DEFAULT_STAR_DENSITY_FACTOR)
    }
}

impl StarBufferConfig {
    pub fn new(star_density_factor: f64, strategy: Strategy) -> Self {
        Self {
            star_density_factor,
            strategy,
        }
    }

    /// Single global bucket holding `density x area` stars
    pub fn coordinate_agnostic(star_density_factor: f64) -> Self {
        Self::new(star_density_factor, Strategy::CoordinateAgnostic)
    }

    /// Buckets keyed by time window
    pub fn evenly_spread_in_time(star_density_factor: f64) -> Self {
        Self::new(
            star_density_factor,
            Strategy::EvenlySpreadInTime {
                window_frames: DEFAULT_TIME_WINDOW_FRAMES,
            },
        )
    }

    /// Uniform frequency windows with equal density
    pub fn evenly_spread_in_frequency(star_density_factor: f64) -> Self {
        Self::new(
            star_density_factor,
            Strategy::EvenlySpreadInFrequency {
                window_bins: DEFAULT_FREQUENCY_WINDOW_BINS,
            },
        )
    }

    /// Frequency-banded buffer, starting from the fair preset
    pub fn banded(star_density_factor: f64) -> Self {
        Self::new(star_density_factor, Strategy::fair())
    }

    pub fn star_density_factor(mut self, star_density_factor: f64) -> Self {
        self.star_density_factor = star_density_factor;
        self
    }

    /// Switch to `num_bands` equal, equally weighted frequency bands
    pub fn evenly_banded(mut self, num_bands: usize) -> Result<Self> {
        if num_bands == 0 {
            return Err(ConfigError::NoBands);
        }
        self.strategy = Strategy::EvenlyBanded { num_bands };
        Ok(self)
    }

    /// Switch to explicit frequency bands
    pub fn manually_banded(mut self, sizes: &[f64], weights: &[f64]) -> Result<Self> {
        validate_manual_bands(sizes, weights)?;
        self.strategy = Strategy::ManuallyBanded {
            sizes: sizes.to_vec(),
            weights: weights.to_vec(),
        };
        Ok(self)
    }

    /// Switch to the fair preset
    pub fn fairly_banded(mut self) -> Self {
        self.strategy = Strategy::fair();
        self
    }

    /// Switch to time windows of `window_frames` frames
    pub fn time_window(mut self, window_frames: usize) -> Result<Self> {
        if window_frames == 0 {
            return Err(ConfigError::ZeroWindow("time"));
        }
        self.strategy = Strategy::EvenlySpreadInTime { window_frames };
        Ok(self)
    }

    /// Switch to frequency windows of `window_bins` bins
    pub fn frequency_window(mut self, window_bins: usize) -> Result<Self> {
        if window_bins == 0 {
            return Err(ConfigError::ZeroWindow("frequency"));
        }
        self.strategy = Strategy::EvenlySpreadInFrequency { window_bins };
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let d = self.star_density_factor;
        if !d.is_finite() || d <= 0.0 {
            return Err(ConfigError::NonPositiveDensity(d));
        }
        self.strategy.validate()
    }

    /// Bind the configuration to a spectrogram, computing bucket capacities
    pub fn create<S: SpectrogramBounds + ?Sized>(&self, spectrogram: &S) -> Result<StarBuffer> {
        self.validate()?;

        let dims = SpectrogramDims::of(spectrogram);
        if dims.num_frames == 0 || dims.num_bins == 0 {
            return Err(ConfigError::EmptySpectrogram {
                num_frames: dims.num_frames,
                num_bins: dims.num_bins,
            });
        }

        let (keying, weights) = self.strategy.layout(dims)?;
        let reference_unit = spectrogram.area();
        let buckets: Vec<Bucket> = weights
            .iter()
            .map(|&w| Bucket::new(bucket_capacity(self.star_density_factor, w, reference_unit)))
            .collect();

        let buffer = StarBuffer::new(self.strategy.name(), dims, keying, buckets);
        log::debug!(
            "Created {} star buffer: {} buckets, {} total capacity ({}x{} spectrogram, density {})",
            buffer.strategy_name(),
            buffer.num_buckets(),
            buffer.total_capacity(),
            dims.num_frames,
            dims.num_bins,
            self.star_density_factor
        );

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fairly_banded_preset() {
        for density in [0.001, 0.5, 3.0] {
            let config = StarBufferConfig::coordinate_agnostic(density).fairly_banded();
            match &config.strategy {
                Strategy::ManuallyBanded { sizes, weights } => {
                    assert_eq!(sizes, &vec![0.05, 0.15, 0.40]);
                    assert_eq!(weights, &vec![0.1, 0.7, 0.2]);
                }
                other => panic!("unexpected strategy {:?}", other),
            }
            assert_relative_eq!(config.star_density_factor, density);
        }
    }

    #[test]
    fn test_manually_banded_rejects_mismatched_lengths() {
        let result = StarBufferConfig::banded(0.1).manually_banded(&[0.2, 0.3], &[1.0]);
        assert_eq!(
            result,
            Err(ConfigError::MismatchedBandLengths {
                sizes: 2,
                weights: 1
            })
        );
    }

    #[test]
    fn test_manually_banded_rejects_negative_values() {
        assert!(StarBufferConfig::banded(0.1)
            .manually_banded(&[-0.2, 0.3], &[1.0, 1.0])
            .is_err());
        assert!(StarBufferConfig::banded(0.1)
            .manually_banded(&[0.2, 0.3], &[1.0, -1.0])
            .is_err());
    }

    #[test]
    fn test_density_factor_validation() {
        let spec = SpectrogramDims::new(10, 10);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = StarBufferConfig::coordinate_agnostic(bad).create(&spec).unwrap_err();
            assert!(matches!(err, ConfigError::NonPositiveDensity(_)));
        }
    }

    #[test]
    fn test_star_density_factor_setter_chains() {
        let config = StarBufferConfig::coordinate_agnostic(1.0)
            .star_density_factor(0.25)
            .evenly_banded(4)
            .unwrap();
        assert_relative_eq!(config.star_density_factor, 0.25);
        assert_eq!(config.strategy, Strategy::EvenlyBanded { num_bands: 4 });
    }

    #[test]
    fn test_zero_windows_rejected() {
        let config = StarBufferConfig::coordinate_agnostic(1.0);
        assert_eq!(
            config.clone().time_window(0),
            Err(ConfigError::ZeroWindow("time"))
        );
        assert_eq!(
            config.clone().frequency_window(0),
            Err(ConfigError::ZeroWindow("frequency"))
        );
        assert_eq!(config.evenly_banded(0), Err(ConfigError::NoBands));
    }

    #[test]
    fn test_empty_spectrogram_rejected() {
        let err = StarBufferConfig::coordinate_agnostic(1.0)
            .create(&SpectrogramDims::new(0, 10))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptySpectrogram {
                num_frames: 0,
                num_bins: 10
            }
        );
    }

    #[test]
    fn test_bucket_capacity_formula() {
        assert_eq!(bucket_capacity(1.0, 1.0, 20_000), 20_000);
        assert_eq!(bucket_capacity(0.01, 0.7, 20_000), 140);
        assert_eq!(bucket_capacity(0.0001, 0.1, 100), 1);
    }

    #[test]
    fn test_window_weights_cover_axis() {
        let weights = window_weights(100, 32);
        assert_eq!(weights.len(), 4);
        assert_relative_eq!(weights[0], 0.32);
        assert_relative_eq!(weights[3], 0.04);
        assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_strategy_toml() {
        let config: StarBufferConfig = toml::from_str(
            r#"
            star_density_factor = 0.05

            [strategy]
            kind = "evenly_banded"
            num_bands = 6
        "#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::EvenlyBanded { num_bands: 6 });

        let config: StarBufferConfig = toml::from_str(
            r#"
            [strategy]
            kind = "manually_banded"
        "#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::fair());
        assert_relative_eq!(config.star_density_factor, DEFAULT_STAR_DENSITY_FACTOR);

        let config: StarBufferConfig = toml::from_str(
            r#"
            [strategy]
            kind = "evenly_spread_in_time"
        "#,
        )
        .unwrap();
        assert_eq!(
            config.strategy,
            Strategy::EvenlySpreadInTime {
                window_frames: DEFAULT_TIME_WINDOW_FRAMES
            }
        );
    }
}
