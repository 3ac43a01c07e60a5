//! Frequency band table
//!
//! Splits the frequency axis into ordered, non-overlapping bands, each with a
//! share of the retention budget.

use crate::error::{ConfigError, Result};
use serde::Serialize;

/// Band sizes of the fair preset, as fractions of the frequency axis
pub const FAIR_BAND_SIZES: [f64; 3] = [0.05, 0.15, 0.40];

/// Band weights of the fair preset. The second band is favoured, following
/// the ear's sensitivity to mid frequencies.
pub const FAIR_BAND_WEIGHTS: [f64; 3] = [0.1, 0.7, 0.2];

const SIZE_SUM_TOLERANCE: f64 = 1e-9;

/// Half-open range of frequency bins with its normalized weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    /// First bin of the band
    pub start: usize,
    /// One past the last bin of the band
    pub end: usize,
    /// Share of the total budget, all bands sum to 1.0
    pub weight: f64,
}

impl FrequencyBand {
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, bin: usize) -> bool {
        bin >= self.start && bin < self.end
    }
}

/// Ordered partition of (part of) the frequency axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyBandTable {
    bands: Vec<FrequencyBand>,
}

impl FrequencyBandTable {
    /// `num_bands` equal bands with equal weights covering `[0, num_bins)`
    pub fn evenly(num_bands: usize, num_bins: usize) -> Result<Self> {
        if num_bands == 0 {
            return Err(ConfigError::NoBands);
        }

        let weight = 1.0 / num_bands as f64;
        let bands = (0..num_bands)
            .map(|i| FrequencyBand {
                start: i * num_bins / num_bands,
                end: (i + 1) * num_bins / num_bands,
                weight,
            })
            .collect();

        Ok(Self { bands })
    }

    /// Bands laid out from bin 0 upwards with explicit sizes and weights.
    ///
    /// Sizes are fractions of the axis; bins past the last band belong to no
    /// band. Weights are normalized to sum to 1.0.
    pub fn manual(sizes: &[f64], weights: &[f64], num_bins: usize) -> Result<Self> {
        validate_manual_bands(sizes, weights)?;

        let total_weight: f64 = weights.iter().sum();
        let mut cumulative = 0.0;
        let mut start = 0;
        let mut bands = Vec::with_capacity(sizes.len());

        for (size, weight) in sizes.iter().zip(weights) {
            cumulative += size;
            let end = ((cumulative * num_bins as f64).round() as usize)
                .clamp(start, num_bins);
            bands.push(FrequencyBand {
                start,
                end,
                weight: weight / total_weight,
            });
            start = end;
        }

        Ok(Self { bands })
    }

    /// Index of the band holding `bin`, if any
    pub fn band_of(&self, bin: usize) -> Option<usize> {
        let idx = self.bands.partition_point(|band| band.start <= bin);
        let idx = idx.checked_sub(1)?;
        self.bands[idx].contains(bin).then_some(idx)
    }

    pub fn bands(&self) -> &[FrequencyBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Number of bins covered by any band
    pub fn covered_bins(&self) -> usize {
        self.bands.iter().map(FrequencyBand::width).sum()
    }
}

/// Check manual band sizes and weights before any bins are assigned
pub fn validate_manual_bands(sizes: &[f64], weights: &[f64]) -> Result<()> {
    if sizes.len() != weights.len() {
        return Err(ConfigError::MismatchedBandLengths {
            sizes: sizes.len(),
            weights: weights.len(),
        });
    }
    if sizes.is_empty() {
        return Err(ConfigError::NoBands);
    }

    for (index, &value) in sizes.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidBandSize { index, value });
        }
    }
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidBandWeight { index, value });
        }
    }

    let size_sum: f64 = sizes.iter().sum();
    if size_sum > 1.0 + SIZE_SUM_TOLERANCE {
        return Err(ConfigError::BandSizesExceedAxis(size_sum));
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return Err(ConfigError::ZeroTotalWeight);
    }

    Ok(())
}
