//! Spectrogram bounds
//!
//! The buffer only needs the size of the spectrogram it scans: the number of
//! time frames and frequency bins.

use crate::error::{ConfigError, Result};

/// Read-only dimensions of a spectrogram
pub trait SpectrogramBounds {
    /// Number of time frames
    fn num_frames(&self) -> usize;
    /// Number of frequency bins
    fn num_bins(&self) -> usize;

    /// Number of cells in the time/frequency grid
    fn area(&self) -> usize {
        self.num_frames() * self.num_bins()
    }
}

/// Spectrogram representation
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Magnitude values [time_frame][frequency_bin]
    pub magnitudes: Vec<Vec<f32>>,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins
    pub num_bins: usize,
}

impl Spectrogram {
    /// Wrap a magnitude grid, checking every frame has the same number of bins
    pub fn from_magnitudes(magnitudes: Vec<Vec<f32>>) -> Result<Self> {
        let num_frames = magnitudes.len();
        let num_bins = magnitudes.first().map_or(0, Vec::len);

        if let Some((frame, row)) = magnitudes
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_bins)
        {
            return Err(ConfigError::RaggedSpectrogram {
                frame,
                expected: num_bins,
                found: row.len(),
            });
        }

        Ok(Self {
            magnitudes,
            num_frames,
            num_bins,
        })
    }

    /// Magnitude at a grid cell, if it exists
    pub fn magnitude(&self, t: usize, f: usize) -> Option<f32> {
        self.magnitudes.get(t).and_then(|row| row.get(f)).copied()
    }
}

impl SpectrogramBounds for Spectrogram {
    fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn num_bins(&self) -> usize {
        self.num_bins
    }
}

/// Bare spectrogram dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrogramDims {
    pub num_frames: usize,
    pub num_bins: usize,
}

impl SpectrogramDims {
    pub fn new(num_frames: usize, num_bins: usize) -> Self {
        Self {
            num_frames,
            num_bins,
        }
    }

    pub fn of<S: SpectrogramBounds + ?Sized>(spectrogram: &S) -> Self {
        Self::new(spectrogram.num_frames(), spectrogram.num_bins())
    }
}

impl SpectrogramBounds for SpectrogramDims {
    fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn num_bins(&self) -> usize {
        self.num_bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_magnitudes() {
        let spec = Spectrogram::from_magnitudes(vec![vec![0.0; 8]; 4]).unwrap();
        assert_eq!(spec.num_frames(), 4);
        assert_eq!(spec.num_bins(), 8);
        assert_eq!(spec.area(), 32);
        assert_eq!(spec.magnitude(3, 7), Some(0.0));
        assert_eq!(spec.magnitude(4, 0), None);
    }

    #[test]
    fn test_ragged_spectrogram_rejected() {
        let err = Spectrogram::from_magnitudes(vec![vec![0.0; 8], vec![0.0; 7]]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RaggedSpectrogram {
                frame: 1,
                expected: 8,
                found: 7
            }
        );
    }

    #[test]
    fn test_dims_of() {
        let spec = Spectrogram::from_magnitudes(vec![vec![1.0; 3]; 2]).unwrap();
        assert_eq!(SpectrogramDims::of(&spec), SpectrogramDims::new(2, 3));
    }
}
