//! Constellation Core - Star retention for acoustic fingerprinting
//!
//! This crate decides which candidate spectrogram peaks ("stars") make it
//! into the constellation map a fingerprint is built from. Candidates are
//! offered to a [`StarBuffer`], possibly from several threads at once, and
//! [`StarBuffer::flush`] returns the stars worth keeping.

pub mod bands;
pub mod bucket;
pub mod buffer;
pub mod builder;
pub mod config;
pub mod error;
pub mod spectrogram;
pub mod star;

pub use bands::{FrequencyBand, FrequencyBandTable, FAIR_BAND_SIZES, FAIR_BAND_WEIGHTS};
pub use buffer::StarBuffer;
pub use builder::{StarBufferConfig, Strategy};
pub use config::ConstellationConfig;
pub use error::ConfigError;
pub use spectrogram::{Spectrogram, SpectrogramBounds, SpectrogramDims};
pub use star::{ConstellationMap, Star};

/// Run one scan's candidates through a fresh buffer and return the
/// constellation map
pub fn select_stars<S: SpectrogramBounds + ?Sized>(
    candidates: &[Star],
    spectrogram: &S,
    config: &StarBufferConfig,
) -> Result<ConstellationMap, ConfigError> {
    let buffer = config.create(spectrogram)?;
    buffer.par_offer_all(candidates);
    Ok(buffer.flush())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_stars() {
        let spec = Spectrogram::from_magnitudes(vec![vec![0.0; 40]; 10]).unwrap();
        let candidates: Vec<Star> = (0..10)
            .flat_map(|t| (0..40).map(move |f| Star::new(t, f, (t * 40 + f as i32) as f32)))
            .collect();

        let config = StarBufferConfig::coordinate_agnostic(0.1);
        let map = select_stars(&candidates, &spec, &config).unwrap();

        assert_eq!(map.len(), 40);
        assert!(map.iter().all(|s| s.m >= 360.0));
    }
}
