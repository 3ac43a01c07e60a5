//! Candidate star files
//!
//! JSON layout: `{ "num_frames": 100, "num_bins": 200, "stars": [{"t": 0, "f": 3, "m": 0.7}] }`

use anyhow::{Context, Result};
use constellation_core::{SpectrogramDims, Star};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Candidates extracted from one spectrogram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFile {
    pub num_frames: usize,
    pub num_bins: usize,
    #[serde(default)]
    pub stars: Vec<Star>,
}

impl CandidateFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read candidate file {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse candidate file {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn dims(&self) -> SpectrogramDims {
        SpectrogramDims::new(self.num_frames, self.num_bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_file() {
        let json = r#"{
            "num_frames": 100,
            "num_bins": 200,
            "stars": [{"t": 1, "f": 2, "m": 0.5}, {"t": 3, "f": 4, "m": 0.25}]
        }"#;

        let file = CandidateFile::from_json_str(json).unwrap();
        assert_eq!(file.dims(), SpectrogramDims::new(100, 200));
        assert_eq!(file.stars.len(), 2);
        assert_eq!(file.stars[1], Star::new(3, 4, 0.25));
    }

    #[test]
    fn test_missing_dimensions_rejected() {
        assert!(CandidateFile::from_json_str(r#"{"stars": []}"#).is_err());
    }
}
