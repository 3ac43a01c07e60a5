//! Stars and constellation maps
//!
//! A star is a candidate spectrogram peak; a constellation map is the set of
//! stars a buffer decided to keep.

use crate::spectrogram::SpectrogramBounds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A star is a local maximum in the spectrogram offered for retention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Time index (frame number)
    pub t: i32,
    /// Frequency bin index
    pub f: i16,
    /// Magnitude value
    pub m: f32,
}

impl Star {
    pub fn new(t: i32, f: i16, m: f32) -> Self {
        Self { t, f, m }
    }

    /// Identity of the star inside a constellation map
    pub fn key(&self) -> (i32, i16) {
        (self.t, self.f)
    }

    /// True when the star lies on the spectrogram grid and has a usable magnitude
    pub fn is_within<S: SpectrogramBounds + ?Sized>(&self, bounds: &S) -> bool {
        if self.m.is_nan() || self.t < 0 || self.f < 0 {
            return false;
        }
        (self.t as usize) < bounds.num_frames() && (self.f as usize) < bounds.num_bins()
    }
}

/// Stars retained by a buffer at flush time
///
/// Stars from one bucket appear in the order that bucket accepted them;
/// nothing is implied about the order across buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstellationMap {
    stars: Vec<Star>,
}

impl ConstellationMap {
    pub fn new(stars: Vec<Star>) -> Self {
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Star> {
        self.stars.iter()
    }

    /// Check whether a star is held at the given coordinates
    pub fn contains(&self, t: i32, f: i16) -> bool {
        self.stars.iter().any(|s| s.t == t && s.f == f)
    }

    /// Coordinates of every retained star
    pub fn keys(&self) -> HashSet<(i32, i16)> {
        self.stars.iter().map(Star::key).collect()
    }

    pub fn as_slice(&self) -> &[Star] {
        &self.stars
    }

    pub fn into_vec(self) -> Vec<Star> {
        self.stars
    }
}

impl IntoIterator for ConstellationMap {
    type Item = Star;
    type IntoIter = std::vec::IntoIter<Star>;

    fn into_iter(self) -> Self::IntoIter {
        self.stars.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstellationMap {
    type Item = &'a Star;
    type IntoIter = std::slice::Iter<'a, Star>;

    fn into_iter(self) -> Self::IntoIter {
        self.stars.iter()
    }
}
