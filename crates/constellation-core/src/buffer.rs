//! Thread-safe star buffer
//!
//! The extractor offers every candidate peak it finds while scanning a
//! spectrogram; the buffer routes each candidate to exactly one bucket and
//! lets that bucket's retention policy decide whether to keep it. `flush`
//! returns the constellation map and empties the buffer for the next scan.
//!
//! Each bucket has its own lock, so offers into different buckets never
//! contend. `flush` visits the buckets one at a time: a star offered while a
//! flush is in progress may or may not appear in its result, but no bucket is
//! ever observed half-updated.

use crate::bands::FrequencyBandTable;
use crate::bucket::Bucket;
use crate::spectrogram::SpectrogramDims;
use crate::star::{ConstellationMap, Star};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};


/// Maps a candidate to the index of its bucket
#[derive(Debug, Clone)]
pub(crate) enum BucketKeying {
    /// Single bucket for every candidate
    Global,
    /// Consecutive runs of `window_frames` time frames
    TimeWindows { window_frames: usize },
    /// Consecutive runs of `window_bins` frequency bins
    FrequencyWindows { window_bins: usize },
    /// Frequency band lookup; bins outside every band map nowhere
    Bands(FrequencyBandTable),
}

impl BucketKeying {
    /// Bucket index for a star already known to lie within bounds
    fn bucket_of(&self, star: &Star) -> Option<usize> {
        match self {
            BucketKeying::Global => Some(0),
            BucketKeying::TimeWindows { window_frames } => Some(star.t as usize / window_frames),
            BucketKeying::FrequencyWindows { window_bins } => Some(star.f as usize / window_bins),
            BucketKeying::Bands(table) => table.band_of(star.f as usize),
        }
    }
}

/// Retains the best candidate stars of one spectrogram scan
///
/// Built by [`StarBufferConfig::create`](crate::builder::StarBufferConfig::create).
#[derive(Debug)]
pub struct StarBuffer {
    strategy: &'static str,
    dims: SpectrogramDims,
    keying: BucketKeying,
    buckets: Vec<Bucket>,
    dropped: AtomicU64,
}

impl StarBuffer {
    pub(crate) fn new(
        strategy: &'static str,
        dims: SpectrogramDims,
        keying: BucketKeying,
        buckets: Vec<Bucket>,
    ) -> Self {
        Self {
            strategy,
            dims,
            keying,
            buckets,
            dropped: AtomicU64::new(0),
        }
    }

    /// Offer a candidate star.
    ///
    /// Candidates off the spectrogram grid, with a NaN magnitude, or outside
    /// every frequency band are dropped without error.
    pub fn offer_star(&self, star: Star) {
        if !star.is_within(&self.dims) {
            log::trace!("Dropping out-of-bounds star {:?}", star);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        match self.keying.bucket_of(&star) {
            Some(idx) => {
                self.buckets[idx].offer(star);
            }
            None => {
                log::trace!("Dropping star outside every band {:?}", star);
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Offer candidates one after the other, in order
    pub fn offer_all<I: IntoIterator<Item = Star>>(&self, stars: I) {
        for star in stars {
            self.offer_star(star);
        }
    }

    /// Offer candidates from rayon's worker threads
    pub fn par_offer_all(&self, stars: &[Star]) {
        stars.par_iter().for_each(|&star| self.offer_star(star));
    }

    /// Remove every retained star and return them as the constellation map.
    ///
    /// The buffer is empty afterwards and can take the next scan pass.
    pub fn flush(&self) -> ConstellationMap {
        let stars: Vec<Star> = self.buckets.iter().flat_map(Bucket::drain).collect();
        log::debug!(
            "Flushed {} stars from {} buckets ({} dropped so far)",
            stars.len(),
            self.buckets.len(),
            self.dropped()
        );
        ConstellationMap::new(stars)
    }

    /// Retained stars without emptying the buffer
    pub fn snapshot(&self) -> ConstellationMap {
        ConstellationMap::new(self.buckets.iter().flat_map(Bucket::snapshot).collect())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy
    }

    pub fn bounds(&self) -> SpectrogramDims {
        self.dims
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_capacities(&self) -> Vec<usize> {
        self.buckets.iter().map(Bucket::capacity).collect()
    }

    /// Upper bound on the size of any flush
    pub fn total_capacity(&self) -> usize {
        self.buckets.iter().map(Bucket::capacity).sum()
    }

    /// Number of stars currently retained
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Bucket::is_empty)
    }

    /// Candidates dropped for lying outside the bounds or every band
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
