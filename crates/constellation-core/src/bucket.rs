//! Bucket retention policy
//!
//! A bucket keeps at most `capacity` stars ranked by magnitude. When it is
//! full, a candidate only gets in by beating the weakest held star, which is
//! then evicted. Ties go to the star that was offered first.
//!
//! A bucket holds at most one star per `(t, f)` coordinate: re-offering a
//! held coordinate keeps whichever of the two stars is stronger.

use crate::star::Star;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

const MAX_PREALLOCATED: usize = 4096;

/// Outcome of offering a star to a bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Stored in free capacity
    Accepted,
    /// Stored after evicting the contained (weaker) star
    Replaced(Star),
    /// Not stored
    Rejected,
}

impl Admission {
    pub fn is_retained(&self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

/// Star tagged with the bucket-local order in which it was accepted
#[derive(Debug, Clone, Copy)]
struct Held {
    star: Star,
    seq: u64,
}

// BinaryHeap is a max-heap: the greatest element is the weakest star, i.e.
// the lowest magnitude and, among equal magnitudes, the latest accepted.
impl Ord for Held {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .star
            .m
            .total_cmp(&self.star.m)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Held {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Held {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Held {}

#[derive(Debug, Default)]
struct BucketState {
    heap: BinaryHeap<Held>,
    /// Magnitude held at each coordinate
    held: HashMap<(i32, i16), f32>,
    next_seq: u64,
}

impl BucketState {
    fn offer(&mut self, mut star: Star, capacity: usize) -> Admission {
        // -0.0 and 0.0 must tie in both the heap order and the eviction test
        if star.m == 0.0 {
            star.m = 0.0;
        }

        if let Some(&held_m) = self.held.get(&star.key()) {
            return self.offer_duplicate(star, held_m);
        }

        if self.heap.len() < capacity {
            self.push(star);
            return Admission::Accepted;
        }

        match self.heap.peek() {
            Some(weakest) if star.m > weakest.star.m => {
                let evicted = self.heap.pop().map(|held| held.star);
                if let Some(evicted) = &evicted {
                    self.held.remove(&evicted.key());
                }
                self.push(star);
                evicted.map_or(Admission::Accepted, Admission::Replaced)
            }
            _ => Admission::Rejected,
        }
    }

    /// A star at a coordinate already held replaces it only when stronger
    fn offer_duplicate(&mut self, star: Star, held_m: f32) -> Admission {
        if star.m <= held_m {
            return Admission::Rejected;
        }

        let key = star.key();
        let mut replaced = None;
        self.heap.retain(|held| {
            if held.star.key() == key {
                replaced = Some(held.star);
                false
            } else {
                true
            }
        });
        self.held.remove(&key);
        self.push(star);
        replaced.map_or(Admission::Accepted, Admission::Replaced)
    }

    fn push(&mut self, star: Star) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.held.insert(star.key(), star.m);
        self.heap.push(Held { star, seq });
    }

    fn ordered(held: impl IntoIterator<Item = Held>) -> Vec<Star> {
        let mut held: Vec<Held> = held.into_iter().collect();
        held.sort_unstable_by_key(|h| h.seq);
        held.into_iter().map(|h| h.star).collect()
    }
}

/// Bounded, thread-safe retention unit for one band or window
#[derive(Debug)]
pub struct Bucket {
    capacity: usize,
    state: Mutex<BucketState>,
}

impl Bucket {
    /// Create a bucket holding at most `capacity` stars (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(BucketState {
                heap: BinaryHeap::with_capacity(capacity.min(MAX_PREALLOCATED)),
                held: HashMap::with_capacity(capacity.min(MAX_PREALLOCATED)),
                next_seq: 0,
            }),
        }
    }

    // The policy never panics mid-update, so a poisoned lock still guards a
    // consistent heap.
    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the retention policy to a candidate
    pub fn offer(&self, star: Star) -> Admission {
        self.lock().offer(star, self.capacity)
    }

    /// Remove and return every held star in acceptance order
    pub fn drain(&self) -> Vec<Star> {
        let mut state = self.lock();
        let held = std::mem::take(&mut state.heap);
        state.held.clear();
        state.next_seq = 0;
        drop(state);
        BucketState::ordered(held)
    }

    /// Copy of every held star in acceptance order
    pub fn snapshot(&self) -> Vec<Star> {
        let held: Vec<Held> = self.lock().heap.iter().copied().collect();
        BucketState::ordered(held)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Magnitude a candidate must beat once the bucket is full
    pub fn weakest_magnitude(&self) -> Option<f32> {
        self.lock().heap.peek().map(|held| held.star.m)
    }
}
