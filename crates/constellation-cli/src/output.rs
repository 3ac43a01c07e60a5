//! JSON output formatting

use constellation_core::{ConstellationMap, Star, StarBuffer};
use serde::Serialize;

/// Result of one selection run
#[derive(Debug, Serialize)]
pub struct SelectionOutput {
    pub status: &'static str,
    pub strategy: &'static str,
    pub num_candidates: usize,
    pub num_retained: usize,
    pub total_capacity: usize,
    pub dropped: u64,
    pub processing_time_seconds: f64,
    pub stars: Vec<Star>,
}

impl SelectionOutput {
    pub fn new(
        buffer: &StarBuffer,
        num_candidates: usize,
        map: ConstellationMap,
        processing_time_seconds: f64,
    ) -> Self {
        let mut stars = map.into_vec();
        // Chronological order for readability; the map itself is unordered
        stars.sort_by_key(|s| s.key());

        Self {
            status: "success",
            strategy: buffer.strategy_name(),
            num_candidates,
            num_retained: stars.len(),
            total_capacity: buffer.total_capacity(),
            dropped: buffer.dropped(),
            processing_time_seconds,
            stars,
        }
    }
}

/// Print selection result as JSON
pub fn print_json_output(output: &SelectionOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }
}
