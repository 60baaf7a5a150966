//! Deterministic subset selection over the question bank.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::types::SampleRecord;

/// Draw a fixed-size random subset of records with a fixed seed.
///
/// Returns exactly `min(n, records.len())` records: the whole collection is
/// shuffled with a seeded RNG and truncated, so repeated runs against the
/// same source produce the same sample in the same order. A source smaller
/// than `n` comes back whole (shuffled, never sampled with replacement) and
/// an empty source yields an empty output.
pub fn sample_records(mut records: Vec<SampleRecord>, n: usize, seed: u64) -> Vec<SampleRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);
    records.truncate(n);
    records
}
