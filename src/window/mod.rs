// Windowed detectors backed by a chain of summary buckets
//
// Both detectors keep count/sum/variance summaries in an index-linked chain
// (see `crate::arena`) instead of raw values, and search the chain for a cut
// point whose two sides have significantly different means:
//
// - ADWIN: exponential histogram, O(log W) buckets, cut search every `clock`
//   insertions, oldest bucket dropped per cut until no cut holds
// - SEED: fixed-size blocks merged when homogeneous, cut search every
//   `block_size` insertions, everything before the first cut dropped

mod adwin;
mod bucket;
mod seed;

pub use adwin::{Adwin, AdwinConfig, AdwinDetector};
pub use bucket::Bucket;
pub use seed::{DecayMode, Seed, SeedConfig};

#[cfg(test)]
mod tests;
