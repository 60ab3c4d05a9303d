// Detectors that keep raw values in block repositories
//
// Both split the stream into a reference (left) side and an incoming (right)
// side, and at block boundaries compare their means against a Bernstein bound
// corrected for the number of tests run so far:
//
// - SeqDrift1: left is a sliding run of at most `1 / delta` blocks, means are
//   taken over random subsamples, a warning zone doubles the sample size
// - SeqDrift2: left is a reservoir sample whose size is re-optimised at every
//   test from the observed variance and direction of the mean shift

mod block;
mod bound;
mod reservoir;
mod seqdrift1;
mod seqdrift2;

pub use block::{Block, Repository};
pub use reservoir::Reservoir;
pub use seqdrift1::{SeqDrift1, SeqDrift1Config};
pub use seqdrift2::{SeqDrift2, SeqDrift2Config};
