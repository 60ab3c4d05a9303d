//! A bounded uniform sample of everything offered to it.

use super::block::Repository;
use rand::Rng;

/// Reservoir sample stored in a [`Repository`].
///
/// Below capacity every value is kept. Beyond it, the `n`-th value offered
/// since the last clear replaces a uniformly chosen slot with probability
/// `capacity / n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservoir {
    store: Repository,
    capacity: usize,
    seen: u64,
}

impl Reservoir {
    pub fn new(capacity: usize, block_size: usize) -> Self {
        Self {
            store: Repository::new(block_size),
            capacity: capacity.max(1),
            seen: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.store.total()
    }

    pub fn squares(&self) -> f64 {
        self.store.squares()
    }

    pub fn mean(&self) -> f64 {
        self.store.mean()
    }

    /// Values offered since the last clear.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn store(&self) -> &Repository {
        &self.store
    }

    pub fn insert<R: Rng>(&mut self, value: f64, rng: &mut R) {
        self.seen += 1;
        if self.store.len() < self.capacity {
            self.store.push(value);
            return;
        }
        let slot = rng.gen_range(0..self.seen);
        if slot < self.capacity as u64 {
            self.store.replace(slot as usize, value);
        }
    }

    /// Offer every value of `source` in order, then empty it.
    pub fn absorb<R: Rng>(&mut self, source: &mut Repository, rng: &mut R) {
        for value in source.values().collect::<Vec<_>>() {
            self.insert(value, rng);
        }
        source.clear();
    }

    /// Change the capacity; a smaller one evicts uniformly chosen values.
    pub fn set_capacity<R: Rng>(&mut self, capacity: usize, rng: &mut R) {
        self.capacity = capacity.max(1);
        while self.store.len() > self.capacity {
            let victim = rng.gen_range(0..self.store.len());
            self.store.swap_remove(victim);
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.seen = 0;
    }
}
