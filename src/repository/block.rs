//! Fixed-size blocks of raw values and the repositories built from them.

use rand::Rng;
use std::collections::VecDeque;

/// A fixed-capacity run of raw values with running sums.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    values: Vec<f64>,
    capacity: usize,
    total: f64,
    squares: f64,
    tested: bool,
}

impl Block {
    pub fn new(capacity: usize, tested: bool) -> Self {
        Self {
            values: Vec::new(),
            capacity,
            total: 0.0,
            squares: 0.0,
            tested,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// The block took part in a hypothesis test.
    pub fn is_tested(&self) -> bool {
        self.tested
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn push(&mut self, value: f64) {
        self.values.push(value);
        self.total += value;
        self.squares += value * value;
    }

    fn replace(&mut self, idx: usize, value: f64) -> Option<f64> {
        let slot = self.values.get_mut(idx)?;
        let old = std::mem::replace(slot, value);
        self.total += value - old;
        self.squares += value * value - old * old;
        Some(old)
    }

    fn pop(&mut self) -> Option<f64> {
        let value = self.values.pop()?;
        self.total -= value;
        self.squares -= value * value;
        Some(value)
    }
}

/// An ordered sequence of blocks; every block but the newest is full.
///
/// Values are addressed by position from the oldest, so position `i` lives in
/// block `i / block_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    block_size: usize,
    blocks: VecDeque<Block>,
    len: usize,
    total: f64,
    squares: f64,
}

impl Repository {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            blocks: VecDeque::new(),
            len: 0,
            total: 0.0,
            squares: 0.0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Sum of squared values.
    pub fn squares(&self) -> f64 {
        self.squares
    }

    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.total / self.len as f64
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter()
    }

    /// Values from oldest to newest.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.blocks.iter().flat_map(|b| b.values().iter().copied())
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.blocks
            .get(idx / self.block_size)
            .and_then(|b| b.values().get(idx % self.block_size))
            .copied()
    }

    pub fn push(&mut self, value: f64) {
        self.push_marked(value, false);
    }

    /// Append a value; if it opens a new block, that block's tested flag is `tested`.
    pub fn push_marked(&mut self, value: f64, tested: bool) {
        let needs_block = self.blocks.back().map_or(true, Block::is_full);
        if needs_block {
            self.blocks.push_back(Block::new(self.block_size, tested));
        }
        if let Some(block) = self.blocks.back_mut() {
            block.push(value);
            self.len += 1;
            self.total += value;
            self.squares += value * value;
        }
    }

    /// Overwrite the value at `idx`, returning the old one.
    pub fn replace(&mut self, idx: usize, value: f64) -> Option<f64> {
        let block = self.blocks.get_mut(idx / self.block_size)?;
        let old = block.replace(idx % self.block_size, value)?;
        self.total += value - old;
        self.squares += value * value - old * old;
        Some(old)
    }

    /// Remove the value at `idx` by moving the newest value into its slot.
    pub fn swap_remove(&mut self, idx: usize) -> Option<f64> {
        if idx >= self.len {
            return None;
        }
        let last = self.blocks.back_mut()?.pop()?;
        self.len -= 1;
        self.total -= last;
        self.squares -= last * last;
        if self.blocks.back().is_some_and(Block::is_empty) {
            self.blocks.pop_back();
        }
        if idx == self.len {
            Some(last)
        } else {
            self.replace(idx, last)
        }
    }

    /// Mark the newest block as having been tested.
    pub fn mark_last_tested(&mut self) {
        if let Some(block) = self.blocks.back_mut() {
            block.tested = true;
        }
    }

    /// Number of blocks that took part in a test.
    pub fn tested_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_tested()).count()
    }

    pub fn remove_first_block(&mut self) -> Option<Block> {
        let block = self.blocks.pop_front()?;
        self.len -= block.len();
        self.total -= block.total;
        self.squares -= block.squares;
        Some(block)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
        self.total = 0.0;
        self.squares = 0.0;
    }

    /// Mean of `size` distinct positions drawn uniformly, or of every value
    /// when the repository holds no more than `size`.
    pub fn sample_mean<R: Rng>(&self, size: usize, rng: &mut R) -> f64 {
        if self.len == 0 || size == 0 {
            return 0.0;
        }
        if self.len <= size {
            return self.mean();
        }
        let sum: f64 = rand::seq::index::sample(rng, self.len, size)
            .into_iter()
            .filter_map(|idx| self.get(idx))
            .sum();
        sum / size as f64
    }
}
