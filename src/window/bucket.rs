//! Sufficient statistics of a contiguous run of stream values.

/// Count, sum and variance contribution of a run of consecutive values.
///
/// `variance` is the run's share of the window's sum of squared deviations, so
/// the window total is always the sum over its buckets plus the cross terms
/// recorded when buckets are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub count: usize,
    pub total: f64,
    pub variance: f64,
}

impl Bucket {
    /// A bucket holding one value.
    pub fn single(value: f64) -> Self {
        Self {
            count: 1,
            total: value,
            variance: 0.0,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }

    /// Combine two runs into one, adding the between-run term
    /// `n1·n2·(u1 - u2)² / (n1 + n2)` so the pooled variance is exact.
    pub fn merge(&self, other: &Bucket) -> Bucket {
        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let between = if self.count == 0 || other.count == 0 {
            0.0
        } else {
            let diff = self.mean() - other.mean();
            n1 * n2 * diff * diff / (n1 + n2)
        };
        Bucket {
            count: self.count + other.count,
            total: self.total + other.total,
            variance: self.variance + other.variance + between,
        }
    }

    /// Fold `other` into `self` without a between-run term.
    ///
    /// Used when the variance fields already hold contributions to a shared
    /// window statistic rather than within-run variances.
    pub fn absorb(&mut self, other: &Bucket) {
        self.count += other.count;
        self.total += other.total;
        self.variance += other.variance;
    }
}
