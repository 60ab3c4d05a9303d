// Bernstein bound shared by the SeqDrift detectors
//
// With `tests` sequential tests run against the same history, the per-test
// confidence is corrected to `delta / (2 (1 - 0.5^tests))`.

/// Per-test confidence after `tests` sequential tests.
pub(crate) fn corrected_delta(delta: f64, tests: usize) -> f64 {
    let tests = i32::try_from(tests).unwrap_or(i32::MAX);
    delta / (2.0 * (1.0 - 0.5f64.powi(tests)))
}

/// Bernstein epsilon for two samples of `sample_size` values each.
pub(crate) fn epsilon(delta: f64, tests: usize, variance: f64, sample_size: usize) -> f64 {
    let ss = sample_size as f64;
    let x = (4.0 / corrected_delta(delta, tests)).ln();
    let squared = x * x + 18.0 * variance * ss * x;
    2.0 / (3.0 * ss) * (x + squared.sqrt())
}

/// Unbiased variance from sums, clamped at zero.
pub(crate) fn variance(n: usize, total: f64, squares: f64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    ((squares - total * total / n) / (n - 1.0)).max(0.0)
}
