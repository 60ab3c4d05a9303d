// Detection logging and scoring against known drift points
//
// A `DetectionLog` follows a detector through a stream and keeps the instants
// at which it signalled a change or entered its warning zone. `evaluate()`
// matches those change signals against the positions where drift was
// injected:
//
// - the first change within `horizon` instances after a drift point is a
//   true positive, its distance from the drift point the detection delay
// - any other change is a false positive
// - a drift point with no matching change is missed

use crate::detector::ChangeDetector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Change,
    Warning,
}

/// One signal raised by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// 1-based position of the value that raised the signal
    pub instance: u64,
    pub kind: EventKind,
    /// Detector estimation right after the value
    pub estimation: f64,
}

/// Signals raised by one detector over one stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionLog {
    detector: String,
    instances: u64,
    events: Vec<DetectionEvent>,
    #[serde(skip)]
    in_warning: bool,
}

impl DetectionLog {
    pub fn new(detector: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
            ..Self::default()
        }
    }

    /// Feed every value to `detector` and log what it signals.
    pub fn run(detector: &mut dyn ChangeDetector, values: impl IntoIterator<Item = f64>) -> Self {
        let mut log = Self::new(detector.name());
        for value in values {
            detector.input(value);
            log.record(detector);
        }
        log
    }

    /// Log the detector's state after it consumed one more value.
    ///
    /// Warnings are logged when the warning zone is entered, not for every
    /// value spent inside it. Returns the events added.
    pub fn record(&mut self, detector: &dyn ChangeDetector) -> &[DetectionEvent] {
        self.instances += 1;
        let before = self.events.len();
        let estimation = detector.estimation();
        if detector.is_warning() && !self.in_warning {
            self.events.push(DetectionEvent {
                instance: self.instances,
                kind: EventKind::Warning,
                estimation,
            });
        }
        self.in_warning = detector.is_warning();
        if detector.is_change() {
            self.events.push(DetectionEvent {
                instance: self.instances,
                kind: EventKind::Change,
                estimation,
            });
        }
        &self.events[before..]
    }

    pub fn detector(&self) -> &str {
        &self.detector
    }

    /// Values recorded so far.
    pub fn instances(&self) -> u64 {
        self.instances
    }

    pub fn events(&self) -> &[DetectionEvent] {
        &self.events
    }

    pub fn changes(&self) -> impl Iterator<Item = u64> + '_ {
        self.instants(EventKind::Change)
    }

    pub fn warnings(&self) -> impl Iterator<Item = u64> + '_ {
        self.instants(EventKind::Warning)
    }

    fn instants(&self, kind: EventKind) -> impl Iterator<Item = u64> + '_ {
        self.events
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.instance)
    }
}

/// Outcome of scoring a [`DetectionLog`] against known drift points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub detector: String,
    pub instances: u64,
    pub drifts: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub missed: usize,
    pub warnings: usize,
    /// Per detected drift, instances between the drift point and the signal
    pub delays: Vec<u64>,
    pub mean_delay: Option<f64>,
    pub delay_stdev: Option<f64>,
}

impl Evaluation {
    /// Fraction of drift points that were detected.
    pub fn true_positive_rate(&self) -> f64 {
        if self.drifts == 0 {
            0.0
        } else {
            self.true_positives as f64 / self.drifts as f64
        }
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "{}: {} instances, {} drift point(s)\n",
            self.detector, self.instances, self.drifts
        ));
        report.push_str(&format!(
            "  true positives:  {} ({:.1}%)\n",
            self.true_positives,
            self.true_positive_rate() * 100.0
        ));
        report.push_str(&format!("  false positives: {}\n", self.false_positives));
        report.push_str(&format!("  missed:          {}\n", self.missed));
        report.push_str(&format!("  warnings:        {}\n", self.warnings));
        match (self.mean_delay, self.delay_stdev) {
            (Some(mean), Some(stdev)) => {
                report.push_str(&format!("  delay:           {:.2} ± {:.2}\n", mean, stdev));
            }
            _ => report.push_str("  delay:           n/a\n"),
        }
        report
    }
}

/// Score `log` against drift points given as the number of values that
/// preceded each drift.
pub fn evaluate(log: &DetectionLog, drift_points: &[u64], horizon: u64) -> Evaluation {
    let mut drifts = drift_points.to_vec();
    drifts.sort_unstable();
    drifts.dedup();

    let mut matched = vec![false; drifts.len()];
    let mut delays = Vec::new();
    let mut false_positives = 0;

    for change in log.changes() {
        // Latest drift point strictly before the change
        let owner = drifts.partition_point(|&d| d < change).checked_sub(1);
        match owner {
            Some(idx) if !matched[idx] && change - drifts[idx] <= horizon => {
                matched[idx] = true;
                delays.push(change - drifts[idx]);
            }
            _ => false_positives += 1,
        }
    }

    let true_positives = delays.len();
    let (mean_delay, delay_stdev) = delay_moments(&delays);
    Evaluation {
        detector: log.detector().to_string(),
        instances: log.instances(),
        drifts: drifts.len(),
        true_positives,
        false_positives,
        missed: drifts.len() - true_positives,
        warnings: log.warnings().count(),
        delays,
        mean_delay,
        delay_stdev,
    }
}

/// Mean and sample standard deviation.
fn delay_moments(delays: &[u64]) -> (Option<f64>, Option<f64>) {
    if delays.is_empty() {
        return (None, None);
    }
    let n = delays.len() as f64;
    let mean = delays.iter().map(|&d| d as f64).sum::<f64>() / n;
    let stdev = if delays.len() < 2 {
        0.0
    } else {
        let ss: f64 = delays.iter().map(|&d| (d as f64 - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    };
    (Some(mean), Some(stdev))
}
