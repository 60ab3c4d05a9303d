//! JSON output format for detection runs

use crate::evaluation::{DetectionLog, EventKind, Evaluation};
use serde::{Deserialize, Serialize};

/// A single change or warning signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEvent {
    /// 1-based position of the value that raised the signal
    pub instance: u64,
    /// "change" or "warning"
    pub kind: EventKind,
    /// Detector estimation right after the value
    pub estimation: f64,
}

/// Summary of the whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Values fed to the detector
    pub instances: u64,
    pub changes: usize,
    pub warnings: usize,
    /// Estimation after the last value
    pub final_estimation: f64,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Detector name as reported by the detector
    pub detector: String,
    /// Signals in stream order
    pub events: Vec<JsonEvent>,
    pub summary: JsonSummary,
    /// Scoring against known drift points (simulate only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

impl JsonOutput {
    /// Create an empty output for `detector`
    pub fn new(detector: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "driftwatch-json-v1".to_string(),
            detector: detector.into(),
            events: Vec::new(),
            summary: JsonSummary {
                instances: 0,
                changes: 0,
                warnings: 0,
                final_estimation: 0.0,
            },
            evaluation: None,
        }
    }

    /// Build from a finished log; `include_warnings` keeps warning events.
    pub fn from_log(log: &DetectionLog, final_estimation: f64, include_warnings: bool) -> Self {
        let mut output = Self::new(log.detector());
        for event in log.events() {
            if event.kind == EventKind::Warning && !include_warnings {
                continue;
            }
            output.add_event(JsonEvent {
                instance: event.instance,
                kind: event.kind,
                estimation: event.estimation,
            });
        }
        output.summary.instances = log.instances();
        output.summary.changes = log.changes().count();
        output.summary.warnings = log.warnings().count();
        output.summary.final_estimation = final_estimation;
        output
    }

    pub fn add_event(&mut self, event: JsonEvent) {
        self.events.push(event);
    }

    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
