//! CSV output format for detection runs

use crate::evaluation::{DetectionLog, EventKind};

/// CSV record for a single signal
#[derive(Debug, Clone)]
pub struct CsvEvent {
    pub detector: String,
    pub instance: u64,
    pub kind: EventKind,
    pub estimation: f64,
}

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    events: Vec<CsvEvent>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the events of `log`; warnings only when `include_warnings`.
    pub fn from_log(log: &DetectionLog, include_warnings: bool) -> Self {
        let mut output = Self::new();
        for event in log.events() {
            if event.kind == EventKind::Warning && !include_warnings {
                continue;
            }
            output.add_event(CsvEvent {
                detector: log.detector().to_string(),
                instance: event.instance,
                kind: event.kind,
                estimation: event.estimation,
            });
        }
        output
    }

    pub fn add_event(&mut self, event: CsvEvent) {
        self.events.push(event);
    }

    fn header() -> &'static str {
        "detector,instance,event,estimation"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_event(event: &CsvEvent) -> String {
        let kind = match event.kind {
            EventKind::Change => "change",
            EventKind::Warning => "warning",
        };
        format!(
            "{},{},{},{}",
            Self::escape_field(&event.detector),
            event.instance,
            kind,
            event.estimation
        )
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');
        for event in &self.events {
            output.push_str(&Self::format_event(event));
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(instance: u64, kind: EventKind) -> CsvEvent {
        CsvEvent {
            detector: "HDDM_A".to_string(),
            instance,
            kind,
            estimation: 0.5,
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(CsvOutput::new().to_csv(), "detector,instance,event,estimation\n");
    }

    #[test]
    fn test_rows() {
        let mut output = CsvOutput::new();
        output.add_event(event(17, EventKind::Warning));
        output.add_event(event(20, EventKind::Change));
        let csv = output.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "HDDM_A,17,warning,0.5");
        assert_eq!(lines[2], "HDDM_A,20,change,0.5");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvOutput::escape_field("a,b"), "\"a,b\"");
        assert_eq!(CsvOutput::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(CsvOutput::escape_field("plain"), "plain");
    }
}
