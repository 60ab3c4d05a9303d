use anyhow::{Context, Result};
use clap::Parser;
use driftwatch::cli::{Cli, Command, DetectorArgs, OutputFormat, ReplayArgs, SimulateArgs};
use driftwatch::config::DetectorConfig;
use driftwatch::csv_output::CsvOutput;
use driftwatch::detector::ChangeDetector;
use driftwatch::evaluation::{evaluate, DetectionLog, EventKind, Evaluation};
use driftwatch::json_output::JsonOutput;
use driftwatch::stream::BernoulliStream;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Build the detector named on the command line or described in a config file
fn build_detector(args: &DetectorArgs) -> Result<Box<dyn ChangeDetector>> {
    let config = match &args.config {
        Some(path) => DetectorConfig::from_file(path)
            .with_context(|| format!("Failed to load detector config {}", path.display()))?,
        None => DetectorConfig::default_for(&args.detector)?,
    };
    tracing::debug!(kind = config.kind(), "building detector");
    Ok(config.build()?)
}

/// Parse one input line; blank lines and `#` comments yield `None`
fn parse_value(line_no: usize, line: &str) -> Result<Option<f64>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("line {}: '{}' is not a number", line_no, trimmed))?;
    if !value.is_finite() {
        anyhow::bail!("line {}: '{}' is not a finite number", line_no, trimmed);
    }
    Ok(Some(value))
}

/// Feed each parsed line to `detector` as it is read
fn replay_lines(detector: &mut dyn ChangeDetector, reader: impl BufRead) -> Result<DetectionLog> {
    let mut log = DetectionLog::new(detector.name());
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if let Some(value) = parse_value(idx + 1, &line)? {
            detector.input(value);
            log.record(&*detector);
        }
    }
    Ok(log)
}

fn open_input(args: &ReplayArgs) -> Result<Box<dyn BufRead>> {
    if args.input.as_os_str() == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open input {}", args.input.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn print_text_events(log: &DetectionLog, include_warnings: bool) {
    for event in log.events() {
        match event.kind {
            EventKind::Change => println!(
                "change at instance {} (estimation {:.4})",
                event.instance, event.estimation
            ),
            EventKind::Warning if include_warnings => println!(
                "warning at instance {} (estimation {:.4})",
                event.instance, event.estimation
            ),
            EventKind::Warning => {}
        }
    }
}

fn print_report(
    log: &DetectionLog,
    estimation: f64,
    format: OutputFormat,
    include_warnings: bool,
    evaluation: Option<Evaluation>,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_events(log, include_warnings);
            println!(
                "{}: {} instances, {} change(s), {} warning(s), final estimation {:.4}",
                log.detector(),
                log.instances(),
                log.changes().count(),
                log.warnings().count(),
                estimation
            );
            if let Some(evaluation) = evaluation {
                print!("{}", evaluation.to_report_string());
            }
        }
        OutputFormat::Json => {
            let mut output = JsonOutput::from_log(log, estimation, include_warnings);
            if let Some(evaluation) = evaluation {
                output.set_evaluation(evaluation);
            }
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => {
            print!("{}", CsvOutput::from_log(log, include_warnings).to_csv());
        }
    }
    Ok(())
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let mut detector = build_detector(&args.detector)?;
    let reader = open_input(&args)?;
    let log = replay_lines(detector.as_mut(), reader)?;
    print_report(&log, detector.estimation(), args.format, args.warnings, None)
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.p0) || !(0.0..=1.0).contains(&args.p1) {
        anyhow::bail!(
            "Probabilities must be in [0, 1], got --p0 {} --p1 {}",
            args.p0,
            args.p1
        );
    }
    let mut detector = build_detector(&args.detector)?;
    let stream = if args.slope > 0.0 {
        BernoulliStream::gradual(args.p0, args.p1, args.drift_at, args.slope, args.seed)
    } else {
        BernoulliStream::abrupt(args.p0, args.p1, args.drift_at, args.seed)
    };
    let values = stream.take(usize::try_from(args.length).unwrap_or(usize::MAX));
    let log = DetectionLog::run(detector.as_mut(), values);
    let drift_points = if args.drift_at < args.length && args.p0 != args.p1 {
        vec![args.drift_at]
    } else {
        Vec::new()
    };
    let evaluation = evaluate(&log, &drift_points, args.horizon);
    print_report(
        &log,
        detector.estimation(),
        args.format,
        true,
        Some(evaluation),
    )
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match args.command {
        Command::Replay(replay) => run_replay(replay),
        Command::Simulate(simulate) => run_simulate(simulate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_skips_comments_and_blanks() {
        assert_eq!(parse_value(1, "  # header").unwrap(), None);
        assert_eq!(parse_value(2, "   ").unwrap(), None);
        assert_eq!(parse_value(3, " 0.5 ").unwrap(), Some(0.5));
    }

    #[test]
    fn test_parse_value_rejects_non_finite() {
        for text in ["NaN", "inf", "-inf", "infinity"] {
            let err = parse_value(7, text).unwrap_err().to_string();
            assert!(err.contains("line 7"), "{}", err);
            assert!(err.contains("is not a finite number"), "{}", err);
        }
    }

    #[test]
    fn test_replay_lines_stops_at_bad_line() {
        let mut detector = DetectorConfig::default_for("ddm").unwrap().build().unwrap();
        let input = "0\n0\nNaN\n1\n";
        let err = replay_lines(detector.as_mut(), input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3: 'NaN' is not a finite number"));
        assert!(detector.estimation().is_finite());
    }

    #[test]
    fn test_replay_lines_counts_only_values() {
        let mut detector = DetectorConfig::default_for("cusum").unwrap().build().unwrap();
        let log = replay_lines(detector.as_mut(), "# errors\n0\n\n1\n".as_bytes()).unwrap();
        assert_eq!(log.instances(), 2);
        assert_eq!(detector.estimation(), 0.5);
    }
}
