#![no_main]

use arbitrary::Arbitrary;
use driftwatch::detector::ChangeDetector;
use driftwatch::repository::{SeqDrift1, SeqDrift1Config, SeqDrift2, SeqDrift2Config};
use driftwatch::simple::{
    Cusum, CusumConfig, Ddm, DdmConfig, Eddm, EwmaChart, EwmaChartConfig, HddmA, HddmAConfig,
    HddmW, HddmWConfig, Rddm, RddmConfig, Stepd, StepdConfig,
};
use driftwatch::window::{AdwinConfig, AdwinDetector, Seed, SeedConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzDetector {
    Ddm(DdmConfig),
    Rddm(RddmConfig),
    Eddm,
    Cusum(CusumConfig),
    EwmaChart(EwmaChartConfig),
    HddmA(HddmAConfig),
    HddmW(HddmWConfig),
    Stepd(StepdConfig),
    Adwin(AdwinConfig),
    Seed(SeedConfig),
    SeqDrift1(SeqDrift1Config),
    SeqDrift2(SeqDrift2Config),
}

#[derive(Debug, Arbitrary)]
struct FuzzCase {
    detector: FuzzDetector,
    values: Vec<f64>,
}

impl FuzzDetector {
    /// Build the detector with every buffer size capped so allocations stay small.
    fn build(self) -> Option<Box<dyn ChangeDetector>> {
        let detector: Box<dyn ChangeDetector> = match self {
            Self::Ddm(c) => Box::new(Ddm::new(c).ok()?),
            Self::Rddm(mut c) => {
                c.min_stable_concept_size %= 4096;
                Box::new(Rddm::new(c).ok()?)
            }
            Self::Eddm => Box::new(Eddm::new()),
            Self::Cusum(c) => Box::new(Cusum::new(c).ok()?),
            Self::EwmaChart(c) => Box::new(EwmaChart::new(c).ok()?),
            Self::HddmA(c) => Box::new(HddmA::new(c).ok()?),
            Self::HddmW(c) => Box::new(HddmW::new(c).ok()?),
            Self::Stepd(mut c) => {
                c.window_size %= 4096;
                Box::new(Stepd::new(c).ok()?)
            }
            Self::Adwin(mut c) => {
                c.max_buckets %= 64;
                Box::new(AdwinDetector::new(c).ok()?)
            }
            Self::Seed(c) => Box::new(Seed::new(c).ok()?),
            Self::SeqDrift1(mut c) => {
                c.block_size %= 4096;
                Box::new(SeqDrift1::new(c).ok()?)
            }
            Self::SeqDrift2(mut c) => {
                c.block_size %= 4096;
                Box::new(SeqDrift2::new(c).ok()?)
            }
        };
        Some(detector)
    }
}

fuzz_target!(|case: FuzzCase| {
    // Any validated configuration must accept any input without panicking
    let Some(mut detector) = case.detector.build() else {
        return;
    };
    for value in case.values {
        detector.input(value);
        let _ = (detector.is_change(), detector.is_warning(), detector.estimation());
    }
    detector.reset();
    assert!(!detector.is_change());
});
