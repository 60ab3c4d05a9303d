//! Detector configuration as data.
//!
//! [`DetectorConfig`] names one detector and carries its parameters, so a
//! detector (or a whole ensemble) can be described in a TOML file and built at
//! runtime. Omitted fields take the detector's defaults.
//!
//! # Example TOML
//! ```toml
//! type = "ensemble"
//! policy = "majority"
//!
//! [[children]]
//! type = "ddm"
//!
//! [[children]]
//! type = "adwin"
//! delta = 0.01
//!
//! [[children]]
//! type = "seqdrift2"
//! block_size = 100
//! seed = 7
//! ```

use crate::detector::ChangeDetector;
use crate::ensemble::{Ensemble, EnsembleConfig};
use crate::error::{DetectorError, Result};
use crate::repository::{SeqDrift1, SeqDrift1Config, SeqDrift2, SeqDrift2Config};
use crate::simple::{
    Cusum, CusumConfig, Ddm, DdmConfig, Eddm, EddmConfig, EwmaChart, EwmaChartConfig, HddmA,
    HddmAConfig, HddmW, HddmWConfig, Rddm, RddmConfig, Stepd, StepdConfig,
};
use crate::window::{AdwinConfig, AdwinDetector, Seed, SeedConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Names accepted in the `type` field, in display order.
pub const DETECTOR_KINDS: &[&str] = &[
    "ddm",
    "rddm",
    "eddm",
    "cusum",
    "ewma_chart",
    "hddm_a",
    "hddm_w",
    "stepd",
    "adwin",
    "seed",
    "seqdrift1",
    "seqdrift2",
    "ensemble",
];

/// One detector and its parameters, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectorConfig {
    Ddm(DdmConfig),
    Rddm(RddmConfig),
    Eddm(EddmConfig),
    Cusum(CusumConfig),
    EwmaChart(EwmaChartConfig),
    HddmA(HddmAConfig),
    HddmW(HddmWConfig),
    Stepd(StepdConfig),
    Adwin(AdwinConfig),
    Seed(SeedConfig),
    #[serde(rename = "seqdrift1")]
    SeqDrift1(SeqDrift1Config),
    #[serde(rename = "seqdrift2")]
    SeqDrift2(SeqDrift2Config),
    Ensemble(EnsembleConfig),
}

impl DetectorConfig {
    /// Default parameters for the detector called `kind` (see [`DETECTOR_KINDS`]).
    pub fn default_for(kind: &str) -> Result<Self> {
        let config = match kind.to_ascii_lowercase().replace('-', "_").as_str() {
            "ddm" => Self::Ddm(DdmConfig::default()),
            "rddm" => Self::Rddm(RddmConfig::default()),
            "eddm" => Self::Eddm(EddmConfig::default()),
            "cusum" => Self::Cusum(CusumConfig::default()),
            "ewma_chart" | "ewma" => Self::EwmaChart(EwmaChartConfig::default()),
            "hddm_a" => Self::HddmA(HddmAConfig::default()),
            "hddm_w" => Self::HddmW(HddmWConfig::default()),
            "stepd" => Self::Stepd(StepdConfig::default()),
            "adwin" => Self::Adwin(AdwinConfig::default()),
            "seed" => Self::Seed(SeedConfig::default()),
            "seqdrift1" => Self::SeqDrift1(SeqDrift1Config::default()),
            "seqdrift2" => Self::SeqDrift2(SeqDrift2Config::default()),
            "ensemble" => Self::Ensemble(EnsembleConfig::default()),
            other => {
                return Err(DetectorError::Config(format!(
                    "unknown detector '{}' (expected one of: {})",
                    other,
                    DETECTOR_KINDS.join(", ")
                )))
            }
        };
        Ok(config)
    }

    /// The `type` tag of this configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ddm(_) => "ddm",
            Self::Rddm(_) => "rddm",
            Self::Eddm(_) => "eddm",
            Self::Cusum(_) => "cusum",
            Self::EwmaChart(_) => "ewma_chart",
            Self::HddmA(_) => "hddm_a",
            Self::HddmW(_) => "hddm_w",
            Self::Stepd(_) => "stepd",
            Self::Adwin(_) => "adwin",
            Self::Seed(_) => "seed",
            Self::SeqDrift1(_) => "seqdrift1",
            Self::SeqDrift2(_) => "seqdrift2",
            Self::Ensemble(_) => "ensemble",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ddm(c) => c.validate(),
            Self::Rddm(c) => c.validate(),
            Self::Eddm(_) => Ok(()),
            Self::Cusum(c) => c.validate(),
            Self::EwmaChart(c) => c.validate(),
            Self::HddmA(c) => c.validate(),
            Self::HddmW(c) => c.validate(),
            Self::Stepd(c) => c.validate(),
            Self::Adwin(c) => c.validate(),
            Self::Seed(c) => c.validate(),
            Self::SeqDrift1(c) => c.validate(),
            Self::SeqDrift2(c) => c.validate(),
            Self::Ensemble(c) => c.validate(),
        }
    }

    /// Construct the configured detector.
    pub fn build(&self) -> Result<Box<dyn ChangeDetector>> {
        let detector: Box<dyn ChangeDetector> = match self {
            Self::Ddm(c) => Box::new(Ddm::new(c.clone())?),
            Self::Rddm(c) => Box::new(Rddm::new(c.clone())?),
            Self::Eddm(_) => Box::new(Eddm::new()),
            Self::Cusum(c) => Box::new(Cusum::new(c.clone())?),
            Self::EwmaChart(c) => Box::new(EwmaChart::new(c.clone())?),
            Self::HddmA(c) => Box::new(HddmA::new(c.clone())?),
            Self::HddmW(c) => Box::new(HddmW::new(c.clone())?),
            Self::Stepd(c) => Box::new(Stepd::new(c.clone())?),
            Self::Adwin(c) => Box::new(AdwinDetector::new(c.clone())?),
            Self::Seed(c) => Box::new(Seed::new(c.clone())?),
            Self::SeqDrift1(c) => Box::new(SeqDrift1::new(c.clone())?),
            Self::SeqDrift2(c) => Box::new(SeqDrift2::new(c.clone())?),
            Self::Ensemble(c) => Box::new(Ensemble::new(c.clone())?),
        };
        Ok(detector)
    }

    /// Parse a TOML document whose top level is one detector configuration.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| DetectorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DetectorError::Config(e.to_string()))
    }
}
