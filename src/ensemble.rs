// Ensemble of independently configured change detectors
//
// Every value is fanned out to all children. A child that signals a change
// latches its "fired" flag; the ensemble signals a change once the latched
// flags satisfy the voting policy, then clears the flags. Children keep their
// own statistics across ensemble verdicts.

use crate::config::DetectorConfig;
use crate::detector::{ChangeDetector, DetectorState};
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

/// How many fired children make an ensemble change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingPolicy {
    /// Every child has fired
    Max,
    /// At least one child has fired
    Min,
    /// More than half of the children have fired
    #[default]
    Majority,
}

impl VotingPolicy {
    /// Whether `fired` of `total` children are enough.
    pub fn is_satisfied(self, fired: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        match self {
            VotingPolicy::Max => fired == total,
            VotingPolicy::Min => fired >= 1,
            VotingPolicy::Majority => fired * 2 > total,
        }
    }
}

/// Configuration for [`Ensemble`]
///
/// # Example
/// ```
/// use driftwatch::config::DetectorConfig;
/// use driftwatch::ensemble::{EnsembleConfig, VotingPolicy};
/// use driftwatch::simple::DdmConfig;
/// use driftwatch::window::AdwinConfig;
///
/// let config = EnsembleConfig {
///     children: vec![
///         DetectorConfig::Ddm(DdmConfig::default()),
///         DetectorConfig::Adwin(AdwinConfig::default()),
///     ],
///     policy: VotingPolicy::Min,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub children: Vec<DetectorConfig>,
    pub policy: VotingPolicy,
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.children.is_empty() {
            return Err(DetectorError::invalid_parameter(
                "children",
                "an ensemble needs at least one child detector",
            ));
        }
        self.children.iter().try_for_each(DetectorConfig::validate)
    }
}

#[derive(Debug)]
pub struct Ensemble {
    children: Vec<Box<dyn ChangeDetector>>,
    fired: Vec<bool>,
    policy: VotingPolicy,
    state: DetectorState,
}

impl Ensemble {
    pub fn new(config: EnsembleConfig) -> Result<Self> {
        config.validate()?;
        let children = config
            .children
            .iter()
            .map(DetectorConfig::build)
            .collect::<Result<Vec<_>>>()?;
        Self::from_detectors(children, config.policy)
    }

    /// Wrap already constructed detectors.
    pub fn from_detectors(
        children: Vec<Box<dyn ChangeDetector>>,
        policy: VotingPolicy,
    ) -> Result<Self> {
        if children.is_empty() {
            return Err(DetectorError::invalid_parameter(
                "children",
                "an ensemble needs at least one child detector",
            ));
        }
        Ok(Self {
            fired: vec![false; children.len()],
            children,
            policy,
            state: DetectorState::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn policy(&self) -> VotingPolicy {
        self.policy
    }

    /// Latched flags: which children fired since the last ensemble verdict.
    pub fn fired(&self) -> &[bool] {
        &self.fired
    }

    pub fn children(&self) -> &[Box<dyn ChangeDetector>] {
        &self.children
    }
}

impl ChangeDetector for Ensemble {
    fn input(&mut self, value: f64) {
        self.state.initialized = true;
        self.state.clear_signals();

        let mut estimation = 0.0;
        for (child, fired) in self.children.iter_mut().zip(self.fired.iter_mut()) {
            child.input(value);
            *fired |= child.is_change();
            self.state.warning_zone |= child.is_warning();
            estimation += child.estimation();
        }
        self.state.estimation = estimation / self.children.len() as f64;

        let votes = self.fired.iter().filter(|&&f| f).count();
        if self.policy.is_satisfied(votes, self.children.len()) {
            self.state.change_detected = true;
            self.fired.iter_mut().for_each(|f| *f = false);
            tracing::debug!(
                detector = "Ensemble",
                votes,
                children = self.children.len(),
                policy = ?self.policy,
                "drift detected"
            );
        }
        self.state.delay = 0.0;
    }

    fn reset(&mut self) {
        self.children.iter_mut().for_each(|c| c.reset());
        self.fired.iter_mut().for_each(|f| *f = false);
        self.state = DetectorState::default();
    }

    fn state(&self) -> &DetectorState {
        &self.state
    }

    fn name(&self) -> &'static str {
        "Ensemble"
    }
}
