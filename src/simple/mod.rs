// Error-rate detectors with constant or fixed-window memory
//
// Every detector here keeps a handful of running scalars (or a fixed ring of
// recent predictions) and compares a statistic against a closed-form bound:
//
// - DDM / RDDM: binomial error rate against its historical minimum
// - EDDM: distance between consecutive errors
// - CUSUM: cumulative positive deviation from the running mean
// - EWMA chart: moving average against a polynomial control limit
// - HDDM_A / HDDM_W: Hoeffding / McDiarmid bounds over a split stream
// - STEPD: two-proportion z-test between a recent and an older window

mod cusum;
mod ddm;
mod eddm;
mod ewma;
mod hddm_a;
mod hddm_w;
mod rddm;
mod stepd;

pub use cusum::{Cusum, CusumConfig};
pub use ddm::{Ddm, DdmConfig};
pub use eddm::{Eddm, EddmConfig};
pub use ewma::{control_limit, EwmaChart, EwmaChartConfig};
pub use hddm_a::{HddmA, HddmAConfig};
pub use hddm_w::{HddmW, HddmWConfig};
pub use rddm::{Rddm, RddmConfig};
pub use stepd::{Stepd, StepdConfig};

#[cfg(test)]
mod tests;
