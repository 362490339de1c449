//! Weekly technical analysis - indicator math and criteria evaluation

pub mod criteria;
pub mod indicators;

pub use criteria::{AnalysisError, CriteriaEvaluator};
pub use indicators::{MacdSeries, RsiSeries};
