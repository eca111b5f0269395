//! Staged Statistical Process Control (SPC).
//!
//! Splits an ordered series into stages by label, estimates a center line
//! and control limits for each stage, and flags out-of-control points.
//!
//! # Pipeline
//!
//! 1. [`SeriesInput::points`] — validate the host binding
//! 2. [`segment`] — partition points into [`Stage`]s
//! 3. [`compute_limits`] — estimate limits with the configured [`LimitMethod`]
//! 4. [`evaluate`] — apply the enabled run [`Rule`]s
//!
//! [`analyze`] runs all four and never fails; [`try_analyze`] surfaces
//! input errors.
//!
//! # Limit Methods
//!
//! - [`MovingRange`] — individuals chart, sigma = R-bar / d2
//! - [`SubgroupStdDev`] — sigma = subgroup standard deviation
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod chart;
mod config;
mod engine;
mod error;
mod factors;
mod limits;
mod ordinal;
mod rules;
mod stage;

pub use chart::{DataPoint, LimitSegment, SeriesInput, StageDivider};
pub use config::{CosmeticOptions, LimitMethod, SpcConfig, DEFAULT_NUM_SDS, DEFAULT_WINDOW};
pub use engine::{analyze, try_analyze, SpcAnalysis};
pub use error::{Result, SpcError};
pub use factors::{d2, MAX_WINDOW};
pub use limits::{
    compute_limits, estimator, group_stages, subgroup_sd, LimitEstimator, MovingRange, StageLimits,
    SubGroup, SubgroupStdDev,
};
pub use ordinal::Ordinal;
pub use rules::{evaluate, Rule, RuleFlags, RuleSelection};
pub use stage::{segment, Stage};
