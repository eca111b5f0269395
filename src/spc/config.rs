//! Analysis configuration.
//!
//! The host resolves user-facing settings and hands them over as an
//! [`SpcConfig`]. Every field has a default, so partial documents deserialize
//! cleanly:
//!
//! ```
//! use u_spc::spc::{LimitMethod, SpcConfig};
//!
//! let config: SpcConfig =
//!     serde_json::from_str(r#"{ "method": "subgroup_std_dev", "run_rule1": true }"#).unwrap();
//! assert_eq!(config.method, LimitMethod::SubgroupStdDev);
//! assert!(config.run_rule1);
//! assert!((config.num_sds() - 3.0).abs() < f64::EPSILON);
//! ```
//!
//! Out-of-range numeric settings are normalised by the accessor methods
//! rather than rejected.

use serde::{Deserialize, Serialize};

use super::factors::MAX_WINDOW;
use super::rules::{Rule, RuleSelection};

/// Default number of standard deviations between center line and limits.
pub const DEFAULT_NUM_SDS: f64 = 3.0;

/// Default moving-range window.
pub const DEFAULT_WINDOW: usize = 2;

/// How control limits are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMethod {
    /// Individuals chart: sigma estimated from the average moving range.
    #[default]
    MovingRange,
    /// Sigma estimated from the standard deviation of each subgroup.
    SubgroupStdDev,
}

/// Presentation settings the engine carries but does not interpret.
///
/// The only exception is rule highlighting: [`CosmeticOptions::rule_color`]
/// picks the color for a flagged point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmeticOptions {
    /// Color for points flagged by any rule without a color of its own.
    pub highlight_color: String,
    /// Per-rule highlight overrides.
    pub rule1_color: Option<String>,
    pub rule2_color: Option<String>,
    pub rule3_color: Option<String>,
    pub mean_line_color: String,
    pub limit_line_color: String,
    pub mean_line_style: String,
    pub limit_line_style: String,
    pub divider_color: String,
    /// Text shown when at least one stage lacks enough data for limits.
    pub insufficient_data_text: String,
    pub show_stage_labels: bool,
    pub number_format: Option<String>,
    pub date_format: Option<String>,
}

impl Default for CosmeticOptions {
    fn default() -> Self {
        Self {
            highlight_color: "#E81123".to_string(),
            rule1_color: None,
            rule2_color: None,
            rule3_color: None,
            mean_line_color: "#107C10".to_string(),
            limit_line_color: "#D83B01".to_string(),
            mean_line_style: "solid".to_string(),
            limit_line_style: "dashed".to_string(),
            divider_color: "#A0A0A0".to_string(),
            insufficient_data_text:
                "Insufficient data to compute control limits for one or more stages".to_string(),
            show_stage_labels: true,
            number_format: None,
            date_format: None,
        }
    }
}

impl CosmeticOptions {
    /// Highlight color for a point flagged by `rule`.
    pub fn rule_color(&self, rule: Rule) -> &str {
        let specific = match rule {
            Rule::BeyondLimits => &self.rule1_color,
            Rule::Trend => &self.rule2_color,
            Rule::RunAboutCenter => &self.rule3_color,
        };
        specific.as_deref().unwrap_or(&self.highlight_color)
    }
}

/// Configuration for one analysis refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpcConfig {
    /// Distance of the control limits from the center line, in standard
    /// deviations. Read through [`SpcConfig::num_sds`].
    pub num_sds: f64,
    /// Limit estimation method.
    pub method: LimitMethod,
    /// Raw moving-range window. Read through
    /// [`SpcConfig::moving_range_window`].
    pub moving_range_window: f64,
    /// Merge non-contiguous stages that share a label (subgroup method only).
    pub aggregate_by_label: bool,
    /// Flag points beyond the control limits.
    pub run_rule1: bool,
    /// Flag six-point trends.
    pub run_rule2: bool,
    /// Flag nine-point runs on one side of the center line.
    pub run_rule3: bool,
    /// Presentation pass-through.
    pub cosmetics: CosmeticOptions,
}

impl Default for SpcConfig {
    fn default() -> Self {
        Self {
            num_sds: DEFAULT_NUM_SDS,
            method: LimitMethod::default(),
            moving_range_window: DEFAULT_WINDOW as f64,
            aggregate_by_label: true,
            run_rule1: false,
            run_rule2: false,
            run_rule3: false,
            cosmetics: CosmeticOptions::default(),
        }
    }
}

impl SpcConfig {
    /// Moving-range window rounded to the nearest integer.
    ///
    /// Values that round outside `2..=50`, and non-finite values, fall back
    /// to the default window of 2. They are not clamped to the nearest bound:
    /// a window of 51 resolves to 2, not 50.
    pub fn moving_range_window(&self) -> usize {
        let w = self.moving_range_window.round();
        if w.is_finite() && w >= DEFAULT_WINDOW as f64 && w <= MAX_WINDOW as f64 {
            w as usize
        } else {
            DEFAULT_WINDOW
        }
    }

    /// Limit multiplier; non-finite or negative values fall back to 3.
    pub fn num_sds(&self) -> f64 {
        if self.num_sds.is_finite() && self.num_sds >= 0.0 {
            self.num_sds
        } else {
            DEFAULT_NUM_SDS
        }
    }

    /// Rules enabled for this refresh.
    pub fn rule_selection(&self) -> RuleSelection {
        RuleSelection {
            beyond_limits: self.run_rule1,
            trend: self.run_rule2,
            run_about_center: self.run_rule3,
        }
    }
}
