//! Control-limit estimation for staged series.
//!
//! Two estimators share one interface, [`LimitEstimator`]:
//!
//! - [`MovingRange`] — individuals chart. Sigma is estimated per stage from
//!   the average range of a sliding window, unbiased by d2:
//!   `UCL/LCL = mean ± k * R-bar / d2(w)`.
//! - [`SubgroupStdDev`] — sigma is the standard deviation of each subgroup,
//!   optionally pooling every stage that shares a label:
//!   `UCL/LCL = mean ± k * s`.
//!
//! Both write their results into the [`Stage`] records; the renderable
//! segments are then built the same way for either method.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6: Control Charts for Variables.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use std::collections::HashMap;

use u_numflow::stats;

use super::chart::{DataPoint, LimitSegment};
use super::config::{LimitMethod, SpcConfig};
use super::factors::d2;
use super::stage::Stage;

/// Groups above this size use the population formula for the standard
/// deviation; smaller groups use the `n - 1` correction.
const POPULATION_SD_THRESHOLD: usize = 8;

/// Strategy for turning stages into center lines and control limits.
pub trait LimitEstimator {
    /// Fill in `center_line`, `ucl`, `lcl`, `sd`, and
    /// `has_insufficient_data` for every stage.
    ///
    /// Returns `true` if at least one stage had too little data for limits.
    fn estimate(&self, points: &[DataPoint], stages: &mut [Stage]) -> bool;
}

/// Individuals / moving-range estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingRange {
    /// Number of consecutive points per range, 2..=50.
    pub window: usize,
    /// Limit distance in estimated standard deviations.
    pub num_sds: f64,
}

/// Subgroup standard-deviation estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubgroupStdDev {
    /// Limit distance in standard deviations.
    pub num_sds: f64,
    /// Pool all stages sharing a label into one subgroup.
    pub aggregate_by_label: bool,
}

/// Stages pooled under one label (or a single stage when not pooling).
#[derive(Debug, Clone, PartialEq)]
pub struct SubGroup {
    /// Label shared by the pooled stages.
    pub label: String,
    /// Sum of all values in the group.
    pub sum: f64,
    /// Number of points in the group.
    pub count: usize,
    /// Group mean, the center line of its stages.
    pub mean: f64,
    /// Sum of squared deviations from `mean`.
    pub sum_squares: f64,
}

/// Stages enriched with limits, plus the lines to draw for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageLimits {
    /// Stages with center lines and limits filled in.
    pub stages: Vec<Stage>,
    /// One center-line segment per stage.
    pub mean_segments: Vec<LimitSegment>,
    /// One UCL segment per stage that has limits.
    pub ucl_segments: Vec<LimitSegment>,
    /// One LCL segment per stage that has limits.
    pub lcl_segments: Vec<LimitSegment>,
    /// At least one stage lacks limits because it had too few points.
    pub insufficient_data: bool,
}

impl LimitEstimator for MovingRange {
    fn estimate(&self, points: &[DataPoint], stages: &mut [Stage]) -> bool {
        let d2 = d2(self.window as i64);
        let mut insufficient = false;

        for stage in stages.iter_mut() {
            stage.center_line = stage.mean;
            stage.sd = None;

            if stage.count < self.window {
                log::warn!(
                    "stage '{}' has {} points, fewer than the moving-range window of {}",
                    stage.label,
                    stage.count,
                    self.window
                );
                mark_insufficient(stage);
                insufficient = true;
                continue;
            }

            let values: Vec<f64> = stage.points(points).iter().map(|p| p.value).collect();
            let ranges: Vec<f64> = values.windows(self.window).map(window_range).collect();
            let Some(r_bar) = stats::mean(&ranges) else {
                mark_insufficient(stage);
                insufficient = true;
                continue;
            };

            let half_width = self.num_sds * r_bar / d2;
            stage.ucl = Some(stage.mean + half_width);
            stage.lcl = Some(stage.mean - half_width);
            stage.has_insufficient_data = false;
        }
        insufficient
    }
}

impl LimitEstimator for SubgroupStdDev {
    fn estimate(&self, points: &[DataPoint], stages: &mut [Stage]) -> bool {
        let (groups, membership) = group_stages(points, stages, self.aggregate_by_label);
        let mut insufficient = false;

        for (stage, &g) in stages.iter_mut().zip(&membership) {
            let group = &groups[g];
            stage.center_line = group.mean;
            match subgroup_sd(group.sum_squares, group.count) {
                Some(sd) => {
                    stage.sd = Some(sd);
                    stage.ucl = Some(group.mean + self.num_sds * sd);
                    stage.lcl = Some(group.mean - self.num_sds * sd);
                    stage.has_insufficient_data = false;
                }
                None => {
                    log::warn!(
                        "subgroup '{}' has {} point(s); standard deviation is undefined",
                        group.label,
                        group.count
                    );
                    mark_insufficient(stage);
                    insufficient = true;
                }
            }
        }
        insufficient
    }
}

/// Build the estimator selected by `config`.
pub fn estimator(config: &SpcConfig) -> Box<dyn LimitEstimator> {
    match config.method {
        LimitMethod::MovingRange => Box::new(MovingRange {
            window: config.moving_range_window(),
            num_sds: config.num_sds(),
        }),
        LimitMethod::SubgroupStdDev => Box::new(SubgroupStdDev {
            num_sds: config.num_sds(),
            aggregate_by_label: config.aggregate_by_label,
        }),
    }
}

/// Estimate limits for `stages` with the configured method and build the
/// mean, UCL, and LCL segments.
///
/// # Examples
///
/// ```
/// use u_spc::spc::{compute_limits, segment, Ordinal, SeriesInput, SpcConfig};
///
/// let input = SeriesInput::new(
///     (0..4).map(|x| Ordinal::Numeric(x as f64)).collect(),
///     vec![10.0, 12.0, 11.0, 13.0],
/// );
/// let points = input.points().unwrap();
/// let stages = segment(&points, None);
///
/// let limits = compute_limits(&points, stages, &SpcConfig::default());
/// let stage = &limits.stages[0];
/// // R-bar = (2 + 1 + 2) / 3, sigma = R-bar / 1.128
/// let sigma = (5.0 / 3.0) / 1.128;
/// assert!((stage.ucl.unwrap() - (11.5 + 3.0 * sigma)).abs() < 1e-9);
/// assert_eq!(limits.mean_segments.len(), 1);
/// ```
pub fn compute_limits(
    points: &[DataPoint],
    mut stages: Vec<Stage>,
    config: &SpcConfig,
) -> StageLimits {
    let insufficient_data = estimator(config).estimate(points, &mut stages);
    let (mean_segments, ucl_segments, lcl_segments) = build_segments(&stages);
    StageLimits {
        stages,
        mean_segments,
        ucl_segments,
        lcl_segments,
        insufficient_data,
    }
}

/// Standard deviation of a group from its sum of squared deviations.
///
/// Groups larger than 8 use `sqrt(S / n)`; groups of 2..=8 use
/// `sqrt(S / (n - 1))`. Returns `None` for groups of 0 or 1 points, where
/// the sample deviation is undefined.
///
/// # Examples
///
/// ```
/// use u_spc::spc::subgroup_sd;
///
/// assert!((subgroup_sd(40.0, 10).unwrap() - 2.0).abs() < 1e-12);
/// assert!((subgroup_sd(28.0, 8).unwrap() - 2.0).abs() < 1e-12);
/// assert_eq!(subgroup_sd(0.0, 1), None);
/// ```
pub fn subgroup_sd(sum_squares: f64, count: usize) -> Option<f64> {
    match count {
        0 | 1 => None,
        n if n > POPULATION_SD_THRESHOLD => Some((sum_squares / n as f64).sqrt()),
        n => Some((sum_squares / (n - 1) as f64).sqrt()),
    }
}

/// Pool stages into subgroups.
///
/// Returns the subgroups in order of first appearance and, for each stage,
/// the index of the subgroup it belongs to.
pub fn group_stages(
    points: &[DataPoint],
    stages: &[Stage],
    aggregate_by_label: bool,
) -> (Vec<SubGroup>, Vec<usize>) {
    let mut groups: Vec<SubGroup> = Vec::new();
    let mut membership = Vec::with_capacity(stages.len());
    let mut by_label: HashMap<&str, usize> = HashMap::new();

    for stage in stages {
        let existing = if aggregate_by_label {
            by_label.get(stage.label.as_str()).copied()
        } else {
            None
        };
        let g = match existing {
            Some(g) => {
                groups[g].sum += stage.sum;
                groups[g].count += stage.count;
                g
            }
            None => {
                groups.push(SubGroup {
                    label: stage.label.clone(),
                    sum: stage.sum,
                    count: stage.count,
                    mean: 0.0,
                    sum_squares: 0.0,
                });
                let g = groups.len() - 1;
                by_label.insert(stage.label.as_str(), g);
                g
            }
        };
        membership.push(g);
    }

    for group in &mut groups {
        group.mean = group.sum / group.count as f64;
    }

    for (stage, &g) in stages.iter().zip(&membership) {
        let mean = groups[g].mean;
        groups[g].sum_squares += stage
            .points(points)
            .iter()
            .map(|p| (p.value - mean).powi(2))
            .sum::<f64>();
    }

    (groups, membership)
}

/// Mean, UCL, and LCL segments.
type Segments = (Vec<LimitSegment>, Vec<LimitSegment>, Vec<LimitSegment>);

/// Build one mean segment per stage and a UCL/LCL segment per stage that
/// has limits.
///
/// Stage `i` spans from the previous stage's divider (or its own start for
/// the first stage) to its own divider.
fn build_segments(stages: &[Stage]) -> Segments {
    let mut mean = Vec::with_capacity(stages.len());
    let mut ucl = Vec::with_capacity(stages.len());
    let mut lcl = Vec::with_capacity(stages.len());

    for (i, stage) in stages.iter().enumerate() {
        let x1 = if i == 0 {
            stage.start_x
        } else {
            stages[i - 1].divider_x
        };
        let x2 = stage.divider_x;

        mean.push(LimitSegment::horizontal(x1, x2, stage.center_line));
        if let (Some(u), Some(l)) = (stage.ucl, stage.lcl) {
            ucl.push(LimitSegment::horizontal(x1, x2, u));
            lcl.push(LimitSegment::horizontal(x1, x2, l));
        }
    }
    (mean, ucl, lcl)
}

fn mark_insufficient(stage: &mut Stage) {
    stage.ucl = None;
    stage.lcl = None;
    stage.has_insufficient_data = true;
}

/// Range (max - min) of a window of values.
fn window_range(window: &[f64]) -> f64 {
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}
