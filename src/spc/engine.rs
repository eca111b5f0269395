//! One-shot analysis pipeline.
//!
//! Each refresh runs segmentation, limit estimation, and rule evaluation from
//! scratch. Nothing is cached between calls, so identical input and
//! configuration always produce identical output.

use super::chart::{LimitSegment, SeriesInput, StageDivider};
use super::config::SpcConfig;
use super::error::Result;
use super::limits::compute_limits;
use super::rules::{evaluate, RuleFlags};
use super::stage::{segment, Stage};

/// Everything the renderer needs for one chart refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpcAnalysis {
    /// Stages in series order.
    pub stages: Vec<Stage>,
    /// Center line per stage.
    pub mean_segments: Vec<LimitSegment>,
    /// Upper control limit per stage that has limits.
    pub ucl_segments: Vec<LimitSegment>,
    /// Lower control limit per stage that has limits.
    pub lcl_segments: Vec<LimitSegment>,
    /// Boundaries between consecutive stages.
    pub dividers: Vec<StageDivider>,
    /// Indices flagged by the enabled rules.
    pub flags: RuleFlags,
    /// At least one stage lacks limits because it had too few points.
    pub insufficient_data: bool,
}

impl SpcAnalysis {
    /// The neutral result: no stages, no lines, no flags, no warning.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if no stage was produced.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Analyse a series, reporting invalid input as an error.
///
/// # Errors
///
/// Returns the [`SpcError`](super::SpcError) raised by
/// [`SeriesInput::points`] when the binding is incomplete or malformed.
pub fn try_analyze(input: &SeriesInput, config: &SpcConfig) -> Result<SpcAnalysis> {
    let points = input.points()?;
    let stages = segment(&points, input.labels());
    let limits = compute_limits(&points, stages, config);
    let flags = evaluate(&points, &limits.stages, config.rule_selection());
    let dividers = dividers(&limits.stages);

    log::debug!(
        "spc refresh: {} points, {} stages, {} flagged, insufficient_data={}",
        points.len(),
        limits.stages.len(),
        flags.len(),
        limits.insufficient_data
    );

    Ok(SpcAnalysis {
        stages: limits.stages,
        mean_segments: limits.mean_segments,
        ucl_segments: limits.ucl_segments,
        lcl_segments: limits.lcl_segments,
        dividers,
        flags,
        insufficient_data: limits.insufficient_data,
    })
}

/// Analyse a series, returning the empty analysis for invalid input.
///
/// # Examples
///
/// ```
/// use u_spc::spc::{analyze, Ordinal, SeriesInput, SpcConfig};
///
/// let values = vec![10.0, 12.0, 11.0, 13.0, 90.0, 14.0, 13.0, 15.0, 14.0, 16.0];
/// let input = SeriesInput::new(
///     (0..values.len()).map(|x| Ordinal::Numeric(x as f64)).collect(),
///     values,
/// );
/// let config = SpcConfig { run_rule1: true, ..SpcConfig::default() };
///
/// let analysis = analyze(&input, &config);
/// assert_eq!(analysis.stages.len(), 1);
/// assert_eq!(analysis.flags.indices().collect::<Vec<_>>(), vec![4]);
///
/// let missing = SeriesInput::default();
/// assert!(analyze(&missing, &config).is_empty());
/// ```
pub fn analyze(input: &SeriesInput, config: &SpcConfig) -> SpcAnalysis {
    match try_analyze(input, config) {
        Ok(analysis) => analysis,
        Err(e) => {
            log::warn!("spc input rejected: {e}");
            SpcAnalysis::empty()
        }
    }
}

fn dividers(stages: &[Stage]) -> Vec<StageDivider> {
    stages
        .windows(2)
        .map(|pair| StageDivider {
            x: pair[0].divider_x,
            before: pair[0].label.clone(),
            after: pair[1].label.clone(),
        })
        .collect()
}
