//! Run rules for detecting out-of-control points.
//!
//! Three tests are evaluated independently within each stage; runs never
//! cross a stage boundary:
//!
//! 1. [`Rule::BeyondLimits`] — a point strictly above the UCL or strictly
//!    below the LCL.
//! 2. [`Rule::Trend`] — 6 or more consecutive points strictly increasing or
//!    strictly decreasing.
//! 3. [`Rule::RunAboutCenter`] — 9 or more consecutive points strictly on
//!    the same side of the center line. A point on the line breaks the run.
//!
//! Every point of a qualifying run is flagged, not only the last one.
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use std::collections::{BTreeMap, BTreeSet};

use super::chart::DataPoint;
use super::config::CosmeticOptions;
use super::stage::Stage;

/// Minimum length of a monotone run that counts as a trend.
const TREND_RUN: usize = 6;

/// Minimum length of a one-sided run about the center line.
const CENTER_RUN: usize = 9;

/// The out-of-control tests, in priority order.
///
/// When a point is flagged by several rules, the lowest variant decides its
/// highlight color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    /// Point beyond the control limits (rule 1).
    BeyondLimits,
    /// Six points steadily increasing or decreasing (rule 2).
    Trend,
    /// Nine points on the same side of the center line (rule 3).
    RunAboutCenter,
}

/// Which rules to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleSelection {
    /// Rule 1: points beyond the control limits.
    pub beyond_limits: bool,
    /// Rule 2: six-point trends.
    pub trend: bool,
    /// Rule 3: nine-point runs on one side of the center line.
    pub run_about_center: bool,
}

impl RuleSelection {
    /// All three rules enabled.
    pub fn all() -> Self {
        Self {
            beyond_limits: true,
            trend: true,
            run_about_center: true,
        }
    }

    /// Returns `true` if any rule is enabled.
    pub fn any(&self) -> bool {
        self.beyond_limits || self.trend || self.run_about_center
    }
}

/// Flagged point indices and the rules that flagged them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFlags {
    hits: BTreeMap<usize, BTreeSet<Rule>>,
}

impl RuleFlags {
    /// Record that `rule` flagged `index`.
    pub fn flag(&mut self, index: usize, rule: Rule) {
        self.hits.entry(index).or_default().insert(rule);
    }

    /// Flagged indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.hits.keys().copied()
    }

    /// Returns `true` if `index` was flagged by any rule.
    pub fn contains(&self, index: usize) -> bool {
        self.hits.contains_key(&index)
    }

    /// Rules that flagged `index`, if any.
    pub fn rules_at(&self, index: usize) -> Option<&BTreeSet<Rule>> {
        self.hits.get(&index)
    }

    /// Highest-priority rule that flagged `index`.
    pub fn primary_rule(&self, index: usize) -> Option<Rule> {
        self.hits.get(&index).and_then(|rules| rules.first().copied())
    }

    /// Color to draw `index` in, or `None` if it is not flagged.
    pub fn highlight_color<'a>(
        &self,
        index: usize,
        cosmetics: &'a CosmeticOptions,
    ) -> Option<&'a str> {
        self.primary_rule(index).map(|rule| cosmetics.rule_color(rule))
    }

    /// Indices flagged by `rule`.
    pub fn flagged_by(&self, rule: Rule) -> Vec<usize> {
        self.hits
            .iter()
            .filter(|(_, rules)| rules.contains(&rule))
            .map(|(&i, _)| i)
            .collect()
    }

    /// Number of flagged points.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns `true` if no point was flagged.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// A run of consecutive indices satisfying some condition.
struct Run {
    rule: Rule,
    min_len: usize,
    start: usize,
    len: usize,
}

impl Run {
    fn new(rule: Rule, min_len: usize) -> Self {
        Self {
            rule,
            min_len,
            start: 0,
            len: 0,
        }
    }

    fn extend(&mut self, index: usize) {
        if self.len == 0 {
            self.start = index;
        }
        self.len += 1;
    }

    /// Close the run, flagging every member if it was long enough.
    fn close(&mut self, flags: &mut RuleFlags) {
        if self.len >= self.min_len {
            for i in self.start..self.start + self.len {
                flags.flag(i, self.rule);
            }
        }
        self.len = 0;
    }
}

/// Evaluate the selected rules over every stage.
///
/// Stages without control limits are skipped by rule 1 but still take part
/// in rules 2 and 3, which only need the center line.
///
/// # Examples
///
/// ```
/// use u_spc::spc::{
///     compute_limits, evaluate, segment, Ordinal, Rule, RuleSelection, SeriesInput, SpcConfig,
/// };
///
/// let input = SeriesInput::new(
///     (0..6).map(|x| Ordinal::Numeric(x as f64)).collect(),
///     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
/// );
/// let points = input.points().unwrap();
/// let limits = compute_limits(&points, segment(&points, None), &SpcConfig::default());
///
/// let flags = evaluate(&points, &limits.stages, RuleSelection::all());
/// assert_eq!(flags.flagged_by(Rule::Trend), vec![0, 1, 2, 3, 4, 5]);
/// ```
pub fn evaluate(points: &[DataPoint], stages: &[Stage], selection: RuleSelection) -> RuleFlags {
    let mut flags = RuleFlags::default();
    if !selection.any() {
        return flags;
    }
    for stage in stages {
        evaluate_stage(stage.points(points), stage, selection, &mut flags);
    }
    flags
}

fn evaluate_stage(
    points: &[DataPoint],
    stage: &Stage,
    selection: RuleSelection,
    flags: &mut RuleFlags,
) {
    let limits = stage.ucl.zip(stage.lcl);
    let center = stage.center_line;

    let mut rising = Run::new(Rule::Trend, TREND_RUN);
    let mut falling = Run::new(Rule::Trend, TREND_RUN);
    let mut above = Run::new(Rule::RunAboutCenter, CENTER_RUN);
    let mut below = Run::new(Rule::RunAboutCenter, CENTER_RUN);

    let mut prev: Option<f64> = None;
    for point in points {
        let (i, v) = (point.index, point.value);

        if selection.beyond_limits {
            if let Some((ucl, lcl)) = limits {
                if v > ucl || v < lcl {
                    flags.flag(i, Rule::BeyondLimits);
                }
            }
        }

        if selection.trend {
            match prev {
                Some(p) if v > p => rising.extend(i),
                _ => {
                    rising.close(flags);
                    rising.extend(i);
                }
            }
            match prev {
                Some(p) if v < p => falling.extend(i),
                _ => {
                    falling.close(flags);
                    falling.extend(i);
                }
            }
        }

        if selection.run_about_center {
            if v > center {
                above.extend(i);
            } else {
                above.close(flags);
            }
            if v < center {
                below.extend(i);
            } else {
                below.close(flags);
            }
        }

        prev = Some(v);
    }

    rising.close(flags);
    falling.close(flags);
    above.close(flags);
    below.close(flags);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spc::ordinal::Ordinal;

    /// Helper: create data points from a slice of values.
    fn make_points(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint {
                position: Ordinal::Numeric(i as f64),
                value: v,
                index: i,
            })
            .collect()
    }

    /// Helper: a stage spanning `first..=last` with the given center and limits.
    fn make_stage(first: usize, last: usize, center: f64, limits: Option<(f64, f64)>) -> Stage {
        Stage {
            label: String::new(),
            first_index: first,
            last_index: last,
            start_x: Ordinal::Numeric(first as f64),
            end_x: Ordinal::Numeric(last as f64),
            divider_x: Ordinal::Numeric(last as f64),
            count: last - first + 1,
            sum: 0.0,
            mean: center,
            center_line: center,
            ucl: limits.map(|(u, _)| u),
            lcl: limits.map(|(_, l)| l),
            sd: None,
            has_insufficient_data: limits.is_none(),
        }
    }

    fn only(rule: Rule) -> RuleSelection {
        RuleSelection {
            beyond_limits: rule == Rule::BeyondLimits,
            trend: rule == Rule::Trend,
            run_about_center: rule == Rule::RunAboutCenter,
        }
    }

    // --- Rule 1: Beyond limits ---

    #[test]
    fn test_rule1_on_limit_is_not_violation() {
        let points = make_points(&[30.0, 20.0, 25.0]);
        let stages = [make_stage(0, 2, 25.0, Some((30.0, 20.0)))];
        let flags = evaluate(&points, &stages, only(Rule::BeyondLimits));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule1_one_unit_beyond() {
        let points = make_points(&[31.0, 25.0, 19.0]);
        let stages = [make_stage(0, 2, 25.0, Some((30.0, 20.0)))];
        let flags = evaluate(&points, &stages, only(Rule::BeyondLimits));
        assert_eq!(flags.indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(flags.primary_rule(0), Some(Rule::BeyondLimits));
    }

    #[test]
    fn test_rule1_skips_stage_without_limits() {
        let points = make_points(&[1_000.0, -1_000.0]);
        let stages = [make_stage(0, 1, 0.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::BeyondLimits));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule1_uses_each_stage_limits() {
        let points = make_points(&[5.0, 5.0, 50.0, 50.0]);
        let stages = [
            make_stage(0, 1, 5.0, Some((6.0, 4.0))),
            make_stage(2, 3, 5.0, Some((6.0, 4.0))),
        ];
        let flags = evaluate(&points, &stages, only(Rule::BeyondLimits));
        assert_eq!(flags.indices().collect::<Vec<_>>(), vec![2, 3]);
    }

    // --- Rule 2: Trend ---

    #[test]
    fn test_rule2_six_increasing() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let stages = [make_stage(0, 5, 3.5, None)];
        let flags = evaluate(&points, &stages, only(Rule::Trend));
        assert_eq!(flags.flagged_by(Rule::Trend), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rule2_equality_breaks_trend() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 5.0]);
        let stages = [make_stage(0, 5, 3.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::Trend));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule2_six_decreasing_mid_series() {
        let points = make_points(&[0.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 20.0]);
        let stages = [make_stage(0, 7, 8.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::Trend));
        assert_eq!(flags.flagged_by(Rule::Trend), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_rule2_five_points_not_enough() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stages = [make_stage(0, 4, 3.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::Trend));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule2_does_not_cross_stages() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let stages = [make_stage(0, 2, 2.0, None), make_stage(3, 5, 5.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::Trend));
        assert!(flags.is_empty());
    }

    // --- Rule 3: Run about center ---

    #[test]
    fn test_rule3_nine_above() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let points = make_points(&values);
        let stages = [make_stage(0, 8, 0.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::RunAboutCenter));
        assert_eq!(flags.flagged_by(Rule::RunAboutCenter), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_rule3_eight_above_not_enough() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        let points = make_points(&values);
        let stages = [make_stage(0, 7, 0.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::RunAboutCenter));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule3_point_on_center_breaks_run() {
        let mut values = vec![-1.0; 5];
        values.push(0.0);
        values.extend(vec![-1.0; 5]);
        let points = make_points(&values);
        let stages = [make_stage(0, 10, 0.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::RunAboutCenter));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_rule3_nine_below_after_break() {
        let mut values = vec![1.0, 0.0];
        values.extend(vec![-2.0; 9]);
        let points = make_points(&values);
        let stages = [make_stage(0, 10, 0.0, None)];
        let flags = evaluate(&points, &stages, only(Rule::RunAboutCenter));
        assert_eq!(flags.flagged_by(Rule::RunAboutCenter), (2..11).collect::<Vec<_>>());
    }

    // --- Combined ---

    #[test]
    fn test_disabled_rules_flag_nothing() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let stages = [make_stage(0, 5, 0.0, Some((10.0, -10.0)))];
        let flags = evaluate(&points, &stages, RuleSelection::default());
        assert!(flags.is_empty());
    }

    #[test]
    fn test_overlapping_rules_collapse_and_keep_provenance() {
        // Rising from 1 to 9 around center 0: every point is both a trend
        // member and above the center line; the last point is also beyond UCL.
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let points = make_points(&values);
        let stages = [make_stage(0, 8, 0.0, Some((8.5, -8.5)))];
        let flags = evaluate(&points, &stages, RuleSelection::all());

        assert_eq!(flags.len(), 9);
        let last = flags.rules_at(8).expect("flagged");
        assert_eq!(last.len(), 3);
        assert_eq!(flags.primary_rule(8), Some(Rule::BeyondLimits));
        assert_eq!(flags.primary_rule(0), Some(Rule::Trend));
        assert!(!flags.contains(9));
    }

    #[test]
    fn test_highlight_color_priority() {
        let cosmetics = CosmeticOptions {
            rule1_color: Some("red".to_string()),
            rule3_color: Some("purple".to_string()),
            ..CosmeticOptions::default()
        };
        let mut flags = RuleFlags::default();
        flags.flag(0, Rule::RunAboutCenter);
        flags.flag(0, Rule::BeyondLimits);
        flags.flag(1, Rule::RunAboutCenter);
        flags.flag(2, Rule::Trend);

        assert_eq!(flags.highlight_color(0, &cosmetics), Some("red"));
        assert_eq!(flags.highlight_color(1, &cosmetics), Some("purple"));
        assert_eq!(
            flags.highlight_color(2, &cosmetics),
            Some(cosmetics.highlight_color.as_str())
        );
        assert_eq!(flags.highlight_color(3, &cosmetics), None);
    }
}
