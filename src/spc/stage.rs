//! Stage segmentation.
//!
//! A stage is a maximal contiguous run of points sharing the same label.
//! Each stage gets its own center line and control limits, and run rules
//! never cross a stage boundary.

use super::chart::DataPoint;
use super::ordinal::Ordinal;

/// A contiguous block of points sharing a label, with its derived limits.
///
/// # Invariants
///
/// - Stages are ordered by position; their `first_index..=last_index` ranges
///   are contiguous, non-overlapping, and cover the whole series.
/// - `count == last_index - first_index + 1`
/// - `divider_x` is the midpoint to the next stage's first point, or `end_x`
///   for the final stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Label shared by every point of the stage.
    pub label: String,
    /// Offset of the stage's first point in the point slice.
    pub first_index: usize,
    /// Offset of the stage's last point in the point slice.
    pub last_index: usize,
    /// Position of the first point.
    pub start_x: Ordinal,
    /// Position of the last point.
    pub end_x: Ordinal,
    /// Boundary towards the next stage.
    pub divider_x: Ordinal,
    /// Number of points in the stage.
    pub count: usize,
    /// Sum of the stage's values.
    pub sum: f64,
    /// Arithmetic mean of this stage's values.
    pub mean: f64,
    /// Center line the limits are built around. Equal to `mean` unless
    /// stages are pooled by label.
    pub center_line: f64,
    /// Upper control limit, `None` when it could not be estimated.
    pub ucl: Option<f64>,
    /// Lower control limit, `None` when it could not be estimated.
    pub lcl: Option<f64>,
    /// Standard deviation of the stage's group (subgroup method only).
    pub sd: Option<f64>,
    /// Set when there were too few points to estimate limits.
    pub has_insufficient_data: bool,
}

impl Stage {
    /// Offsets of this stage's points in the point slice.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.first_index..=self.last_index
    }

    /// The stage's slice of the point series.
    pub fn points<'a>(&self, points: &'a [DataPoint]) -> &'a [DataPoint] {
        &points[self.indices()]
    }

    /// Returns `true` when both control limits are available.
    pub fn has_limits(&self) -> bool {
        self.ucl.is_some() && self.lcl.is_some()
    }
}

/// Running totals for the stage currently being built.
struct Accumulator<'a> {
    label: &'a str,
    first_index: usize,
    start_x: Ordinal,
    sum: f64,
    count: usize,
}

impl<'a> Accumulator<'a> {
    fn open(offset: usize, point: &DataPoint, label: &'a str) -> Self {
        Self {
            label,
            first_index: offset,
            start_x: point.position,
            sum: point.value,
            count: 1,
        }
    }

    fn close(self, last_offset: usize, last: &DataPoint, divider_x: Ordinal) -> Stage {
        let mean = self.sum / self.count as f64;
        Stage {
            label: self.label.to_string(),
            first_index: self.first_index,
            last_index: last_offset,
            start_x: self.start_x,
            end_x: last.position,
            divider_x,
            count: self.count,
            sum: self.sum,
            mean,
            center_line: mean,
            ucl: None,
            lcl: None,
            sd: None,
            has_insufficient_data: false,
        }
    }
}

/// Partition a point series into stages by label.
///
/// `labels` should be `None` or have one entry per point (see
/// [`SeriesInput::points`](super::SeriesInput::points)). Without labels the
/// whole series is a single stage with an empty label; points past the end
/// of a short label slice get the empty label.
///
/// Stage index ranges are offsets into `points`, whatever values the
/// points carry in [`DataPoint::index`].
///
/// # Examples
///
/// ```
/// use u_spc::spc::{segment, Ordinal, SeriesInput};
///
/// let input = SeriesInput::new(
///     (0..5).map(|x| Ordinal::Numeric(x as f64)).collect(),
///     vec![1.0, 2.0, 3.0, 10.0, 12.0],
/// )
/// .with_labels(["before", "before", "before", "after", "after"]);
/// let points = input.points().unwrap();
///
/// let stages = segment(&points, input.labels());
/// assert_eq!(stages.len(), 2);
/// assert!((stages[0].mean - 2.0).abs() < 1e-12);
/// assert_eq!(stages[0].divider_x, Ordinal::Numeric(2.5));
/// assert_eq!(stages[1].divider_x, stages[1].end_x);
/// ```
pub fn segment(points: &[DataPoint], labels: Option<&[String]>) -> Vec<Stage> {
    let mut stages = Vec::new();
    let Some(first) = points.first() else {
        return stages;
    };

    let label_of = |i: usize| labels.and_then(|l| l.get(i)).map_or("", String::as_str);

    let mut acc = Accumulator::open(0, first, label_of(0));
    for (i, window) in points.windows(2).enumerate() {
        let (prev, current) = (&window[0], &window[1]);
        let label = label_of(i + 1);
        if label == acc.label {
            acc.sum += current.value;
            acc.count += 1;
            continue;
        }
        let divider_x = prev
            .position
            .midpoint(&current.position)
            .unwrap_or(prev.position);
        let done = std::mem::replace(&mut acc, Accumulator::open(i + 1, current, label));
        stages.push(done.close(i, prev, divider_x));
    }

    let last_offset = points.len() - 1;
    let last = &points[last_offset];
    stages.push(acc.close(last_offset, last, last.position));
    stages
}
