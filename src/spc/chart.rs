//! Core chart types: input series, data points, and renderable segments.
//!
//! The host binds a category axis (positions), a numeric measure (values),
//! and optionally a stage label per point. [`SeriesInput::points`] validates
//! that binding and produces the immutable [`DataPoint`] sequence the rest of
//! the pipeline works on.

use super::error::{Result, SpcError};
use super::ordinal::Ordinal;

/// A single observation on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Position on the category axis.
    pub position: Ordinal,
    /// The measured value.
    pub value: f64,
    /// Zero-based index of this point in the series.
    pub index: usize,
}

/// Raw series handed over by the host.
///
/// Positions must already be sorted ascending; the engine does not re-sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesInput {
    /// Category axis, one position per point.
    pub positions: Option<Vec<Ordinal>>,
    /// Numeric measure, one value per point.
    pub values: Option<Vec<f64>>,
    /// String-coerced stage label per point. `None` means one implicit stage.
    pub labels: Option<Vec<String>>,
}

impl SeriesInput {
    /// Build an input from positions and values without stage labels.
    pub fn new(positions: Vec<Ordinal>, values: Vec<f64>) -> Self {
        Self {
            positions: Some(positions),
            values: Some(values),
            labels: None,
        }
    }

    /// Attach a stage label per point.
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Validate the binding and produce the point sequence.
    ///
    /// # Errors
    ///
    /// - [`SpcError::MissingPositions`] / [`SpcError::MissingValues`] when a
    ///   column is unbound
    /// - [`SpcError::LengthMismatch`] / [`SpcError::LabelLengthMismatch`] when
    ///   columns disagree in length
    /// - [`SpcError::MixedPositionTypes`] when numeric and temporal positions
    ///   are mixed
    /// - [`SpcError::NonFiniteValue`] for NaN or infinite values or numeric
    ///   positions
    pub fn points(&self) -> Result<Vec<DataPoint>> {
        let positions = self.positions.as_ref().ok_or(SpcError::MissingPositions)?;
        let values = self.values.as_ref().ok_or(SpcError::MissingValues)?;

        if positions.len() != values.len() {
            return Err(SpcError::LengthMismatch {
                positions: positions.len(),
                values: values.len(),
            });
        }
        if let Some(labels) = &self.labels {
            if labels.len() != values.len() {
                return Err(SpcError::LabelLengthMismatch {
                    expected: values.len(),
                    got: labels.len(),
                });
            }
        }

        let mut points = Vec::with_capacity(values.len());
        for (index, (&position, &value)) in positions.iter().zip(values).enumerate() {
            if !positions[0].same_kind(&position) {
                return Err(SpcError::MixedPositionTypes { index });
            }
            if !value.is_finite() || !position.is_finite() {
                return Err(SpcError::NonFiniteValue { index });
            }
            points.push(DataPoint {
                position,
                value,
                index,
            });
        }
        Ok(points)
    }

    /// Stage labels, if bound.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }
}

/// One horizontal line of the chart (center line, UCL, or LCL) spanning a
/// single stage.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSegment {
    /// Start position.
    pub x1: Ordinal,
    /// Height at the start.
    pub y1: f64,
    /// End position.
    pub x2: Ordinal,
    /// Height at the end.
    pub y2: f64,
}

impl LimitSegment {
    /// A horizontal segment at height `y` from `x1` to `x2`.
    pub fn horizontal(x1: Ordinal, x2: Ordinal, y: f64) -> Self {
        Self { x1, y1: y, x2, y2: y }
    }
}

/// Boundary marker between two consecutive stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDivider {
    /// Position of the boundary (midpoint between the stages).
    pub x: Ordinal,
    /// Label of the stage ending at this divider.
    pub before: String,
    /// Label of the stage starting at this divider.
    pub after: String,
}
