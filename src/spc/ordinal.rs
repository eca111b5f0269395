//! Position axis model.
//!
//! A series is positioned either on a numeric axis or on a temporal axis.
//! [`Ordinal`] makes that choice explicit so that ordering and midpoint
//! computation are defined per variant instead of being inferred at runtime.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};

/// A position on the category axis of a control chart.
///
/// Temporal positions are stored as milliseconds since the Unix epoch.
///
/// Values of different variants are unordered: `partial_cmp` returns `None`
/// and `==` is `false`. Input validation rejects series that mix variants, so
/// the segmenter never compares across them.
#[derive(Debug, Clone, Copy)]
pub enum Ordinal {
    /// A numeric position.
    Numeric(f64),
    /// A timestamp in milliseconds since the Unix epoch.
    Temporal(i64),
}

impl Ordinal {
    /// Midpoint between two positions of the same variant.
    ///
    /// Returns `None` when the variants differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_spc::spc::Ordinal;
    ///
    /// let mid = Ordinal::Numeric(1.0).midpoint(&Ordinal::Numeric(4.0));
    /// assert_eq!(mid, Some(Ordinal::Numeric(2.5)));
    ///
    /// let mid = Ordinal::Temporal(1_000).midpoint(&Ordinal::Temporal(2_000));
    /// assert_eq!(mid, Some(Ordinal::Temporal(1_500)));
    /// ```
    pub fn midpoint(&self, other: &Ordinal) -> Option<Ordinal> {
        match (self, other) {
            // Halve first so that large finite positions cannot overflow.
            (Ordinal::Numeric(a), Ordinal::Numeric(b)) => Some(Ordinal::Numeric(a / 2.0 + b / 2.0)),
            (Ordinal::Temporal(a), Ordinal::Temporal(b)) => {
                // Widen so that timestamps near i64 bounds cannot overflow.
                let mid = (i128::from(*a) + i128::from(*b)).div_euclid(2);
                Some(Ordinal::Temporal(mid as i64))
            }
            _ => None,
        }
    }

    /// Returns `true` for numeric positions.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ordinal::Numeric(_))
    }

    /// Returns `true` when both positions belong to the same axis kind.
    pub fn same_kind(&self, other: &Ordinal) -> bool {
        self.is_numeric() == other.is_numeric()
    }

    /// The position as a UTC timestamp, for temporal positions only.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Ordinal::Temporal(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Ordinal::Numeric(_) => None,
        }
    }

    /// Returns `true` if a numeric position is finite. Temporal positions are
    /// always finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Ordinal::Numeric(x) => x.is_finite(),
            Ordinal::Temporal(_) => true,
        }
    }
}

impl PartialEq for Ordinal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ordinal::Numeric(a), Ordinal::Numeric(b)) => a == b,
            (Ordinal::Temporal(a), Ordinal::Temporal(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Ordinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Ordinal::Numeric(a), Ordinal::Numeric(b)) => a.partial_cmp(b),
            (Ordinal::Temporal(a), Ordinal::Temporal(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<f64> for Ordinal {
    fn from(x: f64) -> Self {
        Ordinal::Numeric(x)
    }
}

impl From<DateTime<Utc>> for Ordinal {
    fn from(t: DateTime<Utc>) -> Self {
        Ordinal::Temporal(t.timestamp_millis())
    }
}
