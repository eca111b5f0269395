//! # u-spc
//!
//! Staged statistical process control for ordered series.
//!
//! Observations are positioned on a numeric or temporal axis and optionally
//! tagged with a stage label. The engine segments the series into stages,
//! estimates a center line and control limits for each stage (moving range
//! or subgroup standard deviation), and flags points that break the
//! limit, trend, or run-about-center rules.
//!
//! ## Modules
//!
//! - [`spc`] — Segmentation, control limits, and run rules
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every refresh recomputes from the input; no hidden state
//! - **Never fatal**: malformed input yields an empty analysis, short stages
//!   yield a warning flag instead of limits
//! - **Presentation-agnostic**: output is plain data for any renderer

pub mod spc;
