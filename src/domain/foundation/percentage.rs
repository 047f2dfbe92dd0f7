//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value between 0 and 100 inclusive.
///
/// Fractional values are kept because real-time progress estimation
/// produces them; out-of-range inputs are clamped and NaN becomes zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0.0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100.0);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the value as a fraction (0.0 to 1.0).
    pub fn as_fraction(&self) -> f64 {
        self.0 / 100.0
    }

    /// True when the value is exactly one hundred.
    pub fn is_full(&self) -> bool {
        self.0 >= 100.0
    }

    /// Value rounded to the nearest whole percent.
    pub fn rounded(&self) -> u8 {
        self.0.round() as u8
    }

    /// Mean of the given percentages, zero for an empty input.
    pub fn mean<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Percentage>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), p| (sum + p.0, count + 1));
        if count == 0 {
            Self::ZERO
        } else {
            Self::new(sum / count as f64)
        }
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}
