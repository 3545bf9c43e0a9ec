use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed fuel volume represented as **integer centiliters**.
///
/// Use this type for **all** volumes in the engine (movement volumes, tank
/// balances, capacities) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = fuel entering a tank
/// - negative = fuel drawn for consumption
///
/// # Examples
///
/// ```rust
/// use engine::Liters;
///
/// let volume = Liters::new(12_34);
/// assert_eq!(volume.centiliters(), 1234);
/// assert_eq!(volume.to_string(), "12.34L");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Liters;
///
/// assert_eq!("20".parse::<Liters>().unwrap().centiliters(), 2000);
/// assert_eq!("20,5".parse::<Liters>().unwrap().centiliters(), 2050);
/// assert!("12.345".parse::<Liters>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Liters(i64);

impl Liters {
    pub const ZERO: Liters = Liters(0);

    /// Creates a new volume from integer centiliters.
    #[must_use]
    pub const fn new(centiliters: i64) -> Self {
        Self(centiliters)
    }

    /// Returns the raw value in centiliters.
    #[must_use]
    pub const fn centiliters(self) -> i64 {
        self.0
    }

    /// Returns the volume as fractional liters.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the magnitude of the volume.
    #[must_use]
    pub const fn abs(self) -> Liters {
        Liters(self.0.abs())
    }

    /// Returns `true` if the volume is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the volume is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the volume is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Liters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let liters = abs / 100;
        let centi = abs % 100;
        write!(f, "{sign}{liters}.{centi:02}L")
    }
}

impl From<i64> for Liters {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Liters> for i64 {
    fn from(value: Liters) -> Self {
        value.0
    }
}

impl Add for Liters {
    type Output = Liters;

    fn add(self, rhs: Liters) -> Self::Output {
        Liters(self.0 + rhs.0)
    }
}

impl AddAssign for Liters {
    fn add_assign(&mut self, rhs: Liters) {
        self.0 += rhs.0;
    }
}

impl Sub for Liters {
    type Output = Liters;

    fn sub(self, rhs: Liters) -> Self::Output {
        Liters(self.0 - rhs.0)
    }
}

impl SubAssign for Liters {
    fn sub_assign(&mut self, rhs: Liters) {
        self.0 -= rhs.0;
    }
}

impl Neg for Liters {
    type Output = Liters;

    fn neg(self) -> Self::Output {
        Liters(-self.0)
    }
}

impl Sum for Liters {
    fn sum<I: Iterator<Item = Liters>>(iter: I) -> Self {
        iter.fold(Liters::ZERO, Add::add)
    }
}

impl FromStr for Liters {
    type Err = EngineError;

    /// Parses a decimal string into centiliters.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::reading::parse_fixed(s)
            .map(Liters)
            .map_err(|reason| EngineError::InvalidQuantity(format!("volume: {reason}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_liters() {
        assert_eq!(Liters::new(0).to_string(), "0.00L");
        assert_eq!(Liters::new(1).to_string(), "0.01L");
        assert_eq!(Liters::new(10).to_string(), "0.10L");
        assert_eq!(Liters::new(2050).to_string(), "20.50L");
        assert_eq!(Liters::new(-2050).to_string(), "-20.50L");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("20".parse::<Liters>().unwrap().centiliters(), 2000);
        assert_eq!("20.5".parse::<Liters>().unwrap().centiliters(), 2050);
        assert_eq!("20,50".parse::<Liters>().unwrap().centiliters(), 2050);
        assert_eq!("-0.01".parse::<Liters>().unwrap().centiliters(), -1);
        assert_eq!("+1.00".parse::<Liters>().unwrap().centiliters(), 100);
        assert_eq!("  2.30 ".parse::<Liters>().unwrap().centiliters(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<Liters>().is_err());
        assert!("0.001".parse::<Liters>().is_err());
    }

    #[test]
    fn abs_strips_the_sign() {
        assert_eq!(Liters::new(-2000).abs(), Liters::new(2000));
        assert_eq!(Liters::new(2000).abs(), Liters::new(2000));
    }

    #[test]
    fn sums_over_iterators() {
        let total: Liters = [Liters::new(500), Liters::new(-200)].into_iter().sum();
        assert_eq!(total, Liters::new(300));
    }
}
