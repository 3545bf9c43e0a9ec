use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Meter reading represented as **integer hundredths** of the meter unit
/// (kilometers for odometers, hours for hour meters).
///
/// The same type also carries reading *differences*, so a regression shows up
/// as a negative value instead of an error.
///
/// # Examples
///
/// ```rust
/// use engine::Reading;
///
/// let reading = Reading::new(10_250_00);
/// assert_eq!(reading.hundredths(), 1_025_000);
/// assert_eq!(reading.to_string(), "10250.00");
/// assert_eq!((reading - Reading::new(10_000_00)).as_f64(), 250.0);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Reading(i64);

impl Reading {
    pub const ZERO: Reading = Reading(0);

    /// Creates a new reading from integer hundredths.
    #[must_use]
    pub const fn new(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Returns the raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Returns the reading as a fractional meter value.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `true` if the reading is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the reading is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the reading is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Reading {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Reading> for i64 {
    fn from(value: Reading) -> Self {
        value.0
    }
}

impl Add for Reading {
    type Output = Reading;

    fn add(self, rhs: Reading) -> Self::Output {
        Reading(self.0 + rhs.0)
    }
}

impl Sub for Reading {
    type Output = Reading;

    fn sub(self, rhs: Reading) -> Self::Output {
        Reading(self.0 - rhs.0)
    }
}

impl FromStr for Reading {
    type Err = EngineError;

    /// Parses a decimal string into hundredths, with the same rules as
    /// [`Liters`](crate::Liters): `.` or `,` separator, max 2 decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s)
            .map(Reading)
            .map_err(|reason| EngineError::InvalidQuantity(format!("reading: {reason}")))
    }
}

/// Parses a signed decimal string into integer hundredths.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`;
/// rejects empty strings and more than 2 fractional digits. Shared by the
/// `FromStr` impls of [`Reading`] and [`Liters`](crate::Liters).
pub(crate) fn parse_fixed(s: &str) -> Result<i64, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (-1i64, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (1i64, stripped)
    } else {
        (1i64, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err("empty value".to_string());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let whole_str = parts.next().ok_or_else(|| "invalid value".to_string())?;
    let frac_str = parts.next();

    if parts.next().is_some() {
        return Err("invalid value".to_string());
    }

    if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid value".to_string());
    }

    let whole: i64 = whole_str.parse().map_err(|_| "invalid value".to_string())?;

    let hundredths: i64 = match frac_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err("invalid value".to_string());
            }
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| "invalid value".to_string())? * 10,
                2 => frac.parse::<i64>().map_err(|_| "invalid value".to_string())?,
                _ => return Err("too many decimals".to_string()),
            }
        }
    };

    let total = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(hundredths))
        .ok_or_else(|| "value too large".to_string())?;

    if sign < 0 {
        total.checked_neg().ok_or_else(|| "value too large".to_string())
    } else {
        Ok(total)
    }
}
