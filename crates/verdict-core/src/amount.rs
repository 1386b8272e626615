//! # Currency Amounts
//!
//! Scaled-integer currency. One unit of currency is `ONE_UNIT` micro-units,
//! mirroring how on-chain tokens are carried as integer base units.
//!
//! | Value      | Micro-units  |
//! |------------|--------------|
//! | 1.00       | 1_000_000    |
//! | 0.01       | 10_000       |
//! | 0.000001   | 1            |
//!
//! Amounts are signed: a creator's net gain can be a loss.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::fixed::BPS_ONE;

/// Decimal places carried by an [`Amount`]
pub const AMOUNT_DECIMALS: u32 = 6;

/// One currency unit in micro-units
pub const ONE_UNIT: i128 = 1_000_000;

/// One hundredth of a currency unit in micro-units
pub const ONE_CENT: i128 = 10_000;

/// Signed fixed-point currency amount
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i128);

impl Amount {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Smallest representable step
    pub const MICRO: Self = Self(1);

    /// Build from raw micro-units
    pub const fn from_micros(micros: i128) -> Self {
        Self(micros)
    }

    /// Build from whole currency units
    pub const fn from_units(units: i64) -> Self {
        Self(units as i128 * ONE_UNIT)
    }

    /// Build from hundredths of a unit
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents as i128 * ONE_CENT)
    }

    /// Quantise a float to the nearest micro-unit. Non-finite input maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self((value * ONE_UNIT as f64).round() as i128)
    }

    /// Raw micro-units
    pub const fn micros(self) -> i128 {
        self.0
    }

    /// Lossy conversion for transcendental math and display
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / ONE_UNIT as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Negative values become zero
    pub fn clamp_non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Round to 2 decimal places, half away from zero
    pub fn round_cents(self) -> Self {
        Self(div_round(self.0, ONE_CENT) * ONE_CENT)
    }

    /// Multiply by a basis-point rate (10_000 = 1.0), rounding to the nearest micro-unit
    pub fn mul_bps(self, bps: u64) -> Self {
        Self(div_round(self.0 * bps as i128, BPS_ONE as i128))
    }

    /// Multiply by `numerator / denominator`, rounding to the nearest micro-unit.
    ///
    /// A zero denominator yields zero.
    pub fn mul_ratio(self, numerator: i128, denominator: i128) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        let (n, d) = if denominator < 0 {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        Self(div_round(self.0 * n, d))
    }

    /// Multiply by a whole count
    pub fn times(self, count: u64) -> Self {
        Self(self.0 * count as i128)
    }

    /// Ratio `self / other` in basis points, `None` when `other` is not positive
    pub fn ratio_bps(self, other: Amount) -> Option<u64> {
        if other.0 <= 0 || self.0 < 0 {
            return None;
        }
        u64::try_from(div_round(self.0 * BPS_ONE as i128, other.0)).ok()
    }

    pub fn min(self, other: Amount) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(self, other: Amount) -> Self {
        Self(self.0.max(other.0))
    }
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round(n: i128, d: i128) -> i128 {
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / ONE_UNIT as u128;
        let frac = abs % ONE_UNIT as u128;

        if frac % ONE_CENT as u128 == 0 {
            write!(f, "{}{}.{:02}", sign, units, frac / ONE_CENT as u128)
        } else {
            let digits = format!("{:06}", frac);
            write!(f, "{}{}.{}", sign, units, digits.trim_end_matches('0'))
        }
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self)
    }
}

/// Amount parsing errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,

    #[error("invalid digit in amount: {0}")]
    InvalidDigit(String),

    #[error("amount has more than {max} decimal places: {input}")]
    TooPrecise { input: String, max: u32 },

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountParseError::InvalidDigit(trimmed.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountParseError::InvalidDigit(trimmed.to_string()));
        }
        if frac_part.len() > AMOUNT_DECIMALS as usize {
            return Err(AmountParseError::TooPrecise {
                input: trimmed.to_string(),
                max: AMOUNT_DECIMALS,
            });
        }

        let units: i128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| AmountParseError::OutOfRange(trimmed.to_string()))?
        };
        let frac: i128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_part, width = AMOUNT_DECIMALS as usize);
            padded
                .parse()
                .map_err(|_| AmountParseError::OutOfRange(trimmed.to_string()))?
        };

        let micros = units
            .checked_mul(ONE_UNIT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| AmountParseError::OutOfRange(trimmed.to_string()))?;

        Ok(Self(if negative { -micros } else { micros }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::from_units(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .map(Amount::from_units)
            .map_err(|_| E::custom(format!("amount out of range: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be finite"));
        }
        Ok(Amount::from_f64(v))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_units(10).to_string(), "10.00");
        assert_eq!(Amount::from_cents(1050).to_string(), "10.50");
        assert_eq!(Amount::from_micros(1_234_500).to_string(), "1.2345");
        assert_eq!(Amount::from_cents(-1020).to_string(), "-10.20");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("10".parse::<Amount>().unwrap(), Amount::from_units(10));
        assert_eq!("10.5".parse::<Amount>().unwrap(), Amount::from_cents(1050));
        assert_eq!("-0.01".parse::<Amount>().unwrap(), Amount::from_cents(-1));
        assert_eq!(".25".parse::<Amount>().unwrap(), Amount::from_cents(25));
        assert!(matches!(
            "1.1234567".parse::<Amount>(),
            Err(AmountParseError::TooPrecise { .. })
        ));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_))));
        assert!(matches!("".parse::<Amount>(), Err(AmountParseError::Empty)));
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(Amount::from_micros(1_005_000).round_cents(), Amount::from_cents(101));
        assert_eq!(Amount::from_micros(1_004_999).round_cents(), Amount::from_cents(100));
        assert_eq!(Amount::from_micros(-1_005_000).round_cents(), Amount::from_cents(-101));
    }

    #[test]
    fn test_mul_bps_and_ratio() {
        let hundred = Amount::from_units(100);
        assert_eq!(hundred.mul_bps(2_500), Amount::from_units(25));
        assert_eq!(hundred.mul_ratio(1, 3), Amount::from_micros(33_333_333));
        assert_eq!(hundred.mul_ratio(1, 0), Amount::ZERO);
        assert_eq!(hundred.ratio_bps(Amount::from_units(50)), Some(20_000));
        assert_eq!(hundred.ratio_bps(Amount::ZERO), None);
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let a: Amount = serde_json::from_str("\"12.34\"").unwrap();
        let b: Amount = serde_json::from_str("12.34").unwrap();
        let c: Amount = serde_json::from_str("12").unwrap();
        assert_eq!(a, Amount::from_cents(1234));
        assert_eq!(b, Amount::from_cents(1234));
        assert_eq!(c, Amount::from_units(12));
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"12.34\"");
    }

    proptest::proptest! {
        #[test]
        fn display_parses_back(micros in -1_000_000_000_000i128..1_000_000_000_000i128) {
            let amount = Amount::from_micros(micros);
            let parsed: Amount = amount.to_string().parse().unwrap();
            proptest::prop_assert_eq!(parsed, amount);
        }
    }
}
