//! Fixed-point weights and scores

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::error::VerdictError;

/// Basis points in 1.0
pub const BPS_ONE: u64 = 10_000;

/// One whole weight in fixed-point units (18 decimals)
pub const ONE_WEIGHT: u128 = 1_000_000_000_000_000_000;

/// Unsigned 18-decimal fixed-point weight
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(u128);

impl Weight {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE_WEIGHT);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Quantise a float. Negative and non-finite values become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::ZERO;
        }
        Self((value * ONE_WEIGHT as f64).round() as u128)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / ONE_WEIGHT as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Fixed-point product, truncating
    pub fn mul(self, other: Weight) -> Weight {
        Weight(self.0 * other.0 / ONE_WEIGHT)
    }

    /// `numerator / denominator` as a weight in `[0, 1]` when `numerator <= denominator`.
    ///
    /// Both operands are shifted down together until the scaled numerator
    /// fits in `u128`, so very large inputs lose precision instead of overflowing.
    pub fn fraction(numerator: u128, denominator: u128) -> Weight {
        let (mut numerator, mut denominator) = (numerator, denominator);
        while numerator > u128::MAX / ONE_WEIGHT {
            numerator >>= 1;
            denominator >>= 1;
        }
        if denominator == 0 {
            return Weight::ZERO;
        }
        Weight(numerator * ONE_WEIGHT / denominator)
    }

    /// Multiply by a basis-point factor
    pub fn mul_bps(self, bps: u64) -> Weight {
        Weight(self.0 * bps as u128 / BPS_ONE as u128)
    }

    pub fn saturating_sub(self, other: Weight) -> Weight {
        Weight(self.0.saturating_sub(other.0))
    }

    pub fn min(self, other: Weight) -> Weight {
        Weight(self.0.min(other.0))
    }

    pub fn max(self, other: Weight) -> Weight {
        Weight(self.0.max(other.0))
    }

    /// `self / other` in basis points, `None` when `other` is zero
    pub fn ratio_bps(self, other: Weight) -> Option<u64> {
        if other.0 == 0 {
            return None;
        }
        let bps = self.0.checked_mul(BPS_ONE as u128)? / other.0;
        Some(u64::try_from(bps).unwrap_or(u64::MAX))
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Weight {
        iter.fold(Weight::ZERO, |acc, w| acc + w)
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weight({:.6})", self.to_f64())
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

/// A 0-100 score carried in hundredths (`0..=10_000`)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(u32);

impl Score {
    /// Highest score in hundredths
    pub const MAX_HUNDREDTHS: u32 = 10_000;

    pub const ZERO: Self = Self(0);
    pub const MIDPOINT: Self = Self(5_000);
    pub const MAX: Self = Self(Self::MAX_HUNDREDTHS);

    /// Build from hundredths, rejecting anything above 100.00
    pub fn from_hundredths(hundredths: u32) -> Result<Self, VerdictError> {
        if hundredths > Self::MAX_HUNDREDTHS {
            return Err(VerdictError::InvalidScoreRange {
                field: "score",
                value: hundredths as f64 / 100.0,
            });
        }
        Ok(Self(hundredths))
    }

    /// Build from a decimal score, rounded to 2 places
    pub fn from_f64(value: f64) -> Result<Self, VerdictError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(VerdictError::InvalidScoreRange {
                field: "score",
                value,
            });
        }
        Ok(Self((value * 100.0).round() as u32))
    }

    /// Clamp hundredths into range
    pub(crate) fn saturating(hundredths: u64) -> Self {
        Self(hundredths.min(Self::MAX_HUNDREDTHS as u64) as u32)
    }

    /// Share `part / whole` on the 0-100 scale, half-up. `None` when `whole` is zero.
    pub fn share_of(part: Weight, whole: Weight) -> Option<Self> {
        if whole.is_zero() {
            return None;
        }
        let scaled = part.raw().checked_mul(Self::MAX_HUNDREDTHS as u128 * 2)? / whole.raw();
        Some(Self::saturating(((scaled + 1) / 2) as u64))
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Blend two scores with basis-point weights summing to `BPS_ONE`, half-up
    pub fn blend(a: Score, a_bps: u64, b: Score, b_bps: u64) -> Score {
        let total = a.0 as u64 * a_bps + b.0 as u64 * b_bps;
        Self::saturating((total + BPS_ONE / 2) / BPS_ONE)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

struct ScoreVisitor;

impl<'de> Visitor<'de> for ScoreVisitor {
    type Value = Score;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a score between 0 and 100")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
        Score::from_f64(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
        self.visit_f64(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
        self.visit_f64(v as f64)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScoreVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_arithmetic() {
        let half = Weight::fraction(1, 2);
        assert_eq!(half.raw(), ONE_WEIGHT / 2);
        assert_eq!(half.mul(half).raw(), ONE_WEIGHT / 4);
        assert_eq!(Weight::ONE.mul_bps(20_000).raw(), 2 * ONE_WEIGHT);
        assert_eq!(Weight::from_f64(-1.0), Weight::ZERO);
        assert_eq!(Weight::from_f64(f64::NAN), Weight::ZERO);
    }

    #[test]
    fn test_fraction_of_huge_operands() {
        let near_max = u128::MAX - 7;
        assert_eq!(Weight::fraction(near_max, near_max), Weight::ONE);

        let half = Weight::fraction(u128::MAX / 2, u128::MAX);
        assert!((half.to_f64() - 0.5).abs() < 1e-12);
        assert!(Weight::fraction(u128::MAX / 3, u128::MAX) < Weight::ONE);
    }

    #[test]
    fn test_weight_ratio() {
        let two = Weight::from_raw(2 * ONE_WEIGHT);
        assert_eq!(two.ratio_bps(Weight::ONE), Some(20_000));
        assert_eq!(two.ratio_bps(Weight::ZERO), None);
    }

    #[test]
    fn test_score_range() {
        assert!(Score::from_f64(100.0).is_ok());
        assert!(Score::from_f64(100.01).is_err());
        assert!(Score::from_f64(-0.5).is_err());
        assert!(Score::from_hundredths(10_001).is_err());
        assert_eq!(Score::from_f64(78.4).unwrap().hundredths(), 7_840);
    }

    #[test]
    fn test_score_blend_rounds_half_up() {
        let community = Score::from_f64(78.4).unwrap();
        let arbiter = Score::from_f64(91.0).unwrap();
        let blended = Score::blend(community, 4_900, arbiter, 5_100);
        assert_eq!(blended.hundredths(), 8_483);
        assert_eq!(blended.to_string(), "84.83");
    }

    #[test]
    fn test_share_of() {
        let accept = Weight::from_raw(3 * ONE_WEIGHT);
        let total = Weight::from_raw(4 * ONE_WEIGHT);
        assert_eq!(Score::share_of(accept, total).unwrap().hundredths(), 7_500);
        assert_eq!(Score::share_of(accept, Weight::ZERO), None);

        let third = Score::share_of(Weight::ONE, Weight::from_raw(3 * ONE_WEIGHT)).unwrap();
        assert_eq!(third.hundredths(), 3_333);
    }
}
