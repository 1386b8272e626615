//! # Provisional Share Curves
//!
//! Each beneficiary's share of the pool moves linearly with the realised
//! completion ratio `CR / N`.
//!
//! | Beneficiary | ratio 0 | ratio 1 |
//! |-------------|---------|---------|
//! | Top-3 pool  | 30%     | 40%     |
//! | Creator     | 35%     | 40%     |
//! | Platform    | 20%     | 12%     |
//! | Moderators  | 15%     | 8%      |
//!
//! The four values are renormalised so they always total 10 000 bps.

use serde::{Deserialize, Serialize};
use verdict_core::BPS_ONE;

/// Linear interpolation between `from` and `to`, with `progress_bps` clamped to `[0, BPS_ONE]`
pub fn interpolate_bps(from: u64, to: u64, progress_bps: u64) -> u64 {
    let progress = progress_bps.min(BPS_ONE) as i128;
    let from = from as i128;
    let to = to as i128;
    let value = from + (to - from) * progress / BPS_ONE as i128;
    value.max(0) as u64
}

/// A share that moves linearly with the completion ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCurve {
    /// Share at completion ratio 0 (basis points)
    pub at_zero_bps: u64,
    /// Share at completion ratio 1 (basis points)
    pub at_full_bps: u64,
}

impl ShareCurve {
    pub const fn new(at_zero_bps: u64, at_full_bps: u64) -> Self {
        Self {
            at_zero_bps,
            at_full_bps,
        }
    }

    pub fn at(&self, ratio_bps: u64) -> u64 {
        interpolate_bps(self.at_zero_bps, self.at_full_bps, ratio_bps)
    }
}

/// Curves for the four pool beneficiaries
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCurves {
    #[serde(default = "default_top3")]
    pub top3: ShareCurve,

    #[serde(default = "default_creator")]
    pub creator: ShareCurve,

    #[serde(default = "default_platform")]
    pub platform: ShareCurve,

    #[serde(default = "default_moderators")]
    pub moderators: ShareCurve,
}

fn default_top3() -> ShareCurve {
    ShareCurve::new(3_000, 4_000)
}

fn default_creator() -> ShareCurve {
    ShareCurve::new(3_500, 4_000)
}

fn default_platform() -> ShareCurve {
    ShareCurve::new(2_000, 1_200)
}

fn default_moderators() -> ShareCurve {
    ShareCurve::new(1_500, 800)
}

impl Default for ShareCurves {
    fn default() -> Self {
        Self {
            top3: default_top3(),
            creator: default_creator(),
            platform: default_platform(),
            moderators: default_moderators(),
        }
    }
}

impl ShareCurves {
    /// Renormalised shares at a completion ratio
    pub fn at(&self, ratio_bps: u64) -> ProvisionalShares {
        let raw = [
            self.top3.at(ratio_bps),
            self.creator.at(ratio_bps),
            self.platform.at(ratio_bps),
            self.moderators.at(ratio_bps),
        ];
        let sum: u64 = raw.iter().sum();
        if sum == 0 {
            // nothing configured, everything goes to the platform
            return ProvisionalShares {
                top3_bps: 0,
                creator_bps: 0,
                platform_bps: BPS_ONE,
                moderators_bps: 0,
            };
        }

        let top3_bps = raw[0] * BPS_ONE / sum;
        let creator_bps = raw[1] * BPS_ONE / sum;
        let moderators_bps = raw[3] * BPS_ONE / sum;
        let platform_bps = BPS_ONE - top3_bps - creator_bps - moderators_bps;

        ProvisionalShares {
            top3_bps,
            creator_bps,
            platform_bps,
            moderators_bps,
        }
    }
}

/// Shares of the pool before floors and caps (basis points, total 10 000)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionalShares {
    pub top3_bps: u64,
    pub creator_bps: u64,
    pub platform_bps: u64,
    pub moderators_bps: u64,
}

impl ProvisionalShares {
    pub fn total_bps(&self) -> u64 {
        self.top3_bps + self.creator_bps + self.platform_bps + self.moderators_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate_bps(3_000, 4_000, 0), 3_000);
        assert_eq!(interpolate_bps(3_000, 4_000, 5_000), 3_500);
        assert_eq!(interpolate_bps(3_000, 4_000, 10_000), 4_000);
        assert_eq!(interpolate_bps(2_000, 1_200, 5_000), 1_600);
        // progress past 1.0 is clamped
        assert_eq!(interpolate_bps(2_000, 1_200, 25_000), 1_200);
    }

    #[test]
    fn test_default_curve_endpoints() {
        let curves = ShareCurves::default();

        let empty = curves.at(0);
        assert_eq!(empty.top3_bps, 3_000);
        assert_eq!(empty.creator_bps, 3_500);
        assert_eq!(empty.platform_bps, 2_000);
        assert_eq!(empty.moderators_bps, 1_500);

        let full = curves.at(BPS_ONE);
        assert_eq!(full.top3_bps, 4_000);
        assert_eq!(full.creator_bps, 4_000);
        assert_eq!(full.platform_bps, 1_200);
        assert_eq!(full.moderators_bps, 800);
    }

    #[test]
    fn test_shares_shift_toward_performers() {
        let curves = ShareCurves::default();
        let low = curves.at(2_000);
        let high = curves.at(8_000);
        assert!(high.top3_bps > low.top3_bps);
        assert!(high.creator_bps > low.creator_bps);
        assert!(high.platform_bps < low.platform_bps);
        assert!(high.moderators_bps < low.moderators_bps);
    }

    #[test]
    fn test_renormalisation() {
        let curves = ShareCurves {
            top3: ShareCurve::new(1_000, 1_000),
            creator: ShareCurve::new(1_000, 1_000),
            platform: ShareCurve::new(1_000, 1_000),
            moderators: ShareCurve::new(0, 0),
        };
        let shares = curves.at(5_000);
        assert_eq!(shares.total_bps(), BPS_ONE);
        assert_eq!(shares.top3_bps, 3_333);
        assert_eq!(shares.platform_bps, 3_334);

        for ratio in (0..=BPS_ONE).step_by(250) {
            assert_eq!(ShareCurves::default().at(ratio).total_bps(), BPS_ONE);
        }
    }
}
