//! Moderator pool split
//!
//! Divides a plan's moderator amount across moderators in proportion to
//! their recorded weight, at cent granularity. The largest-remainder method
//! hands out the leftover cents so the lines sum to the pool exactly.

use serde::{Deserialize, Serialize};
use verdict_core::{Amount, ParticipantId, Result, VerdictError, Weight, ONE_CENT};

const WEIGHT_SUM_LIMIT: u128 = 1 << 60;

/// A moderator's claim on the pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorStake {
    pub moderator: ParticipantId,
    pub weight: Weight,
}

/// One moderator's payout line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorPayout {
    pub moderator: ParticipantId,
    pub amount: Amount,
}

/// Split `pool` across `stakes` by weight. Zero total weight splits evenly.
pub fn split_moderator_pool(pool: Amount, stakes: &[ModeratorStake]) -> Result<Vec<ModeratorPayout>> {
    if pool.is_negative() {
        return Err(VerdictError::InvalidSettlementInput {
            field: "moderator_pool",
            reason: format!("negative pool {}", pool),
        });
    }
    if stakes.is_empty() {
        return Ok(Vec::new());
    }

    // shed low-order bits until remainder products fit in u128
    let mut weights: Vec<u128> = stakes.iter().map(|s| s.weight.raw()).collect();
    while weights.iter().fold(0u128, |acc, w| acc.saturating_add(*w)) >= WEIGHT_SUM_LIMIT {
        for weight in weights.iter_mut() {
            *weight >>= 4;
        }
    }
    if weights.iter().all(|w| *w == 0) {
        weights = vec![1; stakes.len()];
    }
    let denominator: u128 = weights.iter().sum();

    let cents = (pool.micros() / ONE_CENT) as u128;
    let sub_cent = pool.micros() % ONE_CENT;

    let mut allocated: Vec<u128> = Vec::with_capacity(stakes.len());
    let mut remainders: Vec<(u128, usize)> = Vec::with_capacity(stakes.len());
    for (index, weight) in weights.iter().enumerate() {
        // divide before multiplying so huge weights cannot overflow
        let whole = cents / denominator * weight
            + (cents % denominator) * weight / denominator;
        let remainder = (cents % denominator) * weight % denominator;
        allocated.push(whole);
        remainders.push((remainder, index));
    }

    let leftover = cents - allocated.iter().sum::<u128>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for &(_, index) in remainders.iter().take(leftover as usize) {
        allocated[index] += 1;
    }

    let first = remainders.first().map(|&(_, index)| index).unwrap_or(0);

    Ok(stakes
        .iter()
        .zip(allocated)
        .enumerate()
        .map(|(index, (stake, cents))| {
            let mut micros = cents as i128 * ONE_CENT;
            if index == first {
                micros += sub_cent;
            }
            ModeratorPayout {
                moderator: stake.moderator.clone(),
                amount: Amount::from_micros(micros),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ONE_WEIGHT;

    fn stake(id: &str, weight: u128) -> ModeratorStake {
        ModeratorStake {
            moderator: ParticipantId::new(id),
            weight: Weight::from_raw(weight * ONE_WEIGHT),
        }
    }

    fn total(payouts: &[ModeratorPayout]) -> Amount {
        payouts.iter().map(|p| p.amount).sum()
    }

    #[test]
    fn test_proportional_split() {
        let payouts = split_moderator_pool(
            Amount::from_units(100),
            &[stake("a", 3), stake("b", 1)],
        )
        .unwrap();
        assert_eq!(payouts[0].amount, Amount::from_units(75));
        assert_eq!(payouts[1].amount, Amount::from_units(25));
    }

    #[test]
    fn test_largest_remainder_sums_exactly() {
        let stakes = [stake("a", 1), stake("b", 1), stake("c", 1)];
        let payouts = split_moderator_pool(Amount::from_units(10), &stakes).unwrap();
        assert_eq!(total(&payouts), Amount::from_units(10));
        assert_eq!(payouts[0].amount, Amount::from_cents(334));
        assert_eq!(payouts[1].amount, Amount::from_cents(333));
        assert_eq!(payouts[2].amount, Amount::from_cents(333));
    }

    #[test]
    fn test_zero_weight_splits_evenly() {
        let payouts = split_moderator_pool(
            Amount::from_units(9),
            &[stake("a", 0), stake("b", 0), stake("c", 0)],
        )
        .unwrap();
        assert!(payouts.iter().all(|p| p.amount == Amount::from_units(3)));
    }

    #[test]
    fn test_sub_cent_pool_is_preserved() {
        let pool = Amount::from_micros(1_000_007);
        let payouts = split_moderator_pool(pool, &[stake("a", 1), stake("b", 2)]).unwrap();
        assert_eq!(total(&payouts), pool);
    }

    #[test]
    fn test_edge_cases() {
        assert!(split_moderator_pool(Amount::from_units(5), &[]).unwrap().is_empty());
        assert!(split_moderator_pool(Amount::from_units(-5), &[stake("a", 1)]).is_err());
    }
}
