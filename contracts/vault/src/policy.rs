//! Target allocation policies.
//!
//! A policy turns a portfolio snapshot into one target value per asset, in
//! registry order. Everything downstream of the targets (swap planning and
//! float-ratio enforcement) is shared by all policies.

use soroban_sdk::{Address, Env, Vec};

use crate::errors::VaultError;
use crate::math::{deviation_ppm, mul_div, PPM, Rounding};
use crate::types::{AssetPosition, CppiParams, RebalancePolicy, VaultConfig};

pub trait TargetPolicy {
    fn target_values(
        &self,
        env: &Env,
        positions: &Vec<AssetPosition>,
        portfolio_value: i128,
    ) -> Result<Vec<i128>, VaultError>;
}

/// Fixed weights over the whole portfolio.
pub struct WeightedTargets;

impl TargetPolicy for WeightedTargets {
    fn target_values(
        &self,
        env: &Env,
        positions: &Vec<AssetPosition>,
        portfolio_value: i128,
    ) -> Result<Vec<i128>, VaultError> {
        let mut targets = Vec::new(env);
        for position in positions.iter() {
            targets.push_back(mul_div(
                portfolio_value,
                position.weight as i128,
                PPM as i128,
                Rounding::Floor,
            )?);
        }
        Ok(targets)
    }
}

/// Constant-proportion portfolio insurance.
///
/// The safe asset holds `pv - at_risk`; the remaining assets split `at_risk`
/// by their weights renormalized over the non-safe total.
pub struct CppiTargets {
    pub params: CppiParams,
    pub safe_asset: Address,
}

/// Sizes of the two CPPI buckets for a given portfolio value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CppiSplit {
    pub cushion: i128,
    pub at_risk: i128,
    pub safe: i128,
}

impl CppiTargets {
    pub fn split(&self, portfolio_value: i128) -> Result<CppiSplit, VaultError> {
        let cushion = mul_div(
            portfolio_value,
            (PPM - self.params.floor_ratio) as i128,
            PPM as i128,
            Rounding::Floor,
        )?;
        let at_risk = cushion
            .checked_mul(self.params.multiplier as i128)
            .ok_or(VaultError::MathOverflow)?
            .min(portfolio_value);

        Ok(CppiSplit {
            cushion,
            at_risk,
            safe: portfolio_value - at_risk,
        })
    }
}

impl TargetPolicy for CppiTargets {
    fn target_values(
        &self,
        env: &Env,
        positions: &Vec<AssetPosition>,
        portfolio_value: i128,
    ) -> Result<Vec<i128>, VaultError> {
        let split = self.split(portfolio_value)?;

        let mut risky_weight: i128 = 0;
        for position in positions.iter() {
            if position.asset != self.safe_asset {
                risky_weight += position.weight as i128;
            }
        }

        // nothing to put at risk: the safe asset takes the whole portfolio
        let safe_target = if risky_weight == 0 {
            portfolio_value
        } else {
            split.safe
        };

        let mut targets = Vec::new(env);
        for position in positions.iter() {
            let target = if position.asset == self.safe_asset {
                safe_target
            } else if risky_weight == 0 {
                0
            } else {
                mul_div(
                    split.at_risk,
                    position.weight as i128,
                    risky_weight,
                    Rounding::Floor,
                )?
            };
            targets.push_back(target);
        }
        Ok(targets)
    }
}

/// Target values for the policy configured on the vault.
pub fn target_values(
    env: &Env,
    config: &VaultConfig,
    positions: &Vec<AssetPosition>,
    portfolio_value: i128,
) -> Result<Vec<i128>, VaultError> {
    match config.policy {
        RebalancePolicy::Weighted => WeightedTargets.target_values(env, positions, portfolio_value),
        RebalancePolicy::Cppi(params) => CppiTargets {
            params,
            safe_asset: config.underlying.clone(),
        }
        .target_values(env, positions, portfolio_value),
    }
}

pub fn validate_cppi(params: &CppiParams) -> Result<(), VaultError> {
    if params.floor_ratio == 0 || params.floor_ratio >= PPM || params.multiplier < 1 {
        return Err(VaultError::OutOfRange);
    }
    Ok(())
}

/// True when every asset sits within `threshold` ppm of its target.
pub fn within_threshold(
    positions: &Vec<AssetPosition>,
    targets: &Vec<i128>,
    portfolio_value: i128,
    threshold: u32,
) -> Result<bool, VaultError> {
    for (position, target) in positions.iter().zip(targets.iter()) {
        if deviation_ppm(position.value, target, portfolio_value)? > threshold as i128 {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn position(asset: &Address, weight: u32, value: i128) -> AssetPosition {
        AssetPosition {
            asset: asset.clone(),
            weight,
            price: 10_000_000,
            decimals: 7,
            float_balance: value,
            strategy_balance: 0,
            value,
        }
    }

    fn book(env: &Env, entries: &[(u32, i128)]) -> (Vec<Address>, Vec<AssetPosition>) {
        let mut assets = Vec::new(env);
        let mut positions = Vec::new(env);
        for (weight, value) in entries {
            let asset = Address::generate(env);
            positions.push_back(position(&asset, *weight, *value));
            assets.push_back(asset);
        }
        (assets, positions)
    }

    #[test]
    fn test_weighted_targets_follow_weights() {
        let env = Env::default();
        let (_, positions) = book(&env, &[(40_000, 1_000), (60_000, 0)]);

        let targets = WeightedTargets.target_values(&env, &positions, 1_000).unwrap();
        assert_eq!(targets.get(0), Some(400));
        assert_eq!(targets.get(1), Some(600));
    }

    #[test]
    fn test_cppi_split() {
        let env = Env::default();
        let policy = CppiTargets {
            params: CppiParams { floor_ratio: 80_000, multiplier: 3 },
            safe_asset: Address::generate(&env),
        };

        // cushion 200, at risk 600, safe 400
        let split = policy.split(1_000).unwrap();
        assert_eq!(split, CppiSplit { cushion: 200, at_risk: 600, safe: 400 });

        // a large multiplier is capped at the whole portfolio
        let aggressive = CppiTargets {
            params: CppiParams { floor_ratio: 50_000, multiplier: 5 },
            safe_asset: Address::generate(&env),
        };
        let split = aggressive.split(1_000).unwrap();
        assert_eq!(split.at_risk, 1_000);
        assert_eq!(split.safe, 0);
    }

    #[test]
    fn test_cppi_renormalizes_risky_weights() {
        let env = Env::default();
        let (assets, positions) = book(&env, &[(50_000, 1_000), (25_000, 0), (25_000, 0)]);
        let policy = CppiTargets {
            params: CppiParams { floor_ratio: 80_000, multiplier: 3 },
            safe_asset: assets.get(0).unwrap(),
        };

        let targets = policy.target_values(&env, &positions, 1_000).unwrap();
        // safe keeps 400, the two risky assets split 600 evenly
        assert_eq!(targets.get(0), Some(400));
        assert_eq!(targets.get(1), Some(300));
        assert_eq!(targets.get(2), Some(300));
    }

    #[test]
    fn test_cppi_without_risky_weight_stays_safe() {
        let env = Env::default();
        let (assets, positions) = book(&env, &[(100_000, 500), (0, 500)]);
        let policy = CppiTargets {
            params: CppiParams { floor_ratio: 80_000, multiplier: 3 },
            safe_asset: assets.get(0).unwrap(),
        };

        let targets = policy.target_values(&env, &positions, 1_000).unwrap();
        assert_eq!(targets.get(0), Some(1_000));
        assert_eq!(targets.get(1), Some(0));
    }

    #[test]
    fn test_threshold_check() {
        let env = Env::default();
        let (_, positions) = book(&env, &[(50_000, 520), (50_000, 480)]);
        let targets = WeightedTargets.target_values(&env, &positions, 1_000).unwrap();

        assert!(within_threshold(&positions, &targets, 1_000, 2_000).unwrap());
        assert!(!within_threshold(&positions, &targets, 1_000, 1_999).unwrap());
    }

    #[test]
    fn test_validate_cppi_bounds() {
        assert_eq!(
            validate_cppi(&CppiParams { floor_ratio: 0, multiplier: 2 }),
            Err(VaultError::OutOfRange)
        );
        assert_eq!(
            validate_cppi(&CppiParams { floor_ratio: PPM, multiplier: 2 }),
            Err(VaultError::OutOfRange)
        );
        assert_eq!(
            validate_cppi(&CppiParams { floor_ratio: 90_000, multiplier: 0 }),
            Err(VaultError::OutOfRange)
        );
        assert!(validate_cppi(&CppiParams { floor_ratio: 90_000, multiplier: 1 }).is_ok());
    }
}
