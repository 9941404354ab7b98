//! Rebalance engine.
//!
//! One pass: snapshot, policy targets, swap legs (only when some asset is
//! outside the deviation threshold), then float-ratio enforcement for every
//! asset with a strategy.

use soroban_sdk::{contracttype, log, Env, Vec};

use crate::errors::VaultError;
use crate::holdings;
use crate::math::{apply_ppm, mul_div, value_to_amount, with_headroom, Rounding};
use crate::policy;
use crate::storage;
use crate::types::{AssetPosition, VaultConfig};

/// Value moved from one asset to another, by registry index.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapLeg {
    pub source: u32,
    pub sink: u32,
    pub value: i128,
}

/// Pairs surplus assets with deficit assets in registry order.
///
/// Both cursors only move forward, so the plan is fully determined by the
/// order of `current` and `targets`.
pub fn plan_swaps(env: &Env, current: &Vec<i128>, targets: &Vec<i128>) -> Vec<SwapLeg> {
    let mut excess: Vec<i128> = Vec::new(env);
    let mut deficit: Vec<i128> = Vec::new(env);
    for (value, target) in current.iter().zip(targets.iter()) {
        excess.push_back((value - target).max(0));
        deficit.push_back((target - value).max(0));
    }

    let mut legs = Vec::new(env);
    let count = excess.len();
    let (mut source, mut sink) = (0u32, 0u32);
    while source < count && sink < count {
        let available = excess.get_unchecked(source);
        if available == 0 {
            source += 1;
            continue;
        }
        let wanted = deficit.get_unchecked(sink);
        if wanted == 0 {
            sink += 1;
            continue;
        }

        let moved = available.min(wanted);
        legs.push_back(SwapLeg { source, sink, value: moved });
        excess.set(source, available - moved);
        deficit.set(sink, wanted - moved);
    }
    legs
}

/// Runs a full rebalance and returns the number of swaps executed.
pub fn run(env: &Env, config: &VaultConfig) -> Result<u32, VaultError> {
    let positions = holdings::snapshot(env, config)?;
    let portfolio_value = holdings::total_value(&positions)?;

    let mut swaps = 0;
    if portfolio_value > 0 {
        let targets = policy::target_values(env, config, &positions, portfolio_value)?;
        if policy::within_threshold(&positions, &targets, portfolio_value, config.deviation_threshold)? {
            log!(env, "weights within threshold, skipping swaps");
        } else {
            let mut current = Vec::new(env);
            for position in positions.iter() {
                current.push_back(position.value);
            }
            for leg in plan_swaps(env, &current, &targets).iter() {
                if execute_leg(env, config, &positions, &leg)? {
                    swaps += 1;
                }
            }
        }
    }

    enforce_float_ratios(env, config)?;
    Ok(swaps)
}

fn execute_leg(
    env: &Env,
    config: &VaultConfig,
    positions: &Vec<AssetPosition>,
    leg: &SwapLeg,
) -> Result<bool, VaultError> {
    let source = positions.get_unchecked(leg.source);
    let sink = positions.get_unchecked(leg.sink);

    let mut amount_out = value_to_amount(leg.value, sink.price, sink.decimals, Rounding::Floor)?;
    if amount_out == 0 {
        return Ok(false);
    }
    let fair_in = value_to_amount(leg.value, source.price, source.decimals, Rounding::Ceil)?;
    let bound = with_headroom(fair_in, config.swap_slippage)?;

    let source_config = storage::require_asset(env, &source.asset)?;
    let float = holdings::ensure_float(env, &source.asset, &source_config, bound);
    let max_in = bound.min(float);
    if max_in < bound {
        // the source came up short (strategy friction); shrink the leg to match
        amount_out = mul_div(amount_out, max_in, bound, Rounding::Floor)?;
        log!(env, "swap leg reduced to {} out", amount_out);
        if amount_out == 0 {
            return Ok(false);
        }
    }

    holdings::swap_exact_out(env, config, &source.asset, &sink.asset, amount_out, max_in)?;
    Ok(true)
}

/// Brings each asset's float to `balance * float_ratio`, deploying surplus to
/// its strategy and recalling shortfalls. Assets without a strategy stay fully
/// in float.
pub fn enforce_float_ratios(env: &Env, config: &VaultConfig) -> Result<(), VaultError> {
    for asset in storage::read_assets(env).iter() {
        let asset_config = storage::require_asset(env, &asset)?;
        let Some(strategy) = asset_config.strategy.clone() else {
            continue;
        };

        let float = holdings::float_balance(env, &asset);
        let invested = holdings::strategy_balance(env, &asset_config);
        let balance = float.checked_add(invested).ok_or(VaultError::MathOverflow)?;
        let ratio = asset_config.float_ratio.unwrap_or(config.float_ratio);
        let target_float = apply_ppm(balance, ratio)?;

        if float > target_float {
            holdings::deploy(env, &asset, &strategy, float - target_float);
        } else if float < target_float {
            holdings::recall(env, &asset, &strategy, target_float - float);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::vec;

    #[test]
    fn test_plan_moves_exact_excess() {
        let env = Env::default();
        let current = vec![&env, 700_i128, 100, 200];
        let targets = vec![&env, 400_i128, 300, 300];

        let legs = plan_swaps(&env, &current, &targets);
        assert_eq!(
            legs,
            vec![
                &env,
                SwapLeg { source: 0, sink: 1, value: 200 },
                SwapLeg { source: 0, sink: 2, value: 100 },
            ]
        );
    }

    #[test]
    fn test_plan_is_empty_when_balanced() {
        let env = Env::default();
        let current = vec![&env, 500_i128, 500];
        let legs = plan_swaps(&env, &current, &current);
        assert_eq!(legs.len(), 0);
    }

    #[test]
    fn test_plan_splits_across_sources_and_sinks() {
        let env = Env::default();
        // two sources feeding two sinks, in registry order
        let current = vec![&env, 0_i128, 600, 0, 400];
        let targets = vec![&env, 250_i128, 250, 250, 250];

        let legs = plan_swaps(&env, &current, &targets);
        assert_eq!(
            legs,
            vec![
                &env,
                SwapLeg { source: 1, sink: 0, value: 250 },
                SwapLeg { source: 1, sink: 2, value: 100 },
                SwapLeg { source: 3, sink: 2, value: 150 },
            ]
        );
    }

    #[test]
    fn test_plan_tolerates_rounding_remainder() {
        let env = Env::default();
        // floor rounding leaves the targets one unit short of the portfolio
        let current = vec![&env, 1_000_i128, 0, 0];
        let targets = vec![&env, 333_i128, 333, 333];

        let legs = plan_swaps(&env, &current, &targets);
        let moved: i128 = legs.iter().map(|leg| leg.value).sum();
        assert_eq!(moved, 666);
    }
}
