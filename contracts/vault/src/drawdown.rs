//! Withdrawal draw-down.
//!
//! Gathers `amount` of one asset into float for a payout: the asset's own
//! float first, then its strategy, then every other asset in withdrawal-queue
//! order, swapped into the requested asset. The queue is never consulted by
//! rebalancing.

use soroban_sdk::{log, Address, Env};

use crate::errors::VaultError;
use crate::holdings;
use crate::math::{amount_to_value, mul_div, value_to_amount, with_headroom, Rounding, PPM};
use crate::storage;
use crate::types::VaultConfig;

/// Returns the amount of `asset` available for the payout, at most `amount`.
///
/// A shortfall is accepted only while its value stays within the configured
/// dust tolerance.
pub fn gather(
    env: &Env,
    config: &VaultConfig,
    asset: &Address,
    amount: i128,
) -> Result<i128, VaultError> {
    let asset_config = storage::require_asset(env, asset)?;
    let price = holdings::price(env, config, asset)?;
    let mut float = holdings::ensure_float(env, asset, &asset_config, amount);

    if float < amount {
        for strategy in storage::read_withdrawal_queue(env).iter() {
            let remaining = amount - float;
            if remaining <= 0 {
                break;
            }
            let Some(source) = storage::read_strategy_asset(env, &strategy) else {
                continue;
            };
            if source == *asset {
                continue;
            }
            draw_from(env, config, &source, asset, price, asset_config.decimals, remaining)?;
            float = holdings::float_balance(env, asset);
        }
    }

    if float >= amount {
        return Ok(amount);
    }

    let shortfall = amount_to_value(amount - float, price, asset_config.decimals, Rounding::Ceil)?;
    if shortfall > config.dust_tolerance {
        log!(env, "draw-down short by {} value", shortfall);
        return Err(VaultError::InsufficientLiquidity);
    }
    log!(env, "draw-down accepted dust shortfall {}", shortfall);
    Ok(float)
}

/// Swaps as much of `source` as needed (or available) into `remaining` of `target`.
fn draw_from(
    env: &Env,
    config: &VaultConfig,
    source: &Address,
    target: &Address,
    price_out: i128,
    decimals_out: u32,
    remaining: i128,
) -> Result<(), VaultError> {
    let source_config = storage::require_asset(env, source)?;
    let price_in = holdings::price(env, config, source)?;
    let available = holdings::float_balance(env, source)
        .checked_add(holdings::strategy_balance(env, &source_config))
        .ok_or(VaultError::MathOverflow)?;
    if available <= 0 {
        return Ok(());
    }

    let value_needed = amount_to_value(remaining, price_out, decimals_out, Rounding::Ceil)?;
    let fair_in = value_to_amount(value_needed, price_in, source_config.decimals, Rounding::Ceil)?;
    let bound = with_headroom(fair_in, config.swap_slippage)?;

    let (amount_out, wanted_in) = if available >= bound {
        (remaining, bound)
    } else {
        // partial: everything this source holds, less slippage headroom
        let value_in = amount_to_value(available, price_in, source_config.decimals, Rounding::Floor)?;
        let net_value = mul_div(
            value_in,
            (PPM - config.swap_slippage) as i128,
            PPM as i128,
            Rounding::Floor,
        )?;
        let out = value_to_amount(net_value, price_out, decimals_out, Rounding::Floor)?;
        (out.min(remaining), available)
    };
    if amount_out <= 0 {
        return Ok(());
    }

    let float = holdings::ensure_float(env, source, &source_config, wanted_in);
    let max_in = wanted_in.min(float);
    if max_in <= 0 {
        return Ok(());
    }
    let amount_out = if max_in < wanted_in {
        mul_div(amount_out, max_in, wanted_in, Rounding::Floor)?
    } else {
        amount_out
    };
    if amount_out <= 0 {
        return Ok(());
    }

    holdings::swap_exact_out(env, config, source, target, amount_out, max_in)?;
    Ok(())
}
