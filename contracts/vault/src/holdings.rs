//! Vault holdings: balances, valuation, and the calls that move assets between
//! float, strategies and the swap adapter.
//!
//! Balances are always read back from the token and strategy contracts after a
//! mutating call; nothing here trusts a collaborator's reported amounts.

use soroban_sdk::{log, token, Address, Env, Vec};

use crate::errors::VaultError;
use crate::interfaces::{PriceOracleClient, StrategyClient, SwapAdapterClient};
use crate::math::{amount_to_value, Rounding};
use crate::storage;
use crate::types::{AssetConfig, AssetPosition, VaultConfig};

/// Tokens of `asset` held directly by the vault.
pub fn float_balance(env: &Env, asset: &Address) -> i128 {
    token::Client::new(env, asset).balance(&env.current_contract_address())
}

pub fn strategy_balance(env: &Env, asset_config: &AssetConfig) -> i128 {
    match &asset_config.strategy {
        Some(strategy) => StrategyClient::new(env, strategy).total_assets(),
        None => 0,
    }
}

pub fn price(env: &Env, config: &VaultConfig, asset: &Address) -> Result<i128, VaultError> {
    let price = PriceOracleClient::new(env, &config.price_oracle).price(asset);
    if price <= 0 {
        return Err(VaultError::InvalidPrice);
    }
    Ok(price)
}

pub fn position(
    env: &Env,
    config: &VaultConfig,
    asset: &Address,
) -> Result<AssetPosition, VaultError> {
    let asset_config = storage::require_asset(env, asset)?;
    let price = price(env, config, asset)?;
    let float_balance = float_balance(env, asset);
    let strategy_balance = strategy_balance(env, &asset_config);
    let balance = float_balance
        .checked_add(strategy_balance)
        .ok_or(VaultError::MathOverflow)?;

    Ok(AssetPosition {
        asset: asset.clone(),
        weight: asset_config.weight,
        price,
        decimals: asset_config.decimals,
        float_balance,
        strategy_balance,
        value: amount_to_value(balance, price, asset_config.decimals, Rounding::Floor)?,
    })
}

/// Positions of every registered asset, in registry order.
pub fn snapshot(env: &Env, config: &VaultConfig) -> Result<Vec<AssetPosition>, VaultError> {
    let mut positions = Vec::new(env);
    for asset in storage::read_assets(env).iter() {
        positions.push_back(position(env, config, &asset)?);
    }
    Ok(positions)
}

pub fn total_value(positions: &Vec<AssetPosition>) -> Result<i128, VaultError> {
    let mut total: i128 = 0;
    for position in positions.iter() {
        total = total
            .checked_add(position.value)
            .ok_or(VaultError::MathOverflow)?;
    }
    Ok(total)
}

pub fn portfolio_value(env: &Env, config: &VaultConfig) -> Result<i128, VaultError> {
    total_value(&snapshot(env, config)?)
}

/// Moves `amount` of float into `strategy`.
pub fn deploy(env: &Env, asset: &Address, strategy: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    token::Client::new(env, asset).transfer(&env.current_contract_address(), strategy, &amount);
    StrategyClient::new(env, strategy).deposit(&amount);
}

/// Pulls up to `amount` back from `strategy` and returns the float actually gained.
pub fn recall(env: &Env, asset: &Address, strategy: &Address, amount: i128) -> i128 {
    let client = StrategyClient::new(env, strategy);
    let available = client.total_assets();
    let request = amount.min(available);
    if request <= 0 {
        return 0;
    }

    let before = float_balance(env, asset);
    client.withdraw(&request);
    let gained = float_balance(env, asset) - before;
    if gained < request {
        log!(env, "strategy returned {} of {} requested", gained, request);
    }
    gained
}

/// Tops up the float of `asset` to at least `needed`, drawing on its strategy.
pub fn ensure_float(
    env: &Env,
    asset: &Address,
    asset_config: &AssetConfig,
    needed: i128,
) -> i128 {
    let float = float_balance(env, asset);
    if float >= needed {
        return float;
    }
    if let Some(strategy) = &asset_config.strategy {
        recall(env, asset, strategy, needed - float);
    }
    float_balance(env, asset)
}

/// Converts at most `max_amount_in` of `asset_in` into exactly `amount_out` of
/// `asset_out` through the swap adapter. Returns the input spent.
pub fn swap_exact_out(
    env: &Env,
    config: &VaultConfig,
    asset_in: &Address,
    asset_out: &Address,
    amount_out: i128,
    max_amount_in: i128,
) -> Result<i128, VaultError> {
    let vault = env.current_contract_address();
    let token_in = token::Client::new(env, asset_in);
    let token_out = token::Client::new(env, asset_out);

    let in_before = token_in.balance(&vault);
    let out_before = token_out.balance(&vault);

    token_in.transfer(&vault, &config.swap_adapter, &max_amount_in);
    SwapAdapterClient::new(env, &config.swap_adapter).swap_exact_out(
        asset_in,
        asset_out,
        &amount_out,
        &max_amount_in,
        &vault,
    );

    let spent = in_before - token_in.balance(&vault);
    let received = token_out.balance(&vault) - out_before;
    if spent > max_amount_in || received < amount_out {
        return Err(VaultError::SlippageExceeded);
    }
    Ok(spent)
}
