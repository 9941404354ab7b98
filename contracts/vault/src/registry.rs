//! Asset registry: registered assets, target weights, strategies and the
//! withdrawal queue.
//!
//! Registration order is kept in `DataKey::Assets` and drives every loop in the
//! vault, so two identical vaults always plan the same swaps.

use soroban_sdk::{log, token, Address, Env, Vec};

use crate::errors::VaultError;
use crate::interfaces::StrategyClient;
use crate::math::PPM;
use crate::storage;
use crate::types::{AssetConfig, VaultConfig};

/// Registers `asset` with zero weight. Decimals are read from the token.
pub fn add_asset(env: &Env, asset: &Address) -> Result<u32, VaultError> {
    if *asset == env.current_contract_address() {
        return Err(VaultError::ZeroAddress);
    }
    if storage::read_asset(env, asset).is_some() {
        return Err(VaultError::DuplicatedValue);
    }

    let decimals = token::Client::new(env, asset).decimals();
    storage::write_asset(
        env,
        asset,
        &AssetConfig {
            weight: 0,
            decimals,
            float_ratio: None,
            strategy: None,
        },
    );
    let mut assets = storage::read_assets(env);
    assets.push_back(asset.clone());
    storage::write_assets(env, &assets);
    Ok(decimals)
}

/// Binds `strategy` to the asset it reports. Returns that asset.
pub fn add_strategy(
    env: &Env,
    config: &VaultConfig,
    strategy: &Address,
) -> Result<Address, VaultError> {
    if *strategy == env.current_contract_address() {
        return Err(VaultError::ZeroAddress);
    }

    let client = StrategyClient::new(env, strategy);
    let asset = client.asset();
    let mut asset_config = storage::require_asset(env, &asset)?;
    if client.dac() != config.dac {
        return Err(VaultError::StrategyDacConflict);
    }
    if storage::read_strategy_asset(env, strategy).is_some() || asset_config.strategy.is_some() {
        return Err(VaultError::DuplicatedValue);
    }

    asset_config.strategy = Some(strategy.clone());
    storage::write_asset(env, &asset, &asset_config);
    storage::write_strategy_asset(env, strategy, &asset);
    Ok(asset)
}

/// Replaces the weights of the listed assets. The resulting weights across
/// every registered asset must sum to exactly `PPM`.
pub fn update_weights(
    env: &Env,
    assets: &Vec<Address>,
    weights: &Vec<u32>,
) -> Result<(), VaultError> {
    if assets.len() != weights.len() {
        return Err(VaultError::PairConflict);
    }

    let mut seen: Vec<Address> = Vec::new(env);
    for (asset, weight) in assets.iter().zip(weights.iter()) {
        storage::require_asset(env, &asset)?;
        if weight > PPM {
            return Err(VaultError::OutOfRange);
        }
        if storage::contains(&seen, &asset) {
            return Err(VaultError::DuplicatedValue);
        }
        seen.push_back(asset);
    }

    let mut total: u64 = 0;
    for asset in storage::read_assets(env).iter() {
        let weight = match assets.first_index_of(&asset) {
            Some(index) => weights.get_unchecked(index),
            None => storage::require_asset(env, &asset)?.weight,
        };
        total += weight as u64;
    }
    if total != PPM as u64 {
        log!(env, "weights sum to {}", total);
        return Err(VaultError::OutOfRange);
    }

    for (asset, weight) in assets.iter().zip(weights.iter()) {
        let mut asset_config = storage::require_asset(env, &asset)?;
        asset_config.weight = weight;
        storage::write_asset(env, &asset, &asset_config);
    }
    Ok(())
}

pub fn update_withdrawal_queue(env: &Env, strategies: &Vec<Address>) -> Result<(), VaultError> {
    if strategies.len() > storage::read_assets(env).len() {
        return Err(VaultError::TooManyElements);
    }

    let mut queue: Vec<Address> = Vec::new(env);
    for strategy in strategies.iter() {
        if storage::read_strategy_asset(env, &strategy).is_none() {
            return Err(VaultError::NotFound);
        }
        if storage::contains(&queue, &strategy) {
            return Err(VaultError::DuplicatedValue);
        }
        queue.push_back(strategy);
    }
    storage::write_withdrawal_queue(env, &queue);
    Ok(())
}

/// Sets or clears the per-asset float ratio override.
pub fn update_asset_float_ratio(
    env: &Env,
    asset: &Address,
    float_ratio: Option<u32>,
) -> Result<Option<u32>, VaultError> {
    let mut asset_config = storage::require_asset(env, asset)?;
    if let Some(ratio) = float_ratio {
        if ratio > PPM {
            return Err(VaultError::OutOfRange);
        }
    }
    if asset_config.float_ratio == float_ratio {
        return Err(VaultError::DuplicatedValue);
    }

    let previous = asset_config.float_ratio;
    asset_config.float_ratio = float_ratio;
    storage::write_asset(env, asset, &asset_config);
    Ok(previous)
}

pub fn weight_total(env: &Env) -> Result<u64, VaultError> {
    let mut total: u64 = 0;
    for asset in storage::read_assets(env).iter() {
        total += storage::require_asset(env, &asset)?.weight as u64;
    }
    Ok(total)
}

/// Registered strategies in asset order.
pub fn strategies(env: &Env) -> Result<Vec<Address>, VaultError> {
    let mut strategies = Vec::new(env);
    for asset in storage::read_assets(env).iter() {
        if let Some(strategy) = storage::require_asset(env, &asset)?.strategy {
            strategies.push_back(strategy);
        }
    }
    Ok(strategies)
}
