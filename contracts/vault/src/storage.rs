//! Storage layout.
//!
//! Instance storage holds the configuration, registry and share supply, which
//! every operation reads. Persistent storage holds per-holder share balances and
//! allowances.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::errors::VaultError;
use crate::types::{AllowanceKey, AssetConfig, ProductStatus, VaultConfig};

// ~1 day and ~30 days at 5s ledgers
pub(crate) const TTL_THRESHOLD: u32 = 17_280;
pub(crate) const TTL_EXTEND_TO: u32 = 518_400;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// `VaultConfig`
    Config,
    /// `ProductStatus`
    Status,
    /// Registered assets in iteration order
    Assets,
    /// `AssetConfig` for one asset
    Asset(Address),
    /// Asset a strategy is bound to
    StrategyAsset(Address),
    /// Strategies consulted by withdrawal draw-down, in order
    WithdrawalQueue,
    TotalShares,
    Shares(Address),
    Allowance(AllowanceKey),
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn read_config(env: &Env) -> Result<VaultConfig, VaultError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(VaultError::NotInitialized)
}

pub fn write_config(env: &Env, config: &VaultConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_status(env: &Env) -> ProductStatus {
    env.storage()
        .instance()
        .get(&DataKey::Status)
        .unwrap_or(ProductStatus::Inactive)
}

pub fn write_status(env: &Env, status: ProductStatus) {
    env.storage().instance().set(&DataKey::Status, &status);
}

pub fn read_assets(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Assets)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn write_assets(env: &Env, assets: &Vec<Address>) {
    env.storage().instance().set(&DataKey::Assets, assets);
}

pub fn read_asset(env: &Env, asset: &Address) -> Option<AssetConfig> {
    env.storage()
        .instance()
        .get(&DataKey::Asset(asset.clone()))
}

pub fn require_asset(env: &Env, asset: &Address) -> Result<AssetConfig, VaultError> {
    read_asset(env, asset).ok_or(VaultError::NotFound)
}

pub fn write_asset(env: &Env, asset: &Address, config: &AssetConfig) {
    env.storage()
        .instance()
        .set(&DataKey::Asset(asset.clone()), config);
}

pub fn read_strategy_asset(env: &Env, strategy: &Address) -> Option<Address> {
    env.storage()
        .instance()
        .get(&DataKey::StrategyAsset(strategy.clone()))
}

pub fn write_strategy_asset(env: &Env, strategy: &Address, asset: &Address) {
    env.storage()
        .instance()
        .set(&DataKey::StrategyAsset(strategy.clone()), asset);
}

pub fn read_withdrawal_queue(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::WithdrawalQueue)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn write_withdrawal_queue(env: &Env, queue: &Vec<Address>) {
    env.storage().instance().set(&DataKey::WithdrawalQueue, queue);
}

pub fn read_total_shares(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalShares)
        .unwrap_or(0)
}

pub fn write_total_shares(env: &Env, total: i128) {
    env.storage().instance().set(&DataKey::TotalShares, &total);
}

pub fn read_shares(env: &Env, holder: &Address) -> i128 {
    let key = DataKey::Shares(holder.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_shares(env: &Env, holder: &Address, amount: i128) {
    let key = DataKey::Shares(holder.clone());
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn read_allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = DataKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
    });
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn contains(list: &Vec<Address>, item: &Address) -> bool {
    list.iter().any(|entry| entry == *item)
}
