//! Events emitted for every state-changing operation.
//!
//! Indexers and the keeper follow these to track deposits, withdrawals,
//! configuration changes and rebalances without polling storage.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::types::ProductStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub dac: Address,
    pub underlying: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub from: Address,
    pub receiver: Address,
    pub asset: Address,
    pub amount: i128,
    pub value: i128,
    pub shares: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub caller: Address,
    pub owner: Address,
    pub receiver: Address,
    pub asset: Address,
    pub shares: i128,
    pub amount: i128,
}

/// Emitted after a completed rebalance pass.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RebalanceEvent {
    pub caller: Address,
    pub portfolio_value: i128,
    pub swaps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusEvent {
    pub status: ProductStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub dac: Address,
    pub assets: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShareTransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetAddedEvent {
    pub asset: Address,
    pub decimals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyAddedEvent {
    pub asset: Address,
    pub strategy: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightsUpdatedEvent {
    pub assets: Vec<Address>,
    pub weights: Vec<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueueUpdatedEvent {
    pub strategies: Vec<Address>,
}

/// A numeric setting changed. `name` identifies the setting.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamUpdatedEvent {
    pub name: Symbol,
    pub old_value: i128,
    pub new_value: i128,
}

/// A collaborator or principal address changed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressUpdatedEvent {
    pub name: Symbol,
    pub old_address: Address,
    pub new_address: Address,
}

pub fn initialized(env: &Env, dac: &Address, underlying: &Address) {
    env.events().publish(
        (symbol_short!("init"),),
        InitializedEvent {
            dac: dac.clone(),
            underlying: underlying.clone(),
        },
    );
}

pub fn deposited(env: &Env, event: DepositEvent) {
    env.events().publish((symbol_short!("deposit"),), event);
}

pub fn withdrawn(env: &Env, event: WithdrawEvent) {
    env.events().publish((symbol_short!("withdraw"),), event);
}

pub fn rebalanced(env: &Env, caller: &Address, portfolio_value: i128, swaps: u32) {
    env.events().publish(
        (symbol_short!("rebalance"),),
        RebalanceEvent {
            caller: caller.clone(),
            portfolio_value,
            swaps,
        },
    );
}

pub fn status_changed(env: &Env, status: ProductStatus) {
    env.events()
        .publish((symbol_short!("status"),), StatusEvent { status });
}

pub fn emergency_withdrawn(env: &Env, dac: &Address, assets: u32) {
    env.events().publish(
        (symbol_short!("emergency"),),
        EmergencyWithdrawEvent {
            dac: dac.clone(),
            assets,
        },
    );
}

pub fn approved(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("approve"),),
        ApprovalEvent {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        },
    );
}

pub fn shares_transferred(env: &Env, from: &Address, to: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("transfer"),),
        ShareTransferEvent {
            from: from.clone(),
            to: to.clone(),
            amount,
        },
    );
}

pub fn asset_added(env: &Env, asset: &Address, decimals: u32) {
    env.events().publish(
        (symbol_short!("asset_add"),),
        AssetAddedEvent {
            asset: asset.clone(),
            decimals,
        },
    );
}

pub fn strategy_added(env: &Env, asset: &Address, strategy: &Address) {
    env.events().publish(
        (symbol_short!("strat_add"),),
        StrategyAddedEvent {
            asset: asset.clone(),
            strategy: strategy.clone(),
        },
    );
}

pub fn weights_updated(env: &Env, assets: &Vec<Address>, weights: &Vec<u32>) {
    env.events().publish(
        (symbol_short!("weights"),),
        WeightsUpdatedEvent {
            assets: assets.clone(),
            weights: weights.clone(),
        },
    );
}

pub fn queue_updated(env: &Env, strategies: &Vec<Address>) {
    env.events().publish(
        (symbol_short!("queue"),),
        QueueUpdatedEvent {
            strategies: strategies.clone(),
        },
    );
}

pub fn param_updated(env: &Env, name: Symbol, old_value: i128, new_value: i128) {
    env.events().publish(
        (symbol_short!("param"),),
        ParamUpdatedEvent {
            name,
            old_value,
            new_value,
        },
    );
}

pub fn address_updated(env: &Env, name: Symbol, old_address: &Address, new_address: &Address) {
    env.events().publish(
        (symbol_short!("address"),),
        AddressUpdatedEvent {
            name,
            old_address: old_address.clone(),
            new_address: new_address.clone(),
        },
    );
}
