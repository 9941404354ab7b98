//! Contract interfaces of the vault's external collaborators.
//!
//! The vault only ever talks to these through the generated clients. Any
//! contract exposing the same functions can be plugged in.

use soroban_sdk::{contractclient, Address, Env};

/// USD price feed.
#[contractclient(name = "PriceOracleClient")]
pub trait PriceOracle {
    /// Value of one whole unit of `asset`, in USD with 7 decimals.
    fn price(env: Env, asset: Address) -> i128;
}

/// Asset converter used for rebalancing and withdrawal draw-down.
#[contractclient(name = "SwapAdapterClient")]
pub trait SwapAdapter {
    /// Delivers exactly `amount_out` of `asset_out` to `recipient`.
    ///
    /// The caller transfers `max_amount_in` of `asset_in` to the adapter before
    /// calling. The adapter spends at most that much, refunds the rest to
    /// `recipient`, and returns the amount spent. It must fail rather than spend
    /// more than `max_amount_in`.
    fn swap_exact_out(
        env: Env,
        asset_in: Address,
        asset_out: Address,
        amount_out: i128,
        max_amount_in: i128,
        recipient: Address,
    ) -> i128;
}

/// Yield strategy bound to a single asset and administered by a DAC.
#[contractclient(name = "StrategyClient")]
pub trait Strategy {
    /// Asset the strategy accepts.
    fn asset(env: Env) -> Address;

    /// Configuration authority of the strategy.
    fn dac(env: Env) -> Address;

    /// Puts `amount` to work. The vault transfers the tokens first.
    fn deposit(env: Env, amount: i128);

    /// Returns up to `amount` to the vault and reports what was sent.
    fn withdraw(env: Env, amount: i128) -> i128;

    /// Returns everything to the vault and reports what was sent.
    fn withdraw_all(env: Env) -> i128;

    /// Balance currently held on behalf of the vault.
    fn total_assets(env: Env) -> i128;
}
