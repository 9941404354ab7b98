//! # Portfolio Vault Contract
//!
//! A multi-asset pooled vault for Stellar. Depositors bring any registered asset
//! and receive vault shares priced in USD; a controller (the DAC) and an
//! automation keeper keep the pooled holdings on a target allocation and put
//! idle balances to work in per-asset yield strategies.
//!
//! ## Architecture Overview
//!
//! The vault prices everything through an external USD oracle and converts
//! between assets through an external swap adapter. Each asset may be bound to
//! one strategy contract; the part of an asset the vault holds directly is its
//! *float*, the rest sits in the strategy.
//!
//! Two rebalance policies are supported:
//! - **Weighted**: every asset targets `portfolio_value * weight`.
//! - **CPPI**: the underlying asset defends a floor and the other assets share
//!   `min(portfolio_value, cushion * multiplier)` by their weights.
//!
//! Both policies finish with float-ratio enforcement: each asset with a
//! strategy keeps `float_ratio` of its balance in float and deploys the rest.
//!
//! ## Share Accounting Model
//!
//! - Shares carry 7 decimals, the same as the USD value unit.
//! - The first deposit mints one share per value unit.
//! - Afterwards `shares = value * total_shares / portfolio_value`, rounded down.
//! - Withdrawals burn shares for `shares * portfolio_value / total_shares` of
//!   value, rounded down and paid in the requested asset.
//!
//! ## Asset Flow
//!
//! ```text
//! Deposit Flow:
//! User → [Asset Token] → [Vault float] → shares minted to receiver
//!
//! Rebalance Flow (DAC or keeper):
//! Vault.rebalance() → [Swap Adapter] surplus assets → deficit assets
//!                   → [Strategies] deploy or recall to the float ratio
//!
//! Withdraw Flow:
//! User → [Vault.withdraw()] → own float → own strategy
//!                           → withdrawal queue (swapped in) → [Asset Token] → receiver
//! ```
//!
//! ## Storage Layout
//!
//! ### Instance Storage
//! - `Config`: the `VaultConfig` (principals, collaborators, ratios, caps, policy)
//! - `Status`: `Inactive`, `Active` or `Deactivated`
//! - `Assets` / `Asset(addr)`: registry order and per-asset configuration
//! - `StrategyAsset(addr)`: reverse index from strategy to asset
//! - `WithdrawalQueue`: strategies consulted by withdrawal draw-down
//! - `TotalShares`: share supply
//!
//! ### Persistent Storage
//! - `Shares(holder)`: share balance
//! - `Allowance(owner, spender)`: share allowance
//!
//! ## Lifecycle
//!
//! `Inactive` → `Active` through `activate_product`, and either of those →
//! `Deactivated` through `deactivate_product`. Only the DAC may deposit or
//! withdraw while `Inactive` (the seed deposit). `Deactivated` is terminal and
//! unlocks `emergency_withdraw`.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod drawdown;
pub mod errors;
pub mod events;
mod holdings;
pub mod interfaces;
mod ledger;
pub mod math;
pub mod policy;
pub mod rebalance;
mod registry;
mod storage;
pub mod types;

#[cfg(test)]
mod testutils;


use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Vec};

pub use errors::VaultError;
pub use types::{
    AssetConfig, AssetPosition, CppiParams, ProductStatus, RebalancePolicy, ShareAmount,
    VaultConfig,
};

use interfaces::StrategyClient;
use math::{amount_to_value, mul_div, value_to_amount, Rounding, PPM, VALUE_SCALE};

// ============================================================================
// CONTRACT
// ============================================================================

#[contract]
pub struct PortfolioVault;

#[contractimpl]
impl PortfolioVault {
    // ==========================================================================
    // INITIALIZATION
    // ==========================================================================

    /// Initializes the vault and registers the underlying asset.
    ///
    /// # Arguments
    /// * `config` - Principals, collaborators, ratios and the rebalance policy
    ///
    /// # Errors
    /// * `AlreadyInitialized` - Called a second time
    /// * `ZeroAddress` - Any configured address is the vault itself
    /// * `OutOfRange` - A ratio exceeds 100,000 ppm, an amount is negative,
    ///   or the CPPI parameters are invalid
    ///
    /// # Events
    /// Emits `init` followed by `asset_add` for the underlying asset.
    pub fn initialize(env: Env, config: VaultConfig) -> Result<(), VaultError> {
        if storage::is_initialized(&env) {
            return Err(VaultError::AlreadyInitialized);
        }
        config.dac.require_auth();
        Self::validate_config(&env, &config)?;

        storage::write_config(&env, &config);
        storage::write_status(&env, ProductStatus::Inactive);
        let decimals = registry::add_asset(&env, &config.underlying)?;
        storage::extend_instance(&env);

        events::initialized(&env, &config.dac, &config.underlying);
        events::asset_added(&env, &config.underlying, decimals);
        Ok(())
    }

    // ==========================================================================
    // REGISTRY
    // ==========================================================================

    /// Registers a new asset with zero weight. DAC only.
    ///
    /// # Errors
    /// * `ZeroAddress` - `asset` is the vault itself
    /// * `DuplicatedValue` - Already registered
    pub fn add_asset(env: Env, asset: Address) -> Result<(), VaultError> {
        Self::require_dac(&env)?;
        let decimals = registry::add_asset(&env, &asset)?;
        storage::extend_instance(&env);
        events::asset_added(&env, &asset, decimals);
        Ok(())
    }

    /// Binds a strategy to the asset it reports. DAC only.
    ///
    /// # Errors
    /// * `ZeroAddress` - `strategy` is the vault itself
    /// * `NotFound` - The strategy's asset is not registered
    /// * `StrategyDacConflict` - The strategy answers to a different DAC
    /// * `DuplicatedValue` - The strategy or its asset is already bound
    pub fn add_strategy(env: Env, strategy: Address) -> Result<(), VaultError> {
        let config = Self::require_dac(&env)?;
        let asset = registry::add_strategy(&env, &config, &strategy)?;
        storage::extend_instance(&env);
        events::strategy_added(&env, &asset, &strategy);
        Ok(())
    }

    /// Replaces the weights of the listed assets. DAC only.
    ///
    /// Unlisted assets keep their weights, and the combined weights must sum
    /// to exactly 100,000 ppm.
    ///
    /// # Errors
    /// * `PairConflict` - `assets` and `weights` differ in length
    /// * `NotFound` - An asset is not registered
    /// * `DuplicatedValue` - An asset is listed twice
    /// * `OutOfRange` - A weight exceeds 100,000 or the total is not 100,000
    pub fn update_weight(
        env: Env,
        assets: Vec<Address>,
        weights: Vec<u32>,
    ) -> Result<(), VaultError> {
        Self::require_dac(&env)?;
        registry::update_weights(&env, &assets, &weights)?;
        storage::extend_instance(&env);
        events::weights_updated(&env, &assets, &weights);
        Ok(())
    }

    /// Replaces the withdrawal queue. DAC only.
    ///
    /// # Errors
    /// * `TooManyElements` - Longer than the asset count
    /// * `NotFound` - An entry is not a registered strategy
    /// * `DuplicatedValue` - An entry appears twice
    pub fn update_withdrawal_queue(env: Env, strategies: Vec<Address>) -> Result<(), VaultError> {
        Self::require_dac(&env)?;
        registry::update_withdrawal_queue(&env, &strategies)?;
        storage::extend_instance(&env);
        events::queue_updated(&env, &strategies);
        Ok(())
    }

    // ==========================================================================
    // CONFIGURATION
    // ==========================================================================

    /// Sets the global float ratio: the share of each asset's balance kept
    /// liquid in the vault instead of deployed to its strategy. DAC only.
    ///
    /// # Arguments
    /// * `float_ratio` - ppm of each asset's balance, at most 100,000
    ///
    /// # Errors
    /// * `OutOfRange` - Above 100,000 ppm
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `param` named `float`.
    pub fn update_float_ratio(env: Env, float_ratio: u32) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        if float_ratio > PPM {
            return Err(VaultError::OutOfRange);
        }
        let old = config.float_ratio;
        if old == float_ratio {
            return Err(VaultError::DuplicatedValue);
        }
        config.float_ratio = float_ratio;
        Self::store_config(&env, &config);
        events::param_updated(&env, symbol_short!("float"), old as i128, float_ratio as i128);
        Ok(())
    }

    /// Sets (or with `None`, clears) the float ratio override of one asset.
    /// DAC only.
    ///
    /// # Errors
    /// * `NotFound` - Unregistered asset
    /// * `OutOfRange` - Override above 100,000 ppm
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `param` named `asset_flt` with the effective old and new ratios.
    pub fn update_asset_float_ratio(
        env: Env,
        asset: Address,
        float_ratio: Option<u32>,
    ) -> Result<(), VaultError> {
        let config = Self::require_dac(&env)?;
        let old = registry::update_asset_float_ratio(&env, &asset, float_ratio)?;
        storage::extend_instance(&env);
        events::param_updated(
            &env,
            symbol_short!("asset_flt"),
            old.unwrap_or(config.float_ratio) as i128,
            float_ratio.unwrap_or(config.float_ratio) as i128,
        );
        Ok(())
    }

    /// Sets how far (ppm of portfolio value) an asset may drift from its
    /// target before `rebalance` swaps it back. DAC only.
    ///
    /// # Errors
    /// * `OutOfRange` - Above 100,000 ppm
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `param` named `deviation`.
    pub fn update_deviation_threshold(env: Env, threshold: u32) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        if threshold > PPM {
            return Err(VaultError::OutOfRange);
        }
        let old = config.deviation_threshold;
        if old == threshold {
            return Err(VaultError::DuplicatedValue);
        }
        config.deviation_threshold = threshold;
        Self::store_config(&env, &config);
        events::param_updated(&env, symbol_short!("deviation"), old as i128, threshold as i128);
        Ok(())
    }

    /// Input headroom granted to the swap adapter. DAC only.
    ///
    /// # Errors
    /// * `OutOfRange` - 100,000 ppm or more
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `param` named `slippage`.
    pub fn update_swap_slippage(env: Env, slippage: u32) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        if slippage >= PPM {
            return Err(VaultError::OutOfRange);
        }
        let old = config.swap_slippage;
        if old == slippage {
            return Err(VaultError::DuplicatedValue);
        }
        config.swap_slippage = slippage;
        Self::store_config(&env, &config);
        events::param_updated(&env, symbol_short!("slippage"), old as i128, slippage as i128);
        Ok(())
    }

    /// Value cap on non-DAC holders. Zero disables the cap. DAC only.
    ///
    /// # Errors
    /// * `OutOfRange` - Negative cap
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `param` named `cap`.
    pub fn update_depositor_cap(env: Env, cap: i128) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        if cap < 0 {
            return Err(VaultError::OutOfRange);
        }
        let old = config.depositor_cap;
        if old == cap {
            return Err(VaultError::DuplicatedValue);
        }
        config.depositor_cap = cap;
        Self::store_config(&env, &config);
        events::param_updated(&env, symbol_short!("cap"), old, cap);
        Ok(())
    }

    /// Updates the CPPI floor ratio and multiplier. DAC only.
    ///
    /// # Errors
    /// * `PolicyMismatch` - The vault runs the weighted policy
    /// * `OutOfRange` - `floor_ratio` outside `(0, 100,000)` or `multiplier < 1`
    /// * `DuplicatedValue` - Both values unchanged
    ///
    /// # Events
    /// Emits one `param` event per changed value (`cppi_flr`, `cppi_mul`).
    pub fn update_rebalance_param(
        env: Env,
        floor_ratio: u32,
        multiplier: u32,
    ) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        let RebalancePolicy::Cppi(old) = config.policy else {
            return Err(VaultError::PolicyMismatch);
        };
        let params = CppiParams { floor_ratio, multiplier };
        policy::validate_cppi(&params)?;
        if old == params {
            return Err(VaultError::DuplicatedValue);
        }

        config.policy = RebalancePolicy::Cppi(params);
        Self::store_config(&env, &config);
        if old.floor_ratio != floor_ratio {
            events::param_updated(
                &env,
                symbol_short!("cppi_flr"),
                old.floor_ratio as i128,
                floor_ratio as i128,
            );
        }
        if old.multiplier != multiplier {
            events::param_updated(
                &env,
                symbol_short!("cppi_mul"),
                old.multiplier as i128,
                multiplier as i128,
            );
        }
        Ok(())
    }

    /// Points the vault at a new price oracle. DAC only.
    ///
    /// # Errors
    /// * `ZeroAddress` - The vault itself
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `address` named `oracle`.
    pub fn update_usd_price_module(env: Env, price_oracle: Address) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        let old = Self::replace_address(&env, &mut config.price_oracle, price_oracle)?;
        Self::store_config(&env, &config);
        events::address_updated(&env, symbol_short!("oracle"), &old, &config.price_oracle);
        Ok(())
    }

    /// Points the vault at a new swap adapter. DAC only.
    ///
    /// # Errors
    /// * `ZeroAddress` - The vault itself
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `address` named `swap`.
    pub fn update_swap_adapter(env: Env, swap_adapter: Address) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        let old = Self::replace_address(&env, &mut config.swap_adapter, swap_adapter)?;
        Self::store_config(&env, &config);
        events::address_updated(&env, symbol_short!("swap"), &old, &config.swap_adapter);
        Ok(())
    }

    /// Replaces the keeper allowed to call `rebalance`. DAC only.
    ///
    /// # Errors
    /// * `ZeroAddress` - The vault itself
    /// * `DuplicatedValue` - Unchanged
    ///
    /// # Events
    /// Emits `address` named `keeper`.
    pub fn update_keeper(env: Env, keeper: Address) -> Result<(), VaultError> {
        let mut config = Self::require_dac(&env)?;
        let old = Self::replace_address(&env, &mut config.keeper, keeper)?;
        Self::store_config(&env, &config);
        events::address_updated(&env, symbol_short!("keeper"), &old, &config.keeper);
        Ok(())
    }

    // ==========================================================================
    // PRODUCT LIFECYCLE
    // ==========================================================================

    /// Opens the vault to public deposits. DAC only.
    ///
    /// # Errors
    /// * `InvalidStatus` - The vault is not `Inactive`
    /// * `ActivationNotReady` - No strategy, weights not summing to 100,000,
    ///   or an empty withdrawal queue
    /// * `ActivationValueTooLow` - The DAC's seed position is below
    ///   `min_activation_value`
    pub fn activate_product(env: Env) -> Result<(), VaultError> {
        let config = Self::require_dac(&env)?;
        if storage::read_status(&env) != ProductStatus::Inactive {
            return Err(VaultError::InvalidStatus);
        }
        if registry::strategies(&env)?.is_empty()
            || registry::weight_total(&env)? != PPM as u64
            || storage::read_withdrawal_queue(&env).is_empty()
        {
            return Err(VaultError::ActivationNotReady);
        }
        let seed_value = Self::value_of(&env, &config, &config.dac)?;
        if seed_value < config.min_activation_value {
            log!(&env, "seed value {} below {}", seed_value, config.min_activation_value);
            return Err(VaultError::ActivationValueTooLow);
        }

        storage::write_status(&env, ProductStatus::Active);
        storage::extend_instance(&env);
        events::status_changed(&env, ProductStatus::Active);
        Ok(())
    }

    /// Permanently closes the vault. DAC only.
    ///
    /// Deposits and withdrawals stop; `emergency_withdraw` becomes available.
    ///
    /// # Errors
    /// * `InvalidStatus` - Already deactivated
    ///
    /// # Events
    /// Emits `status` with `Deactivated`.
    pub fn deactivate_product(env: Env) -> Result<(), VaultError> {
        Self::require_dac(&env)?;
        if storage::read_status(&env) == ProductStatus::Deactivated {
            return Err(VaultError::InvalidStatus);
        }
        storage::write_status(&env, ProductStatus::Deactivated);
        storage::extend_instance(&env);
        events::status_changed(&env, ProductStatus::Deactivated);
        Ok(())
    }

    // ==========================================================================
    // CORE LIFECYCLE - DEPOSIT
    // ==========================================================================

    /// Deposits `amount` of `asset` from `from` and mints shares to `receiver`.
    ///
    /// # Arguments
    /// * `from` - Account paying the tokens (must authorize)
    /// * `asset` - Registered asset being deposited
    /// * `amount` - Token amount in the asset's own decimals
    /// * `receiver` - Account credited with the shares
    ///
    /// # Returns
    /// The number of shares minted.
    ///
    /// # Errors
    /// * `ProductNotActive` - Not `Active`, unless the DAC seeds an `Inactive` vault
    /// * `NotFound` - Unregistered asset
    /// * `ZeroAmount` - Non-positive amount, or an amount too small to mint a share
    /// * `DepositCapExceeded` - A non-DAC receiver would hold more than `depositor_cap`
    ///
    /// # Events
    /// Emits `deposit` with the value credited and the shares minted.
    pub fn deposit(
        env: Env,
        from: Address,
        asset: Address,
        amount: i128,
        receiver: Address,
    ) -> Result<i128, VaultError> {
        from.require_auth();
        if amount <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        let config = storage::read_config(&env)?;
        match storage::read_status(&env) {
            ProductStatus::Active => {}
            ProductStatus::Inactive if from == config.dac => {}
            _ => return Err(VaultError::ProductNotActive),
        }

        let asset_config = storage::require_asset(&env, &asset)?;
        let price = holdings::price(&env, &config, &asset)?;
        let value = amount_to_value(amount, price, asset_config.decimals, Rounding::Floor)?;

        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        let total_shares = ledger::total_supply(&env);
        let shares = ledger::shares_for_value(value, total_shares, portfolio_value)?;
        if shares <= 0 {
            return Err(VaultError::ZeroAmount);
        }

        if receiver != config.dac && config.depositor_cap > 0 {
            let held = ledger::balance(&env, &receiver) + shares;
            let held_value = ledger::value_for_shares(
                held,
                total_shares + shares,
                portfolio_value + value,
            )?;
            if held_value > config.depositor_cap {
                return Err(VaultError::DepositCapExceeded);
            }
        }

        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);
        ledger::mint(&env, &receiver, shares)?;
        storage::extend_instance(&env);

        events::deposited(
            &env,
            events::DepositEvent {
                from,
                receiver,
                asset,
                amount,
                value,
                shares,
            },
        );
        Ok(shares)
    }

    // ==========================================================================
    // CORE LIFECYCLE - WITHDRAW
    // ==========================================================================

    /// Burns `owner`'s shares and pays their value in `asset` to `receiver`.
    ///
    /// Funds are gathered from the asset's float, then its strategy, then the
    /// other assets in withdrawal-queue order, swapped into `asset`.
    ///
    /// # Arguments
    /// * `caller` - Must authorize; spends `owner`'s allowance when not the owner
    /// * `asset` - Registered asset to pay out
    /// * `shares` - `All` of the owner's shares or an `Exact` amount
    /// * `receiver` - Account receiving the tokens
    /// * `owner` - Account whose shares are burned
    ///
    /// # Returns
    /// The token amount paid to `receiver`.
    ///
    /// # Errors
    /// * `ProductNotActive` - Not `Active`, unless the DAC withdraws from an
    ///   `Inactive` vault
    /// * `ZeroAmount` - No shares, or shares worth less than one token unit
    /// * `InsufficientShares` / `InsufficientAllowance`
    /// * `InsufficientLiquidity` - Draw-down ended short by more than `dust_tolerance`
    pub fn withdraw(
        env: Env,
        caller: Address,
        asset: Address,
        shares: ShareAmount,
        receiver: Address,
        owner: Address,
    ) -> Result<i128, VaultError> {
        caller.require_auth();
        let config = storage::read_config(&env)?;
        match storage::read_status(&env) {
            ProductStatus::Active => {}
            ProductStatus::Inactive if owner == config.dac => {}
            _ => return Err(VaultError::ProductNotActive),
        }

        let asset_config = storage::require_asset(&env, &asset)?;
        let held = ledger::balance(&env, &owner);
        let shares = match shares {
            ShareAmount::All => held,
            ShareAmount::Exact(amount) => amount,
        };
        if shares <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        if shares > held {
            return Err(VaultError::InsufficientShares);
        }
        if caller != owner {
            ledger::spend_allowance(&env, &owner, &caller, shares)?;
        }

        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        let value = ledger::value_for_shares(shares, ledger::total_supply(&env), portfolio_value)?;
        let price = holdings::price(&env, &config, &asset)?;
        let amount = value_to_amount(value, price, asset_config.decimals, Rounding::Floor)?;
        if amount <= 0 {
            return Err(VaultError::ZeroAmount);
        }

        let paid = drawdown::gather(&env, &config, &asset, amount)?;
        ledger::burn(&env, &owner, shares)?;
        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &receiver, &paid);
        storage::extend_instance(&env);

        events::withdrawn(
            &env,
            events::WithdrawEvent {
                caller,
                owner,
                receiver,
                asset,
                shares,
                amount: paid,
            },
        );
        Ok(paid)
    }

    // ==========================================================================
    // REBALANCE
    // ==========================================================================

    /// Realigns holdings with the active policy, then enforces float ratios.
    ///
    /// # Arguments
    /// * `caller` - The DAC or the keeper (must authorize)
    ///
    /// # Returns
    /// The number of swaps executed.
    ///
    /// # Errors
    /// * `Unauthorized` - `caller` is neither the DAC nor the keeper
    /// * `ProductNotActive` - The vault is not `Active`
    /// * `SlippageExceeded` - The adapter spent more than the bound or delivered
    ///   less than asked
    ///
    /// # Events
    /// Emits `rebalance` with the post-rebalance portfolio value.
    pub fn rebalance(env: Env, caller: Address) -> Result<u32, VaultError> {
        caller.require_auth();
        let config = storage::read_config(&env)?;
        if caller != config.dac && caller != config.keeper {
            return Err(VaultError::Unauthorized);
        }
        if storage::read_status(&env) != ProductStatus::Active {
            return Err(VaultError::ProductNotActive);
        }

        let swaps = rebalance::run(&env, &config)?;
        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        storage::extend_instance(&env);

        events::rebalanced(&env, &caller, portfolio_value, swaps);
        Ok(swaps)
    }

    // ==========================================================================
    // EMERGENCY
    // ==========================================================================

    /// Recalls every strategy and sends every asset's full float to the DAC.
    ///
    /// Requires a deactivated vault. Shares are left untouched so holders can
    /// be made whole off-chain from the recovered assets.
    ///
    /// # Errors
    /// * `InvalidStatus` - The vault is not `Deactivated`
    ///
    /// # Events
    /// Emits `emergency` with the number of assets swept.
    pub fn emergency_withdraw(env: Env) -> Result<(), VaultError> {
        let config = Self::require_dac(&env)?;
        if storage::read_status(&env) != ProductStatus::Deactivated {
            return Err(VaultError::InvalidStatus);
        }

        let vault = env.current_contract_address();
        let assets = storage::read_assets(&env);
        for asset in assets.iter() {
            let asset_config = storage::require_asset(&env, &asset)?;
            if let Some(strategy) = &asset_config.strategy {
                StrategyClient::new(&env, strategy).withdraw_all();
            }
            let float = holdings::float_balance(&env, &asset);
            if float > 0 {
                token::Client::new(&env, &asset).transfer(&vault, &config.dac, &float);
            }
        }
        storage::extend_instance(&env);

        events::emergency_withdrawn(&env, &config.dac, assets.len());
        Ok(())
    }

    // ==========================================================================
    // SHARE TOKEN
    // ==========================================================================

    /// Lets `spender` withdraw or move up to `amount` of `owner`'s shares.
    ///
    /// # Arguments
    /// * `owner` - Share holder (must authorize)
    /// * `spender` - Account granted the allowance
    /// * `amount` - New allowance, replacing the previous one
    ///
    /// # Errors
    /// * `OutOfRange` - Negative amount
    ///
    /// # Events
    /// Emits `approve`.
    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128) -> Result<(), VaultError> {
        owner.require_auth();
        ledger::approve(&env, &owner, &spender, amount)?;
        events::approved(&env, &owner, &spender, amount);
        Ok(())
    }

    /// Moves shares between holders. The depositor cap is not applied.
    ///
    /// # Errors
    /// * `ZeroAmount` - Non-positive amount
    /// * `InsufficientShares` - `from` holds fewer than `amount`
    ///
    /// # Events
    /// Emits `transfer`.
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), VaultError> {
        from.require_auth();
        ledger::transfer(&env, &from, &to, amount)?;
        events::shares_transferred(&env, &from, &to, amount);
        Ok(())
    }

    /// Shares held by `id`.
    pub fn balance(env: Env, id: Address) -> i128 {
        ledger::balance(&env, &id)
    }

    /// Shares outstanding across all holders.
    pub fn total_supply(env: Env) -> i128 {
        ledger::total_supply(&env)
    }

    /// Shares `spender` may still draw from `owner`.
    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        ledger::allowance(&env, &owner, &spender)
    }

    // ==========================================================================
    // VALUATION QUERIES
    // ==========================================================================

    /// Total USD value (7 decimals) of float and strategy holdings.
    ///
    /// # Errors
    /// * `InvalidPrice` - The oracle returned a non-positive price
    pub fn portfolio_value(env: Env) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        holdings::portfolio_value(&env, &config)
    }

    /// Float plus strategy balance of `asset`, in token units.
    pub fn asset_balance(env: Env, asset: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        Ok(holdings::position(&env, &config, &asset)?.balance())
    }

    /// Token units of `asset` held by the vault itself.
    ///
    /// # Errors
    /// * `NotFound` - Unregistered asset
    pub fn asset_float_balance(env: Env, asset: Address) -> Result<i128, VaultError> {
        storage::require_asset(&env, &asset)?;
        Ok(holdings::float_balance(&env, &asset))
    }

    /// USD value of `asset`'s float plus strategy balance.
    ///
    /// # Errors
    /// * `NotFound` - Unregistered asset
    /// * `InvalidPrice` - The oracle returned a non-positive price
    pub fn asset_value(env: Env, asset: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        Ok(holdings::position(&env, &config, &asset)?.value)
    }

    /// USD value of `asset`'s float only.
    ///
    /// # Errors
    /// * `NotFound` - Unregistered asset
    /// * `InvalidPrice` - The oracle returned a non-positive price
    pub fn asset_float_value(env: Env, asset: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        let asset_config = storage::require_asset(&env, &asset)?;
        let price = holdings::price(&env, &config, &asset)?;
        amount_to_value(
            holdings::float_balance(&env, &asset),
            price,
            asset_config.decimals,
            Rounding::Floor,
        )
    }

    /// Value of one whole share (10^7 units). 1.0 while no shares exist.
    pub fn share_price(env: Env) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        let total_shares = ledger::total_supply(&env);
        if total_shares == 0 {
            return Ok(VALUE_SCALE);
        }
        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        mul_div(portfolio_value, VALUE_SCALE, total_shares, Rounding::Floor)
    }

    /// Current value of `account`'s shares.
    pub fn share_value(env: Env, account: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        Self::value_of(&env, &config, &account)
    }

    /// Shares a deposit worth `value` would mint right now.
    pub fn convert_to_shares(env: Env, value: i128) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        ledger::shares_for_value(value, ledger::total_supply(&env), portfolio_value)
    }

    /// Value that burning `shares` would pay out right now.
    pub fn convert_to_assets(env: Env, shares: i128) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        let portfolio_value = holdings::portfolio_value(&env, &config)?;
        ledger::value_for_shares(shares, ledger::total_supply(&env), portfolio_value)
    }

    /// Further value `account` may deposit. `i128::MAX` means unlimited.
    pub fn max_deposit_value(env: Env, account: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        let is_dac = account == config.dac;
        match storage::read_status(&env) {
            ProductStatus::Deactivated => Ok(0),
            ProductStatus::Inactive if !is_dac => Ok(0),
            _ if is_dac || config.depositor_cap == 0 => Ok(i128::MAX),
            _ => {
                let held = Self::value_of(&env, &config, &account)?;
                Ok((config.depositor_cap - held).max(0))
            }
        }
    }

    /// Value `account` may currently withdraw.
    ///
    /// # Returns
    /// The account's share value while `Active` (or the DAC's while
    /// `Inactive`), otherwise 0.
    pub fn max_withdraw_value(env: Env, account: Address) -> Result<i128, VaultError> {
        let config = storage::read_config(&env)?;
        match storage::read_status(&env) {
            ProductStatus::Deactivated => Ok(0),
            ProductStatus::Inactive if account != config.dac => Ok(0),
            _ => Self::value_of(&env, &config, &account),
        }
    }

    /// Per-asset snapshot in registry order.
    pub fn asset_positions(env: Env) -> Result<Vec<AssetPosition>, VaultError> {
        let config = storage::read_config(&env)?;
        holdings::snapshot(&env, &config)
    }

    // ==========================================================================
    // REGISTRY QUERIES
    // ==========================================================================

    /// True once the product is active.
    pub fn check_activation(env: Env) -> bool {
        storage::read_status(&env) == ProductStatus::Active
    }

    /// True if `asset` is registered.
    pub fn check_asset(env: Env, asset: Address) -> bool {
        storage::read_asset(&env, &asset).is_some()
    }

    /// True if `strategy` is bound to a registered asset.
    pub fn check_strategy(env: Env, strategy: Address) -> bool {
        storage::read_strategy_asset(&env, &strategy).is_some()
    }

    /// Registered strategies in asset order.
    pub fn current_strategies(env: Env) -> Result<Vec<Address>, VaultError> {
        registry::strategies(&env)
    }

    /// Current lifecycle state.
    pub fn status(env: Env) -> ProductStatus {
        storage::read_status(&env)
    }

    /// Stored configuration.
    ///
    /// # Errors
    /// * `NotInitialized` - `initialize` has not run
    pub fn config(env: Env) -> Result<VaultConfig, VaultError> {
        storage::read_config(&env)
    }

    /// Registered assets in registration order, the underlying first.
    pub fn assets(env: Env) -> Vec<Address> {
        storage::read_assets(&env)
    }

    /// Registry entry of `asset`: decimals, weight, strategy and float override.
    ///
    /// # Errors
    /// * `NotFound` - Unregistered asset
    pub fn asset_config(env: Env, asset: Address) -> Result<AssetConfig, VaultError> {
        storage::require_asset(&env, &asset)
    }

    /// Strategies tapped, in order, when a withdrawal outruns the asset's own holdings.
    pub fn withdrawal_queue(env: Env) -> Vec<Address> {
        storage::read_withdrawal_queue(&env)
    }

    // ==========================================================================
    // INTERNAL HELPERS
    // ==========================================================================

    /// Loads the configuration and requires the DAC's authorization.
    fn require_dac(env: &Env) -> Result<VaultConfig, VaultError> {
        let config = storage::read_config(env)?;
        config.dac.require_auth();
        Ok(config)
    }

    fn store_config(env: &Env, config: &VaultConfig) {
        storage::write_config(env, config);
        storage::extend_instance(env);
    }

    /// Swaps `slot` for `new` and returns the previous address.
    fn replace_address(
        env: &Env,
        slot: &mut Address,
        new: Address,
    ) -> Result<Address, VaultError> {
        if new == env.current_contract_address() {
            return Err(VaultError::ZeroAddress);
        }
        if *slot == new {
            return Err(VaultError::DuplicatedValue);
        }
        Ok(core::mem::replace(slot, new))
    }

    fn value_of(env: &Env, config: &VaultConfig, account: &Address) -> Result<i128, VaultError> {
        let shares = ledger::balance(env, account);
        if shares == 0 {
            return Ok(0);
        }
        let portfolio_value = holdings::portfolio_value(env, config)?;
        ledger::value_for_shares(shares, ledger::total_supply(env), portfolio_value)
    }

    fn validate_config(env: &Env, config: &VaultConfig) -> Result<(), VaultError> {
        let vault = env.current_contract_address();
        let addresses = [
            &config.dac,
            &config.keeper,
            &config.underlying,
            &config.price_oracle,
            &config.swap_adapter,
        ];
        if addresses.iter().any(|address| **address == vault) {
            return Err(VaultError::ZeroAddress);
        }
        if config.float_ratio > PPM
            || config.deviation_threshold > PPM
            || config.swap_slippage >= PPM
        {
            return Err(VaultError::OutOfRange);
        }
        if config.depositor_cap < 0 || config.min_activation_value < 0 || config.dust_tolerance < 0 {
            return Err(VaultError::OutOfRange);
        }
        if let RebalancePolicy::Cppi(params) = &config.policy {
            policy::validate_cppi(params)?;
        }
        Ok(())
    }
}
