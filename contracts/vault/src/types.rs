use soroban_sdk::{contracttype, Address};

/// Lifecycle of the product. `Deactivated` is terminal.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProductStatus {
    Inactive,
    Active,
    Deactivated,
}

/// Risk budget of the CPPI policy.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CppiParams {
    /// Fraction of portfolio value defended in the safe asset (ppm, exclusive bounds).
    pub floor_ratio: u32,
    /// Multiplier applied to the cushion to size the at-risk bucket.
    pub multiplier: u32,
}

/// How `rebalance` derives per-asset target values.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RebalancePolicy {
    /// Fixed target weights over the whole portfolio.
    Weighted,
    /// Safe vs. at-risk split sized from the floor and multiplier.
    Cppi(CppiParams),
}

/// Vault-wide configuration, written by `initialize` and the DAC-gated updaters.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    /// Sole configuration authority.
    pub dac: Address,
    /// Automation principal allowed to call `rebalance`.
    pub keeper: Address,
    /// Unit-of-account asset; the safe asset under CPPI.
    pub underlying: Address,
    pub price_oracle: Address,
    pub swap_adapter: Address,
    /// Default share of each asset kept as float (ppm).
    pub float_ratio: u32,
    /// Largest tolerated weight deviation before swaps are issued (ppm).
    pub deviation_threshold: u32,
    /// Input headroom granted to the swap adapter over the oracle value (ppm).
    pub swap_slippage: u32,
    /// Ceiling on a non-DAC holder's share value; 0 disables the cap.
    pub depositor_cap: i128,
    /// DAC share value required before the product can be activated.
    pub min_activation_value: i128,
    /// Largest value shortfall a withdrawal may leave uncollected.
    pub dust_tolerance: i128,
    pub policy: RebalancePolicy,
}

/// Per-asset registry entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetConfig {
    /// Target weight (ppm).
    pub weight: u32,
    /// Token decimals, cached at registration.
    pub decimals: u32,
    /// Overrides `VaultConfig::float_ratio` when set.
    pub float_ratio: Option<u32>,
    pub strategy: Option<Address>,
}

/// Point-in-time holdings of one asset.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetPosition {
    pub asset: Address,
    pub weight: u32,
    pub price: i128,
    pub decimals: u32,
    pub float_balance: i128,
    pub strategy_balance: i128,
    pub value: i128,
}

impl AssetPosition {
    pub fn balance(&self) -> i128 {
        self.float_balance + self.strategy_balance
    }
}

/// Share quantity for a withdrawal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShareAmount {
    /// Every share the owner holds.
    All,
    Exact(i128),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowanceKey {
    pub owner: Address,
    pub spender: Address,
}
