use soroban_sdk::contracterror;

/// Errors returned by every fallible vault entry point.
///
/// Codes are part of the contract ABI and must stay stable across upgrades.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    /// The vault's own address was supplied where an asset, strategy or
    /// collaborator is required.
    ZeroAddress = 1,
    /// The value is already registered, or equals the current setting.
    DuplicatedValue = 2,
    /// A numeric parameter is outside its valid domain.
    OutOfRange = 3,
    /// Reference to an asset or strategy that is not registered.
    NotFound = 4,
    /// Paired input arrays have different lengths.
    PairConflict = 5,
    /// More entries than the registry allows.
    TooManyElements = 6,
    /// The strategy is administered by a different DAC.
    StrategyDacConflict = 7,
    /// Caller is neither the DAC nor the keeper.
    Unauthorized = 8,
    AlreadyInitialized = 9,
    NotInitialized = 10,
    /// Deposits and withdrawals are closed for this caller in the current status.
    ProductNotActive = 11,
    /// The requested status transition is not allowed.
    InvalidStatus = 12,
    /// Activation preconditions (strategy, weights, queue) are not met.
    ActivationNotReady = 13,
    /// The DAC seed deposit is below the configured activation minimum.
    ActivationValueTooLow = 14,
    DepositCapExceeded = 15,
    ZeroAmount = 16,
    InsufficientShares = 17,
    InsufficientAllowance = 18,
    /// Draw-down traversed every source and is still short beyond the dust tolerance.
    InsufficientLiquidity = 19,
    SlippageExceeded = 20,
    /// The oracle returned a non-positive price.
    InvalidPrice = 21,
    MathOverflow = 22,
    DivisionByZero = 23,
    /// The operation belongs to a rebalance policy the vault does not run.
    PolicyMismatch = 24,
    /// Shares are outstanding but the portfolio holds no value.
    EmptyPortfolio = 25,
}
