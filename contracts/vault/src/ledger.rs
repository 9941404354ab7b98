//! Share ledger: per-holder balances, total supply and spending allowances.

use soroban_sdk::{Address, Env};

use crate::errors::VaultError;
use crate::math::{mul_div, Rounding};
use crate::storage;

pub fn balance(env: &Env, holder: &Address) -> i128 {
    storage::read_shares(env, holder)
}

pub fn total_supply(env: &Env) -> i128 {
    storage::read_total_shares(env)
}

pub fn mint(env: &Env, to: &Address, amount: i128) -> Result<(), VaultError> {
    let balance = storage::read_shares(env, to)
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;
    let total = storage::read_total_shares(env)
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;

    storage::write_shares(env, to, balance);
    storage::write_total_shares(env, total);
    Ok(())
}

pub fn burn(env: &Env, from: &Address, amount: i128) -> Result<(), VaultError> {
    let balance = storage::read_shares(env, from);
    if balance < amount {
        return Err(VaultError::InsufficientShares);
    }

    storage::write_shares(env, from, balance - amount);
    storage::write_total_shares(env, storage::read_total_shares(env) - amount);
    Ok(())
}

pub fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), VaultError> {
    if amount <= 0 {
        return Err(VaultError::ZeroAmount);
    }
    let from_balance = storage::read_shares(env, from);
    if from_balance < amount {
        return Err(VaultError::InsufficientShares);
    }
    storage::write_shares(env, from, from_balance - amount);

    let to_balance = storage::read_shares(env, to)
        .checked_add(amount)
        .ok_or(VaultError::MathOverflow)?;
    storage::write_shares(env, to, to_balance);
    Ok(())
}

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    storage::read_allowance(env, owner, spender)
}

pub fn approve(env: &Env, owner: &Address, spender: &Address, amount: i128) -> Result<(), VaultError> {
    if amount < 0 {
        return Err(VaultError::OutOfRange);
    }
    storage::write_allowance(env, owner, spender, amount);
    Ok(())
}

/// Consumes `amount` of the allowance `owner` granted to `spender`.
pub fn spend_allowance(
    env: &Env,
    owner: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), VaultError> {
    let allowed = storage::read_allowance(env, owner, spender);
    if allowed < amount {
        return Err(VaultError::InsufficientAllowance);
    }
    storage::write_allowance(env, owner, spender, allowed - amount);
    Ok(())
}

/// Shares minted for `value` against the current supply and portfolio value.
/// The first deposit mints one share per value unit.
pub fn shares_for_value(value: i128, total_shares: i128, portfolio_value: i128) -> Result<i128, VaultError> {
    if total_shares == 0 {
        return Ok(value);
    }
    if portfolio_value <= 0 {
        return Err(VaultError::EmptyPortfolio);
    }
    mul_div(value, total_shares, portfolio_value, Rounding::Floor)
}

pub fn value_for_shares(shares: i128, total_shares: i128, portfolio_value: i128) -> Result<i128, VaultError> {
    if total_shares == 0 {
        return Ok(shares);
    }
    mul_div(shares, portfolio_value, total_shares, Rounding::Floor)
}
