//! Fixed-point helpers.
//!
//! Ratios are integers in parts-per-hundred-thousand (ppm). Values are USD with
//! 7 decimals, the same scale the price oracle quotes in. Every division
//! truncates unless the caller explicitly asks for a ceiling.

use crate::errors::VaultError;

/// 100% expressed in parts-per-hundred-thousand.
pub const PPM: u32 = 100_000;

/// Decimals of the value unit and of vault shares.
pub const VALUE_DECIMALS: u32 = 7;

/// One whole value unit (1 USD) or one whole share.
pub const VALUE_SCALE: i128 = 10_000_000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// Computes `value * numerator / denominator` with checked intermediate math.
///
/// All operands are amounts or ratios and must be non-negative.
pub fn mul_div(
    value: i128,
    numerator: i128,
    denominator: i128,
    rounding: Rounding,
) -> Result<i128, VaultError> {
    if denominator <= 0 {
        return Err(VaultError::DivisionByZero);
    }
    if value < 0 || numerator < 0 {
        return Err(VaultError::OutOfRange);
    }

    let product = value
        .checked_mul(numerator)
        .ok_or(VaultError::MathOverflow)?;

    match rounding {
        Rounding::Floor => Ok(product / denominator),
        Rounding::Ceil => Ok(product
            .checked_add(denominator - 1)
            .ok_or(VaultError::MathOverflow)?
            / denominator),
    }
}

/// Applies a ppm ratio to `value`, rounding down.
pub fn apply_ppm(value: i128, ratio: u32) -> Result<i128, VaultError> {
    mul_div(value, ratio as i128, PPM as i128, Rounding::Floor)
}

/// Adds `ratio` ppm of headroom on top of `value`, rounding the headroom up.
pub fn with_headroom(value: i128, ratio: u32) -> Result<i128, VaultError> {
    let headroom = mul_div(value, ratio as i128, PPM as i128, Rounding::Ceil)?;
    value.checked_add(headroom).ok_or(VaultError::MathOverflow)
}

pub fn pow10(decimals: u32) -> Result<i128, VaultError> {
    10i128
        .checked_pow(decimals)
        .ok_or(VaultError::MathOverflow)
}

/// Value of `amount` raw token units at `price` (value per whole token).
pub fn amount_to_value(
    amount: i128,
    price: i128,
    decimals: u32,
    rounding: Rounding,
) -> Result<i128, VaultError> {
    mul_div(amount, price, pow10(decimals)?, rounding)
}

/// Raw token units worth `value` at `price`.
pub fn value_to_amount(
    value: i128,
    price: i128,
    decimals: u32,
    rounding: Rounding,
) -> Result<i128, VaultError> {
    if price <= 0 {
        return Err(VaultError::InvalidPrice);
    }
    mul_div(value, pow10(decimals)?, price, rounding)
}

/// `|a - b| * PPM / total`, the deviation of `a` from `b` relative to `total`.
pub fn deviation_ppm(a: i128, b: i128, total: i128) -> Result<i128, VaultError> {
    let gap = if a > b { a - b } else { b - a };
    mul_div(gap, PPM as i128, total, Rounding::Floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Floor).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Floor).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_ceil() {
        assert_eq!(mul_div(100, 3, 2, Rounding::Ceil).unwrap(), 150);
        assert_eq!(mul_div(100, 1, 3, Rounding::Ceil).unwrap(), 34);
    }

    #[test]
    fn test_mul_div_rejects_bad_operands() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Floor), Err(VaultError::DivisionByZero));
        assert_eq!(mul_div(-1, 1, 1, Rounding::Floor), Err(VaultError::OutOfRange));
        assert_eq!(
            mul_div(i128::MAX, 2, 1, Rounding::Floor),
            Err(VaultError::MathOverflow)
        );
    }

    #[test]
    fn test_ppm_helpers() {
        assert_eq!(apply_ppm(1_000, 20_000).unwrap(), 200);
        assert_eq!(apply_ppm(999, 50_000).unwrap(), 499);
        // headroom rounds up so a bound never under-covers
        assert_eq!(with_headroom(1_000, 1_000).unwrap(), 1_010);
        assert_eq!(with_headroom(1, 1_000).unwrap(), 2);
    }

    #[test]
    fn test_value_conversion() {
        // 30 tokens at 0.9998 USD
        let value = amount_to_value(300_000_000, 9_998_000, 7, Rounding::Floor).unwrap();
        assert_eq!(value, 299_940_000);
        assert_eq!(
            value_to_amount(value, 9_998_000, 7, Rounding::Floor).unwrap(),
            300_000_000
        );
        assert_eq!(
            value_to_amount(1, 0, 7, Rounding::Floor),
            Err(VaultError::InvalidPrice)
        );
    }

    #[test]
    fn test_deviation_is_symmetric() {
        assert_eq!(deviation_ppm(60, 40, 100).unwrap(), 20_000);
        assert_eq!(deviation_ppm(40, 60, 100).unwrap(), 20_000);
        assert_eq!(deviation_ppm(40, 40, 100).unwrap(), 0);
    }
}
