use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::error::VaultError;

/// floor(amount * numerator / denominator) with a u128 intermediate
pub fn mul_div(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);
    let value = (amount as u128)
        .checked_mul(numerator as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        / (denominator as u128);
    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// ceil(amount * numerator / denominator)
pub fn mul_div_ceil(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    require!(denominator > 0, VaultError::DivisionByZero);
    let product = (amount as u128)
        .checked_mul(numerator as u128)
        .ok_or(error!(VaultError::MathOverflow))?;
    let value = product.div_ceil(denominator as u128);
    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// Split a gross amount into (net, fee). fee = floor(gross * fee_bps / 10000),
/// net takes the remainder so net + fee == gross exactly.
pub fn split_fee(gross: u64, fee_bps: u16) -> Result<(u64, u64)> {
    let fee = mul_div(gross, fee_bps as u64, BPS_DENOMINATOR as u64)?;
    let net = gross
        .checked_sub(fee)
        .ok_or(error!(VaultError::MathUnderflow))?;
    Ok((net, fee))
}

/// Apply a signed change observed between two readings of the same value
pub fn apply_delta(total: u64, before: u64, after: u64) -> Result<u64> {
    if after >= before {
        total
            .checked_add(after - before)
            .ok_or(error!(VaultError::MathOverflow))
    } else {
        total
            .checked_sub(before - after)
            .ok_or(error!(VaultError::MathUnderflow))
    }
}
