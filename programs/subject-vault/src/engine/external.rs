// EXTERNAL state, owned by the staking engine program.
// Only the prefix we read is mirrored here; trailing fields are ignored by
// the borsh reader.

use anchor_lang::prelude::*;

use crate::error::VaultError;
use crate::math::mul_div;

/// Engine per-subject totals.
/// PDA (engine program): ["subject", subject_type, subject]
#[derive(Clone, Debug, AnchorSerialize, AnchorDeserialize, PartialEq)]
pub struct EngineSubjectState {
    pub discriminator: [u8; 8],

    pub subject_type: u8,

    pub subject: Pubkey,

    /// invariant: total_active_stake backs total_active_shares
    pub total_active_shares: u64,
    pub total_active_stake: u64,

    /// shares queued for withdrawal and the stake still backing them
    pub total_inactive_shares: u64,
    pub total_inactive_stake: u64,

    /// seconds between initiate_withdrawal and withdraw
    pub withdrawal_delay: i64,

    /// set by the engine when the subject is under investigation;
    /// no withdrawals complete while frozen
    pub frozen: bool,
}

impl EngineSubjectState {
    pub fn active_shares_to_stake(&self, shares: u64) -> Result<u64> {
        if self.total_active_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, self.total_active_stake, self.total_active_shares)
    }

    pub fn inactive_shares_to_stake(&self, shares: u64) -> Result<u64> {
        if self.total_inactive_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, self.total_inactive_stake, self.total_inactive_shares)
    }
}

/// Engine per-holder position in one subject.
/// PDA (engine program): ["position", subject, holder]
#[derive(Clone, Debug, Default, AnchorSerialize, AnchorDeserialize, PartialEq)]
pub struct EnginePosition {
    pub discriminator: [u8; 8],

    pub subject: Pubkey,

    pub holder: Pubkey,

    pub active_shares: u64,

    pub inactive_shares: u64,

    /// unlock time of the queued withdrawal, 0 when nothing is queued
    pub withdrawal_deadline: i64,
}

/// deserialize an engine-owned account
pub fn deserialize<T: AnchorDeserialize>(info: &AccountInfo) -> Result<T> {
    let data = info.try_borrow_data()?;
    let mut data_slice = &data[..];
    T::deserialize(&mut data_slice).map_err(|_err| error!(VaultError::InvalidEngineAccount))
}

/// Position accounts are created lazily by the engine; an unallocated one
/// reads as an empty position.
pub fn deserialize_position(info: &AccountInfo) -> Result<EnginePosition> {
    if info.data_is_empty() {
        return Ok(EnginePosition::default());
    }
    deserialize(info)
}
