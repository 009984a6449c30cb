// =============================================================================
// External Collaborators
// =============================================================================
// The vault never trusts an amount reported by a counterparty. Every value
// movement is confirmed by reading balances or share positions before and
// after the call, so these traits expose reads alongside the mutations.
//
// cpi.rs implements them over cross-program invocations, mock.rs over
// in-memory maps for unit tests.
// =============================================================================

use anchor_lang::prelude::*;

pub mod cpi;
pub mod external;

#[cfg(test)]
pub mod mock;

pub use cpi::*;

/// The single underlying asset, addressed by holder (the PDA or wallet that
/// owns the token account).
pub trait AssetBank {
    /// Current asset balance held by `holder`
    fn balance_of(&self, holder: &Pubkey) -> Result<u64>;

    /// Move `amount` from `from` to `to`. `from` must be a signer or a PDA
    /// the caller can sign for.
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
}

/// The external staking engine that holds subject positions.
pub trait StakingEngine {
    /// Stake `amount` of `holder`'s assets into `subject`, returns shares minted
    fn deposit(&mut self, holder: &Pubkey, subject: &Pubkey, amount: u64) -> Result<u64>;

    /// Move `shares` of `holder`'s active position into the withdrawal queue.
    /// Requests from the same holder accumulate and restart the delay.
    /// Returns the unlock deadline.
    fn initiate_withdrawal(&mut self, holder: &Pubkey, subject: &Pubkey, shares: u64) -> Result<i64>;

    /// Pay out everything `holder` has queued for `subject`, returns assets paid
    fn withdraw(&mut self, holder: &Pubkey, subject: &Pubkey) -> Result<u64>;

    /// Active (earning) shares held by `holder` in `subject`
    fn active_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64>;

    /// Inactive (exiting) shares held by `holder` in `subject`
    fn inactive_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64>;

    fn active_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64>;

    fn inactive_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64>;

    fn is_frozen(&self, subject: &Pubkey) -> Result<bool>;

    /// Transfer active position shares between holders
    fn transfer_active_shares(
        &mut self,
        subject: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        shares: u64,
    ) -> Result<()>;
}

/// The external rewards engine. Rewards land in the holder's asset account
/// and are picked up by the next reconcile.
pub trait RewardsEngine {
    fn claim_rewards(&mut self, holder: &Pubkey, subject: &Pubkey, epochs: &[u64]) -> Result<()>;
}
