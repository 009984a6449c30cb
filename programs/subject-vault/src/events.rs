// =============================================================================
// Events
// =============================================================================
// Emitted with emit! at the end of every state-changing instruction so
// indexers can follow the ledger without replaying logs.
// =============================================================================

use anchor_lang::prelude::*;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub admin: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub staking_engine: Pubkey,
    pub rewards_engine: Pubkey,
    pub subject_type: u8,
    pub fee_bps: u16,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub total_assets: u64,
}

#[event]
pub struct Redeemed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub shares: u64,
    /// Cash part before fee
    pub instant_assets: u64,
    pub fee: u64,
    pub subjects_routed: u32,
    pub distributors_routed: u32,
    pub total_assets: u64,
}

#[event]
pub struct Delegated {
    pub vault: Pubkey,
    pub subject: Pubkey,
    pub assets: u64,
    pub engine_shares: u64,
}

#[event]
pub struct UndelegationInitiated {
    pub vault: Pubkey,
    pub subject: Pubkey,
    pub distributor: Pubkey,
    pub shares: u64,
    pub deadline: i64,
}

#[event]
pub struct Undelegated {
    pub vault: Pubkey,
    pub subject: Pubkey,
    pub distributor: Pubkey,
    pub assets: u64,
}

#[event]
pub struct RedeemClaimed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub gross: u64,
    pub fee: u64,
}

#[event]
pub struct RewardsClaimed {
    pub vault: Pubkey,
    pub subject: Pubkey,
    pub epochs: u32,
    pub absorbed: u64,
}

#[event]
pub struct Synced {
    pub vault: Pubkey,
    pub total_assets: u64,
    pub cash_balance: u64,
    pub subjects: u32,
}

#[event]
pub struct FeeConfigUpdated {
    pub vault: Pubkey,
    pub fee_bps: u16,
    pub fee_treasury: Pubkey,
}

#[event]
pub struct OperatorUpdated {
    pub vault: Pubkey,
    pub old_operator: Pubkey,
    pub new_operator: Pubkey,
}

#[event]
pub struct AdminTransferred {
    pub vault: Pubkey,
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
}
