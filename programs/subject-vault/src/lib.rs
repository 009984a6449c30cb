// =============================================================================
// Subject Vault - Pooled Staking Vault with Isolated Redemptions
// =============================================================================
//
// Depositors pool a single asset and receive vault shares. An operator
// stakes the pooled assets into subjects through an external staking
// engine. Redeeming burns shares and pays out the owner's fraction of
// every value bucket at once:
// - idle cash immediately (minus the vault fee)
// - active subject positions, queued for withdrawal in the owner's own
//   Receiver
// - in-flight undelegations, as claim units on the subject's Distributor
//
// Locked value is never parked in a shared pool, so one depositor's exit
// cannot be delayed or diluted by another's.
// =============================================================================

pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use error::*;
pub use instructions::*;
pub use state::*;

declare_id!("EbFymW8nrgA38tetfBYVwkvhexT2SNfDDbnuxjxugUo5");

#[program]
pub mod subject_vault {
    use super::*;

    // =========================================================================
    // Vault Initialization
    // =========================================================================

    /// Initialize a vault for one asset mint
    ///
    /// Creates:
    /// - Vault account (ledger and configuration)
    /// - Share mint (same decimals as the asset)
    /// - Vault asset account (holds idle cash)
    ///
    /// Can only be called once per asset mint
    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        subject_type: u8,
        fee_bps: u16,
    ) -> Result<()> {
        instructions::initialize_vault::handler_initialize_vault(ctx, subject_type, fee_bps)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Deposit assets and receive shares
    ///
    /// # Arguments
    /// * `assets` - Amount of the vault asset to deposit (in base units)
    /// * `min_shares_out` - Minimum shares to receive (slippage protection, 0 to skip)
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, DepositToVault<'info>>,
        assets: u64,
        min_shares_out: u64,
    ) -> Result<u64> {
        instructions::deposit::handler_deposit(ctx, assets, min_shares_out)
    }

    /// Mint an exact number of shares, pulling whatever assets they cost
    pub fn mint<'info>(
        ctx: Context<'_, '_, '_, 'info, DepositToVault<'info>>,
        shares: u64,
        max_assets_in: u64,
    ) -> Result<u64> {
        instructions::deposit::handler_mint(ctx, shares, max_assets_in)
    }

    /// Burn shares for their fraction of cash, active positions and
    /// in-flight undelegations
    ///
    /// Cash is paid out now. Everything else moves into the owner's
    /// Receiver and is collected with claim_redeem.
    pub fn redeem<'info>(
        ctx: Context<'_, '_, '_, 'info, RedeemFromVault<'info>>,
        shares: u64,
        min_assets_out: u64,
    ) -> Result<u64> {
        instructions::withdraw::handler_redeem(ctx, shares, min_assets_out)
    }

    /// Same as redeem, sized by asset value instead of shares
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, RedeemFromVault<'info>>,
        assets: u64,
        max_shares_in: u64,
    ) -> Result<u64> {
        instructions::withdraw::handler_withdraw(ctx, assets, max_shares_in)
    }

    /// Collect matured withdrawals and distributor payouts from the
    /// caller's Receiver
    pub fn claim_redeem<'info>(
        ctx: Context<'_, '_, '_, 'info, ClaimRedeem<'info>>,
    ) -> Result<u64> {
        instructions::claim_redeem::handler_claim_redeem(ctx)
    }

    /// What a Receiver would pay out at current engine rates (view)
    pub fn get_expected_assets<'info>(
        ctx: Context<'_, '_, '_, 'info, ExpectedAssets<'info>>,
    ) -> Result<u64> {
        instructions::expected_assets::handler_expected_assets(ctx)
    }

    /// Reconcile the ledger against the vault's balance and engine positions
    pub fn sync<'info>(ctx: Context<'_, '_, '_, 'info, SyncVault<'info>>) -> Result<u64> {
        instructions::sync::handler_sync(ctx)
    }

    // =========================================================================
    // Operator Operations
    // =========================================================================

    /// Stake idle assets into a subject
    pub fn delegate<'info>(
        ctx: Context<'_, '_, '_, 'info, Delegate<'info>>,
        subject: Pubkey,
        assets: u64,
    ) -> Result<u64> {
        instructions::delegate::handler_delegate(ctx, subject, assets)
    }

    /// Start unwinding part of a subject position into a new Distributor
    ///
    /// One exit per subject may be in flight at a time.
    pub fn initiate_undelegate<'info>(
        ctx: Context<'_, '_, '_, 'info, InitiateUndelegate<'info>>,
        subject: Pubkey,
        shares: u64,
    ) -> Result<UndelegationStarted> {
        instructions::initiate_undelegate::handler_initiate_undelegate(ctx, subject, shares)
    }

    /// Complete a matured exit and return the vault's part to cash
    pub fn undelegate<'info>(
        ctx: Context<'_, '_, '_, 'info, Undelegate<'info>>,
        subject: Pubkey,
    ) -> Result<u64> {
        instructions::undelegate::handler_undelegate(ctx, subject)
    }

    /// Claim staking rewards for a subject into vault cash
    pub fn claim_rewards<'info>(
        ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
        subject: Pubkey,
        epochs: Vec<u64>,
    ) -> Result<u64> {
        instructions::rewards::handler_claim_rewards(ctx, subject, epochs)
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Set the fee charged on asset payouts
    pub fn set_fee_bps(ctx: Context<AdminOnly>, fee_bps: u16) -> Result<()> {
        instructions::admin::handler_set_fee_bps(ctx, fee_bps)
    }

    /// Point fees at a new treasury token account
    pub fn set_fee_treasury(ctx: Context<SetFeeTreasury>) -> Result<()> {
        instructions::admin::handler_set_fee_treasury(ctx)
    }

    /// Replace the operator
    pub fn update_operator(ctx: Context<AdminOnly>, new_operator: Pubkey) -> Result<()> {
        instructions::admin::handler_update_operator(ctx, new_operator)
    }

    /// Hand the admin role to another key
    pub fn transfer_admin(ctx: Context<AdminOnly>, new_admin: Pubkey) -> Result<()> {
        instructions::admin::handler_transfer_admin(ctx, new_admin)
    }
}
