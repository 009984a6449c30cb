// =============================================================================
// Redeem / Withdraw Instructions
// =============================================================================
// Burns shares and splits the owner's fraction of every value bucket:
// - idle cash is paid to `destination` immediately, minus the vault fee
// - active subject positions move to the owner's Receiver and are queued
//   for withdrawal there
// - vault units of in-flight distributors move to the owner's Receiver
//
// The Receiver is created on first use. Everything routed to it is
// collected later with claim_redeem.
//
// redeem fixes the share amount, withdraw fixes the asset value (shares
// rounded up).
//
// Either the owner signs, or the caller is the SPL delegate of the owner's
// share account. The burn consumes the delegation.
//
// Remaining accounts: every pending Distributor, the engine subject state
// of every registered subject, and the vault's and receiver's engine
// positions in each.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::Redeemed;
use crate::instructions::remaining::{load_book, store_book};
use crate::state::{Receiver, RedeemOutcome, RedeemRequest, Vault};

/// Accounts required for redeem and withdraw
#[derive(Accounts)]
pub struct RedeemFromVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Owner of the shares, or their SPL delegate. Pays for the Receiver.
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: only used as a key. Authority over the shares is checked
    /// against owner_share_account in the handler.
    pub owner: UncheckedAccount<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    /// The owner's Receiver, created on first redemption
    #[account(
        init_if_needed,
        payer = caller,
        space = 8 + Receiver::INIT_SPACE,
        seeds = [RECEIVER_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub receiver: Account<'info, Receiver>,

    // =========================================================================
    // Token Mints
    // =========================================================================

    #[account(
        constraint = asset_mint.key() == vault.asset_mint @ VaultError::InvalidAssetMint
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump = vault.share_mint_bump
    )]
    pub share_mint: Account<'info, Mint>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    /// Shares to burn
    #[account(
        mut,
        constraint = owner_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint,
        constraint = owner_share_account.owner == owner.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    /// Receives the instant part
    #[account(
        mut,
        constraint = destination.mint == asset_mint.key() @ VaultError::InvalidAssetMint
    )]
    pub destination: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub vault_assets: Account<'info, TokenAccount>,

    /// Receiver's asset account, where matured withdrawals land
    #[account(
        init_if_needed,
        payer = caller,
        token::mint = asset_mint,
        token::authority = receiver,
        seeds = [RECEIVER_ASSETS_SEED, receiver.key().as_ref()],
        bump
    )]
    pub receiver_assets: Account<'info, TokenAccount>,

    #[account(
        mut,
        address = vault.fee_treasury @ VaultError::InvalidTreasury
    )]
    pub fee_treasury: Account<'info, TokenAccount>,

    // =========================================================================
    // Programs
    // =========================================================================

    /// CHECK: must be the vault's configured staking engine
    #[account(address = vault.staking_engine @ VaultError::InvalidEngineProgram)]
    pub staking_engine: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

impl<'info> RedeemFromVault<'info> {
    /// Set up the Receiver if this is the owner's first redemption
    fn prepare_receiver(&mut self, bump: u8) {
        let vault_key = self.vault.key();
        let owner_key = self.owner.key();
        if self.receiver.initialize_if_needed(vault_key, owner_key, bump) {
            msg!("Created receiver {} for {}", self.receiver.key(), owner_key);
        }
    }

    fn request(&self, shares: u64) -> RedeemRequest {
        RedeemRequest {
            shares,
            owner_balance: self.owner_share_account.amount,
            total_supply: self.share_mint.supply,
            receiver: self.receiver.key(),
            destination: self.destination.key(),
        }
    }

    fn engine(&self, remaining: &[AccountInfo<'info>]) -> EngineCpi<'info> {
        EngineCpi::new(
            self.staking_engine.to_account_info(),
            self.token_program.to_account_info(),
            self.system_program.to_account_info(),
            self.caller.to_account_info(),
            self.vault.subject_type,
            remaining,
        )
        .with_pda(
            self.vault.to_account_info(),
            self.vault_assets.to_account_info(),
            self.vault.signer_seeds(),
        )
        .with_pda(
            self.receiver.to_account_info(),
            self.receiver_assets.to_account_info(),
            self.receiver.signer_seeds(),
        )
        .with_destination(self.destination.to_account_info())
        .with_destination(self.fee_treasury.to_account_info())
    }

    fn check_authority(&self, shares: u64) -> Result<()> {
        Vault::check_redeem_authority(
            &self.caller.key(),
            &self.owner.key(),
            Option::from(self.owner_share_account.delegate),
            self.owner_share_account.delegated_amount,
            shares,
        )
    }

    /// Burn the redeemed shares. Signed by the caller, so a delegate's
    /// allowance is consumed by the token program.
    fn burn_shares(&self, shares: u64) -> Result<()> {
        token::burn(
            CpiContext::new(
                self.token_program.to_account_info(),
                Burn {
                    mint: self.share_mint.to_account_info(),
                    from: self.owner_share_account.to_account_info(),
                    authority: self.caller.to_account_info(),
                },
            ),
            shares,
        )
    }

    fn finish(&self, shares: u64, outcome: &RedeemOutcome) -> Result<()> {
        self.burn_shares(shares)?;

        emit!(Redeemed {
            vault: self.vault.key(),
            owner: self.owner.key(),
            caller: self.caller.key(),
            receiver: self.receiver.key(),
            shares,
            instant_assets: outcome.gross,
            fee: outcome.fee,
            subjects_routed: outcome.subjects_routed,
            distributors_routed: outcome.distributors_routed,
            total_assets: self.vault.total_assets,
        });

        msg!("Redeem successful!");
        msg!("Shares burned: {}", shares);
        msg!("Instant assets: {} (fee {})", outcome.gross, outcome.fee);
        msg!(
            "Pending in receiver: {} tickets, {} distributor slices",
            self.receiver.tickets.len(),
            self.receiver.slices.len()
        );
        Ok(())
    }
}

/// Handler for the redeem instruction
///
/// # Arguments
/// * `shares` - Shares to burn
/// * `min_assets_out` - Minimum net assets paid out instantly (0 to skip)
///
/// # Returns
/// * Gross assets paid out instantly
pub fn handler_redeem<'info>(
    ctx: Context<'_, '_, '_, 'info, RedeemFromVault<'info>>,
    shares: u64,
    min_assets_out: u64,
) -> Result<u64> {
    ctx.accounts.check_authority(shares)?;
    ctx.accounts.prepare_receiver(ctx.bumps.receiver);

    let vault_key = ctx.accounts.vault.key();
    let request = ctx.accounts.request(shares);
    let mut book = load_book(
        ctx.remaining_accounts,
        &vault_key,
        &ctx.accounts.vault.pending_distributors(),
    )?;
    let mut engine = ctx.accounts.engine(ctx.remaining_accounts);

    let accounts = &mut *ctx.accounts;
    let outcome = accounts.vault.redeem(
        &mut engine,
        &vault_key,
        &mut accounts.receiver,
        &mut book,
        &request,
    )?;

    if min_assets_out > 0 {
        require!(
            outcome.net >= min_assets_out,
            VaultError::SlippageExceeded
        );
    }

    store_book(ctx.remaining_accounts, book)?;
    ctx.accounts.finish(shares, &outcome)?;
    Ok(outcome.gross)
}

/// Handler for the withdraw instruction
///
/// # Arguments
/// * `assets` - Asset value to take out across all buckets
/// * `max_shares_in` - Maximum shares to burn (slippage protection, 0 to skip)
///
/// # Returns
/// * Shares burned
pub fn handler_withdraw<'info>(
    ctx: Context<'_, '_, '_, 'info, RedeemFromVault<'info>>,
    assets: u64,
    max_shares_in: u64,
) -> Result<u64> {
    ctx.accounts.prepare_receiver(ctx.bumps.receiver);

    let vault_key = ctx.accounts.vault.key();
    let request = ctx.accounts.request(0);
    let mut book = load_book(
        ctx.remaining_accounts,
        &vault_key,
        &ctx.accounts.vault.pending_distributors(),
    )?;
    let mut engine = ctx.accounts.engine(ctx.remaining_accounts);

    let accounts = &mut *ctx.accounts;
    let (shares, outcome) = accounts.vault.withdraw(
        &mut engine,
        &vault_key,
        &mut accounts.receiver,
        &mut book,
        assets,
        &request,
    )?;

    ctx.accounts.check_authority(shares)?;
    if max_shares_in > 0 {
        require!(shares <= max_shares_in, VaultError::SlippageExceeded);
    }

    store_book(ctx.remaining_accounts, book)?;
    ctx.accounts.finish(shares, &outcome)?;
    Ok(shares)
}
