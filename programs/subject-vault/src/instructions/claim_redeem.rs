// =============================================================================
// Claim Redeem Instruction
// =============================================================================
// Owner collects what their Receiver holds from earlier redemptions:
// - matured engine withdrawals queued in the receiver's own name
// - the receiver's units of matured distributors
//
// Everything collected lands in the receiver's asset account first and is
// then paid to `destination` minus the vault fee. Items that are still
// locked (or frozen) are skipped, so a partial or early claim is fine.
//
// Remaining accounts: the receiver's engine positions and each subject's
// engine state and stake vault, plus any distributors (writable) and their
// asset accounts the owner wants to settle now.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::RedeemClaimed;
use crate::instructions::remaining::{load_available, sign_for_distributors, store_book};
use crate::state::{Receiver, Vault};

#[derive(Accounts)]
pub struct ClaimRedeem<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    #[account(mut)]
    pub owner: Signer<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [RECEIVER_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump = receiver.bump,
        constraint = receiver.owner == owner.key() @ VaultError::Unauthorized
    )]
    pub receiver: Account<'info, Receiver>,

    #[account(
        mut,
        seeds = [RECEIVER_ASSETS_SEED, receiver.key().as_ref()],
        bump
    )]
    pub receiver_assets: Account<'info, TokenAccount>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    #[account(
        mut,
        constraint = destination.mint == vault.asset_mint @ VaultError::InvalidAssetMint
    )]
    pub destination: Account<'info, TokenAccount>,

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

/// Handler for the claim_redeem instruction
///
/// # Returns
/// * Gross assets collected (before fee). Zero when nothing has matured.
pub fn handler_claim_redeem<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimRedeem<'info>>,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let owner_key = ctx.accounts.owner.key();
    let receiver_key = ctx.accounts.receiver.key();
    let destination_key = ctx.accounts.destination.key();
    let treasury_key = ctx.accounts.fee_treasury.key();
    let fee_bps = ctx.accounts.vault.fee_bps;

    let wanted: Vec<Pubkey> = ctx
        .accounts
        .receiver
        .slices
        .iter()
        .map(|s| s.distributor)
        .collect();
    let mut book = load_available(ctx.remaining_accounts, &vault_key, &wanted)?;

    let mut engine = EngineCpi::new(
        ctx.accounts.staking_engine.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.vault.subject_type,
        ctx.remaining_accounts,
    )
    .with_pda(
        ctx.accounts.receiver.to_account_info(),
        ctx.accounts.receiver_assets.to_account_info(),
        ctx.accounts.receiver.signer_seeds(),
    )
    .with_destination(ctx.accounts.destination.to_account_info())
    .with_destination(ctx.accounts.fee_treasury.to_account_info());
    sign_for_distributors(&mut engine, ctx.remaining_accounts, &book)?;

    let now = Clock::get()?.unix_timestamp;
    let receiver = &mut ctx.accounts.receiver;
    let outcome = receiver.claim(
        &mut engine,
        &receiver_key,
        &mut book,
        &destination_key,
        fee_bps,
        &treasury_key,
        now,
    )?;

    store_book(ctx.remaining_accounts, book)?;

    if outcome.gross > 0 {
        emit!(RedeemClaimed {
            vault: vault_key,
            owner: owner_key,
            receiver: receiver_key,
            gross: outcome.gross,
            fee: outcome.fee,
        });
    }

    msg!("Claimed {} (fee {})", outcome.gross, outcome.fee);
    msg!(
        "Settled {} tickets and {} distributor slices",
        outcome.tickets_settled,
        outcome.slices_settled
    );
    msg!(
        "Still pending: {} tickets, {} slices",
        receiver.tickets.len(),
        receiver.slices.len()
    );

    Ok(outcome.gross)
}
