// =============================================================================
// Undelegate Instruction
// =============================================================================
// Completes a subject's pending exit once the engine lock has expired.
//
// The distributor finalizes its withdrawal at the engine (first caller
// pays the CPI), then releases the vault's remaining claim units as cash
// into the vault's asset account. Units already routed to Receivers stay
// in the distributor for their owners to collect.
//
// Permissionless: anyone may crank a matured exit.
//
// Remaining accounts: the subject's pending Distributor (writable) and its
// asset account, the subject's engine state and stake vault, and the
// vault's and distributor's engine positions.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::Undelegated;
use crate::instructions::remaining::{load_book, sign_for_distributors, store_book};
use crate::state::Vault;

#[derive(Accounts)]
pub struct Undelegate<'info> {
    /// Anyone. Pays engine rent if the finalize CPI needs it.
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub vault_assets: Account<'info, TokenAccount>,

    /// CHECK: must be the vault's configured staking engine
    #[account(address = vault.staking_engine @ VaultError::InvalidEngineProgram)]
    pub staking_engine: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for the undelegate instruction
///
/// # Arguments
/// * `subject` - Subject whose pending exit should be completed
///
/// # Returns
/// * Assets returned to vault cash
pub fn handler_undelegate<'info>(
    ctx: Context<'_, '_, '_, 'info, Undelegate<'info>>,
    subject: Pubkey,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let pending = ctx
        .accounts
        .vault
        .pending_distributor(&subject)
        .ok_or(error!(VaultError::NoPendingDistributor))?;
    let mut book = load_book(ctx.remaining_accounts, &vault_key, &[pending])?;

    let mut engine = EngineCpi::new(
        ctx.accounts.staking_engine.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.accounts.caller.to_account_info(),
        ctx.accounts.vault.subject_type,
        ctx.remaining_accounts,
    )
    .with_pda(
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.vault_assets.to_account_info(),
        ctx.accounts.vault.signer_seeds(),
    );
    sign_for_distributors(&mut engine, ctx.remaining_accounts, &book)?;

    let now = Clock::get()?.unix_timestamp;
    let vault = &mut ctx.accounts.vault;
    let received = vault.undelegate(&mut engine, &vault_key, &subject, &mut book, now)?;

    store_book(ctx.remaining_accounts, book)?;

    emit!(Undelegated {
        vault: vault_key,
        subject,
        distributor: pending,
        assets: received,
    });

    msg!("Undelegate complete for subject {}", subject);
    msg!("Assets returned to cash: {}", received);
    msg!("Vault cash: {}", vault.cash_balance);

    Ok(received)
}
