// =============================================================================
// Sync Instruction
// =============================================================================
// Permissionless full reconcile: absorbs stray cash and revalues every
// registered subject from the engine. Subjects left with nothing and no
// exit in flight drop out of the registry.
//
// Remaining accounts: every pending Distributor, plus the engine subject
// state and vault position of every registered subject.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::Synced;
use crate::instructions::remaining::load_book;
use crate::state::Vault;

#[derive(Accounts)]
pub struct SyncVault<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
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

/// Handler for the sync instruction
///
/// # Returns
/// * total_assets after reconciling
pub fn handler_sync<'info>(ctx: Context<'_, '_, '_, 'info, SyncVault<'info>>) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let book = load_book(
        ctx.remaining_accounts,
        &vault_key,
        &ctx.accounts.vault.pending_distributors(),
    )?;

    let engine = EngineCpi::new(
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

    let vault = &mut ctx.accounts.vault;
    let before = vault.total_assets;
    vault.reconcile(&engine, &vault_key, &book)?;

    emit!(Synced {
        vault: vault_key,
        total_assets: vault.total_assets,
        cash_balance: vault.cash_balance,
        subjects: vault.subjects.len() as u32,
    });

    msg!("Synced: total assets {} -> {}", before, vault.total_assets);
    Ok(vault.total_assets)
}
