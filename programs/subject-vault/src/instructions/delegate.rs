// =============================================================================
// Delegate Instruction
// =============================================================================
// Operator stakes idle vault cash into a subject through the staking engine.
//
// The amount booked against the subject is the drop in the vault's own
// asset balance, and the subject is then revalued from the engine, so
// engine-side fees or rounding never inflate total_assets.
//
// Remaining accounts: the subject's engine state, the vault's position and
// the engine stake vault for the subject, plus the subject's pending
// Distributor if it has one.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::Delegated;
use crate::instructions::remaining::load_book;
use crate::state::Vault;

#[derive(Accounts)]
pub struct Delegate<'info> {
    /// Vault operator. Pays for the engine position on first delegation.
    #[account(
        mut,
        constraint = operator.key() == vault.operator @ VaultError::OperatorOnly
    )]
    pub operator: Signer<'info>,

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

/// Handler for the delegate instruction
///
/// # Arguments
/// * `subject` - Subject to stake into
/// * `assets` - Idle assets to stake
///
/// # Returns
/// * Engine shares minted to the vault
pub fn handler_delegate<'info>(
    ctx: Context<'_, '_, '_, 'info, Delegate<'info>>,
    subject: Pubkey,
    assets: u64,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let pending: Vec<Pubkey> = ctx
        .accounts
        .vault
        .pending_distributor(&subject)
        .into_iter()
        .collect();
    let book = load_book(ctx.remaining_accounts, &vault_key, &pending)?;

    let mut engine = EngineCpi::new(
        ctx.accounts.staking_engine.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.accounts.operator.to_account_info(),
        ctx.accounts.vault.subject_type,
        ctx.remaining_accounts,
    )
    .with_pda(
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.vault_assets.to_account_info(),
        ctx.accounts.vault.signer_seeds(),
    );

    let vault = &mut ctx.accounts.vault;
    let outcome = vault.delegate(&mut engine, &vault_key, &subject, assets, &book)?;

    emit!(Delegated {
        vault: vault_key,
        subject,
        assets: outcome.assets,
        engine_shares: outcome.engine_shares,
    });

    msg!("Delegated {} assets to subject {}", outcome.assets, subject);
    msg!("Engine shares minted: {}", outcome.engine_shares);
    msg!("Remaining cash: {}", vault.cash_balance);
    msg!("Registered subjects: {}", vault.subjects.len());

    Ok(outcome.engine_shares)
}
