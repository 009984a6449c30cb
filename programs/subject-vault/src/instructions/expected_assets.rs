// =============================================================================
// Expected Assets View
// =============================================================================
// Read-only: what a Receiver would pay out if everything it holds matured
// at current engine rates, before the vault fee. Intended for simulation.
//
// Remaining accounts: the engine state of every ticket's subject and every
// distributor the receiver holds units of.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::instructions::remaining::load_book;
use crate::state::{Receiver, Vault};

#[derive(Accounts)]
pub struct ExpectedAssets<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [RECEIVER_SEED, vault.key().as_ref(), receiver.owner.as_ref()],
        bump = receiver.bump
    )]
    pub receiver: Account<'info, Receiver>,

    /// CHECK: must be the vault's configured staking engine
    #[account(address = vault.staking_engine @ VaultError::InvalidEngineProgram)]
    pub staking_engine: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler_expected_assets<'info>(
    ctx: Context<'_, '_, '_, 'info, ExpectedAssets<'info>>,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let receiver = &ctx.accounts.receiver;

    let keys: Vec<Pubkey> = receiver.slices.iter().map(|s| s.distributor).collect();
    let book = load_book(ctx.remaining_accounts, &vault_key, &keys)?;

    // nothing is invoked, so the receiver stands in as payer
    let engine = EngineCpi::new(
        ctx.accounts.staking_engine.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        receiver.to_account_info(),
        ctx.accounts.vault.subject_type,
        ctx.remaining_accounts,
    );

    let expected = receiver.expected_assets(&engine, &book)?;
    msg!("Receiver {} expects {}", receiver.key(), expected);
    Ok(expected)
}
