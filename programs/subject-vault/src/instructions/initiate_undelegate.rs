// =============================================================================
// Initiate Undelegate Instruction
// =============================================================================
// Operator starts unwinding part of the vault's position in a subject.
//
// A fresh Distributor PDA is created for the exit, the requested active
// engine shares move from the vault to it, and the distributor queues them
// for withdrawal at the engine. Until maturity the subject's entry carries
// the distributor, so the in-flight value keeps counting toward
// total_assets and redeemers can take their cut of it.
//
// Distributor addresses include the vault's running nonce, so an address
// is never reused even after an earlier exit has been fully paid out.
//
// Remaining accounts: the subject's engine state and stake vault, the
// vault's and the new distributor's engine positions.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::UndelegationInitiated;
use crate::state::{Distributor, Vault};

#[derive(Accounts)]
#[instruction(subject: Pubkey)]
pub struct InitiateUndelegate<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Vault operator. Pays rent for the distributor and its asset account.
    #[account(
        mut,
        constraint = operator.key() == vault.operator @ VaultError::OperatorOnly
    )]
    pub operator: Signer<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        payer = operator,
        space = 8 + Distributor::INIT_SPACE,
        seeds = [
            DISTRIBUTOR_SEED,
            vault.key().as_ref(),
            subject.as_ref(),
            &vault.distributor_nonce.to_le_bytes()
        ],
        bump
    )]
    pub distributor: Account<'info, Distributor>,

    /// Where the engine pays out when the distributor finalizes
    #[account(
        init,
        payer = operator,
        token::mint = asset_mint,
        token::authority = distributor,
        seeds = [DISTRIBUTOR_ASSETS_SEED, distributor.key().as_ref()],
        bump
    )]
    pub distributor_assets: Account<'info, TokenAccount>,

    #[account(
        constraint = asset_mint.key() == vault.asset_mint @ VaultError::InvalidAssetMint
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub vault_assets: Account<'info, TokenAccount>,

    // =========================================================================
    // Programs
    // =========================================================================

    /// CHECK: must be the vault's configured staking engine
    #[account(address = vault.staking_engine @ VaultError::InvalidEngineProgram)]
    pub staking_engine: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Returned to the caller so clients can track the exit
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndelegationStarted {
    pub distributor: Pubkey,
    pub deadline: i64,
}

/// Handler for the initiate_undelegate instruction
///
/// # Arguments
/// * `subject` - Subject to unwind from
/// * `shares` - Active engine shares to move into the distributor
pub fn handler_initiate_undelegate<'info>(
    ctx: Context<'_, '_, '_, 'info, InitiateUndelegate<'info>>,
    subject: Pubkey,
    shares: u64,
) -> Result<UndelegationStarted> {
    let vault_key = ctx.accounts.vault.key();
    let distributor_key = ctx.accounts.distributor.key();
    let distributor_bump = ctx.bumps.distributor;
    let nonce = ctx.accounts.vault.distributor_nonce;

    // the distributor account is still zeroed, so its seeds are built here
    let distributor_seeds = vec![
        DISTRIBUTOR_SEED.to_vec(),
        vault_key.to_bytes().to_vec(),
        subject.to_bytes().to_vec(),
        nonce.to_le_bytes().to_vec(),
        vec![distributor_bump],
    ];

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
    )
    .with_pda(
        ctx.accounts.distributor.to_account_info(),
        ctx.accounts.distributor_assets.to_account_info(),
        distributor_seeds,
    );

    let accounts = &mut *ctx.accounts;
    let deadline = accounts.vault.initiate_undelegate(
        &mut engine,
        &vault_key,
        &subject,
        shares,
        &distributor_key,
        &mut accounts.distributor,
        distributor_bump,
    )?;

    emit!(UndelegationInitiated {
        vault: vault_key,
        subject,
        distributor: distributor_key,
        shares: accounts.distributor.locked_shares,
        deadline,
    });

    msg!("Undelegation initiated for subject {}", subject);
    msg!("Distributor: {}", distributor_key);
    msg!("Inactive shares locked: {}", accounts.distributor.locked_shares);
    msg!("Matures at: {}", deadline);

    Ok(UndelegationStarted {
        distributor: distributor_key,
        deadline,
    })
}
