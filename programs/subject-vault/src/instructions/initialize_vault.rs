// =============================================================================
// Initialize Vault Instruction
// =============================================================================
// Creates a vault for one asset mint, together with its share mint and the
// PDA token account that holds idle cash.
//
// The share mint uses the asset's decimals so one share is worth one base
// unit while the vault is empty. The admin starts out as operator and can
// hand the role over with update_operator.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::VaultInitialized;
use crate::state::Vault;

/// Accounts required for the initialize_vault instruction.
#[derive(Accounts)]
pub struct InitializeVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Stored as vault.admin and vault.operator
    #[account(mut)]
    pub admin: Signer<'info>,

    // =========================================================================
    // Vault Account (PDA - created by this instruction)
    // =========================================================================

    #[account(
        init,
        payer = admin,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    // =========================================================================
    // Token Mints
    // =========================================================================

    /// The pooled asset
    pub asset_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub share_mint: Account<'info, Mint>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    /// Holds cash_balance
    #[account(
        init,
        payer = admin,
        token::mint = asset_mint,
        token::authority = vault,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_assets: Account<'info, TokenAccount>,

    /// Fee destination. An existing token account for the asset.
    #[account(
        constraint = fee_treasury.mint == asset_mint.key() @ VaultError::InvalidTreasury
    )]
    pub fee_treasury: Account<'info, TokenAccount>,

    // =========================================================================
    // External Engines
    // =========================================================================

    /// CHECK: staking engine program, stored and enforced on every engine call
    #[account(executable)]
    pub staking_engine: UncheckedAccount<'info>,

    /// CHECK: rewards engine program, stored and enforced on claim_rewards
    #[account(executable)]
    pub rewards_engine: UncheckedAccount<'info>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler function for initialize_vault
///
/// # Arguments
/// * `subject_type` - Subject category passed through to both engines
/// * `fee_bps` - Fee on asset payouts, at most MAX_FEE_BPS
pub fn handler_initialize_vault(
    ctx: Context<InitializeVault>,
    subject_type: u8,
    fee_bps: u16,
) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    // =========================================================================
    // Roles and account references
    // =========================================================================

    vault.admin = ctx.accounts.admin.key();
    vault.operator = ctx.accounts.admin.key();
    vault.asset_mint = ctx.accounts.asset_mint.key();
    vault.share_mint = ctx.accounts.share_mint.key();
    vault.asset_account = ctx.accounts.vault_assets.key();
    vault.staking_engine = ctx.accounts.staking_engine.key();
    vault.rewards_engine = ctx.accounts.rewards_engine.key();
    vault.subject_type = subject_type;

    // =========================================================================
    // Fee configuration
    // =========================================================================

    vault.set_fee_bps(fee_bps)?;
    vault.set_fee_treasury(ctx.accounts.fee_treasury.key())?;

    // =========================================================================
    // Ledger
    // =========================================================================

    vault.total_assets = 0;
    vault.cash_balance = 0;
    vault.distributor_nonce = 0;
    vault.subjects = Vec::new();
    vault.subject_index = Vec::new();

    vault.bump = ctx.bumps.vault;
    vault.share_mint_bump = ctx.bumps.share_mint;
    vault.asset_account_bump = ctx.bumps.vault_assets;

    emit!(VaultInitialized {
        vault: vault.key(),
        admin: vault.admin,
        asset_mint: vault.asset_mint,
        share_mint: vault.share_mint,
        staking_engine: vault.staking_engine,
        rewards_engine: vault.rewards_engine,
        subject_type,
        fee_bps,
    });

    msg!("Subject vault initialized successfully!");
    msg!("Vault: {}", vault.key());
    msg!("Asset Mint: {}", vault.asset_mint);
    msg!("Share Mint: {}", vault.share_mint);
    msg!("Staking Engine: {}", vault.staking_engine);
    msg!("Rewards Engine: {}", vault.rewards_engine);
    msg!("Fee: {} bps to {}", vault.fee_bps, vault.fee_treasury);

    Ok(())
}
