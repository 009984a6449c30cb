// =============================================================================
// Admin Instructions
// =============================================================================
// Administrative functions that only the vault admin can call:
// - fee rate and fee treasury
// - operator rotation
// - admin handover
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::VaultError;
use crate::events::{AdminTransferred, FeeConfigUpdated, OperatorUpdated};
use crate::state::Vault;

/// Accounts shared by admin instructions that only touch the vault
#[derive(Accounts)]
pub struct AdminOnly<'info> {
    /// The admin must sign
    #[account(
        constraint = admin.key() == vault.admin @ VaultError::AdminOnly
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,
}

// =============================================================================
// Fee Configuration
// =============================================================================

/// Handler for set_fee_bps instruction
///
/// # Arguments
/// * `fee_bps` - New fee on instant redemptions and claims, at most MAX_FEE_BPS
pub fn handler_set_fee_bps(ctx: Context<AdminOnly>, fee_bps: u16) -> Result<()> {
    let vault = &mut ctx.accounts.vault;
    let old_fee = vault.fee_bps;
    vault.set_fee_bps(fee_bps)?;

    emit!(FeeConfigUpdated {
        vault: vault.key(),
        fee_bps,
        fee_treasury: vault.fee_treasury,
    });

    msg!("Fee updated: {} bps -> {} bps", old_fee, fee_bps);
    Ok(())
}

/// Accounts required for set_fee_treasury instruction
#[derive(Accounts)]
pub struct SetFeeTreasury<'info> {
    #[account(
        constraint = admin.key() == vault.admin @ VaultError::AdminOnly
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    /// New treasury. Must hold the vault asset.
    #[account(
        constraint = fee_treasury.mint == vault.asset_mint @ VaultError::InvalidTreasury
    )]
    pub fee_treasury: Account<'info, TokenAccount>,
}

/// Handler for set_fee_treasury instruction
pub fn handler_set_fee_treasury(ctx: Context<SetFeeTreasury>) -> Result<()> {
    let treasury = ctx.accounts.fee_treasury.key();
    let vault = &mut ctx.accounts.vault;
    let old_treasury = vault.fee_treasury;
    vault.set_fee_treasury(treasury)?;

    emit!(FeeConfigUpdated {
        vault: vault.key(),
        fee_bps: vault.fee_bps,
        fee_treasury: treasury,
    });

    msg!("Fee treasury updated: {} -> {}", old_treasury, treasury);
    Ok(())
}

// =============================================================================
// Roles
// =============================================================================

/// Handler for update_operator instruction
///
/// # Arguments
/// * `new_operator` - Key allowed to delegate, undelegate and claim rewards
pub fn handler_update_operator(ctx: Context<AdminOnly>, new_operator: Pubkey) -> Result<()> {
    require!(new_operator != Pubkey::default(), VaultError::InvalidAddress);

    let vault = &mut ctx.accounts.vault;
    let old_operator = vault.operator;
    vault.operator = new_operator;

    emit!(OperatorUpdated {
        vault: vault.key(),
        old_operator,
        new_operator,
    });

    msg!("Operator updated: {} -> {}", old_operator, new_operator);
    Ok(())
}

/// Handler for transfer_admin instruction
///
/// Takes effect immediately. The new admin does not need to sign.
pub fn handler_transfer_admin(ctx: Context<AdminOnly>, new_admin: Pubkey) -> Result<()> {
    require!(new_admin != Pubkey::default(), VaultError::InvalidAddress);

    let vault = &mut ctx.accounts.vault;
    let old_admin = vault.admin;
    vault.admin = new_admin;

    emit!(AdminTransferred {
        vault: vault.key(),
        old_admin,
        new_admin,
    });

    msg!("Admin transferred: {} -> {}", old_admin, new_admin);
    Ok(())
}
