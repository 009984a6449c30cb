// =============================================================================
// Deposit / Mint Instructions
// =============================================================================
// Users deposit the vault asset and receive share tokens.
//
// Flow:
// 1. Reconcile the ledger (donations, yield, slashing since the last call)
// 2. Transfer assets user -> vault, measured as the vault's balance delta
// 3. Price shares against total_assets before the deposit
// 4. Mint shares to the user
//
// deposit fixes the asset amount, mint fixes the share amount (assets
// rounded up).
//
// Remaining accounts: every pending Distributor, plus the engine subject
// state and vault position of every registered subject.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::events::Deposited;
use crate::instructions::remaining::load_book;
use crate::state::{DepositOutcome, Vault};

/// Accounts required for deposit and mint
#[derive(Accounts)]
pub struct DepositToVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// The user depositing assets
    #[account(mut)]
    pub depositor: Signer<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.asset_mint.as_ref()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

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

    /// User's asset account (source of funds)
    #[account(
        mut,
        constraint = user_asset_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = user_asset_account.owner == depositor.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// User's share account (destination for minted shares)
    #[account(
        mut,
        constraint = user_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint
    )]
    pub user_share_account: Account<'info, TokenAccount>,

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

impl<'info> DepositToVault<'info> {
    fn engine(&self, remaining: &[AccountInfo<'info>]) -> EngineCpi<'info> {
        EngineCpi::new(
            self.staking_engine.to_account_info(),
            self.token_program.to_account_info(),
            self.system_program.to_account_info(),
            self.depositor.to_account_info(),
            self.vault.subject_type,
            remaining,
        )
        .with_pda(
            self.vault.to_account_info(),
            self.vault_assets.to_account_info(),
            self.vault.signer_seeds(),
        )
        .with_signer(
            self.depositor.to_account_info(),
            self.user_asset_account.to_account_info(),
        )
    }

    fn mint_shares(&self, shares: u64) -> Result<()> {
        let asset_mint_key = self.vault.asset_mint;
        let vault_seeds = &[VAULT_SEED, asset_mint_key.as_ref(), &[self.vault.bump]];
        let signer_seeds = &[&vault_seeds[..]];

        token::mint_to(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                MintTo {
                    mint: self.share_mint.to_account_info(),
                    to: self.user_share_account.to_account_info(),
                    authority: self.vault.to_account_info(),
                },
                signer_seeds,
            ),
            shares,
        )
    }

    fn finish(&self, outcome: &DepositOutcome) -> Result<()> {
        self.mint_shares(outcome.shares)?;

        emit!(Deposited {
            vault: self.vault.key(),
            depositor: self.depositor.key(),
            assets: outcome.assets,
            shares: outcome.shares,
            total_assets: self.vault.total_assets,
        });

        msg!("Deposit successful!");
        msg!("Assets received: {}", outcome.assets);
        msg!("Shares minted: {}", outcome.shares);
        msg!("Vault total assets: {}", self.vault.total_assets);
        Ok(())
    }
}

/// Handler for the deposit instruction
///
/// # Arguments
/// * `assets` - Amount of the vault asset to deposit (base units)
/// * `min_shares_out` - Minimum shares to receive (slippage protection, 0 to skip)
pub fn handler_deposit<'info>(
    ctx: Context<'_, '_, '_, 'info, DepositToVault<'info>>,
    assets: u64,
    min_shares_out: u64,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let depositor_key = ctx.accounts.depositor.key();
    let total_supply = ctx.accounts.share_mint.supply;

    let book = load_book(
        ctx.remaining_accounts,
        &vault_key,
        &ctx.accounts.vault.pending_distributors(),
    )?;
    let mut engine = ctx.accounts.engine(ctx.remaining_accounts);

    let outcome = ctx.accounts.vault.deposit(
        &mut engine,
        &vault_key,
        &depositor_key,
        assets,
        total_supply,
        &book,
    )?;

    if min_shares_out > 0 {
        require!(
            outcome.shares >= min_shares_out,
            VaultError::SlippageExceeded
        );
    }

    ctx.accounts.finish(&outcome)?;
    Ok(outcome.shares)
}

/// Handler for the mint instruction
///
/// # Arguments
/// * `shares` - Exact number of shares to mint
/// * `max_assets_in` - Maximum assets to pull (slippage protection, 0 to skip)
pub fn handler_mint<'info>(
    ctx: Context<'_, '_, '_, 'info, DepositToVault<'info>>,
    shares: u64,
    max_assets_in: u64,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();
    let depositor_key = ctx.accounts.depositor.key();
    let total_supply = ctx.accounts.share_mint.supply;

    let book = load_book(
        ctx.remaining_accounts,
        &vault_key,
        &ctx.accounts.vault.pending_distributors(),
    )?;
    let mut engine = ctx.accounts.engine(ctx.remaining_accounts);

    let outcome = ctx.accounts.vault.mint(
        &mut engine,
        &vault_key,
        &depositor_key,
        shares,
        total_supply,
        &book,
    )?;

    if max_assets_in > 0 {
        require!(
            outcome.assets <= max_assets_in,
            VaultError::SlippageExceeded
        );
    }

    ctx.accounts.finish(&outcome)?;
    Ok(outcome.assets)
}
