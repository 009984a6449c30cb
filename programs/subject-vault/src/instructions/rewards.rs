// =============================================================================
// Claim Rewards Instruction
// =============================================================================
// Operator claims the vault's staking rewards for one subject from the
// rewards engine. Rewards are paid in the vault asset straight into the
// vault's asset account and are absorbed as cash, so every shareholder
// gains pro-rata.
//
// Only the balance delta is credited. Whatever the rewards engine reports
// is ignored.
//
// Remaining accounts: passed through to the rewards engine in the order
// its claim instruction expects.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::engine::{EngineCpi, RewardsCpi};
use crate::error::VaultError;
use crate::events::RewardsClaimed;
use crate::state::Vault;

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
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

    /// CHECK: must be the vault's configured rewards engine
    #[account(address = vault.rewards_engine @ VaultError::InvalidRewardsProgram)]
    pub rewards_engine: UncheckedAccount<'info>,

    /// CHECK: must be the vault's configured staking engine
    #[account(address = vault.staking_engine @ VaultError::InvalidEngineProgram)]
    pub staking_engine: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for the claim_rewards instruction
///
/// # Arguments
/// * `subject` - Subject the rewards were earned on
/// * `epochs` - Reward epochs to claim (1..=MAX_REWARD_EPOCHS)
///
/// # Returns
/// * Assets absorbed into vault cash
pub fn handler_claim_rewards<'info>(
    ctx: Context<'_, '_, '_, 'info, ClaimRewards<'info>>,
    subject: Pubkey,
    epochs: Vec<u64>,
) -> Result<u64> {
    let vault_key = ctx.accounts.vault.key();

    let mut rewards = RewardsCpi::new(
        ctx.accounts.rewards_engine.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.vault.signer_seeds(),
        ctx.accounts.vault.subject_type,
        ctx.remaining_accounts,
    );
    ctx.accounts
        .vault
        .claim_rewards(&mut rewards, &vault_key, &subject, &epochs)?;

    let bank = EngineCpi::new(
        ctx.accounts.staking_engine.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.accounts.operator.to_account_info(),
        ctx.accounts.vault.subject_type,
        &[],
    )
    .with_pda(
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.vault_assets.to_account_info(),
        ctx.accounts.vault.signer_seeds(),
    );

    let vault = &mut ctx.accounts.vault;
    let absorbed = vault.reconcile_cash(&bank, &vault_key)?;

    emit!(RewardsClaimed {
        vault: vault_key,
        subject,
        epochs: epochs.len() as u32,
        absorbed,
    });

    msg!("Rewards claimed for subject {}", subject);
    msg!("Epochs: {}", epochs.len());
    msg!("Assets absorbed: {}", absorbed);
    msg!("Vault total assets: {}", vault.total_assets);

    Ok(absorbed)
}
