// =============================================================================
// CPI Adapter
// =============================================================================
// Implements the collaborator traits over cross-program invocations.
//
// Instruction handlers register every holder the operation touches (vault,
// distributors, receiver, user, treasury) together with its asset token
// account and, for PDAs, its signer seeds. Engine-side accounts (subject
// state, positions, stake vaults) are looked up by derived address in the
// instruction's remaining accounts, so the client must pass them in any
// order.
//
// Engine instructions use Anchor's "global:<name>" discriminators, fixed in
// constants.rs. Amounts
// are never read from return data: shares and balances are re-read from the
// accounts after each call.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::{invoke, invoke_signed},
};
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::constants::*;
use crate::engine::external::{self, EnginePosition, EngineSubjectState};
use crate::engine::{AssetBank, RewardsEngine, StakingEngine};
use crate::error::VaultError;

/// Engine instruction data: discriminator, subject_type, subject, then the
/// little-endian amount when the instruction takes one
pub fn engine_ix_data(
    discriminator: [u8; 8],
    subject_type: u8,
    subject: &Pubkey,
    amount: Option<u64>,
) -> Vec<u8> {
    let mut data = discriminator.to_vec();
    data.push(subject_type);
    data.extend_from_slice(subject.as_ref());
    if let Some(amount) = amount {
        data.extend_from_slice(&amount.to_le_bytes());
    }
    data
}

/// Rewards claim data: the engine header followed by a Borsh `Vec<u64>`
pub fn claim_rewards_ix_data(subject_type: u8, subject: &Pubkey, epochs: &[u64]) -> Vec<u8> {
    let mut data = engine_ix_data(ENGINE_CLAIM_REWARDS_DISCRIMINATOR, subject_type, subject, None);
    data.extend_from_slice(&(epochs.len() as u32).to_le_bytes());
    for epoch in epochs {
        data.extend_from_slice(&epoch.to_le_bytes());
    }
    data
}

/// Something that owns an asset token account. Destinations only need the
/// token account; sources also need the signing authority.
struct Holder<'info> {
    key: Pubkey,
    authority: Option<AccountInfo<'info>>,
    asset_account: AccountInfo<'info>,
    seeds: Option<Vec<Vec<u8>>>,
}

pub struct EngineCpi<'info> {
    engine_program: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
    payer: AccountInfo<'info>,
    subject_type: u8,
    remaining: Vec<AccountInfo<'info>>,
    holders: Vec<Holder<'info>>,
}

impl<'info> EngineCpi<'info> {
    pub fn new(
        engine_program: AccountInfo<'info>,
        token_program: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
        payer: AccountInfo<'info>,
        subject_type: u8,
        remaining: &[AccountInfo<'info>],
    ) -> Self {
        Self {
            engine_program,
            token_program,
            system_program,
            payer,
            subject_type,
            remaining: remaining.to_vec(),
            holders: Vec::new(),
        }
    }

    /// Register a holder that signs for itself (a wallet signer of this transaction)
    pub fn with_signer(
        mut self,
        authority: AccountInfo<'info>,
        asset_account: AccountInfo<'info>,
    ) -> Self {
        self.holders.push(Holder {
            key: *authority.key,
            authority: Some(authority),
            asset_account,
            seeds: None,
        });
        self
    }

    /// Register a program-derived holder we sign for with `seeds`
    pub fn with_pda(
        mut self,
        authority: AccountInfo<'info>,
        asset_account: AccountInfo<'info>,
        seeds: Vec<Vec<u8>>,
    ) -> Self {
        self.holders.push(Holder {
            key: *authority.key,
            authority: Some(authority),
            asset_account,
            seeds: Some(seeds),
        });
        self
    }

    /// Register a receive-only destination, keyed by the token account itself
    pub fn with_destination(mut self, asset_account: AccountInfo<'info>) -> Self {
        self.holders.push(Holder {
            key: *asset_account.key,
            authority: None,
            asset_account,
            seeds: None,
        });
        self
    }

    /// Add a PDA holder after construction (distributors loaded from remaining accounts)
    pub fn add_pda(
        &mut self,
        authority: AccountInfo<'info>,
        asset_account: AccountInfo<'info>,
        seeds: Vec<Vec<u8>>,
    ) {
        self.holders.push(Holder {
            key: *authority.key,
            authority: Some(authority),
            asset_account,
            seeds: Some(seeds),
        });
    }

    pub fn subject_state_address(&self, subject: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[ENGINE_SUBJECT_SEED, &[self.subject_type], subject.as_ref()],
            self.engine_program.key,
        )
        .0
    }

    pub fn position_address(&self, subject: &Pubkey, holder: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[ENGINE_POSITION_SEED, subject.as_ref(), holder.as_ref()],
            self.engine_program.key,
        )
        .0
    }

    pub fn stake_vault_address(&self, subject: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[ENGINE_STAKE_VAULT_SEED, subject.as_ref()],
            self.engine_program.key,
        )
        .0
    }

    fn holder(&self, key: &Pubkey) -> Result<&Holder<'info>> {
        self.holders
            .iter()
            .find(|h| h.key == *key)
            .ok_or(error!(VaultError::MissingEngineAccount))
    }

    fn authority_of(&self, key: &Pubkey) -> Result<AccountInfo<'info>> {
        self.holder(key)?
            .authority
            .clone()
            .ok_or(error!(VaultError::MissingEngineAccount))
    }

    fn find(&self, key: &Pubkey) -> Result<AccountInfo<'info>> {
        if let Some(info) = self.remaining.iter().find(|a| a.key == key) {
            return Ok(info.clone());
        }
        for h in &self.holders {
            if h.asset_account.key == key {
                return Ok(h.asset_account.clone());
            }
            if let Some(authority) = &h.authority {
                if authority.key == key {
                    return Ok(authority.clone());
                }
            }
        }
        msg!("Missing engine account {}", key);
        Err(error!(VaultError::MissingEngineAccount))
    }

    fn subject_state(&self, subject: &Pubkey) -> Result<EngineSubjectState> {
        let info = self.find(&self.subject_state_address(subject))?;
        require_keys_eq!(*info.owner, *self.engine_program.key, VaultError::InvalidEngineAccount);
        external::deserialize(&info)
    }

    fn position(&self, subject: &Pubkey, holder: &Pubkey) -> Result<EnginePosition> {
        let info = self.find(&self.position_address(subject, holder))?;
        if !info.data_is_empty() {
            require_keys_eq!(*info.owner, *self.engine_program.key, VaultError::InvalidEngineAccount);
        }
        external::deserialize_position(&info)
    }

    fn engine_data(
        &self,
        discriminator: [u8; 8],
        subject: &Pubkey,
        amount: Option<u64>,
    ) -> Vec<u8> {
        engine_ix_data(discriminator, self.subject_type, subject, amount)
    }

    fn invoke_as(&self, ix: &Instruction, infos: &[AccountInfo<'info>], holder: &Pubkey) -> Result<()> {
        let result = match &self.holder(holder)?.seeds {
            Some(seeds) => {
                let seed_refs: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
                invoke_signed(ix, infos, &[seed_refs.as_slice()])
            }
            None => invoke(ix, infos),
        };
        result.map_err(|e| {
            msg!("Staking engine CPI failed: {:?}", e);
            error!(VaultError::EngineCpiFailed)
        })
    }

    /// Accounts shared by deposit and withdraw: both move assets between the
    /// holder's token account and the engine's stake vault.
    fn asset_moving_accounts(
        &self,
        holder: &Pubkey,
        subject: &Pubkey,
    ) -> Result<(Vec<AccountMeta>, Vec<AccountInfo<'info>>)> {
        let state = self.find(&self.subject_state_address(subject))?;
        let position = self.find(&self.position_address(subject, holder))?;
        let stake_vault = self.find(&self.stake_vault_address(subject))?;
        let authority = self.authority_of(holder)?;
        let asset_account = self.holder(holder)?.asset_account.clone();

        let metas = vec![
            AccountMeta::new(*state.key, false),
            AccountMeta::new(*position.key, false),
            AccountMeta::new_readonly(*holder, true),
            AccountMeta::new(*asset_account.key, false),
            AccountMeta::new(*stake_vault.key, false),
            AccountMeta::new(*self.payer.key, true),
            AccountMeta::new_readonly(*self.token_program.key, false),
            AccountMeta::new_readonly(*self.system_program.key, false),
        ];
        let infos = vec![
            state,
            position,
            authority,
            asset_account,
            stake_vault,
            self.payer.clone(),
            self.token_program.clone(),
            self.system_program.clone(),
            self.engine_program.clone(),
        ];
        Ok((metas, infos))
    }
}

impl<'info> AssetBank for EngineCpi<'info> {
    fn balance_of(&self, holder: &Pubkey) -> Result<u64> {
        let info = &self.holder(holder)?.asset_account;
        let data = info.try_borrow_data()?;
        let account = TokenAccount::try_deserialize(&mut &data[..])?;
        Ok(account.amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let source = self.holder(from)?;
        let destination = self.holder(to)?;
        let cpi_accounts = Transfer {
            from: source.asset_account.clone(),
            to: destination.asset_account.clone(),
            authority: self.authority_of(from)?,
        };

        match &source.seeds {
            Some(seeds) => {
                let seed_refs: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
                let signer_seeds = &[seed_refs.as_slice()];
                token::transfer(
                    CpiContext::new_with_signer(
                        self.token_program.clone(),
                        cpi_accounts,
                        signer_seeds,
                    ),
                    amount,
                )
            }
            None => token::transfer(
                CpiContext::new(self.token_program.clone(), cpi_accounts),
                amount,
            ),
        }
    }
}

impl<'info> StakingEngine for EngineCpi<'info> {
    fn deposit(&mut self, holder: &Pubkey, subject: &Pubkey, amount: u64) -> Result<u64> {
        let before = self.position(subject, holder)?.active_shares;

        let (metas, infos) = self.asset_moving_accounts(holder, subject)?;
        let ix = Instruction {
            program_id: *self.engine_program.key,
            accounts: metas,
            data: self.engine_data(ENGINE_DEPOSIT_DISCRIMINATOR, subject, Some(amount)),
        };
        self.invoke_as(&ix, &infos, holder)?;

        let after = self.position(subject, holder)?.active_shares;
        after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))
    }

    fn initiate_withdrawal(&mut self, holder: &Pubkey, subject: &Pubkey, shares: u64) -> Result<i64> {
        let state = self.find(&self.subject_state_address(subject))?;
        let position = self.find(&self.position_address(subject, holder))?;
        let authority = self.authority_of(holder)?;

        let ix = Instruction {
            program_id: *self.engine_program.key,
            accounts: vec![
                AccountMeta::new(*state.key, false),
                AccountMeta::new(*position.key, false),
                AccountMeta::new_readonly(*holder, true),
            ],
            data: self.engine_data(ENGINE_INITIATE_WITHDRAWAL_DISCRIMINATOR, subject, Some(shares)),
        };
        self.invoke_as(
            &ix,
            &[state, position, authority, self.engine_program.clone()],
            holder,
        )?;

        Ok(self.position(subject, holder)?.withdrawal_deadline)
    }

    fn withdraw(&mut self, holder: &Pubkey, subject: &Pubkey) -> Result<u64> {
        let before = self.balance_of(holder)?;

        let (metas, infos) = self.asset_moving_accounts(holder, subject)?;
        let ix = Instruction {
            program_id: *self.engine_program.key,
            accounts: metas,
            data: self.engine_data(ENGINE_WITHDRAW_DISCRIMINATOR, subject, None),
        };
        self.invoke_as(&ix, &infos, holder)?;

        let after = self.balance_of(holder)?;
        after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))
    }

    fn active_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64> {
        Ok(self.position(subject, holder)?.active_shares)
    }

    fn inactive_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64> {
        Ok(self.position(subject, holder)?.inactive_shares)
    }

    fn active_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64> {
        self.subject_state(subject)?.active_shares_to_stake(shares)
    }

    fn inactive_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64> {
        self.subject_state(subject)?.inactive_shares_to_stake(shares)
    }

    fn is_frozen(&self, subject: &Pubkey) -> Result<bool> {
        Ok(self.subject_state(subject)?.frozen)
    }

    fn transfer_active_shares(
        &mut self,
        subject: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        shares: u64,
    ) -> Result<()> {
        let state = self.find(&self.subject_state_address(subject))?;
        let from_position = self.find(&self.position_address(subject, from))?;
        let to_position = self.find(&self.position_address(subject, to))?;
        let from_authority = self.authority_of(from)?;
        let to_authority = self.find(to)?;

        let ix = Instruction {
            program_id: *self.engine_program.key,
            accounts: vec![
                AccountMeta::new_readonly(*state.key, false),
                AccountMeta::new(*from_position.key, false),
                AccountMeta::new(*to_position.key, false),
                AccountMeta::new_readonly(*from, true),
                AccountMeta::new_readonly(*to, false),
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data: self.engine_data(ENGINE_TRANSFER_POSITION_DISCRIMINATOR, subject, Some(shares)),
        };
        self.invoke_as(
            &ix,
            &[
                state,
                from_position,
                to_position,
                from_authority,
                to_authority,
                self.payer.clone(),
                self.system_program.clone(),
                self.engine_program.clone(),
            ],
            from,
        )
    }
}

/// Rewards engine adapter. Route-specific accounts are passed through from
/// remaining accounts in the order the rewards engine expects.
pub struct RewardsCpi<'info> {
    rewards_program: AccountInfo<'info>,
    holder: AccountInfo<'info>,
    holder_seeds: Vec<Vec<u8>>,
    subject_type: u8,
    remaining: Vec<AccountInfo<'info>>,
}

impl<'info> RewardsCpi<'info> {
    pub fn new(
        rewards_program: AccountInfo<'info>,
        holder: AccountInfo<'info>,
        holder_seeds: Vec<Vec<u8>>,
        subject_type: u8,
        remaining: &[AccountInfo<'info>],
    ) -> Self {
        Self {
            rewards_program,
            holder,
            holder_seeds,
            subject_type,
            remaining: remaining.to_vec(),
        }
    }
}

impl<'info> RewardsEngine for RewardsCpi<'info> {
    fn claim_rewards(&mut self, holder: &Pubkey, subject: &Pubkey, epochs: &[u64]) -> Result<()> {
        require_keys_eq!(*holder, *self.holder.key, VaultError::Unauthorized);

        let data = claim_rewards_ix_data(self.subject_type, subject, epochs);

        let mut metas = vec![AccountMeta::new_readonly(*holder, true)];
        metas.extend(self.remaining.iter().map(|acc| {
            if acc.is_writable {
                AccountMeta::new(*acc.key, acc.is_signer)
            } else {
                AccountMeta::new_readonly(*acc.key, acc.is_signer)
            }
        }));

        let mut infos = vec![self.holder.clone()];
        infos.extend(self.remaining.iter().cloned());
        infos.push(self.rewards_program.clone());

        let ix = Instruction {
            program_id: *self.rewards_program.key,
            accounts: metas,
            data,
        };
        let seed_refs: Vec<&[u8]> = self.holder_seeds.iter().map(|s| s.as_slice()).collect();
        invoke_signed(&ix, &infos, &[seed_refs.as_slice()]).map_err(|e| {
            msg!("Rewards engine CPI failed: {:?}", e);
            error!(VaultError::RewardsCpiFailed)
        })
    }
}
