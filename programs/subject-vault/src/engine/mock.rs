//! In-memory staking engine and asset ledger for unit tests.

use std::collections::HashMap;

use anchor_lang::prelude::*;

use crate::engine::{AssetBank, RewardsEngine, StakingEngine};
use crate::error::VaultError;
use crate::math::mul_div;

#[derive(Default, Clone)]
pub struct MockSubject {
    pub active_shares: u64,
    pub active_stake: u64,
    pub inactive_shares: u64,
    pub inactive_stake: u64,
    pub delay: i64,
    pub frozen: bool,
}

#[derive(Default, Clone, Copy)]
pub struct MockPosition {
    pub active: u64,
    pub inactive: u64,
    pub deadline: i64,
}

#[derive(Default)]
pub struct MockEngine {
    pub now: i64,
    pub balances: HashMap<Pubkey, u64>,
    pub subjects: HashMap<Pubkey, MockSubject>,
    pub positions: HashMap<(Pubkey, Pubkey), MockPosition>,
    /// rewards paid per claim_rewards call
    pub reward_per_claim: u64,
    /// basis points kept by the engine on every deposit
    pub deposit_fee_bps: u64,
    /// basis points skimmed from every asset transfer (fee-on-transfer asset)
    pub transfer_fee_bps: u64,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subject(&mut self, subject: Pubkey, delay: i64) {
        self.subjects.insert(
            subject,
            MockSubject {
                delay,
                ..Default::default()
            },
        );
    }

    pub fn mint(&mut self, holder: &Pubkey, amount: u64) {
        *self.balances.entry(*holder).or_default() += amount;
    }

    pub fn balance(&self, holder: &Pubkey) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn position_of(&self, subject: &Pubkey, holder: &Pubkey) -> MockPosition {
        self.positions
            .get(&(*subject, *holder))
            .copied()
            .unwrap_or_default()
    }

    /// Staking yield: grows active stake without minting shares
    pub fn accrue(&mut self, subject: &Pubkey, amount: u64) {
        if let Some(s) = self.subjects.get_mut(subject) {
            s.active_stake += amount;
        }
    }

    pub fn freeze(&mut self, subject: &Pubkey, frozen: bool) {
        if let Some(s) = self.subjects.get_mut(subject) {
            s.frozen = frozen;
        }
    }

    fn subject(&self, subject: &Pubkey) -> Result<&MockSubject> {
        self.subjects
            .get(subject)
            .ok_or(error!(VaultError::InvalidEngineAccount))
    }

    fn subject_mut(&mut self, subject: &Pubkey) -> Result<&mut MockSubject> {
        self.subjects
            .get_mut(subject)
            .ok_or(error!(VaultError::InvalidEngineAccount))
    }
}

impl AssetBank for MockEngine {
    fn balance_of(&self, holder: &Pubkey) -> Result<u64> {
        Ok(self.balance(holder))
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let source = self.balances.entry(*from).or_default();
        require!(*source >= amount, VaultError::MathUnderflow);
        *source -= amount;
        let skimmed = amount * self.transfer_fee_bps / 10_000;
        *self.balances.entry(*to).or_default() += amount - skimmed;
        Ok(())
    }
}

impl StakingEngine for MockEngine {
    fn deposit(&mut self, holder: &Pubkey, subject: &Pubkey, amount: u64) -> Result<u64> {
        AssetBank::transfer(self, holder, &Pubkey::default(), amount)?;
        let fee = amount * self.deposit_fee_bps / 10_000;
        let staked = amount - fee;
        let s = self.subject_mut(subject)?;
        let shares = if s.active_shares == 0 {
            staked
        } else {
            mul_div(staked, s.active_shares, s.active_stake)?
        };
        s.active_shares += shares;
        s.active_stake += staked;
        self.positions.entry((*subject, *holder)).or_default().active += shares;
        Ok(shares)
    }

    fn initiate_withdrawal(&mut self, holder: &Pubkey, subject: &Pubkey, shares: u64) -> Result<i64> {
        let now = self.now;
        let position = self.position_of(subject, holder);
        require!(position.active >= shares, VaultError::MathUnderflow);
        let s = self.subject_mut(subject)?;
        let stake = mul_div(shares, s.active_stake, s.active_shares)?;
        s.active_shares -= shares;
        s.active_stake -= stake;
        let inactive = if s.inactive_shares == 0 {
            stake
        } else {
            mul_div(stake, s.inactive_shares, s.inactive_stake)?
        };
        s.inactive_shares += inactive;
        s.inactive_stake += stake;
        let deadline = now + s.delay;

        let p = self.positions.entry((*subject, *holder)).or_default();
        p.active -= shares;
        p.inactive += inactive;
        p.deadline = deadline;
        Ok(deadline)
    }

    fn withdraw(&mut self, holder: &Pubkey, subject: &Pubkey) -> Result<u64> {
        let now = self.now;
        let position = self.position_of(subject, holder);
        require!(position.inactive > 0, VaultError::InvalidAmount);
        require!(now >= position.deadline, VaultError::UndelegationNotMatured);
        let s = self.subject_mut(subject)?;
        require!(!s.frozen, VaultError::SubjectFrozen);
        let amount = mul_div(position.inactive, s.inactive_stake, s.inactive_shares)?;
        s.inactive_shares -= position.inactive;
        s.inactive_stake -= amount;

        let p = self.positions.entry((*subject, *holder)).or_default();
        p.inactive = 0;
        p.deadline = 0;
        *self.balances.entry(*holder).or_default() += amount;
        Ok(amount)
    }

    fn active_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64> {
        Ok(self.position_of(subject, holder).active)
    }

    fn inactive_shares(&self, subject: &Pubkey, holder: &Pubkey) -> Result<u64> {
        Ok(self.position_of(subject, holder).inactive)
    }

    fn active_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64> {
        let s = self.subject(subject)?;
        if s.active_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, s.active_stake, s.active_shares)
    }

    fn inactive_shares_to_stake(&self, subject: &Pubkey, shares: u64) -> Result<u64> {
        let s = self.subject(subject)?;
        if s.inactive_shares == 0 {
            return Ok(0);
        }
        mul_div(shares, s.inactive_stake, s.inactive_shares)
    }

    fn is_frozen(&self, subject: &Pubkey) -> Result<bool> {
        Ok(self.subject(subject)?.frozen)
    }

    fn transfer_active_shares(
        &mut self,
        subject: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        shares: u64,
    ) -> Result<()> {
        let source = self.positions.entry((*subject, *from)).or_default();
        require!(source.active >= shares, VaultError::MathUnderflow);
        source.active -= shares;
        self.positions.entry((*subject, *to)).or_default().active += shares;
        Ok(())
    }
}

impl RewardsEngine for MockEngine {
    fn claim_rewards(&mut self, holder: &Pubkey, _subject: &Pubkey, epochs: &[u64]) -> Result<()> {
        let amount = self.reward_per_claim * epochs.len() as u64;
        self.mint(holder, amount);
        Ok(())
    }
}
