// =============================================================================
// Vault Ledger State Account
// =============================================================================
// The Vault account is the central ledger. It pools one asset, issues share
// tokens against it and spreads the pool across staking subjects.
//
// Value lives in three places:
//   - cash_balance: idle assets in the vault token account
//   - subjects[i].assets: active position + the vault's units of any
//     distributor in flight for that subject
//   - nothing else; receivers and routed slices are no longer vault value
//
// Invariant after every reconcile:
//   total_assets == cash_balance + sum(subjects[i].assets)
//
// Every share-price dependent computation runs after a reconcile, so
// donations, yield and slashing are priced in before shares are minted or
// burned.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::engine::{AssetBank, RewardsEngine, StakingEngine};
use crate::error::VaultError;
use crate::math::{apply_delta, mul_div, mul_div_ceil, split_fee};
use crate::state::{Distributor, DistributorBook, Receiver};

/// One registered subject and the value the vault holds in it
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct SubjectEntry {
    pub subject: Pubkey,

    /// Cached value: active position + vault-owned distributor units
    pub assets: u64,

    /// Distributor currently holding this subject's exiting shares
    pub distributor: Option<Pubkey>,

    /// Maturity of that distributor, 0 when none
    pub deadline: i64,
}

/// Sorted lookup from subject to its position in `subjects`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct IndexSlot {
    pub subject: Pubkey,

    pub position: u16,
}

/// The main Vault account.
///
/// One vault per asset mint. PDA: ["vault", asset_mint]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Vault {
    // =========================================================================
    // Authority & Identification
    // =========================================================================

    /// Can change fees, the treasury and the operator
    pub admin: Pubkey,

    /// Moves idle assets in and out of subjects
    pub operator: Pubkey,

    /// The pooled asset
    pub asset_mint: Pubkey,

    /// Vault share token, minted by this program
    pub share_mint: Pubkey,

    /// PDA token account holding cash_balance
    pub asset_account: Pubkey,

    /// External staking engine program
    pub staking_engine: Pubkey,

    /// External rewards engine program
    pub rewards_engine: Pubkey,

    /// Subject category understood by both engines
    pub subject_type: u8,

    // =========================================================================
    // Fee Configuration
    // =========================================================================

    /// Charged on every asset payout (instant redemption and receiver claim)
    pub fee_bps: u16,

    /// Asset token account receiving fees
    pub fee_treasury: Pubkey,

    // =========================================================================
    // Accounting (asset base units)
    // =========================================================================

    pub total_assets: u64,

    pub cash_balance: u64,

    /// Seed for the next distributor PDA
    pub distributor_nonce: u64,

    /// Subjects with value or an exit in flight. Unordered, swap-removed.
    #[max_len(16)]
    pub subjects: Vec<SubjectEntry>,

    /// Sorted by subject for binary search
    #[max_len(16)]
    pub subject_index: Vec<IndexSlot>,

    // =========================================================================
    // PDA Bumps
    // =========================================================================

    pub bump: u8,

    pub share_mint_bump: u8,

    pub asset_account_bump: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Assets actually received
    pub assets: u64,

    /// Shares to mint
    pub shares: u64,
}

/// Inputs to a redemption. `receiver` is the holder key of the owner's
/// Receiver; `destination` takes the instant cash part.
#[derive(Debug, Clone, Copy)]
pub struct RedeemRequest {
    pub shares: u64,
    pub owner_balance: u64,
    pub total_supply: u64,
    pub receiver: Pubkey,
    pub destination: Pubkey,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DelegateOutcome {
    /// Drop in the vault's asset balance
    pub assets: u64,

    /// Shares the engine minted to the vault
    pub engine_shares: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedeemOutcome {
    /// Cash part before fee
    pub gross: u64,
    pub net: u64,
    pub fee: u64,
    pub subjects_routed: u32,
    pub distributors_routed: u32,
}

impl Vault {
    pub fn signer_seeds(&self) -> Vec<Vec<u8>> {
        vec![
            VAULT_SEED.to_vec(),
            self.asset_mint.to_bytes().to_vec(),
            vec![self.bump],
        ]
    }

    // =========================================================================
    // Subject Registry
    // =========================================================================

    pub fn subject_position(&self, subject: &Pubkey) -> Option<usize> {
        self.subject_index
            .binary_search_by(|slot| slot.subject.cmp(subject))
            .ok()
            .map(|i| self.subject_index[i].position as usize)
    }

    pub fn entry(&self, subject: &Pubkey) -> Option<&SubjectEntry> {
        self.subject_position(subject).map(|p| &self.subjects[p])
    }

    /// The distributor in flight for `subject`, if any
    pub fn pending_distributor(&self, subject: &Pubkey) -> Option<Pubkey> {
        self.entry(subject).and_then(|e| e.distributor)
    }

    /// Every distributor in flight, across all subjects
    pub fn pending_distributors(&self) -> Vec<Pubkey> {
        self.subjects.iter().filter_map(|e| e.distributor).collect()
    }

    fn register_subject(&mut self, subject: &Pubkey) -> Result<usize> {
        if let Some(position) = self.subject_position(subject) {
            return Ok(position);
        }
        require!(
            self.subjects.len() < MAX_SUBJECTS,
            VaultError::SubjectRegistryFull
        );

        let position = self.subjects.len();
        self.subjects.push(SubjectEntry {
            subject: *subject,
            ..Default::default()
        });
        let slot = self
            .subject_index
            .binary_search_by(|s| s.subject.cmp(subject))
            .unwrap_or_else(|i| i);
        self.subject_index.insert(
            slot,
            IndexSlot {
                subject: *subject,
                position: position as u16,
            },
        );

        msg!("Subject {} registered", subject);
        Ok(position)
    }

    /// Swap-remove: the last entry takes the freed position and its index
    /// slot is repointed. `subjects` itself is O(1); the sorted index shifts
    /// on insert and remove, so both are O(n) in MAX_SUBJECTS.
    fn remove_subject(&mut self, subject: &Pubkey) -> Result<()> {
        let slot = self
            .subject_index
            .binary_search_by(|s| s.subject.cmp(subject))
            .map_err(|_| error!(VaultError::SubjectNotRegistered))?;
        let position = self.subject_index.remove(slot).position as usize;
        self.subjects.swap_remove(position);

        if let Some(moved) = self.subjects.get(position).map(|e| e.subject) {
            if let Ok(i) = self
                .subject_index
                .binary_search_by(|s| s.subject.cmp(&moved))
            {
                self.subject_index[i].position = position as u16;
            }
        }

        msg!("Subject {} removed", subject);
        Ok(())
    }

    /// cash_balance + every subject's cached value
    pub fn sum_of_parts(&self) -> Result<u64> {
        self.subjects.iter().try_fold(self.cash_balance, |acc, e| {
            acc.checked_add(e.assets)
                .ok_or(error!(VaultError::MathOverflow))
        })
    }

    // =========================================================================
    // Reconcile
    // =========================================================================

    /// Absorb assets that reached the vault outside tracked flows
    /// (donations, rewards). Returns the amount absorbed.
    pub fn reconcile_cash<B: AssetBank>(&mut self, bank: &B, vault_key: &Pubkey) -> Result<u64> {
        let actual = bank.balance_of(vault_key)?;
        if actual <= self.cash_balance {
            return Ok(0);
        }

        let delta = actual - self.cash_balance;
        self.cash_balance = actual;
        self.total_assets = self
            .total_assets
            .checked_add(delta)
            .ok_or(error!(VaultError::MathOverflow))?;

        msg!("Absorbed {} untracked assets", delta);
        Ok(delta)
    }

    /// Revalue one subject from the engine and drop it from the registry
    /// once it holds nothing and has no exit in flight.
    pub fn reconcile_subject<E: StakingEngine>(
        &mut self,
        engine: &E,
        vault_key: &Pubkey,
        subject: &Pubkey,
        book: &DistributorBook,
    ) -> Result<()> {
        let position = self
            .subject_position(subject)
            .ok_or(error!(VaultError::SubjectNotRegistered))?;
        let entry = self.subjects[position];

        let active = engine.active_shares(subject, vault_key)?;
        let active_value = engine.active_shares_to_stake(subject, active)?;
        let exiting_value = match entry.distributor {
            Some(key) => {
                let distributor = book
                    .get(&key)
                    .ok_or(error!(VaultError::MissingDistributor))?;
                distributor.value_of(engine, distributor.vault_units)?
            }
            None => 0,
        };
        let value = active_value
            .checked_add(exiting_value)
            .ok_or(error!(VaultError::MathOverflow))?;

        if value != entry.assets {
            self.total_assets = apply_delta(self.total_assets, entry.assets, value)?;
            self.subjects[position].assets = value;
        }

        if value == 0 && entry.distributor.is_none() {
            self.remove_subject(subject)?;
        }

        Ok(())
    }

    /// Full resync: cash first, then every registered subject
    pub fn reconcile<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &E,
        vault_key: &Pubkey,
        book: &DistributorBook,
    ) -> Result<()> {
        self.reconcile_cash(engine, vault_key)?;

        let subjects: Vec<Pubkey> = self.subjects.iter().map(|e| e.subject).collect();
        for subject in &subjects {
            self.reconcile_subject(engine, vault_key, subject, book)?;
        }

        Ok(())
    }

    // =========================================================================
    // Share Conversions
    // =========================================================================

    /// Shares for `assets`, rounded down. 1:1 while the vault is empty.
    pub fn convert_to_shares(&self, assets: u64, total_supply: u64) -> Result<u64> {
        if total_supply == 0 || self.total_assets == 0 {
            return Ok(assets);
        }
        mul_div(assets, total_supply, self.total_assets)
    }

    /// Assets for `shares`, rounded down
    pub fn convert_to_assets(&self, shares: u64, total_supply: u64) -> Result<u64> {
        if total_supply == 0 {
            return Ok(shares);
        }
        mul_div(shares, self.total_assets, total_supply)
    }

    /// Assets needed to mint exactly `shares`, rounded up
    pub fn preview_mint(&self, shares: u64, total_supply: u64) -> Result<u64> {
        if total_supply == 0 || self.total_assets == 0 {
            return Ok(shares);
        }
        mul_div_ceil(shares, self.total_assets, total_supply)
    }

    /// Shares to burn for `assets` of value, rounded up
    pub fn preview_withdraw(&self, assets: u64, total_supply: u64) -> Result<u64> {
        require!(total_supply > 0, VaultError::NoSharesOutstanding);
        mul_div_ceil(assets, total_supply, self.total_assets)
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Take `assets` from `depositor`. The caller mints `shares` of the
    /// returned outcome.
    pub fn deposit<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        depositor: &Pubkey,
        assets: u64,
        total_supply: u64,
        book: &DistributorBook,
    ) -> Result<DepositOutcome> {
        require!(assets > 0, VaultError::InvalidAmount);
        self.reconcile(engine, vault_key, book)?;
        self.deposit_reconciled(engine, vault_key, depositor, assets, total_supply)
    }

    /// Take whatever asset amount mints exactly `shares`
    pub fn mint<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        depositor: &Pubkey,
        shares: u64,
        total_supply: u64,
        book: &DistributorBook,
    ) -> Result<DepositOutcome> {
        require!(shares > 0, VaultError::InvalidAmount);
        self.reconcile(engine, vault_key, book)?;

        let assets = self.preview_mint(shares, total_supply)?;
        let outcome = self.deposit_reconciled(engine, vault_key, depositor, assets, total_supply)?;
        require!(outcome.shares >= shares, VaultError::SlippageExceeded);

        Ok(DepositOutcome {
            assets: outcome.assets,
            shares,
        })
    }

    fn deposit_reconciled<B: AssetBank>(
        &mut self,
        bank: &mut B,
        vault_key: &Pubkey,
        depositor: &Pubkey,
        assets: u64,
        total_supply: u64,
    ) -> Result<DepositOutcome> {
        let before = bank.balance_of(vault_key)?;
        bank.transfer(depositor, vault_key, assets)?;
        let after = bank.balance_of(vault_key)?;
        let received = after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))?;
        require!(received > 0, VaultError::InvalidAmount);

        // priced against total_assets before this deposit lands
        let shares = self.convert_to_shares(received, total_supply)?;
        require!(shares > 0, VaultError::ShareAmountZero);

        self.cash_balance = self
            .cash_balance
            .checked_add(received)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.total_assets = self
            .total_assets
            .checked_add(received)
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(DepositOutcome {
            assets: received,
            shares,
        })
    }

    // =========================================================================
    // Operator Flows
    // =========================================================================

    /// Stake `amount` of idle cash into `subject`
    pub fn delegate<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        subject: &Pubkey,
        amount: u64,
        book: &DistributorBook,
    ) -> Result<DelegateOutcome> {
        require!(amount > 0, VaultError::InvalidAmount);
        self.reconcile_cash(engine, vault_key)?;
        require!(amount <= self.cash_balance, VaultError::InsufficientCash);

        let position = self.register_subject(subject)?;

        let before = engine.balance_of(vault_key)?;
        let minted = engine.deposit(vault_key, subject, amount)?;
        let after = engine.balance_of(vault_key)?;
        let deposited = before
            .checked_sub(after)
            .ok_or(error!(VaultError::MathUnderflow))?;

        // value changes location, total_assets does not move here
        self.cash_balance = self
            .cash_balance
            .checked_sub(deposited)
            .ok_or(error!(VaultError::MathUnderflow))?;
        self.subjects[position].assets = self.subjects[position]
            .assets
            .checked_add(deposited)
            .ok_or(error!(VaultError::MathOverflow))?;

        // engine fees or rounding show up as a revaluation
        self.reconcile_subject(engine, vault_key, subject, book)?;

        msg!(
            "Delegated {} to {} for {} engine shares",
            deposited,
            subject,
            minted
        );
        Ok(DelegateOutcome {
            assets: deposited,
            engine_shares: minted,
        })
    }

    /// Move `shares` of the vault's active position in `subject` into a new
    /// distributor and queue them at the engine. Returns the maturity.
    #[allow(clippy::too_many_arguments)]
    pub fn initiate_undelegate<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        subject: &Pubkey,
        shares: u64,
        distributor_key: &Pubkey,
        distributor: &mut Distributor,
        bump: u8,
    ) -> Result<i64> {
        require!(shares > 0, VaultError::InvalidAmount);
        let position = self
            .subject_position(subject)
            .ok_or(error!(VaultError::SubjectNotRegistered))?;
        require!(
            self.subjects[position].distributor.is_none(),
            VaultError::DistributorAlreadyPending
        );

        let held = engine.active_shares(subject, vault_key)?;
        require!(shares <= held, VaultError::InvalidAmount);

        engine.transfer_active_shares(subject, vault_key, distributor_key, shares)?;
        let nonce = self.distributor_nonce;
        let deadline =
            distributor.initialize(engine, distributor_key, *vault_key, *subject, nonce, bump)?;

        self.distributor_nonce = nonce
            .checked_add(1)
            .ok_or(error!(VaultError::MathOverflow))?;
        let entry = &mut self.subjects[position];
        entry.distributor = Some(*distributor_key);
        entry.deadline = deadline;

        let mut book = DistributorBook::new();
        book.insert(*distributor_key, distributor.clone());
        self.reconcile_subject(engine, vault_key, subject, &book)?;

        Ok(deadline)
    }

    /// Collect the vault's units of a matured distributor back into cash and
    /// detach it. Returns the assets received.
    pub fn undelegate<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        subject: &Pubkey,
        book: &mut DistributorBook,
        now: i64,
    ) -> Result<u64> {
        let key = self
            .entry(subject)
            .ok_or(error!(VaultError::SubjectNotRegistered))?
            .distributor
            .ok_or(error!(VaultError::NoPendingDistributor))?;

        self.reconcile_cash(engine, vault_key)?;
        self.reconcile_subject(engine, vault_key, subject, book)?;
        require!(!engine.is_frozen(subject)?, VaultError::SubjectFrozen);

        let distributor = book
            .get_mut(&key)
            .ok_or(error!(VaultError::MissingDistributor))?;
        require!(now >= distributor.maturity, VaultError::UndelegationNotMatured);

        let before = engine.balance_of(vault_key)?;
        distributor
            .release_vault_units(engine, &key, vault_key, now)?
            .ok_or(error!(VaultError::UndelegationNotMatured))?;
        let after = engine.balance_of(vault_key)?;
        let received = after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))?;

        let position = self
            .subject_position(subject)
            .ok_or(error!(VaultError::SubjectNotRegistered))?;
        let entry = &mut self.subjects[position];
        let removed = received.min(entry.assets);
        entry.assets -= removed;
        entry.distributor = None;
        entry.deadline = 0;

        self.cash_balance = self
            .cash_balance
            .checked_add(received)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.total_assets = self
            .total_assets
            .checked_add(received - removed)
            .ok_or(error!(VaultError::MathOverflow))?;

        // what is left is the active position only
        self.reconcile_subject(engine, vault_key, subject, book)?;

        msg!("Undelegated {} from {}", received, subject);
        Ok(received)
    }

    /// Validate the epoch list and claim rewards into the vault token
    /// account. The caller absorbs them with reconcile_cash.
    pub fn claim_rewards<R: RewardsEngine>(
        &self,
        rewards: &mut R,
        vault_key: &Pubkey,
        subject: &Pubkey,
        epochs: &[u64],
    ) -> Result<()> {
        require!(
            !epochs.is_empty() && epochs.len() <= MAX_REWARD_EPOCHS,
            VaultError::TooManyEpochs
        );
        rewards.claim_rewards(vault_key, subject, epochs)
    }

    // =========================================================================
    // Redemption
    // =========================================================================

    /// Split `request.shares / request.total_supply` of every value bucket
    /// to the redeemer:
    ///   - active positions move to the Receiver and are queued there
    ///   - vault units of in-flight distributors move to the Receiver
    ///   - cash is paid out now, minus the fee
    ///
    /// All buckets use the same supply snapshot. The caller burns the shares.
    pub fn redeem<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        receiver: &mut Receiver,
        book: &mut DistributorBook,
        request: &RedeemRequest,
    ) -> Result<RedeemOutcome> {
        require!(request.shares > 0, VaultError::InvalidAmount);
        require!(request.total_supply > 0, VaultError::NoSharesOutstanding);
        require!(
            request.shares <= request.owner_balance,
            VaultError::ExceededMaxRedeem
        );

        self.reconcile(engine, vault_key, book)?;

        let shares = request.shares;
        let supply = request.total_supply;
        let mut outcome = RedeemOutcome::default();

        // ---------------------------------------------------------------------
        // Active positions
        // ---------------------------------------------------------------------
        let subjects: Vec<Pubkey> = self.subjects.iter().map(|e| e.subject).collect();
        for subject in &subjects {
            let held = engine.active_shares(subject, vault_key)?;
            let part = mul_div(shares, held, supply)?;
            if part == 0 {
                continue;
            }

            let before = engine.active_shares(subject, &request.receiver)?;
            engine.transfer_active_shares(subject, vault_key, &request.receiver, part)?;
            let after = engine.active_shares(subject, &request.receiver)?;
            let moved = after
                .checked_sub(before)
                .ok_or(error!(VaultError::MathUnderflow))?;

            receiver.add_undelegation(engine, &request.receiver, subject, moved)?;
            self.reconcile_subject(engine, vault_key, subject, book)?;
            outcome.subjects_routed += 1;
        }

        // ---------------------------------------------------------------------
        // In-flight distributors
        // ---------------------------------------------------------------------
        let pending: Vec<(Pubkey, Pubkey)> = self
            .subjects
            .iter()
            .filter_map(|e| e.distributor.map(|d| (e.subject, d)))
            .collect();
        for (subject, key) in &pending {
            let distributor = book
                .get_mut(key)
                .ok_or(error!(VaultError::MissingDistributor))?;
            let part = mul_div(shares, distributor.vault_units, supply)?;
            if part == 0 {
                continue;
            }

            distributor.allocate(part)?;
            let exhausted = distributor.vault_units == 0;
            receiver.add_distributor(*key, part)?;

            // every unit now belongs to receivers, who finalize it themselves
            if exhausted {
                let position = self
                    .subject_position(subject)
                    .ok_or(error!(VaultError::SubjectNotRegistered))?;
                let entry = &mut self.subjects[position];
                entry.distributor = None;
                entry.deadline = 0;
                msg!("Distributor {} detached from {}", key, subject);
            }
            self.reconcile_subject(engine, vault_key, subject, book)?;
            outcome.distributors_routed += 1;
        }

        // ---------------------------------------------------------------------
        // Cash
        // ---------------------------------------------------------------------
        let cash_part = mul_div(shares, self.cash_balance, supply)?;
        if cash_part > 0 {
            let (net, fee) = split_fee(cash_part, self.fee_bps)?;

            let before = engine.balance_of(vault_key)?;
            engine.transfer(vault_key, &request.destination, net)?;
            if fee > 0 {
                engine.transfer(vault_key, &self.fee_treasury, fee)?;
            }
            let after = engine.balance_of(vault_key)?;
            let sent = before
                .checked_sub(after)
                .ok_or(error!(VaultError::MathUnderflow))?;

            self.cash_balance = self
                .cash_balance
                .checked_sub(sent)
                .ok_or(error!(VaultError::MathUnderflow))?;
            self.total_assets = self
                .total_assets
                .checked_sub(sent)
                .ok_or(error!(VaultError::MathUnderflow))?;

            outcome.gross = cash_part;
            outcome.net = net;
            outcome.fee = fee;
        }

        msg!(
            "Redeemed {} of {} shares: {} instant, {} subjects and {} distributors routed",
            shares,
            supply,
            outcome.gross,
            outcome.subjects_routed,
            outcome.distributors_routed
        );
        Ok(outcome)
    }

    /// Redeem however many shares (rounded up) are worth `assets`.
    /// Returns the shares to burn with the redemption outcome.
    pub fn withdraw<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        vault_key: &Pubkey,
        receiver: &mut Receiver,
        book: &mut DistributorBook,
        assets: u64,
        request: &RedeemRequest,
    ) -> Result<(u64, RedeemOutcome)> {
        require!(assets > 0, VaultError::InvalidAmount);
        self.reconcile(engine, vault_key, book)?;

        let shares = self.preview_withdraw(assets, request.total_supply)?;
        let outcome = self.redeem(
            engine,
            vault_key,
            receiver,
            book,
            &RedeemRequest { shares, ..*request },
        )?;
        Ok((shares, outcome))
    }

    /// Owner redeems directly, or a delegate spends its share-token allowance
    pub fn check_redeem_authority(
        caller: &Pubkey,
        owner: &Pubkey,
        delegate: Option<Pubkey>,
        delegated_amount: u64,
        shares: u64,
    ) -> Result<()> {
        if caller == owner {
            return Ok(());
        }
        match delegate {
            Some(d) if d == *caller && delegated_amount >= shares => Ok(()),
            _ => err!(VaultError::Unauthorized),
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn set_fee_bps(&mut self, fee_bps: u16) -> Result<()> {
        require!(fee_bps <= MAX_FEE_BPS, VaultError::FeeTooHigh);
        self.fee_bps = fee_bps;
        Ok(())
    }

    pub fn set_fee_treasury(&mut self, treasury: Pubkey) -> Result<()> {
        require!(treasury != Pubkey::default(), VaultError::InvalidTreasury);
        self.fee_treasury = treasury;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use std::collections::HashMap;

    fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: VaultError) {
        match result {
            Err(Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(expected), "{}", e.error_msg)
            }
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    struct User {
        key: Pubkey,
        receiver_key: Pubkey,
        receiver: Receiver,
    }

    impl User {
        fn new(vault: &Pubkey) -> Self {
            let key = Pubkey::new_unique();
            let mut receiver = Receiver::default();
            receiver.initialize_if_needed(*vault, key, 255);
            Self {
                key,
                receiver_key: Pubkey::new_unique(),
                receiver,
            }
        }
    }

    struct Harness {
        engine: MockEngine,
        vault: Vault,
        key: Pubkey,
        supply: u64,
        shares: HashMap<Pubkey, u64>,
        book: DistributorBook,
    }

    impl Harness {
        fn new() -> Self {
            let vault = Vault {
                fee_treasury: Pubkey::new_unique(),
                ..Default::default()
            };
            Self {
                engine: MockEngine::new(),
                vault,
                key: Pubkey::new_unique(),
                supply: 0,
                shares: HashMap::new(),
                book: DistributorBook::new(),
            }
        }

        fn at(&mut self, now: i64) {
            self.engine.now = now;
        }

        fn user(&self) -> User {
            User::new(&self.key)
        }

        fn deposit(&mut self, user: &User, assets: u64) -> u64 {
            self.engine.mint(&user.key, assets);
            let outcome = self
                .vault
                .deposit(&mut self.engine, &self.key, &user.key, assets, self.supply, &self.book)
                .unwrap();
            self.supply += outcome.shares;
            *self.shares.entry(user.key).or_default() += outcome.shares;
            outcome.shares
        }

        fn delegate(&mut self, subject: &Pubkey, amount: u64) -> u64 {
            self.vault
                .delegate(&mut self.engine, &self.key, subject, amount, &self.book)
                .unwrap()
                .engine_shares
        }

        fn initiate(&mut self, subject: &Pubkey, shares: u64) -> Result<(Pubkey, i64)> {
            let d_key = Pubkey::new_unique();
            let mut distributor = Distributor::default();
            let deadline = self.vault.initiate_undelegate(
                &mut self.engine,
                &self.key,
                subject,
                shares,
                &d_key,
                &mut distributor,
                250,
            )?;
            self.book.insert(d_key, distributor);
            Ok((d_key, deadline))
        }

        fn undelegate(&mut self, subject: &Pubkey) -> Result<u64> {
            let now = self.engine.now;
            self.vault
                .undelegate(&mut self.engine, &self.key, subject, &mut self.book, now)
        }

        fn redeem(&mut self, user: &mut User, shares: u64) -> Result<RedeemOutcome> {
            let balance = self.shares.get(&user.key).copied().unwrap_or(0);
            let request = RedeemRequest {
                shares,
                owner_balance: balance,
                total_supply: self.supply,
                receiver: user.receiver_key,
                destination: user.key,
            };
            let outcome = self.vault.redeem(
                &mut self.engine,
                &self.key,
                &mut user.receiver,
                &mut self.book,
                &request,
            )?;
            self.supply -= shares;
            *self.shares.get_mut(&user.key).unwrap() -= shares;
            Ok(outcome)
        }

        fn claim(&mut self, user: &mut User) -> u64 {
            let now = self.engine.now;
            let fee_bps = self.vault.fee_bps;
            let treasury = self.vault.fee_treasury;
            user.receiver
                .claim(
                    &mut self.engine,
                    &user.receiver_key,
                    &mut self.book,
                    &user.key,
                    fee_bps,
                    &treasury,
                    now,
                )
                .unwrap()
                .gross
        }

        fn assert_balanced(&self) {
            assert_eq!(self.vault.sum_of_parts().unwrap(), self.vault.total_assets);
            assert_eq!(self.vault.subjects.len(), self.vault.subject_index.len());
            for (i, entry) in self.vault.subjects.iter().enumerate() {
                assert!(entry.assets > 0 || entry.distributor.is_some());
                assert_eq!(self.vault.subject_position(&entry.subject), Some(i));
            }
            assert!(self
                .vault
                .subject_index
                .windows(2)
                .all(|w| w[0].subject < w[1].subject));
        }
    }

    #[test]
    fn test_first_deposit_is_one_to_one() {
        let mut h = Harness::new();
        let u = h.user();
        assert_eq!(h.deposit(&u, 1000), 1000);
        assert_eq!(h.vault.cash_balance, 1000);
        assert_eq!(h.vault.total_assets, 1000);
        h.assert_balanced();
    }

    #[test]
    fn test_donation_is_absorbed_before_pricing() {
        let mut h = Harness::new();
        let (a, b) = (h.user(), h.user());
        h.deposit(&a, 1000);
        h.engine.mint(&h.key, 500);

        // price is now 1.5 assets per share
        assert_eq!(h.deposit(&b, 300), 200);
        assert_eq!(h.vault.total_assets, 1800);
        assert_eq!(h.vault.cash_balance, 1800);
        h.assert_balanced();
    }

    #[test]
    fn test_conversions_round_in_vault_favor() {
        let mut h = Harness::new();
        let u = h.user();
        h.deposit(&u, 1000);
        h.engine.mint(&h.key, 500);
        h.vault.reconcile_cash(&h.engine, &h.key).unwrap();

        assert_eq!(h.vault.convert_to_shares(100, h.supply).unwrap(), 66);
        assert_eq!(h.vault.preview_withdraw(100, h.supply).unwrap(), 67);
        assert_eq!(h.vault.convert_to_assets(100, h.supply).unwrap(), 150);
        assert_eq!(h.vault.preview_mint(101, h.supply).unwrap(), 152);
        assert_error(h.vault.preview_withdraw(1, 0), VaultError::NoSharesOutstanding);
    }

    #[test]
    fn test_mint_takes_rounded_up_assets() {
        let mut h = Harness::new();
        let (a, b) = (h.user(), h.user());
        h.deposit(&a, 1000);
        h.engine.mint(&h.key, 500);
        h.engine.mint(&b.key, 1000);

        let outcome = h
            .vault
            .mint(&mut h.engine, &h.key, &b.key, 101, h.supply, &h.book)
            .unwrap();
        assert_eq!(outcome, DepositOutcome { assets: 152, shares: 101 });
        assert_eq!(h.engine.balance(&b.key), 848);
    }

    #[test]
    fn test_delegate_books_measured_amount() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.engine.deposit_fee_bps = 100;
        h.deposit(&u, 1000);

        let minted = h.delegate(&subject, 1000);

        assert_eq!(minted, 990);
        assert_eq!(h.vault.cash_balance, 0);
        assert_eq!(h.vault.entry(&subject).unwrap().assets, 990);
        assert_eq!(h.vault.total_assets, 990);
        h.assert_balanced();
    }

    #[test]
    fn test_delegate_rejects_bad_amounts() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 10);

        assert_error(
            h.vault.delegate(&mut h.engine, &h.key, &subject, 0, &h.book),
            VaultError::InvalidAmount,
        );
        assert_error(
            h.vault.delegate(&mut h.engine, &h.key, &subject, 11, &h.book),
            VaultError::InsufficientCash,
        );
        assert!(h.vault.subjects.is_empty());
    }

    #[test]
    fn test_yield_is_picked_up_by_reconcile() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 1000);
        h.delegate(&subject, 600);

        h.engine.accrue(&subject, 60);
        h.vault.reconcile(&h.engine, &h.key, &h.book).unwrap();

        assert_eq!(h.vault.total_assets, 1060);
        assert_eq!(h.vault.entry(&subject).unwrap().assets, 660);
        h.assert_balanced();
    }

    #[test]
    fn test_full_undelegation_cycle() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 1000);
        let engine_shares = h.delegate(&subject, 1000);

        let (d_key, deadline) = h.initiate(&subject, engine_shares).unwrap();
        assert_eq!(deadline, 100);
        assert_eq!(h.vault.pending_distributor(&subject), Some(d_key));
        assert_eq!(h.vault.entry(&subject).unwrap().assets, 1000);
        h.assert_balanced();

        h.at(99);
        assert_error(h.undelegate(&subject), VaultError::UndelegationNotMatured);

        h.at(100);
        assert_eq!(h.undelegate(&subject).unwrap(), 1000);
        assert!(h.vault.entry(&subject).is_none());
        assert!(h.vault.subjects.is_empty());
        assert_eq!(h.vault.cash_balance, 1000);
        assert_eq!(h.vault.total_assets, 1000);
        h.assert_balanced();

        assert_error(h.undelegate(&subject), VaultError::SubjectNotRegistered);
    }

    #[test]
    fn test_one_distributor_per_subject() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 1000);
        h.delegate(&subject, 1000);

        h.initiate(&subject, 400).unwrap();
        assert_error(h.initiate(&subject, 100), VaultError::DistributorAlreadyPending);
        assert_eq!(h.vault.distributor_nonce, 1);
    }

    #[test]
    fn test_undelegate_requires_pending_and_unfrozen() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 1000);
        h.delegate(&subject, 1000);
        assert_error(h.undelegate(&subject), VaultError::NoPendingDistributor);

        h.initiate(&subject, 1000).unwrap();
        h.at(500);
        h.engine.freeze(&subject, true);
        assert_error(h.undelegate(&subject), VaultError::SubjectFrozen);

        h.engine.freeze(&subject, false);
        assert_eq!(h.undelegate(&subject).unwrap(), 1000);
    }

    #[test]
    fn test_redeem_splits_cash_and_position() {
        let mut h = Harness::new();
        let (mut u1, mut u2) = (h.user(), h.user());
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.vault.fee_bps = 300;
        h.deposit(&u1, 700);
        h.deposit(&u2, 300);
        h.delegate(&subject, 500);

        let outcome = h.redeem(&mut u1, 350).unwrap();

        assert_eq!(outcome.gross, 175);
        assert_eq!(outcome.fee, 5);
        assert_eq!(h.engine.balance(&u1.key), 170);
        assert_eq!(h.engine.balance(&h.vault.fee_treasury), 5);
        assert_eq!(u1.receiver.tickets.len(), 1);
        assert_eq!(u1.receiver.tickets[0].shares, 175);
        assert_eq!(
            u1.receiver.expected_assets(&h.engine, &h.book).unwrap(),
            175
        );

        assert!(!u2.receiver.has_pending());
        assert_eq!(h.shares[&u2.key], 300);

        assert_eq!(h.vault.cash_balance, 325);
        assert_eq!(h.vault.entry(&subject).unwrap().assets, 325);
        assert_eq!(h.vault.total_assets, 650);
        h.assert_balanced();

        assert_eq!(h.claim(&mut u2), 0);
    }

    #[test]
    fn test_instant_fee_split_has_no_dust() {
        let mut h = Harness::new();
        let mut u = h.user();
        h.vault.fee_bps = 300;
        h.deposit(&u, 100);

        let outcome = h.redeem(&mut u, 100).unwrap();

        assert_eq!((outcome.gross, outcome.net, outcome.fee), (100, 97, 3));
        assert_eq!(h.engine.balance(&u.key), 97);
        assert_eq!(h.engine.balance(&h.vault.fee_treasury), 3);
        assert_eq!(h.engine.balance(&h.key), 0);
        assert_eq!(h.vault.total_assets, 0);
        h.assert_balanced();
    }

    #[test]
    fn test_redeem_routes_distributor_units_pro_rata() {
        let mut h = Harness::new();
        let (mut u1, u2) = (h.user(), h.user());
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u1, 600);
        h.deposit(&u2, 400);
        h.delegate(&subject, 600);
        let (d_key, _) = h.initiate(&subject, 300).unwrap();

        h.at(10);
        let before = h.vault.total_assets;
        let outcome = h.redeem(&mut u1, 300).unwrap();

        assert_eq!(outcome.gross, 120);
        assert_eq!(outcome.subjects_routed, 1);
        assert_eq!(outcome.distributors_routed, 1);
        assert_eq!(u1.receiver.slices[0].distributor, d_key);
        assert_eq!(u1.receiver.slices[0].units, 90);
        assert_eq!(h.book.get(&d_key).unwrap().vault_units, 210);

        // instant + pending == 30% of pre-redemption value
        let pending = u1.receiver.expected_assets(&h.engine, &h.book).unwrap();
        assert_eq!(outcome.gross + pending, before * 300 / 1000);
        assert_eq!(h.vault.total_assets, 700);
        h.assert_balanced();

        // receiver ticket matures at 110, distributor at 100
        h.at(110);
        assert_eq!(h.claim(&mut u1), 180);
        assert!(!u1.receiver.has_pending());

        assert_eq!(h.undelegate(&subject).unwrap(), 210);
        assert_eq!(h.vault.cash_balance, 490);
        assert_eq!(h.vault.entry(&subject).unwrap().assets, 210);
        assert_eq!(h.vault.total_assets, 700);
        assert_eq!(
            h.book.get(&d_key).unwrap().state,
            crate::state::DistributorState::Closed
        );
        h.assert_balanced();
    }

    #[test]
    fn test_deposit_prices_received_amount() {
        let mut h = Harness::new();
        let (a, b) = (h.user(), h.user());
        h.deposit(&a, 1000);

        // 1% skimmed in transit
        h.engine.transfer_fee_bps = 100;
        assert_eq!(h.deposit(&b, 1000), 990);
        assert_eq!(h.engine.balance(&h.key), 1990);
        assert_eq!(h.vault.cash_balance, 1990);
        assert_eq!(h.vault.total_assets, 1990);
        assert_eq!(h.supply, 1990);
        h.assert_balanced();
    }

    #[test]
    fn test_full_redeem_detaches_exhausted_distributor() {
        let mut h = Harness::new();
        let mut u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u, 1000);
        let engine_shares = h.delegate(&subject, 1000);
        let (d_key, _) = h.initiate(&subject, engine_shares).unwrap();

        let outcome = h.redeem(&mut u, 1000).unwrap();

        assert_eq!(outcome.distributors_routed, 1);
        assert_eq!(h.book.get(&d_key).unwrap().vault_units, 0);
        assert!(h.vault.entry(&subject).is_none());
        assert!(h.vault.subjects.is_empty());
        assert!(h.vault.pending_distributors().is_empty());
        assert_eq!(h.vault.total_assets, 0);
        h.assert_balanced();

        // the receiver finalizes the distributor on its own
        h.at(100);
        assert_eq!(h.claim(&mut u), 1000);
        assert_eq!(
            h.book.get(&d_key).unwrap().state,
            crate::state::DistributorState::Closed
        );
        assert_error(h.undelegate(&subject), VaultError::SubjectNotRegistered);
    }

    #[test]
    fn test_redeem_is_proportional_across_every_bucket() {
        let mut h = Harness::new();
        let (mut u1, u2) = (h.user(), h.user());
        let (s1, s2, s3) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        for s in [s1, s2, s3] {
            h.engine.add_subject(s, 100);
        }
        h.deposit(&u1, 6000);
        h.deposit(&u2, 4000);
        h.delegate(&s1, 3000);
        h.delegate(&s2, 3000);
        h.delegate(&s3, 2000);
        h.initiate(&s1, 1000).unwrap();
        h.initiate(&s2, 3000).unwrap();

        h.engine.accrue(&s1, 300);
        h.engine.accrue(&s3, 200);
        h.engine.mint(&h.key, 100);
        h.vault.reconcile(&h.engine, &h.key, &h.book).unwrap();
        let before = h.vault.total_assets;
        assert_eq!(before, 10_600);

        h.at(10);
        let outcome = h.redeem(&mut u1, 2500).unwrap();

        assert_eq!(outcome.subjects_routed, 2);
        assert_eq!(outcome.distributors_routed, 2);
        assert_eq!(u1.receiver.tickets.len(), 2);
        assert_eq!(u1.receiver.slices.len(), 2);

        // at most one unit of rounding per bucket (3 subjects, 2 distributors, cash)
        let expected = before * 2500 / 10_000;
        let pending = u1.receiver.expected_assets(&h.engine, &h.book).unwrap();
        let received = outcome.gross + pending;
        assert!(received <= expected);
        assert!(expected - received <= 6);
        assert_eq!(h.vault.total_assets, before - received);
        assert_eq!(h.vault.subjects.len(), 3);
        h.assert_balanced();

        h.at(110);
        assert_eq!(h.claim(&mut u1), pending);
        assert_eq!(h.engine.balance(&u1.key), received);
        assert!(!u1.receiver.has_pending());
    }

    #[test]
    fn test_receivers_are_isolated() {
        let mut h = Harness::new();
        let (mut u1, mut u2) = (h.user(), h.user());
        let subject = Pubkey::new_unique();
        h.engine.add_subject(subject, 100);
        h.deposit(&u1, 500);
        h.deposit(&u2, 500);
        h.delegate(&subject, 1000);

        h.redeem(&mut u1, 500).unwrap();
        h.at(50);
        h.redeem(&mut u2, 500).unwrap();
        assert!(h.vault.subjects.is_empty());
        h.assert_balanced();

        h.at(100);
        assert_eq!(h.claim(&mut u1), 500);
        assert_eq!(u2.receiver.tickets.len(), 1);
        assert_eq!(h.engine.position_of(&subject, &u2.receiver_key).inactive, 500);
        assert_eq!(h.claim(&mut u2), 0);

        h.at(150);
        assert_eq!(h.claim(&mut u2), 500);
        assert_eq!(h.engine.balance(&u1.key), 500);
        assert_eq!(h.engine.balance(&u2.key), 500);
    }

    #[test]
    fn test_redeem_validation() {
        let mut h = Harness::new();
        let mut u = h.user();
        assert_error(h.redeem(&mut u, 1), VaultError::NoSharesOutstanding);

        h.deposit(&u, 100);
        assert_error(h.redeem(&mut u, 0), VaultError::InvalidAmount);
        assert_error(h.redeem(&mut u, 101), VaultError::ExceededMaxRedeem);
        assert_eq!(h.vault.cash_balance, 100);
    }

    #[test]
    fn test_withdraw_burns_rounded_up_shares() {
        let mut h = Harness::new();
        let mut u = h.user();
        h.deposit(&u, 1000);
        h.engine.mint(&h.key, 500);

        let request = RedeemRequest {
            shares: 0,
            owner_balance: 1000,
            total_supply: 1000,
            receiver: u.receiver_key,
            destination: u.key,
        };
        let (shares, outcome) = h
            .vault
            .withdraw(&mut h.engine, &h.key, &mut u.receiver, &mut h.book, 100, &request)
            .unwrap();

        assert_eq!(shares, 67);
        assert_eq!(outcome.gross, 100);
        assert_eq!(h.vault.total_assets, 1400);
    }

    #[test]
    fn test_registry_swap_remove_fixes_index() {
        let mut vault = Vault::default();
        let keys: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        for key in &keys {
            vault.register_subject(key).unwrap();
        }

        vault.remove_subject(&keys[0]).unwrap();

        assert_eq!(vault.subject_position(&keys[0]), None);
        assert_eq!(vault.subject_position(&keys[3]), Some(0));
        assert_eq!(vault.subject_position(&keys[1]), Some(1));
        assert_eq!(vault.subject_position(&keys[2]), Some(2));
        assert_eq!(vault.subjects.len(), 3);
        assert_error(vault.remove_subject(&keys[0]), VaultError::SubjectNotRegistered);

        vault.remove_subject(&keys[2]).unwrap();
        assert_eq!(vault.subject_position(&keys[3]), Some(0));
        assert_eq!(vault.subject_position(&keys[1]), Some(1));
    }

    #[test]
    fn test_registry_capacity() {
        let mut vault = Vault::default();
        for _ in 0..MAX_SUBJECTS {
            vault.register_subject(&Pubkey::new_unique()).unwrap();
        }
        assert_error(
            vault.register_subject(&Pubkey::new_unique()),
            VaultError::SubjectRegistryFull,
        );
        let existing = vault.subjects[3].subject;
        assert_eq!(vault.register_subject(&existing).unwrap(), 3);
    }

    #[test]
    fn test_claim_rewards_lands_as_cash() {
        let mut h = Harness::new();
        let u = h.user();
        let subject = Pubkey::new_unique();
        h.engine.reward_per_claim = 5;
        h.deposit(&u, 100);

        h.vault
            .claim_rewards(&mut h.engine, &h.key, &subject, &[1, 2])
            .unwrap();
        assert_eq!(h.vault.reconcile_cash(&h.engine, &h.key).unwrap(), 10);
        assert_eq!(h.vault.total_assets, 110);

        assert_error(
            h.vault.claim_rewards(&mut h.engine, &h.key, &subject, &[]),
            VaultError::TooManyEpochs,
        );
        let epochs = vec![0u64; MAX_REWARD_EPOCHS + 1];
        assert_error(
            h.vault.claim_rewards(&mut h.engine, &h.key, &subject, &epochs),
            VaultError::TooManyEpochs,
        );
    }

    #[test]
    fn test_redeem_authority() {
        let (owner, delegate, stranger) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        assert!(Vault::check_redeem_authority(&owner, &owner, None, 0, 10).is_ok());
        assert!(Vault::check_redeem_authority(&delegate, &owner, Some(delegate), 10, 10).is_ok());
        assert_error(
            Vault::check_redeem_authority(&delegate, &owner, Some(delegate), 9, 10),
            VaultError::Unauthorized,
        );
        assert_error(
            Vault::check_redeem_authority(&stranger, &owner, Some(delegate), 10, 10),
            VaultError::Unauthorized,
        );
    }

    #[test]
    fn test_fee_setters_validate() {
        let mut vault = Vault::default();
        assert_error(vault.set_fee_bps(BPS_DENOMINATOR), VaultError::FeeTooHigh);
        vault.set_fee_bps(MAX_FEE_BPS).unwrap();
        assert_eq!(vault.fee_bps, MAX_FEE_BPS);
        assert_error(
            vault.set_fee_treasury(Pubkey::default()),
            VaultError::InvalidTreasury,
        );
        let treasury = Pubkey::new_unique();
        vault.set_fee_treasury(treasury).unwrap();
        assert_eq!(vault.fee_treasury, treasury);
    }

    #[test]
    fn test_full_registry_fits_account_space() {
        let mut vault = Vault::default();
        for i in 0..MAX_SUBJECTS {
            vault.subjects.push(SubjectEntry {
                subject: Pubkey::new_unique(),
                assets: u64::MAX,
                distributor: Some(Pubkey::new_unique()),
                deadline: i64::MAX,
            });
            vault.subject_index.push(IndexSlot {
                subject: Pubkey::new_unique(),
                position: i as u16,
            });
        }

        let mut data = Vec::new();
        vault.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), 8 + Vault::INIT_SPACE);
    }
}
