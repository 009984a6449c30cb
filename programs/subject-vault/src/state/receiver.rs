// =============================================================================
// Redemption Receiver State Account
// =============================================================================
// One Receiver per (vault, depositor). It holds everything a redemption
// could not pay out instantly:
//   - withdrawal tickets for active shares routed to it, queued at the engine
//     in its own name
//   - claim-unit slices of distributors that were in flight at redemption
//
// Receivers never share positions, so one depositor's claim cannot touch
// another depositor's balance.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::engine::{AssetBank, StakingEngine};
use crate::error::VaultError;
use crate::math::split_fee;
use crate::state::DistributorBook;

/// A queued engine withdrawal for one subject
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct WithdrawalTicket {
    pub subject: Pubkey,

    /// Inactive shares queued at the engine
    pub shares: u64,

    pub deadline: i64,
}

/// Claim units of one distributor
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub struct DistributorSlice {
    pub distributor: Pubkey,

    pub units: u64,
}

/// PDA: ["receiver", vault, owner]
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct Receiver {
    pub vault: Pubkey,

    /// Depositor this receiver pays out to
    pub owner: Pubkey,

    /// One ticket per subject, ordered by first redemption
    #[max_len(16)]
    pub tickets: Vec<WithdrawalTicket>,

    #[max_len(32)]
    pub slices: Vec<DistributorSlice>,

    /// Gross assets collected over the receiver's lifetime
    pub total_claimed: u64,

    pub bump: u8,
}

/// Result of one claim pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub gross: u64,
    pub net: u64,
    pub fee: u64,
    pub tickets_settled: u32,
    pub slices_settled: u32,
}

impl Receiver {
    /// Returns true when the account was fresh and has now been set up
    pub fn initialize_if_needed(&mut self, vault: Pubkey, owner: Pubkey, bump: u8) -> bool {
        if self.owner != Pubkey::default() {
            return false;
        }
        self.vault = vault;
        self.owner = owner;
        self.bump = bump;
        true
    }

    pub fn signer_seeds(&self) -> Vec<Vec<u8>> {
        vec![
            RECEIVER_SEED.to_vec(),
            self.vault.to_bytes().to_vec(),
            self.owner.to_bytes().to_vec(),
            vec![self.bump],
        ]
    }

    pub fn has_pending(&self) -> bool {
        !self.tickets.is_empty() || !self.slices.is_empty()
    }

    /// Queue active shares already transferred to `holder` for withdrawal.
    ///
    /// A second redemption against the same subject merges into the existing
    /// ticket: shares add up and the deadline moves to the later one, which
    /// is what the engine does to the underlying position.
    pub fn add_undelegation<E: StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        subject: &Pubkey,
        active_shares: u64,
    ) -> Result<()> {
        if active_shares == 0 {
            return Ok(());
        }

        let existing = self.tickets.iter().position(|t| t.subject == *subject);
        require!(
            existing.is_some() || self.tickets.len() < MAX_SUBJECTS,
            VaultError::ReceiverFull
        );

        let before = engine.inactive_shares(subject, holder)?;
        let deadline = engine.initiate_withdrawal(holder, subject, active_shares)?;
        let after = engine.inactive_shares(subject, holder)?;
        let queued = after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))?;

        match existing {
            Some(i) => {
                let ticket = &mut self.tickets[i];
                ticket.shares = ticket
                    .shares
                    .checked_add(queued)
                    .ok_or(error!(VaultError::MathOverflow))?;
                ticket.deadline = ticket.deadline.max(deadline);
            }
            None => self.tickets.push(WithdrawalTicket {
                subject: *subject,
                shares: queued,
                deadline,
            }),
        }

        Ok(())
    }

    /// Record claim units of a distributor. Registering the same distributor
    /// again adds units to the existing slice.
    pub fn add_distributor(&mut self, distributor: Pubkey, units: u64) -> Result<()> {
        if units == 0 {
            return Ok(());
        }

        match self.slices.iter_mut().find(|s| s.distributor == distributor) {
            Some(slice) => {
                slice.units = slice
                    .units
                    .checked_add(units)
                    .ok_or(error!(VaultError::MathOverflow))?;
            }
            None => {
                require!(
                    self.slices.len() < MAX_RECEIVER_DISTRIBUTORS,
                    VaultError::ReceiverFull
                );
                self.slices.push(DistributorSlice { distributor, units });
            }
        }

        Ok(())
    }

    /// Collect everything that has matured and pay it to `destination`,
    /// minus the vault fee.
    ///
    /// Tickets still locked or frozen and distributors not yet matured are
    /// left in place, so calling this early (or twice) is harmless and
    /// returns zero.
    #[allow(clippy::too_many_arguments)]
    pub fn claim<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        book: &mut DistributorBook,
        destination: &Pubkey,
        fee_bps: u16,
        treasury: &Pubkey,
        now: i64,
    ) -> Result<ClaimOutcome> {
        let mut outcome = ClaimOutcome::default();
        let mut gross: u64 = 0;

        // ---------------------------------------------------------------------
        // Matured engine withdrawals
        // ---------------------------------------------------------------------
        let mut i = 0;
        while i < self.tickets.len() {
            let ticket = self.tickets[i];
            if now < ticket.deadline || engine.is_frozen(&ticket.subject)? {
                i += 1;
                continue;
            }

            let before = engine.balance_of(holder)?;
            engine.withdraw(holder, &ticket.subject)?;
            let after = engine.balance_of(holder)?;
            let received = after
                .checked_sub(before)
                .ok_or(error!(VaultError::MathUnderflow))?;

            gross = gross
                .checked_add(received)
                .ok_or(error!(VaultError::MathOverflow))?;
            self.tickets.remove(i);
            outcome.tickets_settled += 1;
        }

        // ---------------------------------------------------------------------
        // Distributor slices
        // ---------------------------------------------------------------------
        let mut i = 0;
        while i < self.slices.len() {
            let slice = self.slices[i];
            let Some(distributor) = book.get_mut(&slice.distributor) else {
                i += 1;
                continue;
            };

            let before = engine.balance_of(holder)?;
            let paid = distributor.sweep(engine, &slice.distributor, holder, slice.units, now)?;
            if paid.is_none() {
                i += 1;
                continue;
            }
            let after = engine.balance_of(holder)?;
            let received = after
                .checked_sub(before)
                .ok_or(error!(VaultError::MathUnderflow))?;

            gross = gross
                .checked_add(received)
                .ok_or(error!(VaultError::MathOverflow))?;
            self.slices.remove(i);
            outcome.slices_settled += 1;
        }

        if gross == 0 {
            return Ok(outcome);
        }

        let (net, fee) = split_fee(gross, fee_bps)?;
        engine.transfer(holder, destination, net)?;
        if fee > 0 {
            engine.transfer(holder, treasury, fee)?;
        }

        self.total_claimed = self
            .total_claimed
            .checked_add(gross)
            .ok_or(error!(VaultError::MathOverflow))?;

        outcome.gross = gross;
        outcome.net = net;
        outcome.fee = fee;
        Ok(outcome)
    }

    /// Assets this receiver would collect if everything matured at current
    /// engine rates. Pure read.
    pub fn expected_assets<E: StakingEngine>(&self, engine: &E, book: &DistributorBook) -> Result<u64> {
        let mut total: u64 = 0;

        for ticket in &self.tickets {
            let value = engine.inactive_shares_to_stake(&ticket.subject, ticket.shares)?;
            total = total
                .checked_add(value)
                .ok_or(error!(VaultError::MathOverflow))?;
        }

        for slice in &self.slices {
            let distributor = book
                .get(&slice.distributor)
                .ok_or(error!(VaultError::MissingDistributor))?;
            let value = distributor.value_of(engine, slice.units)?;
            total = total
                .checked_add(value)
                .ok_or(error!(VaultError::MathOverflow))?;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use crate::state::Distributor;

    fn receiver() -> (Receiver, Pubkey) {
        let mut r = Receiver::default();
        assert!(r.initialize_if_needed(Pubkey::new_unique(), Pubkey::new_unique(), 255));
        (r, Pubkey::new_unique())
    }

    /// Engine with one subject (delay 100) and `shares` active shares held by `holder`
    fn engine_with(subject: &Pubkey, holder: &Pubkey, shares: u64) -> MockEngine {
        let mut engine = MockEngine::new();
        engine.add_subject(*subject, 100);
        engine.mint(holder, shares);
        engine.deposit(holder, subject, shares).unwrap();
        engine
    }

    #[test]
    fn test_initialize_only_once() {
        let (mut r, _) = receiver();
        let owner = r.owner;
        assert!(!r.initialize_if_needed(Pubkey::new_unique(), Pubkey::new_unique(), 1));
        assert_eq!(r.owner, owner);
        assert_eq!(r.bump, 255);
    }

    #[test]
    fn test_add_undelegation_merges_tickets() {
        let (mut r, holder) = receiver();
        let subject = Pubkey::new_unique();
        let mut engine = engine_with(&subject, &holder, 300);

        r.add_undelegation(&mut engine, &holder, &subject, 100).unwrap();
        assert_eq!(r.tickets[0].deadline, 100);

        engine.now = 40;
        r.add_undelegation(&mut engine, &holder, &subject, 200).unwrap();

        assert_eq!(r.tickets.len(), 1);
        assert_eq!(r.tickets[0].shares, 300);
        assert_eq!(r.tickets[0].deadline, 140);
    }

    #[test]
    fn test_add_distributor_is_idempotent_per_key() {
        let (mut r, _) = receiver();
        let d = Pubkey::new_unique();
        r.add_distributor(d, 10).unwrap();
        r.add_distributor(d, 5).unwrap();
        r.add_distributor(Pubkey::new_unique(), 0).unwrap();
        assert_eq!(r.slices, vec![DistributorSlice { distributor: d, units: 15 }]);
    }

    #[test]
    fn test_add_distributor_capacity() {
        let (mut r, _) = receiver();
        for _ in 0..MAX_RECEIVER_DISTRIBUTORS {
            r.add_distributor(Pubkey::new_unique(), 1).unwrap();
        }
        assert!(r.add_distributor(Pubkey::new_unique(), 1).is_err());
        // existing keys still merge when full
        let first = r.slices[0].distributor;
        r.add_distributor(first, 1).unwrap();
        assert_eq!(r.slices[0].units, 2);
    }

    #[test]
    fn test_claim_before_maturity_returns_zero_and_keeps_state() {
        let (mut r, holder) = receiver();
        let subject = Pubkey::new_unique();
        let mut engine = engine_with(&subject, &holder, 100);
        r.add_undelegation(&mut engine, &holder, &subject, 100).unwrap();
        let snapshot = r.clone();

        let (dest, treasury) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut book = DistributorBook::new();
        engine.now = 50;
        let outcome = r
            .claim(&mut engine, &holder, &mut book, &dest, 300, &treasury, 50)
            .unwrap();

        assert_eq!(outcome, ClaimOutcome::default());
        assert_eq!(r, snapshot);
        assert_eq!(engine.balance(&dest), 0);
    }

    #[test]
    fn test_claim_pays_net_and_fee_once() {
        let (mut r, holder) = receiver();
        let subject = Pubkey::new_unique();
        let mut engine = engine_with(&subject, &holder, 100);
        r.add_undelegation(&mut engine, &holder, &subject, 100).unwrap();

        let (dest, treasury) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut book = DistributorBook::new();
        engine.now = 100;
        let outcome = r
            .claim(&mut engine, &holder, &mut book, &dest, 300, &treasury, 100)
            .unwrap();

        assert_eq!(outcome.gross, 100);
        assert_eq!(engine.balance(&dest), 97);
        assert_eq!(engine.balance(&treasury), 3);
        assert!(!r.has_pending());
        assert_eq!(r.total_claimed, 100);

        let again = r
            .claim(&mut engine, &holder, &mut book, &dest, 300, &treasury, 100)
            .unwrap();
        assert_eq!(again.gross, 0);
        assert_eq!(engine.balance(&dest), 97);
    }

    #[test]
    fn test_claim_skips_frozen_subject() {
        let (mut r, holder) = receiver();
        let (frozen, open) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut engine = engine_with(&frozen, &holder, 50);
        engine.add_subject(open, 100);
        engine.mint(&holder, 70);
        engine.deposit(&holder, &open, 70).unwrap();
        r.add_undelegation(&mut engine, &holder, &frozen, 50).unwrap();
        r.add_undelegation(&mut engine, &holder, &open, 70).unwrap();
        engine.freeze(&frozen, true);

        let (dest, treasury) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut book = DistributorBook::new();
        engine.now = 200;
        let outcome = r
            .claim(&mut engine, &holder, &mut book, &dest, 0, &treasury, 200)
            .unwrap();

        assert_eq!(outcome.gross, 70);
        assert_eq!(outcome.fee, 0);
        assert_eq!(r.tickets.len(), 1);
        assert_eq!(r.tickets[0].subject, frozen);
    }

    #[test]
    fn test_claim_and_expected_assets_with_distributor_slice() {
        let (mut r, holder) = receiver();
        let subject = Pubkey::new_unique();
        let d_key = Pubkey::new_unique();
        let mut engine = engine_with(&subject, &d_key, 400);
        let mut distributor = Distributor::default();
        distributor
            .initialize(&mut engine, &d_key, Pubkey::new_unique(), subject, 0, 1)
            .unwrap();
        distributor.allocate(100).unwrap();
        r.add_distributor(d_key, 100).unwrap();

        let mut book = DistributorBook::new();
        book.insert(d_key, distributor);
        assert_eq!(r.expected_assets(&engine, &book).unwrap(), 100);

        let (dest, treasury) = (Pubkey::new_unique(), Pubkey::new_unique());
        engine.now = 100;
        let outcome = r
            .claim(&mut engine, &holder, &mut book, &dest, 0, &treasury, 100)
            .unwrap();

        assert_eq!(outcome.gross, 100);
        assert_eq!(outcome.slices_settled, 1);
        assert_eq!(engine.balance(&dest), 100);
        assert_eq!(book.get(&d_key).unwrap().vault_units, 300);
        assert_eq!(r.expected_assets(&engine, &book).unwrap(), 0);
    }

    #[test]
    fn test_expected_assets_requires_every_distributor() {
        let (mut r, _) = receiver();
        r.add_distributor(Pubkey::new_unique(), 5).unwrap();
        let engine = MockEngine::new();
        assert!(r.expected_assets(&engine, &DistributorBook::new()).is_err());
    }

    #[test]
    fn test_full_receiver_fits_account_space() {
        let mut r = Receiver::default();
        for _ in 0..MAX_SUBJECTS {
            r.tickets.push(WithdrawalTicket {
                subject: Pubkey::new_unique(),
                shares: u64::MAX,
                deadline: i64::MAX,
            });
        }
        for _ in 0..MAX_RECEIVER_DISTRIBUTORS {
            r.slices.push(DistributorSlice {
                distributor: Pubkey::new_unique(),
                units: u64::MAX,
            });
        }

        let mut data = Vec::new();
        r.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), 8 + Receiver::INIT_SPACE);
    }
}
