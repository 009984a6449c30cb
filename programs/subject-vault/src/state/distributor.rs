// =============================================================================
// Distributor State Account
// =============================================================================
// A Distributor isolates one subject's in-flight undelegation. The vault
// hands it the exiting shares, the distributor queues them at the staking
// engine, and from then on the locked position is divided into claim units
// (one unit per inactive share) so depositors who redeem while the exit is
// in flight can each take a slice.
//
// Lifecycle (strictly forward):
//   Pending  - shares locked at the engine
//   Matured  - lock expired, engine withdrawal done, assets held here
//   Closed   - every claim unit swept
//
// Whoever sweeps first after maturity triggers the engine withdrawal; later
// sweepers are paid from the realized assets.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::engine::{AssetBank, StakingEngine};
use crate::error::VaultError;
use crate::math::mul_div;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub enum DistributorState {
    /// Shares are locked in the engine's withdrawal queue
    Pending,

    /// Engine withdrawal executed; realized assets await sweeping
    Matured,

    /// All claim units have been paid out
    Closed,
}

impl Default for DistributorState {
    fn default() -> Self {
        DistributorState::Pending
    }
}

/// One undelegation in flight for one subject.
///
/// PDA: ["distributor", vault, subject, nonce_le_bytes]
#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct Distributor {
    pub vault: Pubkey,

    pub subject: Pubkey,

    /// Vault-wide counter value at creation, part of the PDA seeds
    pub nonce: u64,

    /// Engine unlock time for the queued position
    pub maturity: i64,

    pub state: DistributorState,

    /// Inactive shares queued at creation. Also the total claim units.
    pub locked_shares: u64,

    /// Claim units still owned by the vault
    pub vault_units: u64,

    /// Claim units not yet swept (vault + every receiver)
    pub outstanding_units: u64,

    /// Assets realized by the engine withdrawal
    pub realized_assets: u64,

    /// Realized assets not yet swept
    pub outstanding_assets: u64,

    pub bump: u8,
}

impl Distributor {
    /// PDA signer seeds for this distributor
    pub fn signer_seeds(&self) -> Vec<Vec<u8>> {
        vec![
            DISTRIBUTOR_SEED.to_vec(),
            self.vault.to_bytes().to_vec(),
            self.subject.to_bytes().to_vec(),
            self.nonce.to_le_bytes().to_vec(),
            vec![self.bump],
        ]
    }

    /// Queue the active shares this distributor now holds at the engine.
    ///
    /// `holder` is this distributor's own address. The number of locked
    /// shares is read back from the engine rather than taken from the
    /// caller. Returns the maturity deadline.
    pub fn initialize<E: StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        vault: Pubkey,
        subject: Pubkey,
        nonce: u64,
        bump: u8,
    ) -> Result<i64> {
        let active = engine.active_shares(&subject, holder)?;
        require!(active > 0, VaultError::InvalidAmount);

        let before = engine.inactive_shares(&subject, holder)?;
        let maturity = engine.initiate_withdrawal(holder, &subject, active)?;
        let after = engine.inactive_shares(&subject, holder)?;
        let locked = after
            .checked_sub(before)
            .ok_or(error!(VaultError::MathUnderflow))?;
        require!(locked > 0, VaultError::InvalidAmount);

        self.vault = vault;
        self.subject = subject;
        self.nonce = nonce;
        self.bump = bump;
        self.maturity = maturity;
        self.state = DistributorState::Pending;
        self.locked_shares = locked;
        self.vault_units = locked;
        self.outstanding_units = locked;
        self.realized_assets = 0;
        self.outstanding_assets = 0;

        msg!(
            "Distributor queued {} inactive shares of {}, matures at {}",
            locked,
            subject,
            maturity
        );

        Ok(maturity)
    }

    /// Lock has expired and the engine is not blocking withdrawals
    pub fn is_mature<E: StakingEngine>(&self, engine: &E, now: i64) -> Result<bool> {
        if self.state != DistributorState::Pending {
            return Ok(true);
        }
        Ok(now >= self.maturity && !engine.is_frozen(&self.subject)?)
    }

    /// Convert the whole locked position to assets, once.
    ///
    /// Returns Ok(false) while still locked or frozen, so pollers can call
    /// this freely.
    pub fn try_finalize<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        now: i64,
    ) -> Result<bool> {
        match self.state {
            DistributorState::Closed => err!(VaultError::DistributorClosed),
            DistributorState::Matured => Ok(true),
            DistributorState::Pending => {
                if !self.is_mature(engine, now)? {
                    return Ok(false);
                }

                let before = engine.balance_of(holder)?;
                engine.withdraw(holder, &self.subject)?;
                let after = engine.balance_of(holder)?;
                let realized = after
                    .checked_sub(before)
                    .ok_or(error!(VaultError::MathUnderflow))?;

                self.realized_assets = realized;
                self.outstanding_assets = realized;
                self.state = DistributorState::Matured;

                msg!(
                    "Distributor for {} finalized: {} assets for {} units",
                    self.subject,
                    realized,
                    self.outstanding_units
                );
                Ok(true)
            }
        }
    }

    /// Pay `units` worth of realized assets to `destination`.
    ///
    /// Returns Ok(None) if the position has not matured yet. The last sweeper
    /// receives any rounding remainder, so the sum of all payouts equals the
    /// realized amount exactly.
    pub fn sweep<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        destination: &Pubkey,
        units: u64,
        now: i64,
    ) -> Result<Option<u64>> {
        require!(
            self.state != DistributorState::Closed,
            VaultError::DistributorClosed
        );
        require!(
            units > 0 && units <= self.outstanding_units,
            VaultError::InvalidAmount
        );

        if !self.try_finalize(engine, holder, now)? {
            return Ok(None);
        }

        let amount = mul_div(units, self.outstanding_assets, self.outstanding_units)?;
        engine.transfer(holder, destination, amount)?;

        self.outstanding_assets = self
            .outstanding_assets
            .checked_sub(amount)
            .ok_or(error!(VaultError::MathUnderflow))?;
        self.outstanding_units = self
            .outstanding_units
            .checked_sub(units)
            .ok_or(error!(VaultError::MathUnderflow))?;

        if self.outstanding_units == 0 {
            self.state = DistributorState::Closed;
            msg!("Distributor for {} closed", self.subject);
        }

        Ok(Some(amount))
    }

    /// Sweep every unit the vault still owns back to the vault
    pub fn release_vault_units<E: AssetBank + StakingEngine>(
        &mut self,
        engine: &mut E,
        holder: &Pubkey,
        vault_holder: &Pubkey,
        now: i64,
    ) -> Result<Option<u64>> {
        let units = self.vault_units;
        if units == 0 {
            return Ok(Some(0));
        }
        let paid = self.sweep(engine, holder, vault_holder, units, now)?;
        if paid.is_some() {
            self.vault_units = 0;
        }
        Ok(paid)
    }

    /// Hand `units` of the vault's slice over to a depositor
    pub fn allocate(&mut self, units: u64) -> Result<()> {
        require!(
            self.state != DistributorState::Closed,
            VaultError::DistributorClosed
        );
        self.vault_units = self
            .vault_units
            .checked_sub(units)
            .ok_or(error!(VaultError::MathUnderflow))?;
        Ok(())
    }

    /// Current asset value of `units` claim units
    pub fn value_of<E: StakingEngine>(&self, engine: &E, units: u64) -> Result<u64> {
        match self.state {
            DistributorState::Pending => engine.inactive_shares_to_stake(&self.subject, units),
            DistributorState::Matured => {
                if self.outstanding_units == 0 {
                    return Ok(0);
                }
                mul_div(units, self.outstanding_assets, self.outstanding_units)
            }
            DistributorState::Closed => Ok(0),
        }
    }
}

/// The distributor accounts supplied to one instruction, keyed by address.
///
/// Handlers load them from remaining accounts, the accounting core mutates
/// them here, and the handler writes them back afterwards.
#[derive(Default)]
pub struct DistributorBook {
    entries: Vec<(Pubkey, Distributor)>,
}

impl DistributorBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Pubkey, distributor: Distributor) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = distributor,
            None => self.entries.push((key, distributor)),
        }
    }

    pub fn get(&self, key: &Pubkey) -> Option<&Distributor> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, key: &Pubkey) -> Option<&mut Distributor> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Pubkey, Distributor)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(Pubkey, Distributor)> {
        self.entries
    }
}
