// =============================================================================
// Remaining Accounts
// =============================================================================
// The accounts an instruction touches depend on ledger state: one engine
// position per registered subject, one Distributor (plus its asset account)
// per exit in flight. Clients pass them as remaining accounts in any order
// and the helpers here pick them out by address.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::engine::EngineCpi;
use crate::error::VaultError;
use crate::state::{Distributor, DistributorBook};

pub fn find<'info>(remaining: &[AccountInfo<'info>], key: &Pubkey) -> Option<AccountInfo<'info>> {
    remaining.iter().find(|a| a.key == key).cloned()
}

/// ["distributor_assets", distributor]
pub fn distributor_assets_address(distributor: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[DISTRIBUTOR_ASSETS_SEED, distributor.as_ref()], &crate::ID).0
}

/// Deserialize a Distributor and check it belongs to `vault`
pub fn load_distributor(info: &AccountInfo, vault: &Pubkey) -> Result<Distributor> {
    require_keys_eq!(*info.owner, crate::ID, VaultError::DistributorMismatch);
    let data = info.try_borrow_data()?;
    let distributor = Distributor::try_deserialize(&mut &data[..])?;
    require_keys_eq!(distributor.vault, *vault, VaultError::DistributorMismatch);
    Ok(distributor)
}

/// Load every distributor in `keys`. Missing accounts are an error: the
/// ledger cannot be valued without them.
pub fn load_book(
    remaining: &[AccountInfo],
    vault: &Pubkey,
    keys: &[Pubkey],
) -> Result<DistributorBook> {
    let mut book = DistributorBook::new();
    for key in keys {
        let info = find(remaining, key).ok_or_else(|| {
            msg!("Missing distributor {}", key);
            error!(VaultError::MissingDistributor)
        })?;
        book.insert(*key, load_distributor(&info, vault)?);
    }
    Ok(book)
}

/// Load whichever of `keys` were supplied. Used by claims, which settle
/// what they can and leave the rest for a later call.
pub fn load_available(
    remaining: &[AccountInfo],
    vault: &Pubkey,
    keys: &[Pubkey],
) -> Result<DistributorBook> {
    let mut book = DistributorBook::new();
    for key in keys {
        if let Some(info) = find(remaining, key) {
            book.insert(*key, load_distributor(&info, vault)?);
        }
    }
    Ok(book)
}

/// Let the adapter sign for every distributor in `book`
pub fn sign_for_distributors<'info>(
    engine: &mut EngineCpi<'info>,
    remaining: &[AccountInfo<'info>],
    book: &DistributorBook,
) -> Result<()> {
    for (key, distributor) in book.iter() {
        let authority = find(remaining, key).ok_or(error!(VaultError::MissingDistributor))?;
        let assets = find(remaining, &distributor_assets_address(key))
            .ok_or(error!(VaultError::MissingEngineAccount))?;
        engine.add_pda(authority, assets, distributor.signer_seeds());
    }
    Ok(())
}

/// Write every distributor in `book` back to its account
pub fn store_book(remaining: &[AccountInfo], book: DistributorBook) -> Result<()> {
    for (key, distributor) in book.into_entries() {
        let info = find(remaining, &key).ok_or(error!(VaultError::MissingDistributor))?;
        require!(info.is_writable, VaultError::InvalidEngineAccount);
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        distributor.try_serialize(&mut writer)?;
    }
    Ok(())
}
