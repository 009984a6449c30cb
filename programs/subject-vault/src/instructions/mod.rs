// =============================================================================
// Instructions Module
// =============================================================================
// This module exports all instructions for the subject vault.
//
// Handlers stay thin: they resolve accounts, build the CPI adapter and hand
// off to the accounting methods on the state accounts.
// =============================================================================

// Shared remaining-accounts helpers
pub mod remaining;

// Core vault operations
pub mod claim_redeem;
pub mod deposit;
pub mod expected_assets;
pub mod initialize_vault;
pub mod sync;
pub mod withdraw;

// Operator operations
pub mod delegate;
pub mod initiate_undelegate;
pub mod rewards;
pub mod undelegate;

// Admin operations
pub mod admin;

// Re-export everything from each module
// The #[derive(Accounts)] macro generates helper types that need to be at crate root
pub use admin::*;
pub use claim_redeem::*;
pub use delegate::*;
pub use deposit::*;
pub use expected_assets::*;
pub use initialize_vault::*;
pub use initiate_undelegate::*;
pub use rewards::*;
pub use sync::*;
pub use undelegate::*;
pub use withdraw::*;
