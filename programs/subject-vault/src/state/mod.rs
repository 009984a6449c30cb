// =============================================================================
// State Module
// =============================================================================
// Account structures owned by the subject vault program:
// - Vault: the pooled ledger and subject registry
// - Distributor: one subject's undelegation in flight
// - Receiver: one depositor's pending redemptions
// =============================================================================

pub mod distributor;
pub mod receiver;
pub mod vault;

pub use distributor::*;
pub use receiver::*;
pub use vault::*;
