// =============================================================================
// Subject Vault Error Codes
// =============================================================================
// Errors are grouped by what the caller can do about them:
// - Authorization: wrong signer, never retry
// - State: wait (maturity, freeze) or adjust the request, then retry
// - Input: correct the arguments or accounts
// - Arithmetic: a broken accounting invariant, treat as a defect
// =============================================================================

use anchor_lang::prelude::*;

/// All errors the subject vault program can return.
///
/// Anchor assigns numeric codes starting from 6000.
#[error_code]
pub enum VaultError {
    // =========================================================================
    // Authorization Errors
    // =========================================================================

    /// Caller is neither the owner nor an approved delegate
    #[msg("Unauthorized - signer does not have permission")]
    Unauthorized,

    /// Only the vault admin can call this function
    #[msg("Only admin can perform this action")]
    AdminOnly,

    /// Only the vault operator can move funds between subjects
    #[msg("Only the operator can perform this action")]
    OperatorOnly,

    // =========================================================================
    // State Errors
    // =========================================================================

    /// One outstanding undelegation per subject
    #[msg("Subject already has a pending undelegation")]
    DistributorAlreadyPending,

    /// undelegate called for a subject with nothing in flight
    #[msg("Subject has no pending undelegation")]
    NoPendingDistributor,

    /// The engine lock has not expired yet
    #[msg("Undelegation has not matured yet")]
    UndelegationNotMatured,

    /// The staking engine reports the subject frozen
    #[msg("Subject is frozen by the staking engine")]
    SubjectFrozen,

    /// Redeem amount is above the owner's share balance
    #[msg("Redeem exceeds maximum redeemable shares")]
    ExceededMaxRedeem,

    /// No shares exist, so there is nothing to split pro-rata
    #[msg("No shares outstanding")]
    NoSharesOutstanding,

    /// Registry is at MAX_SUBJECTS
    #[msg("Subject registry is full")]
    SubjectRegistryFull,

    /// Receiver holds MAX_RECEIVER_DISTRIBUTORS slices already
    #[msg("Receiver cannot track more distributors")]
    ReceiverFull,

    /// Subject is not in the vault registry
    #[msg("Subject is not registered")]
    SubjectNotRegistered,

    /// Distributor has already paid out every claim unit
    #[msg("Distributor is closed")]
    DistributorClosed,

    /// A live distributor account was not supplied to the instruction
    #[msg("Pending distributor account missing")]
    MissingDistributor,

    /// Delegation larger than the vault's idle balance
    #[msg("Insufficient idle assets in vault")]
    InsufficientCash,

    /// Supplied distributor belongs to another vault or subject
    #[msg("Distributor does not match vault or subject")]
    DistributorMismatch,

    // =========================================================================
    // Input Errors
    // =========================================================================

    /// Zero amounts are rejected
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    /// fee_bps must be strictly below BPS_DENOMINATOR
    #[msg("Fee exceeds maximum allowed")]
    FeeTooHigh,

    /// Treasury token account is not usable
    #[msg("Invalid fee treasury")]
    InvalidTreasury,

    /// Zero address supplied where a real key is needed
    #[msg("Invalid address")]
    InvalidAddress,

    /// Asset mint does not match the vault's asset
    #[msg("Invalid asset mint - must use vault's asset token")]
    InvalidAssetMint,

    /// Share mint does not match the vault's share token
    #[msg("Invalid share mint")]
    InvalidShareMint,

    /// Token account owner doesn't match expected owner
    #[msg("Invalid token account owner")]
    InvalidTokenAccountOwner,

    /// Calculated share amount rounds down to zero
    #[msg("Share amount rounds to zero")]
    ShareAmountZero,

    /// Slippage guard triggered
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    /// claim_rewards called with too many or zero epochs
    #[msg("Invalid reward epoch list")]
    TooManyEpochs,

    /// Program account does not match the configured engine
    #[msg("Invalid staking engine program")]
    InvalidEngineProgram,

    /// Program account does not match the configured rewards engine
    #[msg("Invalid rewards engine program")]
    InvalidRewardsProgram,

    /// A required engine or token account was not passed in remaining accounts
    #[msg("Required engine account missing")]
    MissingEngineAccount,

    /// Engine account data could not be decoded
    #[msg("Engine account could not be deserialized")]
    InvalidEngineAccount,

    // =========================================================================
    // Arithmetic Errors
    // =========================================================================

    /// A calculation would overflow
    #[msg("Math overflow - calculation exceeded maximum value")]
    MathOverflow,

    /// A calculation would underflow
    #[msg("Math underflow - result would be negative")]
    MathUnderflow,

    /// Division by zero
    #[msg("Division by zero")]
    DivisionByZero,

    // =========================================================================
    // CPI Errors
    // =========================================================================

    /// Staking engine rejected the call
    #[msg("Staking engine CPI failed")]
    EngineCpiFailed,

    /// Rewards engine rejected the call
    #[msg("Rewards engine CPI failed")]
    RewardsCpiFailed,
}
