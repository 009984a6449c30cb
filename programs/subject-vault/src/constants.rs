// =============================================================================
// Subject Vault Constants
// =============================================================================
// Seeds, fee limits and capacity bounds for the subject vault program.
// Account capacities are fixed at allocation time, so every list stored
// on-chain has a hard maximum declared here.
// =============================================================================

// =============================================================================
// FEE CONFIGURATION (in basis points - 1 BPS = 0.01%)
// =============================================================================

/// Total basis points (100%) - used as denominator in fee calculations
/// Example: fee = amount * fee_bps / BPS_DENOMINATOR
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Fee must stay strictly below the denominator
pub const MAX_FEE_BPS: u16 = BPS_DENOMINATOR - 1;

// =============================================================================
// CAPACITY LIMITS
// =============================================================================

/// Maximum number of subjects the vault can hold a position in at once.
/// Also the receiver ticket limit. Must match #[max_len] on Vault and Receiver.
pub const MAX_SUBJECTS: usize = 16;

/// Maximum number of distributor slices a single receiver can hold.
/// Must match #[max_len] on Receiver.slices.
pub const MAX_RECEIVER_DISTRIBUTORS: usize = 32;

/// Maximum epochs accepted by a single claim_rewards call
pub const MAX_REWARD_EPOCHS: usize = 32;

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Full seed: ["vault", asset_mint_pubkey]
pub const VAULT_SEED: &[u8] = b"vault";

/// Full seed: ["share_mint", vault_pubkey]
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";

/// Token account holding the vault's cash balance
/// Full seed: ["vault_assets", vault_pubkey]
pub const VAULT_ASSETS_SEED: &[u8] = b"vault_assets";

/// Full seed: ["distributor", vault_pubkey, subject_pubkey, nonce_le_bytes]
pub const DISTRIBUTOR_SEED: &[u8] = b"distributor";

/// Full seed: ["distributor_assets", distributor_pubkey]
pub const DISTRIBUTOR_ASSETS_SEED: &[u8] = b"distributor_assets";

/// Full seed: ["receiver", vault_pubkey, owner_pubkey]
pub const RECEIVER_SEED: &[u8] = b"receiver";

/// Full seed: ["receiver_assets", receiver_pubkey]
pub const RECEIVER_ASSETS_SEED: &[u8] = b"receiver_assets";

// =============================================================================
// EXTERNAL ENGINE SEEDS
// =============================================================================
// Derived under the staking engine's program id, not ours.

/// Engine per-subject state. Full seed: ["subject", subject_type, subject_pubkey]
pub const ENGINE_SUBJECT_SEED: &[u8] = b"subject";

/// Engine per-holder position. Full seed: ["position", subject_pubkey, holder_pubkey]
pub const ENGINE_POSITION_SEED: &[u8] = b"position";

/// Engine token account pooling staked assets for a subject.
/// Full seed: ["stake_vault", subject_pubkey]
pub const ENGINE_STAKE_VAULT_SEED: &[u8] = b"stake_vault";

// =============================================================================
// EXTERNAL ENGINE DISCRIMINATORS
// =============================================================================
// Anchor instruction discriminators of the engine programs:
// first 8 bytes of sha256("global:<instruction_name>").

/// Staking engine `deposit`
pub const ENGINE_DEPOSIT_DISCRIMINATOR: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];

/// Staking engine `initiate_withdrawal`
pub const ENGINE_INITIATE_WITHDRAWAL_DISCRIMINATOR: [u8; 8] =
    [69, 216, 131, 74, 114, 122, 38, 112];

/// Staking engine `withdraw`
pub const ENGINE_WITHDRAW_DISCRIMINATOR: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];

/// Staking engine `transfer_position`
pub const ENGINE_TRANSFER_POSITION_DISCRIMINATOR: [u8; 8] =
    [139, 130, 102, 147, 135, 77, 113, 222];

/// Rewards engine `claim_rewards`
pub const ENGINE_CLAIM_REWARDS_DISCRIMINATOR: [u8; 8] = [4, 144, 132, 71, 116, 23, 151, 80];
