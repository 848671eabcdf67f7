//! # Protocol Configuration & Constants
//!
//! Every magic number the Nxt wire format depends on lives here. The ledger
//! is a closed, versioned protocol: these values are dictated by the remote
//! nodes, not chosen by this client. Changing one of them does not change the
//! protocol, it only makes every transaction we build invalid.

// ---------------------------------------------------------------------------
// Monetary Units
// ---------------------------------------------------------------------------

/// Number of NQT (the indivisible base unit) in one whole NXT.
///
/// The API reports a few balances (notably `effectiveBalanceNXT`) in whole
/// coins; multiply by this to get base units.
pub const NQT_ADJUST: i64 = 100_000_000;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// The Nxt epoch, 2013-11-24T12:00:00Z, in Unix milliseconds.
/// Transaction timestamps are whole seconds since this instant.
pub const EPOCH_BEGINNING_MS: i64 = 1_385_294_400_000;

/// Default transaction deadline in minutes (one day).
pub const DEFAULT_DEADLINE: i16 = 1440;

// ---------------------------------------------------------------------------
// Transaction Layout
// ---------------------------------------------------------------------------

/// Transaction version emitted by the builder. Version 0 transactions have
/// no flags word, no EC block fields and no appendices.
pub const TRANSACTION_VERSION: u8 = 1;

/// Ed25519-style public key length used in the header.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Signature length. The assembler zero-fills it for unsigned transactions.
pub const SIGNATURE_LENGTH: usize = 64;

/// Full hash length (SHA-256).
pub const HASH_LENGTH: usize = 32;

/// Size of the fixed header for version 0 transactions.
pub const HEADER_LENGTH_V0: usize =
    1 + 1 + 4 + 2 + PUBLIC_KEY_LENGTH + 8 + 8 + 8 + HASH_LENGTH + SIGNATURE_LENGTH;

/// Size of the fixed header for version 1+ transactions (flags + EC block).
pub const HEADER_LENGTH_V1: usize = HEADER_LENGTH_V0 + 4 + 4 + 8;

/// Byte offset of the signature inside the header.
pub const SIGNATURE_OFFSET: usize = HEADER_LENGTH_V0 - SIGNATURE_LENGTH;

/// Bit 31 of a 4-byte length word marks a text payload.
pub const TEXT_FLAG: u32 = 0x8000_0000;

// ---------------------------------------------------------------------------
// Attachment Limits
// ---------------------------------------------------------------------------

/// Maximum arbitrary message payload, in bytes.
pub const MAX_ARBITRARY_MESSAGE_LENGTH: usize = 1000;

/// Maximum encrypted message payload, in bytes.
pub const MAX_ENCRYPTED_MESSAGE_LENGTH: usize = 1000;

/// Encrypted message nonce length.
pub const ENCRYPTED_NONCE_LENGTH: usize = 32;

/// Maximum alias name length, in bytes.
pub const MAX_ALIAS_LENGTH: usize = 100;

/// Maximum alias URI length, in bytes.
pub const MAX_ALIAS_URI_LENGTH: usize = 1000;

/// Maximum account name length, in bytes.
pub const MAX_ACCOUNT_NAME_LENGTH: usize = 100;

/// Maximum account description length, in bytes.
pub const MAX_ACCOUNT_DESCRIPTION_LENGTH: usize = 1000;

/// Shortest balance lease, in blocks.
pub const MIN_LEASING_PERIOD: u16 = 1440;

/// Longest balance lease, in blocks. Bounded by the signed 16-bit wire field.
pub const MAX_LEASING_PERIOD: u16 = 32767;

/// Maximum number of accounts in a phasing whitelist.
pub const MAX_PHASING_WHITELIST_SIZE: usize = 10;

/// Maximum number of linked transactions in a phasing appendix.
pub const MAX_PHASING_LINKED_TRANSACTIONS: usize = 10;

/// Maximum hashed secret length in a phasing appendix.
pub const MAX_PHASING_HASHED_SECRET_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Account Identifiers
// ---------------------------------------------------------------------------

/// Prefix of the Reed-Solomon account string form.
pub const ACCOUNT_PREFIX: &str = "NXT-";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
