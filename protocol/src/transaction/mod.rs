//! # Transaction Module
//!
//! Classification, construction and wire encoding of Nxt transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      : Registry of (type, subtype) descriptors
//! appendix.rs   : Appendix codec contract, public key announcement, phasing
//! message.rs    : Plain and encrypted message payloads
//! attachment.rs : Primary attachments (aliases, account info, leasing, minting)
//! builder.rs    : Transaction, TransactionBuilder and the Nxt epoch helpers
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Classify**: resolve a descriptor with [`types::find`].
//! 2. **Build**: assemble header, attachment and appendices with
//!    [`TransactionBuilder`].
//! 3. **Encode**: [`Transaction::unsigned_bytes`] goes to an external signer;
//!    [`Transaction::signed`] and [`Transaction::bytes`] produce the
//!    broadcast form.
//! 4. **Decode**: [`Transaction::parse`] for raw bytes,
//!    [`Transaction::from_response`] for API documents.

pub mod appendix;
pub mod attachment;
pub mod builder;
pub mod message;
pub mod types;

pub use appendix::{
    Appendix, Phasing, PublicKeyAnnouncement, ENCRYPTED_MESSAGE_FLAG,
    ENCRYPT_TO_SELF_MESSAGE_FLAG, MESSAGE_FLAG, PHASING_FLAG, PUBLIC_KEY_ANNOUNCEMENT_FLAG,
};
pub use attachment::{
    AccountInfo, AliasAssignment, AliasBuy, AliasSell, Attachment, BalanceLeasing,
    CurrencyMinting,
};
pub use builder::{epoch_time, to_datetime, Transaction, TransactionBuilder};
pub use message::{ArbitraryMessage, EncryptedData, EncryptedMessage};
pub use types::{find, AttachmentKind, TransactionType};
