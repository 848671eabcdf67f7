//! Transaction type registry.
//!
//! Every transaction names its operation with a `(type, subtype)` byte pair.
//! The pairs the ledger defines are described once, in a static table, by a
//! [`TransactionType`] descriptor. Lookup is a pure function:
//!
//! ```
//! use nxt_core::transaction::types::find;
//!
//! assert_eq!(find(1, 0).unwrap().description(), "Arbitrary message");
//! assert!(find(9, 9).is_none());
//! ```
//!
//! A descriptor also knows what its attachment looks like, so it can decode
//! the attachment of a transaction document or a raw transaction.

use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Buf;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::appendix::MESSAGE_FLAG;
use super::attachment::Attachment;
use crate::error::NxtError;
use crate::response::Response;

// ---------------------------------------------------------------------------
// Type codes
// ---------------------------------------------------------------------------

/// NXT transfers between accounts.
pub const TYPE_PAYMENT: u8 = 0;
/// Messages, aliases, polls and account records.
pub const TYPE_MESSAGING: u8 = 1;
/// Asset issuance and the asset exchange.
pub const TYPE_COLORED_COINS: u8 = 2;
/// The digital goods store.
pub const TYPE_DIGITAL_GOODS: u8 = 3;
/// Effective balance leasing.
pub const TYPE_ACCOUNT_CONTROL: u8 = 4;
/// Currencies: issuance, exchange offers and minting.
pub const TYPE_MONETARY_SYSTEM: u8 = 5;
/// Tagged data uploads.
pub const TYPE_DATA: u8 = 6;

// ---------------------------------------------------------------------------
// AttachmentKind
// ---------------------------------------------------------------------------

/// Shape of the attachment a transaction type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// No attachment bytes at all.
    Empty,
    /// The ledger defines an attachment this crate does not model.
    Opaque,
    ArbitraryMessage,
    AliasAssignment,
    AliasSell,
    AliasBuy,
    AccountInfo,
    BalanceLeasing,
    CurrencyMinting,
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Immutable descriptor of one `(type, subtype)` pair.
///
/// Equality and hashing consider only the pair.
#[derive(Debug)]
pub struct TransactionType {
    tx_type: u8,
    subtype: u8,
    description: &'static str,
    kind: AttachmentKind,
}

impl TransactionType {
    const fn new(tx_type: u8, subtype: u8, description: &'static str, kind: AttachmentKind) -> Self {
        Self {
            tx_type,
            subtype,
            description,
            kind,
        }
    }

    /// Family code, one of the `TYPE_*` constants.
    pub fn tx_type(&self) -> u8 {
        self.tx_type
    }

    /// Position within the family, always below 16.
    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    /// Human-readable name, e.g. `"Alias assignment"`.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Which attachment, if any, transactions of this type carry.
    pub fn attachment_kind(&self) -> AttachmentKind {
        self.kind
    }

    /// Decode this type's attachment from a transaction document's
    /// `attachment` object.
    ///
    /// Returns `Ok(None)` for types without a modelled attachment, and for an
    /// arbitrary-message transaction whose document carries no message.
    pub fn load_attachment(&self, response: &Response) -> Result<Option<Attachment>, NxtError> {
        Attachment::load(self.kind, response)
    }

    /// Consume this type's attachment bytes from a raw transaction.
    ///
    /// `tx_version` decides whether a version byte precedes the body; `flags`
    /// is the transaction flags word, which tells a version 1+ arbitrary
    /// message whether it carries a message at all.
    pub fn parse_attachment(
        &self,
        buf: &mut impl Buf,
        tx_version: u8,
        flags: u32,
    ) -> Result<Option<Attachment>, NxtError> {
        match self.kind {
            AttachmentKind::Empty => Ok(None),
            AttachmentKind::Opaque => Err(NxtError::UnsupportedAttachment(self.description)),
            AttachmentKind::ArbitraryMessage if tx_version > 0 && flags & MESSAGE_FLAG == 0 => {
                Ok(None)
            }
            kind => Attachment::parse(kind, buf, tx_version > 0).map(Some),
        }
    }
}

impl PartialEq for TransactionType {
    fn eq(&self, other: &Self) -> bool {
        self.tx_type == other.tx_type && self.subtype == other.subtype
    }
}

impl Eq for TransactionType {}

impl Hash for TransactionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tx_type.hash(state);
        self.subtype.hash(state);
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.description, self.tx_type, self.subtype)
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

use AttachmentKind as K;

pub mod payment {
    use super::*;

    pub static ORDINARY: TransactionType =
        TransactionType::new(TYPE_PAYMENT, 0, "Ordinary payment", K::Empty);
}

pub mod messaging {
    use super::*;

    pub static ARBITRARY_MESSAGE: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 0, "Arbitrary message", K::ArbitraryMessage);
    pub static ALIAS_ASSIGNMENT: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 1, "Alias assignment", K::AliasAssignment);
    pub static POLL_CREATION: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 2, "Poll creation", K::Opaque);
    pub static VOTE_CASTING: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 3, "Vote casting", K::Opaque);
    pub static HUB_ANNOUNCEMENT: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 4, "Hub terminal announcement", K::Opaque);
    pub static ACCOUNT_INFO: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 5, "Account information", K::AccountInfo);
    pub static ALIAS_SELL: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 6, "Alias sell", K::AliasSell);
    pub static ALIAS_BUY: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 7, "Alias buy", K::AliasBuy);
    pub static ALIAS_DELETE: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 8, "Delete alias", K::Opaque);
    pub static PHASING_VOTE_CASTING: TransactionType =
        TransactionType::new(TYPE_MESSAGING, 9, "Phasing vote casting", K::Opaque);
}

pub mod colored_coins {
    use super::*;

    pub static ASSET_ISSUANCE: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 0, "Asset issuance", K::Opaque);
    pub static ASSET_TRANSFER: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 1, "Asset transfer", K::Opaque);
    pub static ASK_ORDER_PLACEMENT: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 2, "Ask order placement", K::Opaque);
    pub static BID_ORDER_PLACEMENT: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 3, "Bid order placement", K::Opaque);
    pub static ASK_ORDER_CANCELLATION: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 4, "Ask order cancellation", K::Opaque);
    pub static BID_ORDER_CANCELLATION: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 5, "Bid order cancellation", K::Opaque);
    pub static DIVIDEND_PAYMENT: TransactionType =
        TransactionType::new(TYPE_COLORED_COINS, 6, "Dividend payment", K::Opaque);
}

pub mod digital_goods {
    use super::*;

    pub static LISTING: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 0, "Digital goods listing", K::Opaque);
    pub static DELISTING: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 1, "Digital goods delisting", K::Opaque);
    pub static PRICE_CHANGE: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 2, "Digital goods price change", K::Opaque);
    pub static QUANTITY_CHANGE: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 3, "Digital goods quantity change", K::Opaque);
    pub static PURCHASE: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 4, "Digital goods purchase", K::Opaque);
    pub static DELIVERY: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 5, "Digital goods delivery", K::Opaque);
    pub static FEEDBACK: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 6, "Digital goods feedback", K::Opaque);
    pub static REFUND: TransactionType =
        TransactionType::new(TYPE_DIGITAL_GOODS, 7, "Digital goods refund", K::Opaque);
}

pub mod account_control {
    use super::*;

    pub static BALANCE_LEASING: TransactionType =
        TransactionType::new(TYPE_ACCOUNT_CONTROL, 0, "Balance leasing", K::BalanceLeasing);
}

pub mod monetary_system {
    use super::*;

    pub static CURRENCY_ISSUANCE: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 0, "Issue currency", K::Opaque);
    pub static RESERVE_INCREASE: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 1, "Increase currency reserve", K::Opaque);
    pub static RESERVE_CLAIM: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 2, "Claim currency reserve", K::Opaque);
    pub static CURRENCY_TRANSFER: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 3, "Transfer currency", K::Opaque);
    pub static PUBLISH_EXCHANGE_OFFER: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 4, "Publish exchange offer", K::Opaque);
    pub static EXCHANGE_BUY: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 5, "Buy currency", K::Opaque);
    pub static EXCHANGE_SELL: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 6, "Sell currency", K::Opaque);
    pub static CURRENCY_MINTING: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 7, "Mint currency", K::CurrencyMinting);
    pub static CURRENCY_DELETION: TransactionType =
        TransactionType::new(TYPE_MONETARY_SYSTEM, 8, "Delete currency", K::Opaque);
}

pub mod data {
    use super::*;

    pub static TAGGED_DATA_UPLOAD: TransactionType =
        TransactionType::new(TYPE_DATA, 0, "Tagged data upload", K::Opaque);
    pub static TAGGED_DATA_EXTEND: TransactionType =
        TransactionType::new(TYPE_DATA, 1, "Tagged data extend", K::Opaque);
}

/// Every descriptor, ordered by `(type, subtype)`.
pub static ALL: [&TransactionType; 38] = [
    &payment::ORDINARY,
    &messaging::ARBITRARY_MESSAGE,
    &messaging::ALIAS_ASSIGNMENT,
    &messaging::POLL_CREATION,
    &messaging::VOTE_CASTING,
    &messaging::HUB_ANNOUNCEMENT,
    &messaging::ACCOUNT_INFO,
    &messaging::ALIAS_SELL,
    &messaging::ALIAS_BUY,
    &messaging::ALIAS_DELETE,
    &messaging::PHASING_VOTE_CASTING,
    &colored_coins::ASSET_ISSUANCE,
    &colored_coins::ASSET_TRANSFER,
    &colored_coins::ASK_ORDER_PLACEMENT,
    &colored_coins::BID_ORDER_PLACEMENT,
    &colored_coins::ASK_ORDER_CANCELLATION,
    &colored_coins::BID_ORDER_CANCELLATION,
    &colored_coins::DIVIDEND_PAYMENT,
    &digital_goods::LISTING,
    &digital_goods::DELISTING,
    &digital_goods::PRICE_CHANGE,
    &digital_goods::QUANTITY_CHANGE,
    &digital_goods::PURCHASE,
    &digital_goods::DELIVERY,
    &digital_goods::FEEDBACK,
    &digital_goods::REFUND,
    &account_control::BALANCE_LEASING,
    &monetary_system::CURRENCY_ISSUANCE,
    &monetary_system::RESERVE_INCREASE,
    &monetary_system::RESERVE_CLAIM,
    &monetary_system::CURRENCY_TRANSFER,
    &monetary_system::PUBLISH_EXCHANGE_OFFER,
    &monetary_system::EXCHANGE_BUY,
    &monetary_system::EXCHANGE_SELL,
    &monetary_system::CURRENCY_MINTING,
    &monetary_system::CURRENCY_DELETION,
    &data::TAGGED_DATA_UPLOAD,
    &data::TAGGED_DATA_EXTEND,
];

/// Look up the descriptor for a `(type, subtype)` pair.
///
/// Defined for every input: pairs the ledger does not define yield `None`.
pub fn find(tx_type: u8, subtype: u8) -> Option<&'static TransactionType> {
    let found = ALL
        .iter()
        .copied()
        .find(|t| t.tx_type == tx_type && t.subtype == subtype);
    if found.is_none() {
        trace!(tx_type, subtype, "no transaction type registered");
    }
    found
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
