//! Transaction assembly via the builder pattern.
//!
//! The [`TransactionBuilder`] collects the header fields, the primary
//! attachment and any appendices, checks that they fit together, and returns
//! an unsigned [`Transaction`]. The transaction then renders the exact byte
//! stream the ledger expects:
//!
//! ```text
//! u8   type
//! u8   (version << 4) | subtype
//! i32  timestamp            seconds since the Nxt epoch
//! i16  deadline             minutes
//! [32] sender public key
//! i64  recipient
//! i64  amountNQT
//! i64  feeNQT
//! [32] referenced transaction full hash (zeros when absent)
//! [64] signature (zeros when unsigned)
//! ---- version > 0 ----
//! i32  flags
//! i32  ecBlockHeight
//! i64  ecBlockId
//! ---- then ----
//! attachment, message, encrypted message, public key announcement,
//! encrypt-to-self message, phasing
//! ```
//!
//! Field order is fixed by protocol position; the order setters are called
//! in has no effect. Signing happens elsewhere: the builder only produces
//! the unsigned bytes, and [`Transaction::signed`] attaches a signature
//! computed by the caller.

use bytes::{Buf, BufMut};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::appendix::{
    Appendix, Phasing, PublicKeyAnnouncement, ENCRYPTED_MESSAGE_FLAG, ENCRYPT_TO_SELF_MESSAGE_FLAG,
    MESSAGE_FLAG, PHASING_FLAG, PUBLIC_KEY_ANNOUNCEMENT_FLAG,
};
use super::attachment::Attachment;
use super::message::{ArbitraryMessage, EncryptedData, EncryptedMessage};
use super::types::{find, AttachmentKind, TransactionType};
use crate::codec::{get_array, get_i16, get_i32, get_i64, get_u8};
use crate::config::{
    DEFAULT_DEADLINE, EPOCH_BEGINNING_MS, HASH_LENGTH, HEADER_LENGTH_V1, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH, SIGNATURE_OFFSET, TRANSACTION_VERSION,
};
use crate::error::NxtError;
use crate::identifier::{id_string, to_rs};
use crate::response::Response;

// ---------------------------------------------------------------------------
// Nxt epoch
// ---------------------------------------------------------------------------

/// Seconds since the Nxt epoch (2013-11-24T12:00:00Z), rounded to the
/// nearest second and saturated to the `i32` range.
pub fn epoch_time(time: DateTime<Utc>) -> i32 {
    let seconds = (time.timestamp_millis() - EPOCH_BEGINNING_MS + 500).div_euclid(1000);
    seconds.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Inverse of [`epoch_time`].
pub fn to_datetime(epoch_seconds: i32) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
        + Duration::milliseconds(EPOCH_BEGINNING_MS + epoch_seconds as i64 * 1000)
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An Nxt transaction: header fields, an optional primary attachment and the
/// optional appendices.
///
/// The raw `tx_type` / `subtype` pair is kept as received, so a document
/// naming a pair this crate does not know still decodes (without its
/// attachment). [`Transaction::transaction_type`] resolves the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction family, see [`super::types`].
    pub tx_type: u8,
    /// Subtype within the family. Shares a byte with `version`, so it must
    /// stay below 16.
    pub subtype: u8,
    /// Layout version. Version 0 has no flags word, no EC block fields and
    /// no appendices.
    pub version: u8,
    /// Seconds since the Nxt epoch.
    pub timestamp: i32,
    /// Minutes after `timestamp` the transaction stays valid.
    pub deadline: i16,
    /// Ed25519 public key of the sending account.
    pub sender_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Recipient account id, 0 for types without a recipient.
    pub recipient_id: i64,
    /// Amount transferred, in NQT.
    pub amount_nqt: i64,
    /// Fee paid to the forger, in NQT.
    pub fee_nqt: i64,
    /// Full hash of a transaction that must be confirmed first.
    pub referenced_transaction_full_hash: Option<[u8; HASH_LENGTH]>,
    /// `None` until [`Transaction::signed`] is called.
    pub signature: Option<[u8; SIGNATURE_LENGTH]>,
    /// Height of the economic clustering block. Version 1 only.
    pub ec_block_height: i32,
    /// Id of the economic clustering block. Version 1 only.
    pub ec_block_id: i64,
    /// The type-specific payload, if the type carries one.
    pub attachment: Option<Attachment>,
    /// Plain message appendix.
    pub message: Option<ArbitraryMessage>,
    /// Message encrypted for the recipient.
    pub encrypted_message: Option<EncryptedMessage>,
    /// The recipient's public key, announced on first use.
    pub public_key_announcement: Option<PublicKeyAnnouncement>,
    /// Message encrypted for the sender's own key.
    pub encrypt_to_self_message: Option<EncryptedMessage>,
    /// Deferred execution pending approval.
    pub phasing: Option<Phasing>,
}

impl Transaction {
    /// The registry descriptor, if the pair is known.
    pub fn transaction_type(&self) -> Option<&'static TransactionType> {
        find(self.tx_type, self.subtype)
    }

    fn appendices(&self) -> impl Iterator<Item = &dyn Appendix> {
        [
            self.message.as_ref().map(|a| a as &dyn Appendix),
            self.encrypted_message.as_ref().map(|a| a as &dyn Appendix),
            self.public_key_announcement.as_ref().map(|a| a as &dyn Appendix),
            self.encrypt_to_self_message.as_ref().map(|a| a as &dyn Appendix),
            self.phasing.as_ref().map(|a| a as &dyn Appendix),
        ]
        .into_iter()
        .flatten()
    }

    /// Bitwise OR of the attachment's flags and the bit of every appendix
    /// present.
    pub fn flags(&self) -> u32 {
        let attachment = self.attachment.as_ref().map_or(0, |a| a.flags());
        self.appendices().fold(attachment, |flags, a| flags | a.flags())
    }

    fn put_bytes(&self, buf: &mut Vec<u8>, signature: Option<&[u8; SIGNATURE_LENGTH]>) {
        buf.put_u8(self.tx_type);
        buf.put_u8((self.version << 4) | (self.subtype & 0x0F));
        buf.put_i32_le(self.timestamp);
        buf.put_i16_le(self.deadline);
        buf.put_slice(&self.sender_public_key);
        buf.put_i64_le(self.recipient_id);
        buf.put_i64_le(self.amount_nqt);
        buf.put_i64_le(self.fee_nqt);
        buf.put_slice(
            self.referenced_transaction_full_hash
                .as_ref()
                .unwrap_or(&[0u8; HASH_LENGTH]),
        );
        buf.put_slice(signature.unwrap_or(&[0u8; SIGNATURE_LENGTH]));
        if self.version > 0 {
            buf.put_u32_le(self.flags());
            buf.put_i32_le(self.ec_block_height);
            buf.put_i64_le(self.ec_block_id);
        }
        if let Some(attachment) = &self.attachment {
            attachment.put_bytes(buf);
        }
        for appendix in self.appendices() {
            appendix.put_bytes(buf);
        }
    }

    /// The complete byte stream, including the signature when present.
    pub fn bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LENGTH_V1 + 64);
        self.put_bytes(&mut buf, self.signature.as_ref());
        buf
    }

    /// The byte stream with the signature field zeroed: what a signer signs.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LENGTH_V1 + 64);
        self.put_bytes(&mut buf, None);
        buf
    }

    /// Attach a signature computed over [`Transaction::unsigned_bytes`].
    pub fn signed(mut self, signature: [u8; SIGNATURE_LENGTH]) -> Self {
        self.signature = Some(signature);
        self
    }

    /// `SHA-256(unsigned_bytes || SHA-256(signature))`, or `None` while
    /// unsigned.
    pub fn full_hash(&self) -> Option<[u8; HASH_LENGTH]> {
        let signature = self.signature.as_ref()?;
        let signature_hash = Sha256::digest(signature);
        let mut hasher = Sha256::new();
        hasher.update(self.unsigned_bytes());
        hasher.update(signature_hash);
        Some(hasher.finalize().into())
    }

    /// The transaction id: the first eight bytes of the full hash, little
    /// endian. `None` while unsigned.
    pub fn id(&self) -> Option<i64> {
        self.full_hash().map(|hash| {
            let mut head = [0u8; 8];
            head.copy_from_slice(&hash[..8]);
            i64::from_le_bytes(head)
        })
    }

    /// The timestamp as a UTC instant.
    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        to_datetime(self.timestamp)
    }

    /// The instant after which the ledger no longer accepts the transaction.
    pub fn expiration(&self) -> DateTime<Utc> {
        self.timestamp_utc() + Duration::minutes(self.deadline as i64)
    }

    /// Check that the parts fit together, so that [`Transaction::bytes`]
    /// renders a stream that parses back to the same value.
    ///
    /// Version and subtype must fit their nibbles and the layout version
    /// must be 0 or 1. A known type's attachment must be of the kind the
    /// type names and carry a version byte exactly when the layout does.
    /// Version 0 carries no appendices, appendices have a positive version,
    /// an arbitrary message transaction has no second message, and phasing
    /// parameters must be in range. Types whose attachment is not modelled
    /// are accepted without one.
    pub fn validate(&self) -> Result<(), NxtError> {
        if self.subtype > 0x0F {
            return Err(NxtError::invalid(
                "subtype",
                format!("subtype {} does not fit in four bits", self.subtype),
            ));
        }
        if self.version > TRANSACTION_VERSION {
            return Err(NxtError::invalid(
                "version",
                format!("unsupported layout version {}", self.version),
            ));
        }
        self.check_attachment()?;
        self.check_appendices()
    }

    fn check_attachment(&self) -> Result<(), NxtError> {
        let Some(tx_type) = self.transaction_type() else {
            return match &self.attachment {
                Some(_) => Err(NxtError::invalid(
                    "attachment",
                    format!("unknown type ({}, {}) cannot carry one", self.tx_type, self.subtype),
                )),
                None => Ok(()),
            };
        };
        let expected = tx_type.attachment_kind();
        match &self.attachment {
            Some(attachment) => {
                if attachment.kind() != expected {
                    return Err(NxtError::invalid(
                        "attachment",
                        format!(
                            "{} does not belong to {}",
                            attachment.name(),
                            tx_type.description()
                        ),
                    ));
                }
                if (attachment.version() > 0) != (self.version > 0) {
                    return Err(NxtError::invalid(
                        "attachment",
                        format!(
                            "attachment version {} does not fit layout version {}",
                            attachment.version(),
                            self.version
                        ),
                    ));
                }
                Ok(())
            }
            None => match expected {
                AttachmentKind::Empty | AttachmentKind::Opaque => Ok(()),
                AttachmentKind::ArbitraryMessage if self.version > 0 => Ok(()),
                _ => Err(NxtError::MissingField("attachment".to_string())),
            },
        }
    }

    fn check_appendices(&self) -> Result<(), NxtError> {
        let versions = [
            self.message.as_ref().map(|a| a.version()),
            self.encrypted_message.as_ref().map(|a| a.version()),
            self.public_key_announcement.as_ref().map(|a| a.version()),
            self.encrypt_to_self_message.as_ref().map(|a| a.version()),
            self.phasing.as_ref().map(|a| a.version),
        ];
        if self.version == 0 && versions.iter().flatten().next().is_some() {
            return Err(NxtError::invalid(
                "version",
                "version 0 transactions carry no appendices",
            ));
        }
        if versions.iter().flatten().any(|&v| v == 0) {
            return Err(NxtError::invalid("appendix", "appendix version must be positive"));
        }
        if self.message.is_some() && matches!(self.attachment, Some(Attachment::Message(_))) {
            return Err(NxtError::invalid(
                "message",
                "an arbitrary message transaction already carries its message",
            ));
        }
        if let Some(phasing) = &self.phasing {
            phasing.validate()?;
        }
        Ok(())
    }

    // -- decoding -----------------------------------------------------------

    /// Decode a complete transaction byte stream.
    ///
    /// The pair must be known and its attachment modelled; the input must be
    /// consumed exactly.
    pub fn parse(bytes: &[u8]) -> Result<Self, NxtError> {
        let mut buf = bytes;
        let tx_type = get_u8(&mut buf)?;
        let version_and_subtype = get_u8(&mut buf)?;
        let version = version_and_subtype >> 4;
        let subtype = version_and_subtype & 0x0F;
        let timestamp = get_i32(&mut buf)?;
        let deadline = get_i16(&mut buf)?;
        let sender_public_key = get_array::<PUBLIC_KEY_LENGTH>(&mut buf)?;
        let recipient_id = get_i64(&mut buf)?;
        let amount_nqt = get_i64(&mut buf)?;
        let fee_nqt = get_i64(&mut buf)?;
        let referenced = get_array::<HASH_LENGTH>(&mut buf)?;
        let signature = get_array::<SIGNATURE_LENGTH>(&mut buf)?;
        let (flags, ec_block_height, ec_block_id) = if version > 0 {
            (
                get_i32(&mut buf)? as u32,
                get_i32(&mut buf)?,
                get_i64(&mut buf)?,
            )
        } else {
            (0, 0, 0)
        };

        let tx_type_desc = find(tx_type, subtype)
            .ok_or(NxtError::UnknownTransactionType { tx_type, subtype })?;
        let attachment = tx_type_desc.parse_attachment(&mut buf, version, flags)?;

        let mut tx = Transaction {
            tx_type,
            subtype,
            version,
            timestamp,
            deadline,
            sender_public_key,
            recipient_id,
            amount_nqt,
            fee_nqt,
            referenced_transaction_full_hash: non_zero(referenced),
            signature: non_zero(signature),
            ec_block_height,
            ec_block_id,
            attachment,
            message: None,
            encrypted_message: None,
            public_key_announcement: None,
            encrypt_to_self_message: None,
            phasing: None,
        };

        if version > 0 {
            let message_is_attachment = matches!(tx.attachment, Some(Attachment::Message(_)));
            if flags & MESSAGE_FLAG != 0 && !message_is_attachment {
                tx.message = Some(ArbitraryMessage::parse(&mut buf, true)?);
            }
            if flags & ENCRYPTED_MESSAGE_FLAG != 0 {
                tx.encrypted_message = Some(EncryptedMessage::parse(&mut buf, false)?);
            }
            if flags & PUBLIC_KEY_ANNOUNCEMENT_FLAG != 0 {
                tx.public_key_announcement = Some(PublicKeyAnnouncement::parse(&mut buf)?);
            }
            if flags & ENCRYPT_TO_SELF_MESSAGE_FLAG != 0 {
                tx.encrypt_to_self_message = Some(EncryptedMessage::parse(&mut buf, true)?);
            }
            if flags & PHASING_FLAG != 0 {
                tx.phasing = Some(Phasing::parse(&mut buf)?);
            }
        }

        if buf.has_remaining() {
            return Err(NxtError::invalid(
                "transaction",
                format!("{} trailing bytes", buf.remaining()),
            ));
        }
        tx.validate()?;
        debug!(
            tx_type,
            subtype,
            version,
            len = bytes.len(),
            "parsed transaction bytes"
        );
        Ok(tx)
    }

    /// Decode a transaction document as returned by `getTransaction`.
    ///
    /// A pair missing from the registry is not an error: the header is kept
    /// and the attachment is left out. Everything else goes through
    /// [`Transaction::validate`], so a document whose parts disagree with
    /// each other is rejected instead of producing a corrupt byte stream.
    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let tx_type: u8 = response.get_number("type")?;
        let subtype: u8 = response.get_number("subtype")?;
        let attachment_doc = response.opt_object("attachment")?.unwrap_or_default();

        let attachment = match find(tx_type, subtype) {
            Some(t) => t.load_attachment(&attachment_doc)?,
            None => {
                debug!(tx_type, subtype, "unknown transaction type, skipping attachment");
                None
            }
        };
        let message_is_attachment = matches!(attachment, Some(Attachment::Message(_)));

        let message = if !message_is_attachment && attachment_doc.has("version.Message") {
            Some(ArbitraryMessage::from_response(&attachment_doc)?)
        } else {
            None
        };
        let encrypted_message = if attachment_doc.has("version.EncryptedMessage") {
            Some(EncryptedMessage::from_response(&attachment_doc, false)?)
        } else {
            None
        };
        let public_key_announcement = if attachment_doc.has("version.PublicKeyAnnouncement") {
            Some(PublicKeyAnnouncement::from_response(&attachment_doc)?)
        } else {
            None
        };
        let encrypt_to_self_message = if attachment_doc.has("version.EncryptToSelfMessage") {
            Some(EncryptedMessage::from_response(&attachment_doc, true)?)
        } else {
            None
        };
        let phasing = if attachment_doc.has("version.Phasing") {
            Some(Phasing::from_response(&attachment_doc)?)
        } else {
            None
        };

        let tx = Transaction {
            tx_type,
            subtype,
            version: response.opt_number("version")?.unwrap_or(0),
            timestamp: response.get_int("timestamp")?,
            deadline: response.get_short("deadline")?,
            sender_public_key: response
                .opt_hex_array::<PUBLIC_KEY_LENGTH>("senderPublicKey")?
                .ok_or_else(|| NxtError::MissingField("senderPublicKey".to_string()))?,
            recipient_id: response.opt_id("recipient")?.unwrap_or(0),
            amount_nqt: response.get_long("amountNQT")?,
            fee_nqt: response.get_long("feeNQT")?,
            referenced_transaction_full_hash: response
                .opt_hex_array::<HASH_LENGTH>("referencedTransactionFullHash")?,
            signature: response
                .opt_hex_array::<SIGNATURE_LENGTH>("signature")?
                .and_then(non_zero),
            ec_block_height: response.opt_number("ecBlockHeight")?.unwrap_or(0),
            ec_block_id: response.opt_id("ecBlockId")?.unwrap_or(0),
            attachment,
            message,
            encrypted_message,
            public_key_announcement,
            encrypt_to_self_message,
            phasing,
        };
        tx.validate()?;
        Ok(tx)
    }

    /// The document form, field-compatible with [`Transaction::from_response`].
    ///
    /// Signed transactions also carry the derived `fullHash` and
    /// `transaction` id.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("type".into(), self.tx_type.into());
        doc.insert("subtype".into(), self.subtype.into());
        doc.insert("version".into(), self.version.into());
        doc.insert("timestamp".into(), self.timestamp.into());
        doc.insert("deadline".into(), self.deadline.into());
        doc.insert(
            "senderPublicKey".into(),
            hex::encode(self.sender_public_key).into(),
        );
        doc.insert("recipient".into(), id_string(self.recipient_id).into());
        doc.insert("recipientRS".into(), to_rs(self.recipient_id).into());
        doc.insert("amountNQT".into(), self.amount_nqt.to_string().into());
        doc.insert("feeNQT".into(), self.fee_nqt.to_string().into());
        if let Some(hash) = &self.referenced_transaction_full_hash {
            doc.insert("referencedTransactionFullHash".into(), hex::encode(hash).into());
        }
        if let Some(signature) = &self.signature {
            doc.insert("signature".into(), hex::encode(signature).into());
        }
        if let (Some(full_hash), Some(id)) = (self.full_hash(), self.id()) {
            doc.insert("fullHash".into(), hex::encode(full_hash).into());
            doc.insert("transaction".into(), id_string(id).into());
        }
        doc.insert("ecBlockHeight".into(), self.ec_block_height.into());
        doc.insert("ecBlockId".into(), id_string(self.ec_block_id).into());

        let mut attachment = Map::new();
        if let Some(a) = &self.attachment {
            attachment.extend(a.to_document());
        }
        for appendix in self.appendices() {
            attachment.extend(appendix.to_document());
        }
        if !attachment.is_empty() {
            doc.insert("attachment".into(), Value::Object(attachment));
        }
        doc
    }
}

fn non_zero<const N: usize>(bytes: [u8; N]) -> Option<[u8; N]> {
    if bytes.iter().all(|&b| b == 0) {
        None
    } else {
        Some(bytes)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```
/// use nxt_core::transaction::{types::messaging, ArbitraryMessage, TransactionBuilder};
///
/// let tx = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, [7u8; 32])
///     .recipient(42)
///     .fee_nqt(100_000_000)
///     .attachment(ArbitraryMessage::text("hi").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(tx.flags(), 1);
/// ```
///
/// Defaults: version 1, deadline 1440 minutes, timestamp taken from the
/// current UTC time at build, everything else zero or absent.
pub struct TransactionBuilder {
    tx_type: &'static TransactionType,
    sender_public_key: [u8; PUBLIC_KEY_LENGTH],
    version: u8,
    timestamp: Option<i32>,
    deadline: i16,
    recipient_id: i64,
    amount_nqt: i64,
    fee_nqt: i64,
    referenced_transaction_full_hash: Option<[u8; HASH_LENGTH]>,
    ec_block_height: i32,
    ec_block_id: i64,
    attachment: Option<Attachment>,
    message: Option<ArbitraryMessage>,
    encrypted_message: Option<EncryptedMessage>,
    public_key_announcement: Option<PublicKeyAnnouncement>,
    encrypt_to_self_message: Option<EncryptedMessage>,
    phasing: Option<Phasing>,
}

impl TransactionBuilder {
    pub fn new(tx_type: &'static TransactionType, sender_public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self {
            tx_type,
            sender_public_key,
            version: TRANSACTION_VERSION,
            timestamp: None,
            deadline: DEFAULT_DEADLINE,
            recipient_id: 0,
            amount_nqt: 0,
            fee_nqt: 0,
            referenced_transaction_full_hash: None,
            ec_block_height: 0,
            ec_block_id: 0,
            attachment: None,
            message: None,
            encrypted_message: None,
            public_key_announcement: None,
            encrypt_to_self_message: None,
            phasing: None,
        }
    }

    /// Layout version, 0 or 1.
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Timestamp in Nxt epoch seconds. See [`epoch_time`].
    pub fn timestamp(mut self, timestamp: i32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn deadline(mut self, minutes: i16) -> Self {
        self.deadline = minutes;
        self
    }

    pub fn recipient(mut self, account_id: i64) -> Self {
        self.recipient_id = account_id;
        self
    }

    pub fn amount_nqt(mut self, amount: i64) -> Self {
        self.amount_nqt = amount;
        self
    }

    pub fn fee_nqt(mut self, fee: i64) -> Self {
        self.fee_nqt = fee;
        self
    }

    pub fn referenced_transaction(mut self, full_hash: [u8; HASH_LENGTH]) -> Self {
        self.referenced_transaction_full_hash = Some(full_hash);
        self
    }

    /// Economic clustering block the transaction commits to.
    pub fn ec_block(mut self, height: i32, block_id: i64) -> Self {
        self.ec_block_height = height;
        self.ec_block_id = block_id;
        self
    }

    pub fn attachment(mut self, attachment: impl Into<Attachment>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    pub fn message(mut self, message: ArbitraryMessage) -> Self {
        self.message = Some(message);
        self
    }

    pub fn encrypted_message(mut self, encrypted: EncryptedData) -> Self {
        self.encrypted_message = Some(EncryptedMessage::for_recipient(encrypted));
        self
    }

    pub fn encrypt_to_self_message(mut self, encrypted: EncryptedData) -> Self {
        self.encrypt_to_self_message = Some(EncryptedMessage::for_self(encrypted));
        self
    }

    pub fn public_key_announcement(mut self, public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        self.public_key_announcement = Some(PublicKeyAnnouncement::new(public_key));
        self
    }

    pub fn phasing(mut self, phasing: Phasing) -> Self {
        self.phasing = Some(phasing);
        self
    }

    /// Check the parts against each other and produce the transaction.
    ///
    /// Types whose attachment is not modelled cannot be built. Everything
    /// else is checked by [`Transaction::validate`].
    pub fn build(self) -> Result<Transaction, NxtError> {
        if self.attachment.is_none() && self.tx_type.attachment_kind() == AttachmentKind::Opaque {
            return Err(NxtError::UnsupportedAttachment(self.tx_type.description()));
        }

        let timestamp = self.timestamp.unwrap_or_else(|| epoch_time(Utc::now()));
        let tx = Transaction {
            tx_type: self.tx_type.tx_type(),
            subtype: self.tx_type.subtype(),
            version: self.version,
            timestamp,
            deadline: self.deadline,
            sender_public_key: self.sender_public_key,
            recipient_id: self.recipient_id,
            amount_nqt: self.amount_nqt,
            fee_nqt: self.fee_nqt,
            referenced_transaction_full_hash: self.referenced_transaction_full_hash,
            signature: None,
            ec_block_height: self.ec_block_height,
            ec_block_id: self.ec_block_id,
            attachment: self.attachment,
            message: self.message,
            encrypted_message: self.encrypted_message,
            public_key_announcement: self.public_key_announcement,
            encrypt_to_self_message: self.encrypt_to_self_message,
            phasing: self.phasing,
        };
        tx.validate()?;
        debug!(
            tx_type = %self.tx_type,
            version = tx.version,
            flags = tx.flags(),
            "built transaction"
        );
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HEADER_LENGTH_V0, NQT_ADJUST};
    use crate::transaction::attachment::{AliasAssignment, BalanceLeasing};
    use crate::transaction::types::{account_control, colored_coins, messaging, payment};

    const SENDER: [u8; PUBLIC_KEY_LENGTH] = [0x11; PUBLIC_KEY_LENGTH];

    fn sample_payment() -> Transaction {
        TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .recipient(-1)
            .amount_nqt(5 * NQT_ADJUST)
            .fee_nqt(NQT_ADJUST)
            .timestamp(50_000_000)
            .ec_block(400_000, 1234)
            .build()
            .unwrap()
    }

    #[test]
    fn payment_header_layout() {
        let tx = sample_payment();
        let bytes = tx.bytes();
        assert_eq!(bytes.len(), HEADER_LENGTH_V1);
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 0x10, "version 1, subtype 0");
        assert_eq!(&bytes[2..6], &50_000_000i32.to_le_bytes());
        assert_eq!(&bytes[6..8], &1440i16.to_le_bytes());
        assert_eq!(&bytes[8..40], &SENDER);
        assert_eq!(&bytes[40..48], &[0xFF; 8]);
        assert_eq!(&bytes[48..56], &(5 * NQT_ADJUST).to_le_bytes());
        assert!(bytes[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE_LENGTH]
            .iter()
            .all(|&b| b == 0));
        assert_eq!(&bytes[160..164], &0u32.to_le_bytes(), "no flags");
        assert_eq!(&bytes[164..168], &400_000i32.to_le_bytes());
    }

    #[test]
    fn version_zero_has_short_header() {
        let tx = TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .version(0)
            .timestamp(1)
            .build()
            .unwrap();
        assert_eq!(tx.bytes().len(), HEADER_LENGTH_V0);
        assert_eq!(Transaction::parse(&tx.bytes()).unwrap(), tx);
    }

    #[test]
    fn flags_do_not_depend_on_setter_order() {
        let data = EncryptedData::new(vec![1; 16], [2; 32], false).unwrap();
        let a = TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .timestamp(10)
            .message(ArbitraryMessage::text("memo").unwrap())
            .public_key_announcement([3; 32])
            .encrypted_message(data.clone())
            .build()
            .unwrap();
        let b = TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .encrypted_message(data)
            .public_key_announcement([3; 32])
            .message(ArbitraryMessage::text("memo").unwrap())
            .timestamp(10)
            .build()
            .unwrap();
        assert_eq!(a.flags(), MESSAGE_FLAG | ENCRYPTED_MESSAGE_FLAG | PUBLIC_KEY_ANNOUNCEMENT_FLAG);
        assert_eq!(a.bytes(), b.bytes());
    }

    #[test]
    fn arbitrary_message_transaction_roundtrip() {
        let tx = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, SENDER)
            .recipient(99)
            .timestamp(77)
            .attachment(ArbitraryMessage::text("hi").unwrap())
            .build()
            .unwrap();
        let bytes = tx.bytes();
        assert_eq!(&bytes[HEADER_LENGTH_V1..], &[0x01, 0x02, 0x00, 0x00, 0x80, b'h', b'i']);
        assert_eq!(Transaction::parse(&bytes).unwrap(), tx);
    }

    #[test]
    fn every_appendix_survives_both_codecs() {
        let mut phasing = Phasing::new(900_000, 0, 1);
        phasing.whitelist = vec![5];
        let tx = TransactionBuilder::new(&messaging::ALIAS_ASSIGNMENT, SENDER)
            .timestamp(123)
            .attachment(AliasAssignment::new("site", "https://example.org").unwrap())
            .message(ArbitraryMessage::binary(vec![0, 1, 2]).unwrap())
            .encrypted_message(EncryptedData::new(vec![9; 32], [1; 32], true).unwrap())
            .public_key_announcement([4; 32])
            .encrypt_to_self_message(EncryptedData::new(vec![8; 16], [2; 32], false).unwrap())
            .phasing(phasing)
            .build()
            .unwrap()
            .signed([0x5A; SIGNATURE_LENGTH]);

        assert_eq!(tx.flags(), 0x1F);
        assert_eq!(Transaction::parse(&tx.bytes()).unwrap(), tx);
        let doc = Response::new(tx.to_document());
        assert_eq!(Transaction::from_response(&doc).unwrap(), tx);
    }

    #[test]
    fn full_hash_and_id() {
        let unsigned = sample_payment();
        assert!(unsigned.full_hash().is_none());
        assert!(unsigned.id().is_none());

        let signature = [0xAB; SIGNATURE_LENGTH];
        let tx = unsigned.clone().signed(signature);
        let mut hasher = Sha256::new();
        hasher.update(unsigned.bytes());
        hasher.update(Sha256::digest(signature));
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(tx.full_hash(), Some(expected));

        let mut head = [0u8; 8];
        head.copy_from_slice(&expected[..8]);
        assert_eq!(tx.id(), Some(i64::from_le_bytes(head)));
        assert_eq!(tx.unsigned_bytes(), unsigned.bytes());
    }

    #[test]
    fn attachment_must_match_type() {
        let err = TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .attachment(BalanceLeasing::new(1440).unwrap())
            .build();
        assert!(matches!(err, Err(NxtError::InvalidField { .. })));
    }

    #[test]
    fn modelled_type_requires_its_attachment() {
        let err = TransactionBuilder::new(&account_control::BALANCE_LEASING, SENDER).build();
        assert!(matches!(err, Err(NxtError::MissingField(_))));
    }

    #[test]
    fn opaque_type_cannot_be_built() {
        let err = TransactionBuilder::new(&colored_coins::ASSET_TRANSFER, SENDER).build();
        assert!(matches!(err, Err(NxtError::UnsupportedAttachment(_))));
    }

    #[test]
    fn version_zero_rejects_appendices_and_versioned_attachments() {
        let appendix = TransactionBuilder::new(&payment::ORDINARY, SENDER)
            .version(0)
            .message(ArbitraryMessage::text("x").unwrap())
            .build();
        assert!(appendix.is_err());

        let versioned = TransactionBuilder::new(&account_control::BALANCE_LEASING, SENDER)
            .version(0)
            .attachment(BalanceLeasing::new(1440).unwrap())
            .build();
        assert!(versioned.is_err());

        let legacy = TransactionBuilder::new(&account_control::BALANCE_LEASING, SENDER)
            .version(0)
            .timestamp(5)
            .attachment(Attachment::from(BalanceLeasing::new(1440).unwrap()).with_version(0))
            .build()
            .unwrap();
        assert_eq!(Transaction::parse(&legacy.bytes()).unwrap(), legacy);
    }

    #[test]
    fn duplicate_message_is_rejected() {
        let err = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, SENDER)
            .attachment(ArbitraryMessage::text("a").unwrap())
            .message(ArbitraryMessage::text("b").unwrap())
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn parse_errors() {
        let bytes = sample_payment().bytes();
        assert!(matches!(
            Transaction::parse(&bytes[..100]),
            Err(NxtError::Truncated { .. })
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            Transaction::parse(&trailing),
            Err(NxtError::InvalidField { .. })
        ));

        let mut unknown = bytes.clone();
        unknown[0] = 9;
        assert!(matches!(
            Transaction::parse(&unknown),
            Err(NxtError::UnknownTransactionType { tx_type: 9, subtype: 0 })
        ));

        let mut opaque = bytes;
        opaque[0] = 2;
        opaque[1] = 0x11;
        assert!(matches!(
            Transaction::parse(&opaque),
            Err(NxtError::UnsupportedAttachment("Asset transfer"))
        ));
    }

    #[test]
    fn unknown_pair_in_document_keeps_header() {
        let mut doc = sample_payment().to_document();
        doc.insert("type".into(), 9.into());
        doc.insert("subtype".into(), 9.into());
        doc.insert("attachment".into(), serde_json::json!({ "version.Whatever": 1 }));
        let tx = Transaction::from_response(&Response::new(doc)).unwrap();
        assert_eq!((tx.tx_type, tx.subtype), (9, 9));
        assert!(tx.transaction_type().is_none());
        assert!(tx.attachment.is_none());
    }

    #[test]
    fn document_attachment_without_version_on_v1_is_rejected() {
        let mut doc = TransactionBuilder::new(&messaging::ALIAS_ASSIGNMENT, SENDER)
            .timestamp(5)
            .attachment(AliasAssignment::new("shop", "x").unwrap())
            .build()
            .unwrap()
            .to_document();
        doc.insert(
            "attachment".into(),
            serde_json::json!({ "alias": "shop", "uri": "x" }),
        );
        assert!(matches!(
            Transaction::from_response(&Response::new(doc)),
            Err(NxtError::InvalidField { .. })
        ));
    }

    #[test]
    fn document_message_with_zero_version_on_v1_is_rejected() {
        let mut doc = sample_payment().to_document();
        doc.insert(
            "attachment".into(),
            serde_json::json!({
                "version.Message": 0,
                "messageIsText": true,
                "message": "hi"
            }),
        );
        assert!(matches!(
            Transaction::from_response(&Response::new(doc)),
            Err(NxtError::InvalidField { .. })
        ));
    }

    #[test]
    fn document_version_and_subtype_must_fit_their_nibbles() {
        let mut doc = sample_payment().to_document();
        doc.insert("version".into(), 16.into());
        assert!(matches!(
            Transaction::from_response(&Response::new(doc)),
            Err(NxtError::InvalidField { .. })
        ));

        let mut doc = sample_payment().to_document();
        doc.insert("subtype".into(), 16.into());
        assert!(matches!(
            Transaction::from_response(&Response::new(doc)),
            Err(NxtError::InvalidField { .. })
        ));
    }

    #[test]
    fn version_zero_document_cannot_carry_appendices() {
        let mut doc = sample_payment().to_document();
        doc.insert("version".into(), 0.into());
        doc.insert(
            "attachment".into(),
            serde_json::json!({ "version.PublicKeyAnnouncement": 1, "recipientPublicKey": "ab".repeat(32) }),
        );
        assert!(matches!(
            Transaction::from_response(&Response::new(doc)),
            Err(NxtError::InvalidField { .. })
        ));
    }

    #[test]
    fn parse_rejects_inconsistent_streams() {
        let mut future = sample_payment().bytes();
        future[1] = 0x20;
        assert!(matches!(
            Transaction::parse(&future),
            Err(NxtError::InvalidField { .. })
        ));

        let mut unversioned = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, SENDER)
            .timestamp(77)
            .attachment(ArbitraryMessage::text("hi").unwrap())
            .build()
            .unwrap()
            .bytes();
        unversioned[HEADER_LENGTH_V1] = 0;
        assert!(matches!(
            Transaction::parse(&unversioned),
            Err(NxtError::InvalidField { .. })
        ));
    }

    #[test]
    fn version_zero_message_transaction_roundtrip() {
        let tx = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, SENDER)
            .version(0)
            .timestamp(42)
            .recipient(7)
            .attachment(ArbitraryMessage::binary(vec![1, 2, 3]).unwrap().with_version(0))
            .build()
            .unwrap()
            .signed([0x21; SIGNATURE_LENGTH]);
        assert_eq!(tx.flags(), 0);

        let bytes = tx.bytes();
        assert_eq!(bytes.len(), HEADER_LENGTH_V0 + 4 + 3);
        assert_eq!(&bytes[HEADER_LENGTH_V0..], &[0x03, 0x00, 0x00, 0x00, 1, 2, 3]);
        let parsed = Transaction::parse(&bytes).unwrap();
        assert_eq!(parsed, tx);

        let doc = parsed.to_document();
        assert_eq!(doc["attachment"]["version.Message"], 0);
        let decoded = Transaction::from_response(&Response::new(doc)).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.bytes(), bytes);
    }

    #[test]
    fn builder_uses_current_time_if_not_set() {
        let before = epoch_time(Utc::now());
        let tx = TransactionBuilder::new(&payment::ORDINARY, SENDER).build().unwrap();
        let after = epoch_time(Utc::now());
        assert!(tx.timestamp >= before && tx.timestamp <= after);
    }

    #[test]
    fn epoch_conversions() {
        assert_eq!(to_datetime(0).timestamp_millis(), EPOCH_BEGINNING_MS);
        assert_eq!(epoch_time(to_datetime(86_400)), 86_400);

        let tx = sample_payment();
        assert_eq!(
            tx.expiration() - tx.timestamp_utc(),
            Duration::minutes(DEFAULT_DEADLINE as i64)
        );
    }
}
