//! Message payloads: the plain [`ArbitraryMessage`] and the encrypted
//! variants.
//!
//! All three share the same length convention on the wire: a 4-byte
//! little-endian word holding the payload length, with bit 31 set when the
//! payload is UTF-8 text.
//!
//! ```text
//! ArbitraryMessage:  [version?] [len | text<<31] [payload]
//! EncryptedMessage:  [version?] [len | text<<31] [data] [nonce: 32]
//! ```

use bytes::{Buf, BufMut};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::appendix::{
    read_version, Appendix, ENCRYPTED_MESSAGE_FLAG, ENCRYPT_TO_SELF_MESSAGE_FLAG, MESSAGE_FLAG,
};
use crate::codec::{check_len, get_array, get_bytes, get_flagged_len, put_flagged_len};
use crate::config::{ENCRYPTED_NONCE_LENGTH, MAX_ARBITRARY_MESSAGE_LENGTH, MAX_ENCRYPTED_MESSAGE_LENGTH};
use crate::error::NxtError;
use crate::response::Response;

// ---------------------------------------------------------------------------
// ArbitraryMessage
// ---------------------------------------------------------------------------

/// An unencrypted message, either raw bytes or UTF-8 text.
///
/// Serves as the attachment of an arbitrary-message transaction and as the
/// optional message appendix of any other transaction.
///
/// # Examples
///
/// ```
/// use nxt_core::transaction::{Appendix, ArbitraryMessage};
///
/// let msg = ArbitraryMessage::text("hi").unwrap();
/// assert_eq!(msg.bytes(), vec![0x01, 0x02, 0x00, 0x00, 0x80, b'h', b'i']);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitraryMessage {
    version: u8,
    message: Vec<u8>,
    is_text: bool,
}

impl ArbitraryMessage {
    /// A binary message. Fails if longer than 1000 bytes.
    pub fn binary(message: Vec<u8>) -> Result<Self, NxtError> {
        check_len("message", message.len(), MAX_ARBITRARY_MESSAGE_LENGTH)?;
        Ok(Self {
            version: 1,
            message,
            is_text: false,
        })
    }

    /// A text message, stored as its UTF-8 bytes. Fails if the encoding is
    /// longer than 1000 bytes.
    pub fn text(message: &str) -> Result<Self, NxtError> {
        check_len("message", message.len(), MAX_ARBITRARY_MESSAGE_LENGTH)?;
        Ok(Self {
            version: 1,
            message: message.as_bytes().to_vec(),
            is_text: true,
        })
    }

    /// Same message with a different version byte. Version 0 is only valid
    /// inside a version 0 transaction.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Raw payload bytes.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn is_text(&self) -> bool {
        self.is_text
    }

    /// The payload as text, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        if self.is_text {
            std::str::from_utf8(&self.message).ok()
        } else {
            None
        }
    }

    /// Decode from a document: `version.Message`, `messageIsText`, `message`.
    ///
    /// A text message is read as a string; a binary one as hex, where an
    /// absent field means an empty payload.
    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("Message")?;
        let is_text = response.opt_bool("messageIsText")?.unwrap_or(false);
        let message = if is_text {
            response.get_string("message")?.into_bytes()
        } else {
            response.get_hex("message")?
        };
        check_len("message", message.len(), MAX_ARBITRARY_MESSAGE_LENGTH)?;
        Ok(Self {
            version,
            message,
            is_text,
        })
    }

    /// Decode from the wire.
    ///
    /// A payload flagged as text that is not valid UTF-8 degrades to an empty
    /// binary payload instead of failing; callers that care must check the
    /// resulting length.
    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let (len, is_text) = get_flagged_len(buf)?;
        check_len("message", len, MAX_ARBITRARY_MESSAGE_LENGTH)?;
        let message = get_bytes(buf, len)?;

        if is_text && std::str::from_utf8(&message).is_err() {
            warn!(len, "text message is not valid UTF-8, keeping an empty binary payload");
            return Ok(Self {
                version,
                message: Vec::new(),
                is_text: false,
            });
        }
        Ok(Self {
            version,
            message,
            is_text,
        })
    }
}

impl Appendix for ArbitraryMessage {
    fn name(&self) -> &'static str {
        "Message"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn flags(&self) -> u32 {
        if self.version > 0 {
            MESSAGE_FLAG
        } else {
            0
        }
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_flagged_len(buf, self.message.len(), self.is_text);
        buf.put_slice(&self.message);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("messageIsText".into(), self.is_text.into());
        let message = if self.is_text {
            String::from_utf8_lossy(&self.message).into_owned()
        } else {
            hex::encode(&self.message)
        };
        doc.insert("message".into(), message.into());
    }
}

// ---------------------------------------------------------------------------
// EncryptedData
// ---------------------------------------------------------------------------

/// Ciphertext produced by an external encryptor, with its nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    data: Vec<u8>,
    nonce: [u8; ENCRYPTED_NONCE_LENGTH],
    is_text: bool,
}

impl EncryptedData {
    /// Fails if the ciphertext is longer than 1000 bytes.
    pub fn new(
        data: Vec<u8>,
        nonce: [u8; ENCRYPTED_NONCE_LENGTH],
        is_text: bool,
    ) -> Result<Self, NxtError> {
        check_len("encrypted message", data.len(), MAX_ENCRYPTED_MESSAGE_LENGTH)?;
        Ok(Self {
            data,
            nonce,
            is_text,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn nonce(&self) -> &[u8; ENCRYPTED_NONCE_LENGTH] {
        &self.nonce
    }

    /// Whether the plaintext is UTF-8 text.
    pub fn is_text(&self) -> bool {
        self.is_text
    }

    fn from_response(response: &Response) -> Result<Self, NxtError> {
        let data = response.get_hex("data")?;
        let nonce = response
            .opt_hex_array::<ENCRYPTED_NONCE_LENGTH>("nonce")?
            .ok_or_else(|| NxtError::MissingField("nonce".to_string()))?;
        let is_text = response.opt_bool("isText")?.unwrap_or(false);
        Self::new(data, nonce, is_text)
    }

    fn to_value(&self) -> Value {
        json!({
            "data": hex::encode(&self.data),
            "nonce": hex::encode(self.nonce),
            "isText": self.is_text,
        })
    }
}

// ---------------------------------------------------------------------------
// EncryptedMessage
// ---------------------------------------------------------------------------

/// An encrypted message appendix, addressed either to the recipient or to
/// the sender's own key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    version: u8,
    encrypted: EncryptedData,
    to_self: bool,
}

impl EncryptedMessage {
    /// Message encrypted for the transaction recipient.
    pub fn for_recipient(encrypted: EncryptedData) -> Self {
        Self {
            version: 1,
            encrypted,
            to_self: false,
        }
    }

    /// Message encrypted to the sender's own key.
    pub fn for_self(encrypted: EncryptedData) -> Self {
        Self {
            version: 1,
            encrypted,
            to_self: true,
        }
    }

    pub fn encrypted(&self) -> &EncryptedData {
        &self.encrypted
    }

    pub fn is_to_self(&self) -> bool {
        self.to_self
    }

    fn field(to_self: bool) -> &'static str {
        if to_self {
            "encryptToSelfMessage"
        } else {
            "encryptedMessage"
        }
    }

    /// Decode the recipient (`to_self == false`) or self-addressed variant.
    pub fn from_response(response: &Response, to_self: bool) -> Result<Self, NxtError> {
        let name = if to_self {
            "EncryptToSelfMessage"
        } else {
            "EncryptedMessage"
        };
        let version = response.get_version(name)?;
        let encrypted = EncryptedData::from_response(&response.get_object(Self::field(to_self))?)?;
        Ok(Self {
            version,
            encrypted,
            to_self,
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, to_self: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, true)?;
        let (len, is_text) = get_flagged_len(buf)?;
        check_len("encrypted message", len, MAX_ENCRYPTED_MESSAGE_LENGTH)?;
        let data = get_bytes(buf, len)?;
        let nonce = get_array::<ENCRYPTED_NONCE_LENGTH>(buf)?;
        Ok(Self {
            version,
            encrypted: EncryptedData {
                data,
                nonce,
                is_text,
            },
            to_self,
        })
    }
}

impl Appendix for EncryptedMessage {
    fn name(&self) -> &'static str {
        if self.to_self {
            "EncryptToSelfMessage"
        } else {
            "EncryptedMessage"
        }
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn flags(&self) -> u32 {
        if self.to_self {
            ENCRYPT_TO_SELF_MESSAGE_FLAG
        } else {
            ENCRYPTED_MESSAGE_FLAG
        }
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_flagged_len(buf, self.encrypted.data.len(), self.encrypted.is_text);
        buf.put_slice(&self.encrypted.data);
        buf.put_slice(&self.encrypted.nonce);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert(Self::field(self.to_self).into(), self.encrypted.to_value());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
