//! Error types for the Nxt core.
//!
//! Every decode, parse and construction path returns an [`NxtError`].
//! Failures are raised at the first invalid field; no partially-built value
//! ever escapes. Note what is *not* here: an unrecognized `(type, subtype)`
//! pair is reported as `None` by the registry, not as an error.

use thiserror::Error;

/// Errors raised while decoding documents, parsing wire bytes or
/// constructing attachments.
#[derive(Debug, Error)]
pub enum NxtError {
    /// A numeric field was neither a number nor a numeric string, or did not
    /// fit the target width.
    #[error("invalid numeric value for '{field}': {value}")]
    NumberFormat {
        /// Document field name.
        field: String,
        /// The offending value as text.
        value: String,
    },

    /// An identifier field was not an integer. Magnitude alone never
    /// triggers this.
    #[error("invalid identifier for '{field}': {value}")]
    Identifier {
        /// Document field name.
        field: String,
        /// The offending value as text.
        value: String,
    },

    /// A required document field was absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field was present but its value is not acceptable.
    #[error("invalid value for '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A hex-encoded field could not be decoded.
    #[error("invalid hex string for '{field}': {reason}")]
    Hex {
        /// Field name.
        field: String,
        /// Decoder message.
        reason: String,
    },

    /// A payload exceeds its protocol limit.
    #[error("{what} length {len} exceeds maximum {max}")]
    TooLong {
        /// What was too long.
        what: &'static str,
        /// Actual length in bytes.
        len: usize,
        /// Protocol limit in bytes.
        max: usize,
    },

    /// The wire buffer ended before a field could be read.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes required by the next field.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Wire bytes name a `(type, subtype)` pair this client does not know,
    /// so the attachment length cannot be determined.
    #[error("unknown transaction type {tx_type}/{subtype}")]
    UnknownTransactionType {
        /// Transaction type byte.
        tx_type: u8,
        /// Transaction subtype byte.
        subtype: u8,
    },

    /// The transaction kind is known but its attachment bytes are not
    /// modelled by this client.
    #[error("attachment for '{0}' is not supported")]
    UnsupportedAttachment(&'static str),

    /// A Reed-Solomon account string is not well formed.
    #[error("malformed account identifier: {0}")]
    MalformedAccount(String),

    /// A Reed-Solomon account string is well formed but its checksum does
    /// not match.
    #[error("account identifier checksum mismatch: {0}")]
    AccountChecksum(String),

    /// The document was not valid JSON or not a JSON object.
    #[error("invalid document: {0}")]
    Json(String),
}

impl NxtError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for NxtError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
