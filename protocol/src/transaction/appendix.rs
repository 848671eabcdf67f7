//! The shared codec contract for every attachment and appendix, plus the
//! structural appendices that are neither messages nor primary attachments.
//!
//! On the wire, an appendix is an optional version byte followed by a body.
//! In a document, it is a set of fields plus a `version.<Name>` key. The
//! [`Appendix`] trait captures both halves once; implementors only supply the
//! body and their own fields.

use bytes::{Buf, BufMut};
use serde_json::{json, Map, Value};

use crate::codec::{check_len, ensure, get_array, get_bytes, get_i32, get_i64, get_i8, get_u8, put_version};
use crate::config::{
    HASH_LENGTH, MAX_PHASING_HASHED_SECRET_LENGTH, MAX_PHASING_LINKED_TRANSACTIONS,
    MAX_PHASING_WHITELIST_SIZE, PUBLIC_KEY_LENGTH,
};
use crate::error::NxtError;
use crate::identifier::id_string;
use crate::response::Response;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Plain or text message appendix present.
pub const MESSAGE_FLAG: u32 = 0x01;
/// Encrypted message (to the recipient) present.
pub const ENCRYPTED_MESSAGE_FLAG: u32 = 0x02;
/// Recipient public key announcement present.
pub const PUBLIC_KEY_ANNOUNCEMENT_FLAG: u32 = 0x04;
/// Message encrypted to the sender's own key present.
pub const ENCRYPT_TO_SELF_MESSAGE_FLAG: u32 = 0x08;
/// Phasing (deferred execution) appendix present.
pub const PHASING_FLAG: u32 = 0x10;

// ---------------------------------------------------------------------------
// Appendix
// ---------------------------------------------------------------------------

/// Encode side of an attachment or appendix.
pub trait Appendix {
    /// Name used for the `version.<name>` document key.
    fn name(&self) -> &'static str;

    /// Version byte. Zero means "no version byte on the wire".
    fn version(&self) -> u8;

    /// Bits this value contributes to the transaction flags word.
    fn flags(&self) -> u32 {
        0
    }

    /// Write the body (everything after the version byte).
    fn put_body(&self, buf: &mut Vec<u8>);

    /// Write this value's document fields, excluding the version key.
    fn put_document(&self, doc: &mut Map<String, Value>);

    /// Write the version byte (when non-zero) and the body.
    fn put_bytes(&self, buf: &mut Vec<u8>) {
        put_version(buf, self.version());
        self.put_body(buf);
    }

    /// The exact wire encoding.
    fn bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.put_bytes(&mut buf);
        buf
    }

    /// The document form, as the API would report it.
    fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert(format!("version.{}", self.name()), self.version().into());
        self.put_document(&mut doc);
        doc
    }
}

/// Read the version byte when the transaction version says one is present.
pub(crate) fn read_version(buf: &mut impl Buf, version_present: bool) -> Result<u8, NxtError> {
    if version_present {
        get_u8(buf)
    } else {
        Ok(0)
    }
}

// ---------------------------------------------------------------------------
// PublicKeyAnnouncement
// ---------------------------------------------------------------------------

/// Announces the recipient's public key so the ledger can bind it to the
/// recipient account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyAnnouncement {
    version: u8,
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKeyAnnouncement {
    pub fn new(public_key: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self {
            version: 1,
            public_key,
        }
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("PublicKeyAnnouncement")?;
        let public_key = response
            .opt_hex_array::<PUBLIC_KEY_LENGTH>("recipientPublicKey")?
            .ok_or_else(|| NxtError::MissingField("recipientPublicKey".to_string()))?;
        Ok(Self {
            version,
            public_key,
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf) -> Result<Self, NxtError> {
        let version = get_u8(buf)?;
        let public_key = get_array::<PUBLIC_KEY_LENGTH>(buf)?;
        Ok(Self {
            version,
            public_key,
        })
    }
}

impl Appendix for PublicKeyAnnouncement {
    fn name(&self) -> &'static str {
        "PublicKeyAnnouncement"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn flags(&self) -> u32 {
        PUBLIC_KEY_ANNOUNCEMENT_FLAG
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        buf.put_slice(&self.public_key);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert(
            "recipientPublicKey".into(),
            hex::encode(self.public_key).into(),
        );
    }
}

// ---------------------------------------------------------------------------
// Phasing
// ---------------------------------------------------------------------------

/// Deferred execution: the transaction is held until `finish_height` and
/// then applied only if the configured vote passes.
///
/// Fields are public like the header fields of a transaction; call
/// [`Phasing::validate`] (the builder and both decoders do) before relying
/// on the limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phasing {
    pub version: u8,
    pub finish_height: i32,
    /// -1 none, 0 account, 1 NQT, 2 asset, 3 currency, 4 transaction, 5 hash.
    pub voting_model: i8,
    pub quorum: i64,
    pub min_balance: i64,
    pub whitelist: Vec<i64>,
    pub holding_id: i64,
    /// 0 none, 1 NQT, 2 asset, 3 currency.
    pub min_balance_model: i8,
    pub linked_full_hashes: Vec<[u8; HASH_LENGTH]>,
    pub hashed_secret: Vec<u8>,
    pub hashed_secret_algorithm: u8,
}

impl Phasing {
    /// A version-1 phasing appendix with the given vote and no whitelist,
    /// linked transactions or hashed secret.
    pub fn new(finish_height: i32, voting_model: i8, quorum: i64) -> Self {
        Self {
            version: 1,
            finish_height,
            voting_model,
            quorum,
            min_balance: 0,
            whitelist: Vec::new(),
            holding_id: 0,
            min_balance_model: 0,
            linked_full_hashes: Vec::new(),
            hashed_secret: Vec::new(),
            hashed_secret_algorithm: 0,
        }
    }

    /// Check the protocol limits.
    pub fn validate(&self) -> Result<(), NxtError> {
        if !(-1..=5).contains(&self.voting_model) {
            return Err(NxtError::invalid(
                "phasingVotingModel",
                format!("unknown voting model {}", self.voting_model),
            ));
        }
        if !(0..=3).contains(&self.min_balance_model) {
            return Err(NxtError::invalid(
                "phasingMinBalanceModel",
                format!("unknown balance model {}", self.min_balance_model),
            ));
        }
        if self.finish_height <= 0 {
            return Err(NxtError::invalid("phasingFinishHeight", "must be positive"));
        }
        if self.quorum < 0 || self.min_balance < 0 {
            return Err(NxtError::invalid("phasingQuorum", "must not be negative"));
        }
        check_len("phasing whitelist", self.whitelist.len(), MAX_PHASING_WHITELIST_SIZE)?;
        check_len(
            "phasing linked transactions",
            self.linked_full_hashes.len(),
            MAX_PHASING_LINKED_TRANSACTIONS,
        )?;
        check_len(
            "phasing hashed secret",
            self.hashed_secret.len(),
            MAX_PHASING_HASHED_SECRET_LENGTH,
        )?;
        Ok(())
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let linked_full_hashes = response
            .get_hex_list("phasingLinkedFullHashes")?
            .into_iter()
            .map(|hash| {
                <[u8; HASH_LENGTH]>::try_from(hash.as_slice()).map_err(|_| {
                    NxtError::invalid("phasingLinkedFullHashes", "expected 32-byte hashes")
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let phasing = Self {
            version: response.get_version("Phasing")?,
            finish_height: response.get_number("phasingFinishHeight")?,
            voting_model: response.get_number("phasingVotingModel")?,
            quorum: response.get_long("phasingQuorum")?,
            min_balance: response.opt_number("phasingMinBalance")?.unwrap_or(0),
            whitelist: response.get_id_list("phasingWhitelist")?,
            holding_id: response.opt_id("phasingHolding")?.unwrap_or(0),
            min_balance_model: response.opt_number("phasingMinBalanceModel")?.unwrap_or(0),
            linked_full_hashes,
            hashed_secret: response.get_hex("phasingHashedSecret")?,
            hashed_secret_algorithm: response
                .opt_number("phasingHashedSecretAlgorithm")?
                .unwrap_or(0),
        };
        phasing.validate()?;
        Ok(phasing)
    }

    pub(crate) fn parse(buf: &mut impl Buf) -> Result<Self, NxtError> {
        let version = get_u8(buf)?;
        let finish_height = get_i32(buf)?;
        let voting_model = get_i8(buf)?;
        let quorum = get_i64(buf)?;
        let min_balance = get_i64(buf)?;

        let whitelist_len = get_u8(buf)? as usize;
        check_len("phasing whitelist", whitelist_len, MAX_PHASING_WHITELIST_SIZE)?;
        ensure(buf, whitelist_len * 8)?;
        let whitelist = (0..whitelist_len)
            .map(|_| get_i64(buf))
            .collect::<Result<Vec<_>, _>>()?;

        let holding_id = get_i64(buf)?;
        let min_balance_model = get_i8(buf)?;

        let linked_len = get_u8(buf)? as usize;
        check_len(
            "phasing linked transactions",
            linked_len,
            MAX_PHASING_LINKED_TRANSACTIONS,
        )?;
        let linked_full_hashes = (0..linked_len)
            .map(|_| get_array::<HASH_LENGTH>(buf))
            .collect::<Result<Vec<_>, _>>()?;

        let secret_len = get_u8(buf)? as usize;
        let hashed_secret = get_bytes(buf, secret_len)?;
        let hashed_secret_algorithm = get_u8(buf)?;

        let phasing = Self {
            version,
            finish_height,
            voting_model,
            quorum,
            min_balance,
            whitelist,
            holding_id,
            min_balance_model,
            linked_full_hashes,
            hashed_secret,
            hashed_secret_algorithm,
        };
        phasing.validate()?;
        Ok(phasing)
    }
}

impl Appendix for Phasing {
    fn name(&self) -> &'static str {
        "Phasing"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn flags(&self) -> u32 {
        PHASING_FLAG
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        buf.put_i32_le(self.finish_height);
        buf.put_i8(self.voting_model);
        buf.put_i64_le(self.quorum);
        buf.put_i64_le(self.min_balance);
        buf.put_u8(self.whitelist.len() as u8);
        for account in &self.whitelist {
            buf.put_i64_le(*account);
        }
        buf.put_i64_le(self.holding_id);
        buf.put_i8(self.min_balance_model);
        buf.put_u8(self.linked_full_hashes.len() as u8);
        for hash in &self.linked_full_hashes {
            buf.put_slice(hash);
        }
        buf.put_u8(self.hashed_secret.len() as u8);
        buf.put_slice(&self.hashed_secret);
        buf.put_u8(self.hashed_secret_algorithm);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("phasingFinishHeight".into(), self.finish_height.into());
        doc.insert("phasingVotingModel".into(), self.voting_model.into());
        doc.insert("phasingQuorum".into(), self.quorum.to_string().into());
        doc.insert("phasingMinBalance".into(), self.min_balance.to_string().into());
        doc.insert(
            "phasingWhitelist".into(),
            json!(self.whitelist.iter().map(|id| id_string(*id)).collect::<Vec<_>>()),
        );
        doc.insert("phasingHolding".into(), id_string(self.holding_id).into());
        doc.insert("phasingMinBalanceModel".into(), self.min_balance_model.into());
        doc.insert(
            "phasingLinkedFullHashes".into(),
            json!(self.linked_full_hashes.iter().map(hex::encode).collect::<Vec<_>>()),
        );
        doc.insert("phasingHashedSecret".into(), hex::encode(&self.hashed_secret).into());
        doc.insert(
            "phasingHashedSecretAlgorithm".into(),
            self.hashed_secret_algorithm.into(),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
