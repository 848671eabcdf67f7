//! Primary transaction attachments.
//!
//! An [`Attachment`] is the type-specific payload of a transaction: the alias
//! being assigned, the leasing period, the minting solution. Only the variants
//! below are modelled; other transaction types either carry no attachment or
//! one this crate treats as opaque (see [`AttachmentKind`]).
//!
//! Every variant follows the [`Appendix`] contract: an optional version byte
//! followed by a body on the wire, and a `version.<Name>` key plus its own
//! fields in a document.

use bytes::{Buf, BufMut};
use serde_json::{Map, Value};

use super::appendix::{read_version, Appendix};
use super::message::ArbitraryMessage;
use super::types::AttachmentKind;
use crate::codec::{check_len, get_i64, get_string_u16, get_string_u8, get_u16, put_string_u16, put_string_u8};
use crate::config::{
    MAX_ACCOUNT_DESCRIPTION_LENGTH, MAX_ACCOUNT_NAME_LENGTH, MAX_ALIAS_LENGTH, MAX_ALIAS_URI_LENGTH,
    MAX_LEASING_PERIOD, MIN_LEASING_PERIOD,
};
use crate::error::NxtError;
use crate::identifier::id_string;
use crate::response::Response;

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// The modelled attachment variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Message(ArbitraryMessage),
    AliasAssignment(AliasAssignment),
    AliasSell(AliasSell),
    AliasBuy(AliasBuy),
    AccountInfo(AccountInfo),
    BalanceLeasing(BalanceLeasing),
    CurrencyMinting(CurrencyMinting),
}

impl Attachment {
    /// The registry kind this variant belongs to.
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Self::Message(_) => AttachmentKind::ArbitraryMessage,
            Self::AliasAssignment(_) => AttachmentKind::AliasAssignment,
            Self::AliasSell(_) => AttachmentKind::AliasSell,
            Self::AliasBuy(_) => AttachmentKind::AliasBuy,
            Self::AccountInfo(_) => AttachmentKind::AccountInfo,
            Self::BalanceLeasing(_) => AttachmentKind::BalanceLeasing,
            Self::CurrencyMinting(_) => AttachmentKind::CurrencyMinting,
        }
    }

    /// Same attachment with a different version byte.
    pub fn with_version(self, version: u8) -> Self {
        match self {
            Self::Message(a) => Self::Message(a.with_version(version)),
            Self::AliasAssignment(mut a) => {
                a.version = version;
                Self::AliasAssignment(a)
            }
            Self::AliasSell(mut a) => {
                a.version = version;
                Self::AliasSell(a)
            }
            Self::AliasBuy(mut a) => {
                a.version = version;
                Self::AliasBuy(a)
            }
            Self::AccountInfo(mut a) => {
                a.version = version;
                Self::AccountInfo(a)
            }
            Self::BalanceLeasing(mut a) => {
                a.version = version;
                Self::BalanceLeasing(a)
            }
            Self::CurrencyMinting(mut a) => {
                a.version = version;
                Self::CurrencyMinting(a)
            }
        }
    }

    fn inner(&self) -> &dyn Appendix {
        match self {
            Self::Message(a) => a,
            Self::AliasAssignment(a) => a,
            Self::AliasSell(a) => a,
            Self::AliasBuy(a) => a,
            Self::AccountInfo(a) => a,
            Self::BalanceLeasing(a) => a,
            Self::CurrencyMinting(a) => a,
        }
    }

    /// Decode the attachment of `kind` from a document.
    ///
    /// An arbitrary-message document with neither a message nor a message
    /// version carries no attachment.
    pub(crate) fn load(kind: AttachmentKind, response: &Response) -> Result<Option<Self>, NxtError> {
        let attachment = match kind {
            AttachmentKind::Empty | AttachmentKind::Opaque => return Ok(None),
            AttachmentKind::ArbitraryMessage => {
                if !response.has("message") && !response.has("version.Message") {
                    return Ok(None);
                }
                Self::Message(ArbitraryMessage::from_response(response)?)
            }
            AttachmentKind::AliasAssignment => {
                Self::AliasAssignment(AliasAssignment::from_response(response)?)
            }
            AttachmentKind::AliasSell => Self::AliasSell(AliasSell::from_response(response)?),
            AttachmentKind::AliasBuy => Self::AliasBuy(AliasBuy::from_response(response)?),
            AttachmentKind::AccountInfo => Self::AccountInfo(AccountInfo::from_response(response)?),
            AttachmentKind::BalanceLeasing => {
                Self::BalanceLeasing(BalanceLeasing::from_response(response)?)
            }
            AttachmentKind::CurrencyMinting => {
                Self::CurrencyMinting(CurrencyMinting::from_response(response)?)
            }
        };
        Ok(Some(attachment))
    }

    /// Decode the attachment of `kind` from the wire.
    pub(crate) fn parse(
        kind: AttachmentKind,
        buf: &mut impl Buf,
        version_present: bool,
    ) -> Result<Self, NxtError> {
        Ok(match kind {
            AttachmentKind::Empty => return Err(NxtError::UnsupportedAttachment("empty")),
            AttachmentKind::Opaque => return Err(NxtError::UnsupportedAttachment("opaque")),
            AttachmentKind::ArbitraryMessage => {
                Self::Message(ArbitraryMessage::parse(buf, version_present)?)
            }
            AttachmentKind::AliasAssignment => {
                Self::AliasAssignment(AliasAssignment::parse(buf, version_present)?)
            }
            AttachmentKind::AliasSell => Self::AliasSell(AliasSell::parse(buf, version_present)?),
            AttachmentKind::AliasBuy => Self::AliasBuy(AliasBuy::parse(buf, version_present)?),
            AttachmentKind::AccountInfo => {
                Self::AccountInfo(AccountInfo::parse(buf, version_present)?)
            }
            AttachmentKind::BalanceLeasing => {
                Self::BalanceLeasing(BalanceLeasing::parse(buf, version_present)?)
            }
            AttachmentKind::CurrencyMinting => {
                Self::CurrencyMinting(CurrencyMinting::parse(buf, version_present)?)
            }
        })
    }
}

impl Appendix for Attachment {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn version(&self) -> u8 {
        self.inner().version()
    }

    fn flags(&self) -> u32 {
        self.inner().flags()
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        self.inner().put_body(buf)
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        self.inner().put_document(doc)
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Attachment {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from!(AliasAssignment, AliasSell, AliasBuy, AccountInfo, BalanceLeasing, CurrencyMinting);

impl From<ArbitraryMessage> for Attachment {
    fn from(value: ArbitraryMessage) -> Self {
        Self::Message(value)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_alias(alias: &str) -> Result<(), NxtError> {
    if alias.is_empty() {
        return Err(NxtError::invalid("alias", "must not be empty"));
    }
    check_len("alias", alias.len(), MAX_ALIAS_LENGTH)?;
    if !alias.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(NxtError::invalid("alias", format!("{alias:?} is not alphanumeric")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Assign (or reassign) an alias to a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasAssignment {
    version: u8,
    alias: String,
    uri: String,
}

impl AliasAssignment {
    pub fn new(alias: impl Into<String>, uri: impl Into<String>) -> Result<Self, NxtError> {
        let alias = alias.into();
        let uri = uri.into();
        validate_alias(&alias)?;
        check_len("alias uri", uri.len(), MAX_ALIAS_URI_LENGTH)?;
        Ok(Self {
            version: 1,
            alias,
            uri,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("AliasAssignment")?;
        let uri = response.opt_string("uri")?.unwrap_or_default();
        Ok(Self {
            version,
            ..Self::new(response.get_string("alias")?, uri)?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let alias = get_string_u8(buf, "alias")?;
        let uri = get_string_u16(buf, "uri")?;
        Ok(Self {
            version,
            ..Self::new(alias, uri)?
        })
    }
}

impl Appendix for AliasAssignment {
    fn name(&self) -> &'static str {
        "AliasAssignment"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_string_u8(buf, &self.alias);
        put_string_u16(buf, &self.uri);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("alias".into(), self.alias.clone().into());
        doc.insert("uri".into(), self.uri.clone().into());
    }
}

/// Offer an alias for sale. A price of zero transfers it outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSell {
    version: u8,
    alias: String,
    price_nqt: i64,
}

impl AliasSell {
    pub fn new(alias: impl Into<String>, price_nqt: i64) -> Result<Self, NxtError> {
        let alias = alias.into();
        validate_alias(&alias)?;
        if price_nqt < 0 {
            return Err(NxtError::invalid("priceNQT", "must not be negative"));
        }
        Ok(Self {
            version: 1,
            alias,
            price_nqt,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn price_nqt(&self) -> i64 {
        self.price_nqt
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("AliasSell")?;
        Ok(Self {
            version,
            ..Self::new(response.get_string("alias")?, response.get_long("priceNQT")?)?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let alias = get_string_u8(buf, "alias")?;
        let price_nqt = get_i64(buf)?;
        Ok(Self {
            version,
            ..Self::new(alias, price_nqt)?
        })
    }
}

impl Appendix for AliasSell {
    fn name(&self) -> &'static str {
        "AliasSell"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_string_u8(buf, &self.alias);
        buf.put_i64_le(self.price_nqt);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("alias".into(), self.alias.clone().into());
        doc.insert("priceNQT".into(), self.price_nqt.to_string().into());
    }
}

/// Buy an alias that is offered for sale. The price is the transaction amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBuy {
    version: u8,
    alias: String,
}

impl AliasBuy {
    pub fn new(alias: impl Into<String>) -> Result<Self, NxtError> {
        let alias = alias.into();
        validate_alias(&alias)?;
        Ok(Self { version: 1, alias })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("AliasBuy")?;
        Ok(Self {
            version,
            ..Self::new(response.get_string("alias")?)?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let alias = get_string_u8(buf, "alias")?;
        Ok(Self {
            version,
            ..Self::new(alias)?
        })
    }
}

impl Appendix for AliasBuy {
    fn name(&self) -> &'static str {
        "AliasBuy"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_string_u8(buf, &self.alias);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("alias".into(), self.alias.clone().into());
    }
}

// ---------------------------------------------------------------------------
// AccountInfo
// ---------------------------------------------------------------------------

/// Set the sender's public account name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    version: u8,
    name: String,
    description: String,
}

impl AccountInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self, NxtError> {
        let name = name.into();
        let description = description.into();
        check_len("account name", name.len(), MAX_ACCOUNT_NAME_LENGTH)?;
        check_len(
            "account description",
            description.len(),
            MAX_ACCOUNT_DESCRIPTION_LENGTH,
        )?;
        Ok(Self {
            version: 1,
            name,
            description,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("AccountInfo")?;
        let name = response.opt_string("name")?.unwrap_or_default();
        let description = response.opt_string("description")?.unwrap_or_default();
        Ok(Self {
            version,
            ..Self::new(name, description)?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let name = get_string_u8(buf, "name")?;
        let description = get_string_u16(buf, "description")?;
        Ok(Self {
            version,
            ..Self::new(name, description)?
        })
    }
}

impl Appendix for AccountInfo {
    fn name(&self) -> &'static str {
        "AccountInfo"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        put_string_u8(buf, &self.name);
        put_string_u16(buf, &self.description);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("name".into(), self.name.clone().into());
        doc.insert("description".into(), self.description.clone().into());
    }
}

// ---------------------------------------------------------------------------
// BalanceLeasing
// ---------------------------------------------------------------------------

/// Lease the sender's effective balance to the recipient for `period` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceLeasing {
    version: u8,
    period: u16,
}

impl BalanceLeasing {
    /// Fails unless `period` is within 1440..=32767 blocks.
    pub fn new(period: u16) -> Result<Self, NxtError> {
        if !(MIN_LEASING_PERIOD..=MAX_LEASING_PERIOD).contains(&period) {
            return Err(NxtError::invalid(
                "period",
                format!("{period} is outside {MIN_LEASING_PERIOD}..={MAX_LEASING_PERIOD}"),
            ));
        }
        Ok(Self { version: 1, period })
    }

    pub fn period(&self) -> u16 {
        self.period
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("EffectiveBalanceLeasing")?;
        Ok(Self {
            version,
            ..Self::new(response.get_number("period")?)?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let period = get_u16(buf)?;
        Ok(Self {
            version,
            ..Self::new(period)?
        })
    }
}

impl Appendix for BalanceLeasing {
    fn name(&self) -> &'static str {
        "EffectiveBalanceLeasing"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        buf.put_u16_le(self.period);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("period".into(), self.period.into());
    }
}

// ---------------------------------------------------------------------------
// CurrencyMinting
// ---------------------------------------------------------------------------

/// A proof-of-work solution that mints `units` of a mintable currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMinting {
    version: u8,
    nonce: i64,
    currency_id: i64,
    units: i64,
    counter: i64,
}

impl CurrencyMinting {
    /// Fails unless `units` is positive.
    pub fn new(nonce: i64, currency_id: i64, units: i64, counter: i64) -> Result<Self, NxtError> {
        if units <= 0 {
            return Err(NxtError::invalid("units", "must be positive"));
        }
        Ok(Self {
            version: 1,
            nonce,
            currency_id,
            units,
            counter,
        })
    }

    pub fn nonce(&self) -> i64 {
        self.nonce
    }

    pub fn currency_id(&self) -> i64 {
        self.currency_id
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn counter(&self) -> i64 {
        self.counter
    }

    pub fn from_response(response: &Response) -> Result<Self, NxtError> {
        let version = response.get_version("CurrencyMinting")?;
        Ok(Self {
            version,
            ..Self::new(
                response.get_long("nonce")?,
                response.get_id("currency")?,
                response.get_long("units")?,
                response.get_long("counter")?,
            )?
        })
    }

    pub(crate) fn parse(buf: &mut impl Buf, version_present: bool) -> Result<Self, NxtError> {
        let version = read_version(buf, version_present)?;
        let nonce = get_i64(buf)?;
        let currency_id = get_i64(buf)?;
        let units = get_i64(buf)?;
        let counter = get_i64(buf)?;
        Ok(Self {
            version,
            ..Self::new(nonce, currency_id, units, counter)?
        })
    }
}

impl Appendix for CurrencyMinting {
    fn name(&self) -> &'static str {
        "CurrencyMinting"
    }

    fn version(&self) -> u8 {
        self.version
    }

    fn put_body(&self, buf: &mut Vec<u8>) {
        buf.put_i64_le(self.nonce);
        buf.put_i64_le(self.currency_id);
        buf.put_i64_le(self.units);
        buf.put_i64_le(self.counter);
    }

    fn put_document(&self, doc: &mut Map<String, Value>) {
        doc.insert("nonce".into(), self.nonce.to_string().into());
        doc.insert("currency".into(), id_string(self.currency_id).into());
        doc.insert("units".into(), self.units.to_string().into());
        doc.insert("counter".into(), self.counter.to_string().into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn samples() -> Vec<Attachment> {
        vec![
            ArbitraryMessage::text("pay rent").unwrap().into(),
            AliasAssignment::new("nxtwiki", "https://wiki.example.org").unwrap().into(),
            AliasSell::new("nxtwiki", 2_500_000_000).unwrap().into(),
            AliasBuy::new("nxtwiki").unwrap().into(),
            AccountInfo::new("alice", "long-term holder").unwrap().into(),
            BalanceLeasing::new(1440).unwrap().into(),
            CurrencyMinting::new(77, -3, 1_000, 5).unwrap().into(),
        ]
    }

    #[test]
    fn every_variant_roundtrips_through_its_document() {
        for attachment in samples() {
            let doc = Response::new(attachment.to_document());
            let loaded = Attachment::load(attachment.kind(), &doc).unwrap();
            assert_eq!(loaded.as_ref(), Some(&attachment), "{}", attachment.name());
        }
    }

    #[test]
    fn every_variant_roundtrips_through_its_bytes() {
        for attachment in samples() {
            let bytes = attachment.bytes();
            let mut slice = bytes.as_slice();
            let parsed = Attachment::parse(attachment.kind(), &mut slice, true).unwrap();
            assert_eq!(parsed, attachment, "{}", attachment.name());
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn version_zero_roundtrips_without_version_byte() {
        for attachment in samples() {
            let attachment = attachment.with_version(0);
            let bytes = attachment.bytes();
            let mut slice = bytes.as_slice();
            assert_eq!(
                Attachment::parse(attachment.kind(), &mut slice, false).unwrap(),
                attachment
            );
        }
    }

    #[test]
    fn alias_assignment_layout() {
        let a = AliasAssignment::new("ab", "xyz").unwrap();
        assert_eq!(a.bytes(), vec![1, 2, b'a', b'b', 3, 0, b'x', b'y', b'z']);
        assert_eq!(a.flags(), 0);
    }

    #[test]
    fn alias_sell_and_buy_layout() {
        let sell = AliasSell::new("a", 1).unwrap();
        assert_eq!(sell.bytes(), vec![1, 1, b'a', 1, 0, 0, 0, 0, 0, 0, 0]);
        let buy = AliasBuy::new("a").unwrap();
        assert_eq!(buy.bytes(), vec![1, 1, b'a']);
    }

    #[test]
    fn leasing_and_minting_layout() {
        assert_eq!(BalanceLeasing::new(1440).unwrap().bytes(), vec![1, 0xA0, 0x05]);
        assert_eq!(CurrencyMinting::new(1, 2, 3, 4).unwrap().bytes().len(), 1 + 4 * 8);
    }

    #[test]
    fn alias_limits() {
        assert!(AliasAssignment::new("", "uri").is_err());
        assert!(AliasAssignment::new("a".repeat(100), "").is_ok());
        assert!(AliasAssignment::new("a".repeat(101), "").is_err());
        assert!(AliasAssignment::new("has space", "").is_err());
        assert!(AliasAssignment::new("ok", "u".repeat(1001)).is_err());
        assert!(AliasSell::new("ok", -1).is_err());
    }

    #[test]
    fn account_info_limits() {
        assert!(AccountInfo::new("", "").is_ok());
        assert!(AccountInfo::new("n".repeat(101), "").is_err());
        assert!(AccountInfo::new("", "d".repeat(1001)).is_err());
    }

    #[test]
    fn leasing_period_bounds() {
        assert!(BalanceLeasing::new(1439).is_err());
        assert!(BalanceLeasing::new(1440).is_ok());
        assert!(BalanceLeasing::new(32767).is_ok());
        assert!(BalanceLeasing::new(32768).is_err());
    }

    #[test]
    fn minting_requires_positive_units() {
        assert!(CurrencyMinting::new(0, 1, 0, 0).is_err());
    }

    #[test]
    fn leasing_document_uses_effective_balance_version_key() {
        let doc = BalanceLeasing::new(2000).unwrap().to_document();
        assert_eq!(doc["version.EffectiveBalanceLeasing"], json!(1));
        assert_eq!(doc["period"], json!(2000));
    }

    #[test]
    fn minting_document_with_unsigned_currency_id() {
        let doc = Response::from_value(json!({
            "version.CurrencyMinting": 1,
            "nonce": "42",
            "currency": "18446744073709551615",
            "units": 10,
            "counter": "3",
        }))
        .unwrap();
        let minting = CurrencyMinting::from_response(&doc).unwrap();
        assert_eq!(minting.currency_id(), -1);
        assert_eq!(minting.units(), 10);
    }

    #[test]
    fn absent_version_decodes_as_zero() {
        let doc = Response::from_value(json!({ "alias": "legacy" })).unwrap();
        let buy = AliasBuy::from_response(&doc).unwrap();
        assert_eq!(buy.version(), 0);
        assert_eq!(buy.bytes(), vec![6, b'l', b'e', b'g', b'a', b'c', b'y']);
    }

    #[test]
    fn missing_required_field() {
        let doc = Response::from_value(json!({ "version.AliasSell": 1, "alias": "a" })).unwrap();
        assert!(matches!(
            AliasSell::from_response(&doc),
            Err(NxtError::MissingField(field)) if field == "priceNQT"
        ));
    }

    #[test]
    fn message_kind_without_message_loads_nothing() {
        let doc = Response::default();
        assert!(Attachment::load(AttachmentKind::ArbitraryMessage, &doc)
            .unwrap()
            .is_none());
    }
}
