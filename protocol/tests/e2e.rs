//! End-to-end tests for the Nxt core.
//!
//! These drive the public API the way a client does: raw JSON text from a
//! node goes in through `Response`, typed transactions come out, and their
//! byte streams parse back to the same values. Signatures are supplied as
//! opaque bytes since signing is not this crate's job.

use nxt_core::identifier::{from_rs, id_string, parse_id, to_rs};
use nxt_core::transaction::types::{self, account_control, messaging, monetary_system};
use nxt_core::transaction::{
    AccountInfo, AliasSell, Appendix, ArbitraryMessage, Attachment, BalanceLeasing,
    CurrencyMinting, EncryptedData, Phasing, Transaction, TransactionBuilder, MESSAGE_FLAG,
    PHASING_FLAG,
};
use nxt_core::{Account, NxtError, Response};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const SENDER: [u8; 32] = [0x42; 32];

fn builder(tx_type: &'static types::TransactionType) -> TransactionBuilder {
    TransactionBuilder::new(tx_type, SENDER)
        .timestamp(60_000_000)
        .fee_nqt(100_000_000)
        .ec_block(1_000_000, 0x0102_0304_0506_0708)
}

/// bytes -> parse -> bytes, and document -> decode -> document.
fn assert_both_roundtrips(tx: &Transaction) {
    let bytes = tx.bytes();
    let parsed = Transaction::parse(&bytes).expect("parse");
    assert_eq!(&parsed, tx);
    assert_eq!(parsed.bytes(), bytes);

    let text = serde_json::to_string(&serde_json::Value::Object(tx.to_document())).unwrap();
    let decoded = Transaction::from_response(&Response::parse(&text).unwrap()).expect("decode");
    assert_eq!(&decoded, tx);
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[test]
fn text_message_attachment_bytes() {
    let msg = ArbitraryMessage::text("hi").unwrap();
    assert_eq!(msg.bytes(), vec![0x01, 0x02, 0x00, 0x00, 0x80, b'h', b'i']);
    assert_eq!(msg.flags(), MESSAGE_FLAG);
}

#[test]
fn message_document_from_api_text() {
    let doc = Response::parse(
        r#"{"version.Message":1,"messageIsText":true,"message":"hi"}"#,
    )
    .unwrap();
    let attachment = messaging::ARBITRARY_MESSAGE
        .load_attachment(&doc)
        .unwrap()
        .unwrap();
    match &attachment {
        Attachment::Message(msg) => {
            assert_eq!(msg.message(), b"hi");
            assert!(msg.is_text());
        }
        other => panic!("unexpected attachment {other:?}"),
    }
}

#[test]
fn registry_lookup() {
    assert_eq!(types::find(1, 0).unwrap().description(), "Arbitrary message");
    assert!(types::find(9, 9).is_none());
    assert_eq!(types::ALL.len(), 38);
}

#[test]
fn message_size_boundary() {
    assert!(ArbitraryMessage::binary(vec![0; 1000]).is_ok());
    assert!(matches!(
        ArbitraryMessage::binary(vec![0; 1001]),
        Err(NxtError::TooLong { .. })
    ));
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[test]
fn every_modelled_type_roundtrips() {
    let txs = vec![
        builder(&messaging::ARBITRARY_MESSAGE)
            .attachment(ArbitraryMessage::binary(vec![1, 2, 3]).unwrap())
            .build()
            .unwrap(),
        builder(&messaging::ALIAS_ASSIGNMENT)
            .attachment(nxt_core::transaction::AliasAssignment::new("nxt", "nxt.org").unwrap())
            .build()
            .unwrap(),
        builder(&messaging::ACCOUNT_INFO)
            .attachment(AccountInfo::new("bob", "").unwrap())
            .build()
            .unwrap(),
        builder(&messaging::ALIAS_SELL)
            .recipient(7)
            .attachment(AliasSell::new("nxt", 0).unwrap())
            .build()
            .unwrap(),
        builder(&messaging::ALIAS_BUY)
            .amount_nqt(300)
            .attachment(nxt_core::transaction::AliasBuy::new("nxt").unwrap())
            .build()
            .unwrap(),
        builder(&account_control::BALANCE_LEASING)
            .recipient(-99)
            .attachment(BalanceLeasing::new(10_000).unwrap())
            .build()
            .unwrap(),
        builder(&monetary_system::CURRENCY_MINTING)
            .attachment(CurrencyMinting::new(123, i64::MIN, 50, 2).unwrap())
            .build()
            .unwrap()
            .signed([0x33; 64]),
    ];
    for tx in &txs {
        assert_both_roundtrips(tx);
    }
}

#[test]
fn message_with_phasing_on_payment() {
    let tx = builder(&types::payment::ORDINARY)
        .recipient(parse_id("18446744073709551615").unwrap())
        .amount_nqt(1)
        .message(ArbitraryMessage::text("invoice 17").unwrap())
        .encrypted_message(EncryptedData::new(vec![0xEE; 64], [0x01; 32], true).unwrap())
        .phasing(Phasing::new(1_000_500, 0, 1))
        .build()
        .unwrap()
        .signed([0x77; 64]);

    assert_eq!(tx.flags() & (MESSAGE_FLAG | PHASING_FLAG), MESSAGE_FLAG | PHASING_FLAG);
    assert_eq!(tx.recipient_id, -1);
    assert_both_roundtrips(&tx);

    let doc = tx.to_document();
    assert_eq!(doc["recipient"], "18446744073709551615");
    assert_eq!(doc["transaction"], id_string(tx.id().unwrap()).as_str());
}

#[test]
fn signing_changes_id_but_not_unsigned_bytes() {
    let unsigned = builder(&types::payment::ORDINARY).build().unwrap();
    let a = unsigned.clone().signed([1; 64]);
    let b = unsigned.clone().signed([2; 64]);
    assert_eq!(a.unsigned_bytes(), b.unsigned_bytes());
    assert_ne!(a.full_hash(), b.full_hash());
    assert_ne!(a.id(), b.id());
}

#[test]
fn api_transaction_document_decodes() {
    let text = format!(
        r#"{{
            "type": 1, "subtype": 6, "version": 1,
            "timestamp": 61234567, "deadline": 60,
            "senderPublicKey": "{key}",
            "recipient": "9223372036854775808",
            "amountNQT": "0", "feeNQT": "100000000",
            "ecBlockHeight": 500000, "ecBlockId": "13455256389043468133",
            "attachment": {{
                "version.AliasSell": 1, "alias": "shop", "priceNQT": "2500000000",
                "version.PublicKeyAnnouncement": 1, "recipientPublicKey": "{key}"
            }}
        }}"#,
        key = "ab".repeat(32)
    );
    let tx = Transaction::from_response(&Response::parse(&text).unwrap()).unwrap();
    assert_eq!(tx.transaction_type().unwrap().description(), "Alias sell");
    assert_eq!(tx.recipient_id, i64::MIN);
    assert!(tx.signature.is_none());
    assert!(tx.public_key_announcement.is_some());
    match &tx.attachment {
        Some(Attachment::AliasSell(sell)) => assert_eq!(sell.price_nqt(), 2_500_000_000),
        other => panic!("unexpected attachment {other:?}"),
    }
    assert_eq!(Transaction::parse(&tx.bytes()).unwrap(), tx);
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[test]
fn account_from_api_text() {
    let rs = to_rs(1_234_567);
    let text = format!(
        r#"{{"account":"1234567","accountRS":"{rs}","balanceNQT":"10",
            "unconfirmedBalanceNQT":"10","effectiveBalanceNXT":50,
            "forgedBalanceNQT":"0"}}"#
    );
    let account = Account::from_response(&Response::parse(&text).unwrap()).unwrap();
    assert_eq!(account.effective_balance_nqt, 5_000_000_000);
    assert_eq!(from_rs(&account.account_rs).unwrap(), account.account_id);
}

#[test]
fn inconsistent_api_documents_are_rejected() {
    let key = "ab".repeat(32);
    let header = |version: u8, tx_type: u8, subtype: u8| {
        format!(
            r#""type": {tx_type}, "subtype": {subtype}, "version": {version},
               "timestamp": 1000, "deadline": 60, "senderPublicKey": "{key}",
               "amountNQT": "0", "feeNQT": "100000000""#
        )
    };
    let documents = [
        format!(r#"{{{}, "attachment": {{"alias": "shop", "uri": "x"}}}}"#, header(1, 1, 1)),
        format!(
            r#"{{{}, "attachment": {{"version.Message": 0, "messageIsText": true, "message": "hi"}}}}"#,
            header(1, 0, 0)
        ),
        format!("{{{}}}", header(16, 0, 0)),
        format!("{{{}}}", header(1, 0, 16)),
    ];
    for text in &documents {
        let doc = Response::parse(text).unwrap();
        assert!(
            matches!(Transaction::from_response(&doc), Err(NxtError::InvalidField { .. })),
            "accepted {text}"
        );
    }
}
