//! Terminal walkthrough of the Nxt transaction model.
//!
//! Classifies a few `(type, subtype)` pairs, builds an alias transaction
//! with a message appendix, dumps its bytes, parses them back and decodes
//! the same transaction from its API document.
//!
//! Run with:
//!   cargo run --example demo

use std::time::Instant;

use nxt_core::identifier::{id_string, to_rs};
use nxt_core::logging::{init_logging, LogFormat};
use nxt_core::transaction::types::{self, messaging};
use nxt_core::transaction::{
    AliasAssignment, ArbitraryMessage, Transaction, TransactionBuilder,
};
use nxt_core::{NxtError, Response};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]============================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn hex_dump(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        println!("{DIM}  {:04x}  {}{RESET}", row * 16, hex::encode(chunk));
    }
}

fn main() -> Result<(), NxtError> {
    if !init_logging("nxt_core=debug", LogFormat::Pretty) {
        println!("{DIM}  a tracing subscriber is already installed, keeping it{RESET}");
    }

    section(1, "Transaction type registry");
    for (tx_type, subtype) in [(0, 0), (1, 1), (5, 0), (5, 1), (9, 9)] {
        let label = format!("({tx_type}, {subtype})");
        match types::find(tx_type, subtype) {
            Some(t) => info(&label, t.description()),
            None => info(&label, "unknown"),
        }
    }

    section(2, "Build an alias assignment with a message");
    let sender_key = [0x5Au8; 32];
    let tx = TransactionBuilder::new(&messaging::ALIAS_ASSIGNMENT, sender_key)
        .fee_nqt(100_000_000)
        .attachment(AliasAssignment::new("demo", "https://example.org/demo")?)
        .message(ArbitraryMessage::text("first alias")?)
        .build()?
        .signed([0x99; 64]);
    info("flags", &format!("{:#06x}", tx.flags()));
    info("expires", &tx.expiration().to_rfc3339());
    let bytes = tx.bytes();
    info("length", &bytes.len().to_string());
    hex_dump(&bytes);

    section(3, "Identifiers");
    let full_hash = tx.full_hash().map(hex::encode).unwrap_or_default();
    info("full hash", &full_hash);
    if let Some(id) = tx.id() {
        info("id", &id_string(id));
        info("as account", &to_rs(id));
    }

    section(4, "Parse it back");
    let started = Instant::now();
    let parsed = Transaction::parse(&bytes)?;
    let elapsed = started.elapsed();
    assert_eq!(parsed, tx);
    success(&format!("bytes parse to the same transaction in {elapsed:?}"));

    let document = tx.to_document();
    let decoded = Transaction::from_response(&Response::new(document.clone()))?;
    assert_eq!(decoded, tx);
    success("document decodes to the same transaction");
    println!(
        "{DIM}{}{RESET}",
        serde_json::to_string_pretty(&document).unwrap_or_default()
    );
    Ok(())
}
