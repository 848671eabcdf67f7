// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # nxt-core — Nxt Transaction Model
//!
//! Client-side model of the Nxt ledger's transaction taxonomy and wire
//! encoding. Given a `(type, subtype)` pair and either caller parameters or a
//! parsed API document, the crate resolves the transaction type, builds the
//! typed attachment and produces (or consumes) the exact little-endian byte
//! layout the ledger expects.
//!
//! Transport, signing and storage live elsewhere: callers hand in parsed
//! JSON documents and take away byte buffers.
//!
//! ## Architecture
//!
//! - **response**: typed field access over API documents.
//! - **transaction**: type registry, attachments, appendices, assembler.
//! - **identifier**: unsigned ids and Reed-Solomon account strings.
//! - **account**: account and asset balance snapshots.
//! - **codec**: little-endian wire primitives.
//! - **config**: protocol constants and limits.
//! - **logging**: optional `tracing` subscriber bootstrap.
//!
//! ```
//! use nxt_core::transaction::{types::messaging, ArbitraryMessage, Transaction, TransactionBuilder};
//!
//! let tx = TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, [1u8; 32])
//!     .timestamp(1_000)
//!     .attachment(ArbitraryMessage::text("hello").unwrap())
//!     .build()
//!     .unwrap();
//! assert_eq!(Transaction::parse(&tx.bytes()).unwrap(), tx);
//! ```

pub mod account;
pub(crate) mod codec;
pub mod config;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod response;
pub mod transaction;

pub use account::{Account, AssetBalance};
pub use error::NxtError;
pub use response::Response;
