#![warn(missing_docs, unused_imports)]

//! _This is a part of **homoledger**. For more information, head to the
//! [homoledger](https://crates.io/crates/homoledger) crate._
//!
//! Encrypted account balances and confidential transfers between them. A sender prepares a
//! [`TxInfo`] with its private key, and the [`Ledger`] validates and applies it without
//! decrypting anything.

/// Errors of the ledger and its transfer flow.
pub mod error;

/// Transfer payloads.
pub mod tx;

/// Preparation of transfers on the sender's side.
pub mod client;

/// Validation of transfers against on-ledger state.
pub mod validate;

/// The in-memory account store.
pub mod ledger;

pub use error::{LedgerError, Result};
pub use ledger::{address_of, CipherAccount, Ledger};
pub use tx::TxInfo;
