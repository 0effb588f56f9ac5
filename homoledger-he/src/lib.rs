#![warn(missing_docs, unused_imports)]

//! _This is a part of **homoledger**. For more information, head to the
//! [homoledger](https://crates.io/crates/homoledger) crate._
//!
//! The Paillier cryptosystem, the byte-level functions that collaborators call into, and the
//! codec that turns keys into bytes and text.

/// Partially homomorphic cryptosystems with one key.
pub mod cryptosystems;

/// Deterministic binary and textual encodings of keys.
pub mod encoding;

/// Key generation, encryption and homomorphic operations over big-endian byte strings.
pub mod wire;

pub use homoledger_traits;
