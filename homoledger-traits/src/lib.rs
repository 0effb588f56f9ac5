#![warn(missing_docs, unused_imports)]

//! _This is a part of **homoledger**. For more information, head to the
//! [homoledger](https://crates.io/crates/homoledger) crate._
//!
//! General traits for additively homomorphic cryptosystems, the random number generator adapter
//! that all homoledger crates share, and the error taxonomy of the cryptographic engine.

/// Random number generation that is consistent with the dependencies' requirements.
pub mod randomness;

/// Concepts expressing the security level of a given cryptosystem.
pub mod security;

/// General notion of a cryptosystem
pub mod cryptosystems;

/// Homomorphic operations on ciphertexts, including operator overloading.
pub mod homomorphic;

/// Errors returned by the cryptographic engine.
pub mod error;

pub use error::{Error, Result};
