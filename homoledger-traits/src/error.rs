/// Everything that can go wrong inside the cryptographic engine. Every public operation returns
/// either its result or one of these kinds; no operation panics on bad input.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Prime search ran out of candidates, the key size is unusable, or the modular inverse of
    /// `L` modulo `N` did not exist.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// The plaintext is not strictly smaller than the public modulus `N`.
    #[error("message too long for Paillier public key size")]
    MessageTooLong,

    /// The ciphertext is not strictly smaller than `N²`.
    #[error("ciphertext is out of range for Paillier public key size")]
    CiphertextRange,

    /// A value that must be inverted has no inverse modulo `N²`.
    #[error("value is not invertible modulo n^2")]
    NotInvertible,

    /// The structured key encoding or its textual envelope is invalid.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// Bytes remain after a complete key encoding.
    #[error("trailing data after key encoding")]
    TrailingData,

    /// An operand could not be decoded from its byte encoding.
    #[error("could not decode operand: {0}")]
    Decode(String),
}

/// Shorthand for results carrying an engine [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
