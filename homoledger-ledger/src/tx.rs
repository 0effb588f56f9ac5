use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The payload a sender prepares and the ledger validates. Ciphertexts are carried as base64 in
/// JSON, keys as their textual envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    /// The sender's balance as the sender saw it when preparing the transfer.
    #[serde(with = "base64_bytes")]
    pub cipher_balance_a: Vec<u8>,
    /// The amount encrypted under the sender's key.
    #[serde(with = "base64_bytes")]
    pub cipher_tx_a: Vec<u8>,
    /// The amount encrypted under the receiver's key.
    #[serde(with = "base64_bytes")]
    pub cipher_tx_b: Vec<u8>,
    /// The sender's public key.
    pub pub_key_a: String,
    /// The receiver's public key.
    pub pub_key_b: String,
}

impl TxInfo {
    /// Serializes the payload for submission.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a submitted payload.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: AsRef<[u8]>, S: Serializer>(
        bytes: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(text)
            .map_err(serde::de::Error::custom)
    }
}
