/// DER encoding of integer sequences.
pub mod der;
/// Textual key envelopes.
pub mod pem;

use crate::cryptosystems::paillier::{PaillierPK, PaillierSK};
use homoledger_traits::cryptosystems::DecryptionKey;
use homoledger_traits::{Error, Result};
use rug::Integer;

const PRIVATE_KEY_VERSION: u32 = 1;
const PUBLIC_KEY_FIELDS: usize = 2;
const PRIVATE_KEY_FIELDS: usize = 6;

/// Serializes a public key as the DER sequence `(n, g)`. The same key always yields the same
/// bytes.
pub fn marshal_public_key(public_key: &PaillierPK) -> Vec<u8> {
    der::encode_integer_sequence(&[public_key.n(), public_key.g()])
}

/// Serializes a private key as the DER sequence `(version, n, g, n^2, l, u)`, with version 1.
pub fn marshal_private_key(secret_key: &PaillierSK) -> Vec<u8> {
    let public_key = secret_key.public_key();
    let version = Integer::from(PRIVATE_KEY_VERSION);

    der::encode_integer_sequence(&[
        &version,
        public_key.n(),
        public_key.g(),
        public_key.n_squared(),
        secret_key.l(),
        secret_key.u(),
    ])
}

fn expect_fields(fields: &[Integer], expected: usize) -> Result<()> {
    if fields.len() != expected {
        return Err(Error::MalformedKey(format!(
            "expected {} fields, found {}",
            expected,
            fields.len()
        )));
    }
    Ok(())
}

fn public_key_with_generator(n: Integer, g: &Integer) -> Result<PaillierPK> {
    let public_key = PaillierPK::new(n)?;
    if public_key.g() != g {
        return Err(Error::MalformedKey("generator is not n + 1".to_string()));
    }
    Ok(public_key)
}

/// Parses a public key produced by [`marshal_public_key`]. The cached $n^2$ is always recomputed
/// from $n$.
pub fn parse_public_key(bytes: &[u8]) -> Result<PaillierPK> {
    let fields = der::decode_integer_sequence(bytes)?;
    expect_fields(&fields, PUBLIC_KEY_FIELDS)?;

    let [n, g]: [Integer; PUBLIC_KEY_FIELDS] = fields
        .try_into()
        .map_err(|_| Error::MalformedKey("field count".to_string()))?;

    public_key_with_generator(n, &g)
}

/// Parses a private key produced by [`marshal_private_key`]. Besides the structure, the fields
/// must be consistent with each other: $g = n + 1$, the stored $n^2$ must match $n$, and
/// $l \cdot u \equiv 1 \pmod n$.
pub fn parse_private_key(bytes: &[u8]) -> Result<PaillierSK> {
    let fields = der::decode_integer_sequence(bytes)?;
    expect_fields(&fields, PRIVATE_KEY_FIELDS)?;

    let [version, n, g, n_squared, l, u]: [Integer; PRIVATE_KEY_FIELDS] = fields
        .try_into()
        .map_err(|_| Error::MalformedKey("field count".to_string()))?;

    if version != PRIVATE_KEY_VERSION {
        return Err(Error::MalformedKey(format!(
            "unsupported private key version {}",
            version
        )));
    }

    let public_key = public_key_with_generator(n, &g)?;
    if *public_key.n_squared() != n_squared {
        return Err(Error::MalformedKey("n^2 does not match n".to_string()));
    }

    PaillierSK::from_parts(public_key, l, u)
}

/// Serializes a public key and wraps it in a `public key` envelope.
pub fn gen_pem_public_key(public_key: &PaillierPK) -> String {
    pem::encode(pem::PUBLIC_KEY_LABEL, &marshal_public_key(public_key))
}

/// Serializes a private key and wraps it in a `private key` envelope.
pub fn gen_pem_private_key(secret_key: &PaillierSK) -> String {
    pem::encode(pem::PRIVATE_KEY_LABEL, &marshal_private_key(secret_key))
}

/// Unwraps a `public key` envelope and parses its contents.
pub fn decode_pem_public_key(text: &str) -> Result<PaillierPK> {
    parse_public_key(&pem::decode(pem::PUBLIC_KEY_LABEL, text)?)
}

/// Unwraps a `private key` envelope and parses its contents.
pub fn decode_pem_private_key(text: &str) -> Result<PaillierSK> {
    parse_private_key(&pem::decode(pem::PRIVATE_KEY_LABEL, text)?)
}
