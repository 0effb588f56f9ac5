//! The byte-level surface of the engine. Plaintexts, ciphertexts and constants travel as
//! big-endian unsigned integers of variable length with leading zero bytes stripped, so zero is
//! the empty byte string. Every function takes its keys as already-decoded values.

use crate::cryptosystems::paillier::{Paillier, PaillierCiphertext, PaillierPK, PaillierSK};
use homoledger_traits::cryptosystems::{AsymmetricCryptosystem, DecryptionKey, EncryptionKey};
use homoledger_traits::homomorphic::HomomorphicAddition;
use homoledger_traits::randomness::{GeneralRng, SecureRng};
use homoledger_traits::{Error, Result};
use rug::integer::Order;
use rug::Integer;

/// Decodes a big-endian unsigned integer.
pub fn integer_from_bytes(bytes: &[u8]) -> Integer {
    Integer::from_digits(bytes, Order::MsfBe)
}

/// Encodes a non-negative integer as big-endian bytes without leading zeros.
pub fn integer_to_bytes(value: &Integer) -> Vec<u8> {
    debug_assert!(*value >= 0);
    value.to_digits::<u8>(Order::MsfBe)
}

fn ciphertext_operand(public_key: &PaillierPK, bytes: &[u8]) -> Result<PaillierCiphertext> {
    let c = integer_from_bytes(bytes);
    if !public_key.contains_ciphertext(&c) {
        return Err(Error::Decode(format!(
            "{}-byte operand is not a ciphertext under this key",
            bytes.len()
        )));
    }

    Ok(PaillierCiphertext { c })
}

/// Generates a private key with a modulus of `bit_size` bits, drawing all randomness from `rng`.
/// `bit_size` must be even. Sizes below 2048 bits carry no security guarantee and are only meant
/// for testing.
pub fn generate_key<R: SecureRng>(rng: &mut GeneralRng<R>, bit_size: u32) -> Result<PaillierSK> {
    let (_, secret_key) = Paillier::with_modulus_size(bit_size).generate_keys(rng)?;
    Ok(secret_key)
}

/// Encrypts a plaintext that must be smaller than the modulus, consuming fresh randomness for the
/// blinding factor on every call.
pub fn encrypt<R: SecureRng>(
    public_key: &PaillierPK,
    plaintext: &[u8],
    rng: &mut GeneralRng<R>,
) -> Result<Vec<u8>> {
    let m = integer_from_bytes(plaintext);
    let ciphertext = public_key.encrypt_raw(&m, rng)?;

    Ok(integer_to_bytes(&ciphertext.c))
}

/// Decrypts a ciphertext that must be smaller than the modulus squared.
pub fn decrypt(secret_key: &PaillierSK, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = PaillierCiphertext {
        c: integer_from_bytes(ciphertext),
    };
    let m = secret_key.decrypt_raw(&ciphertext)?;

    Ok(integer_to_bytes(&m))
}

/// Homomorphically adds two ciphertexts.
pub fn add_cipher(public_key: &PaillierPK, cipher_a: &[u8], cipher_b: &[u8]) -> Result<Vec<u8>> {
    let a = ciphertext_operand(public_key, cipher_a)?;
    let b = ciphertext_operand(public_key, cipher_b)?;

    Ok(integer_to_bytes(&public_key.add(a, b).c))
}

/// Homomorphically subtracts `cipher_b` from `cipher_a`. The result decrypts to the difference
/// modulo $n$, so a negative difference wraps around.
pub fn sub_cipher(public_key: &PaillierPK, cipher_a: &[u8], cipher_b: &[u8]) -> Result<Vec<u8>> {
    let a = ciphertext_operand(public_key, cipher_a)?;
    let b = ciphertext_operand(public_key, cipher_b)?;

    Ok(integer_to_bytes(&public_key.sub(a, b)?.c))
}

/// Homomorphically adds a plaintext constant to a ciphertext.
pub fn add(public_key: &PaillierPK, cipher: &[u8], constant: &[u8]) -> Result<Vec<u8>> {
    let c = ciphertext_operand(public_key, cipher)?;
    let k = integer_from_bytes(constant);

    Ok(integer_to_bytes(&public_key.add_constant(c, &k)?.c))
}

/// Homomorphically multiplies a ciphertext by a plaintext constant.
pub fn mul(public_key: &PaillierPK, cipher: &[u8], constant: &[u8]) -> Result<Vec<u8>> {
    let c = ciphertext_operand(public_key, cipher)?;
    let k = integer_from_bytes(constant);

    Ok(integer_to_bytes(&public_key.mul_constant(c, &k)?.c))
}
