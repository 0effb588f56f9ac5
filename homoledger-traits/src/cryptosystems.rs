use crate::error::Result;
use crate::randomness::GeneralRng;
use crate::randomness::SecureRng;
use crate::security::BitsOfSecurity;
use std::fmt::Debug;

/// An asymmetric cryptosystem is a system of methods to encrypt plaintexts into ciphertexts, and
/// decrypt those ciphertexts back into plaintexts. Anyone who has access to the public key can
/// perform encryptions, but only those with the secret key can decrypt.
///
/// The struct that implements an `AsymmetricCryptosystem` will hold the general parameters of that
/// cryptosystem. Depending on the cryptosystem, those parameters could play an important role in
/// deciding the level of security. As such, each cryptosystem should clearly indicate these.
pub trait AsymmetricCryptosystem {
    /// The public key, used for encrypting plaintexts.
    type PublicKey: EncryptionKey;
    /// The secret key, used for decrypting ciphertexts.
    type SecretKey: DecryptionKey<Self::PublicKey>;

    /// Sets up an instance of this cryptosystem with parameters satisfying the security parameter.
    fn setup(security_parameter: &BitsOfSecurity) -> Self;

    /// Generate a public and private key pair using a cryptographic RNG. The level of security is
    /// determined by the parameters chosen in `setup`.
    fn generate_keys<R: SecureRng>(
        &self,
        rng: &mut GeneralRng<R>,
    ) -> Result<(Self::PublicKey, Self::SecretKey)>;
}

/// The encryption key.
pub trait EncryptionKey: Sized + Debug + PartialEq {
    /// Constants that can be combined with ciphertexts, e.g. for scalar multiplication.
    type Input;
    /// The type of the plaintexts to be encrypted.
    type Plaintext;
    /// The type of the encrypted plaintexts.
    type Ciphertext: Associable<Self>;

    /// Encrypt the plaintext using the public key and a cryptographic RNG and immediately associate it with the public key.
    fn encrypt<'pk, R: SecureRng>(
        &'pk self,
        plaintext: &Self::Plaintext,
        rng: &mut GeneralRng<R>,
    ) -> Result<AssociatedCiphertext<'pk, Self::Ciphertext, Self>> {
        Ok(self.encrypt_raw(plaintext, rng)?.associate(self))
    }

    /// Encrypt the plaintext using the public key and a cryptographic RNG.
    fn encrypt_raw<R: SecureRng>(
        &self,
        plaintext: &Self::Plaintext,
        rng: &mut GeneralRng<R>,
    ) -> Result<Self::Ciphertext>;
}

/// The decryption key.
pub trait DecryptionKey<PK: EncryptionKey> {
    /// The public key that belongs to this decryption key.
    fn public_key(&self) -> &PK;

    /// Decrypt the associated ciphertext using the secret key. The associated public key is not
    /// compared to this key; a ciphertext under another key decrypts to a meaningless plaintext or
    /// fails like any other out-of-range ciphertext.
    fn decrypt(
        &self,
        ciphertext: &AssociatedCiphertext<'_, PK::Ciphertext, PK>,
    ) -> Result<PK::Plaintext> {
        self.decrypt_raw(&ciphertext.ciphertext)
    }

    /// Decrypt the ciphertext using the secret key.
    fn decrypt_raw(&self, ciphertext: &PK::Ciphertext) -> Result<PK::Plaintext>;
}

/// A ciphertext together with the public key it was encrypted under. Homomorphic operators are
/// defined on associated ciphertexts, so that the public key does not have to be passed around.
#[derive(PartialEq, Debug, Clone)]
pub struct AssociatedCiphertext<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C>> {
    /// The raw ciphertext
    pub ciphertext: C,
    /// The public key it belongs to
    pub public_key: &'pk PK,
}

/// Functionality to easily turn a ciphertext into an associated ciphertext
pub trait Associable<PK: EncryptionKey<Ciphertext = Self>>: Sized {
    /// 'Enriches' a ciphertext by associating it with a corresponding public key. This allows to overload operators for homomorphic operations.
    fn associate(self, public_key: &PK) -> AssociatedCiphertext<'_, Self, PK> {
        AssociatedCiphertext {
            ciphertext: self,
            public_key,
        }
    }
}
