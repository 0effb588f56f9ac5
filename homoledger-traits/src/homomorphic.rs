use std::ops::{Add, Mul, Sub};

use crate::cryptosystems::{Associable, AssociatedCiphertext, EncryptionKey};
use crate::error::Result;

/// Additively homomorphic operations. Only the public key is needed for any of them, which lets an
/// untrusted party combine ciphertexts without learning the plaintexts.
pub trait HomomorphicAddition: EncryptionKey {
    /// Combines two ciphertexts so that the result decrypts to the sum of both plaintexts.
    fn add(&self, ciphertext_a: Self::Ciphertext, ciphertext_b: Self::Ciphertext) -> Self::Ciphertext;

    /// Combines two ciphertexts so that the result decrypts to the difference of both plaintexts.
    fn sub(
        &self,
        ciphertext_a: Self::Ciphertext,
        ciphertext_b: Self::Ciphertext,
    ) -> Result<Self::Ciphertext>;

    /// Adds a plaintext constant to the encrypted value.
    fn add_constant(
        &self,
        ciphertext: Self::Ciphertext,
        input: &Self::Input,
    ) -> Result<Self::Ciphertext>;

    /// Multiplies the encrypted value by a plaintext constant.
    fn mul_constant(
        &self,
        ciphertext: Self::Ciphertext,
        input: &Self::Input,
    ) -> Result<Self::Ciphertext>;
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition> Add
    for AssociatedCiphertext<'pk, C, PK>
{
    type Output = AssociatedCiphertext<'pk, C, PK>;

    fn add(self, rhs: Self) -> Self::Output {
        self.public_key
            .add(self.ciphertext, rhs.ciphertext)
            .associate(self.public_key)
    }
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition> Sub
    for AssociatedCiphertext<'pk, C, PK>
{
    type Output = Result<AssociatedCiphertext<'pk, C, PK>>;

    fn sub(self, rhs: Self) -> Self::Output {
        Ok(self
            .public_key
            .sub(self.ciphertext, rhs.ciphertext)?
            .associate(self.public_key))
    }
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition> Mul<PK::Input>
    for AssociatedCiphertext<'pk, C, PK>
{
    type Output = Result<AssociatedCiphertext<'pk, C, PK>>;

    fn mul(self, rhs: PK::Input) -> Self::Output {
        Ok(self
            .public_key
            .mul_constant(self.ciphertext, &rhs)?
            .associate(self.public_key))
    }
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition>
    AssociatedCiphertext<'pk, C, PK>
{
    /// Adds a plaintext constant to the encrypted value.
    pub fn add_constant(self, rhs: &PK::Input) -> Result<AssociatedCiphertext<'pk, C, PK>> {
        Ok(self
            .public_key
            .add_constant(self.ciphertext, rhs)?
            .associate(self.public_key))
    }
}
