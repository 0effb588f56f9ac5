use homoledger_numbertheory::{gen_coprime, gen_rsa_modulus};
use homoledger_traits::cryptosystems::{
    Associable, AsymmetricCryptosystem, DecryptionKey, EncryptionKey,
};
use homoledger_traits::homomorphic::HomomorphicAddition;
use homoledger_traits::randomness::GeneralRng;
use homoledger_traits::randomness::SecureRng;
use homoledger_traits::security::BitsOfSecurity;
use homoledger_traits::{Error, Result};
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The Paillier cryptosystem.
#[derive(Copy, Clone, Debug)]
pub struct Paillier {
    modulus_size: u32,
}

impl Paillier {
    /// Sets up the cryptosystem with an explicit modulus size in bits. The size must be even;
    /// anything below 2048 bits is only suitable for testing.
    pub fn with_modulus_size(modulus_size: u32) -> Self {
        Paillier { modulus_size }
    }

    /// The size of the moduli this instance generates, in bits.
    pub fn modulus_size(&self) -> u32 {
        self.modulus_size
    }
}

/// Public key for the Paillier cryptosystem. The generator is always $g = n + 1$ and $n^2$ is
/// cached, so both are derived from $n$ on construction and can never disagree with it.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct PaillierPK {
    n: Integer,
    g: Integer,
    n_squared: Integer,
}

impl PaillierPK {
    /// Creates a public key from its modulus. The modulus must be odd and larger than 1.
    pub fn new(n: Integer) -> Result<Self> {
        if n <= 1 || n.is_even() {
            return Err(Error::MalformedKey(
                "modulus must be an odd integer larger than 1".to_string(),
            ));
        }

        let g = Integer::from(&n + 1);
        let n_squared = Integer::from(n.square_ref());

        Ok(PaillierPK { n, g, n_squared })
    }

    /// Public modulus n for encryption
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// Public generator g for encryption
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// The ciphertext modulus n^2
    pub fn n_squared(&self) -> &Integer {
        &self.n_squared
    }

    /// Returns true when `value` lies in the ciphertext space $[0, n^2)$.
    pub fn contains_ciphertext(&self, value: &Integer) -> bool {
        *value >= 0 && *value < self.n_squared
    }

    fn reduce(&self, value: Integer) -> Integer {
        value.div_rem_euc(self.n_squared.clone()).1
    }

    fn pow_mod(&self, base: &Integer, exponent: &Integer) -> Result<Integer> {
        base.pow_mod_ref(exponent, &self.n_squared)
            .map(Integer::from)
            .ok_or(Error::NotInvertible)
    }
}

/// Decryption key for the Paillier cryptosystem. Holds $L = \varphi(n) = (p-1)(q-1)$ and
/// $U = L^{-1} \bmod n$ next to the public key it belongs to.
#[derive(PartialEq, Eq, Clone)]
pub struct PaillierSK {
    public_key: PaillierPK,
    l: Integer,
    u: Integer,
}

impl PaillierSK {
    /// Reassembles a decryption key from its parts. Fails unless $0 < U < n$ and
    /// $L \cdot U \equiv 1 \pmod n$.
    pub fn from_parts(public_key: PaillierPK, l: Integer, u: Integer) -> Result<Self> {
        if l <= 0 || u <= 0 || u >= public_key.n {
            return Err(Error::MalformedKey(
                "private exponents are out of range".to_string(),
            ));
        }

        let check = Integer::from(&l * &u) % &public_key.n;
        if check != 1 {
            return Err(Error::MalformedKey(
                "u is not the inverse of l modulo n".to_string(),
            ));
        }

        Ok(PaillierSK { public_key, l, u })
    }

    /// $L = (p-1)(q-1)$
    pub fn l(&self) -> &Integer {
        &self.l
    }

    /// $U = L^{-1} \bmod n$
    pub fn u(&self) -> &Integer {
        &self.u
    }
}

impl fmt::Debug for PaillierSK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierSK")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Ciphertext of the Paillier cryptosystem, which is additively homomorphic.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct PaillierCiphertext {
    /// Encrypted message (Ciphertext)
    pub c: Integer,
}

impl Associable<PaillierPK> for PaillierCiphertext {}

impl AsymmetricCryptosystem for Paillier {
    type PublicKey = PaillierPK;
    type SecretKey = PaillierSK;

    fn setup(security_param: &BitsOfSecurity) -> Self {
        Paillier {
            modulus_size: security_param.to_public_key_bit_length(),
        }
    }

    /// Generates a fresh Paillier keypair.
    /// ```
    /// # use homoledger_traits::randomness::GeneralRng;
    /// # use homoledger_he::cryptosystems::paillier::Paillier;
    /// # use homoledger_traits::security::BitsOfSecurity;
    /// # use homoledger_traits::cryptosystems::AsymmetricCryptosystem;
    /// # use rand_core::OsRng;
    /// let mut rng = GeneralRng::new(OsRng);
    /// let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// ```
    fn generate_keys<R: SecureRng>(
        &self,
        rng: &mut GeneralRng<R>,
    ) -> Result<(PaillierPK, PaillierSK)> {
        let (n, l) = gen_rsa_modulus(self.modulus_size, rng)?;

        let u = Integer::from(l.invert_ref(&n).ok_or_else(|| {
            Error::KeyGeneration("(p-1)(q-1) has no inverse modulo n".to_string())
        })?);
        let public_key = PaillierPK::new(n)?;

        Ok((
            public_key.clone(),
            PaillierSK {
                public_key,
                l,
                u,
            },
        ))
    }
}

impl EncryptionKey for PaillierPK {
    type Input = Integer;
    type Plaintext = Integer;
    type Ciphertext = PaillierCiphertext;

    /// Encrypts a plaintext integer in $[0, n)$ using the Paillier public key. The blinding
    /// factor $r$ is sampled uniformly from $[0, n)$, rejecting draws that are not coprime to $n$.
    /// ```
    /// # use homoledger_traits::randomness::GeneralRng;
    /// # use homoledger_he::cryptosystems::paillier::Paillier;
    /// # use homoledger_traits::security::BitsOfSecurity;
    /// # use homoledger_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// let ciphertext = public_key.encrypt(&Integer::from(5), &mut rng).unwrap();
    /// ```
    fn encrypt_raw<R: SecureRng>(
        &self,
        plaintext: &Integer,
        rng: &mut GeneralRng<R>,
    ) -> Result<PaillierCiphertext> {
        if *plaintext < 0 || *plaintext >= self.n {
            return Err(Error::MessageTooLong);
        }

        let r = gen_coprime(&self.n, rng);

        let first = self.pow_mod(&self.g, plaintext)?;
        let second = r.secure_pow_mod(&self.n, &self.n_squared);

        Ok(PaillierCiphertext {
            c: self.reduce(first * second),
        })
    }
}

impl DecryptionKey<PaillierPK> for PaillierSK {
    fn public_key(&self) -> &PaillierPK {
        &self.public_key
    }

    /// Decrypts a rich Paillier ciphertext using the secret key.
    /// ```
    /// # use homoledger_traits::randomness::GeneralRng;
    /// # use homoledger_he::cryptosystems::paillier::Paillier;
    /// # use homoledger_traits::security::BitsOfSecurity;
    /// # use homoledger_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey, DecryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// # let ciphertext = public_key.encrypt(&Integer::from(5), &mut rng).unwrap();
    /// println!("The decrypted message is {}", secret_key.decrypt(&ciphertext).unwrap());
    /// // Prints: "The decrypted message is 5".
    /// ```
    ///
    /// The division $(a - 1) / n$ rounds down without checking that $n$ divides $a - 1$. For a
    /// ciphertext that did not come out of encryption this yields a meaningless plaintext rather
    /// than an error; telling the two apart is up to the caller.
    fn decrypt_raw(&self, ciphertext: &PaillierCiphertext) -> Result<Integer> {
        let public_key = &self.public_key;
        if !public_key.contains_ciphertext(&ciphertext.c) {
            return Err(Error::CiphertextRange);
        }

        let mut inner = Integer::from(
            ciphertext
                .c
                .secure_pow_mod_ref(&self.l, &public_key.n_squared),
        );
        inner -= 1;
        let (quotient, _) = inner.div_rem_floor(public_key.n.clone());

        let (_, plaintext) = (quotient * &self.u).div_rem_euc(public_key.n.clone());
        Ok(plaintext)
    }
}

impl HomomorphicAddition for PaillierPK {
    fn add(
        &self,
        ciphertext_a: PaillierCiphertext,
        ciphertext_b: PaillierCiphertext,
    ) -> PaillierCiphertext {
        PaillierCiphertext {
            c: self.reduce(ciphertext_a.c * ciphertext_b.c),
        }
    }

    fn sub(
        &self,
        ciphertext_a: PaillierCiphertext,
        ciphertext_b: PaillierCiphertext,
    ) -> Result<PaillierCiphertext> {
        let inverse = Integer::from(
            ciphertext_b
                .c
                .invert_ref(&self.n_squared)
                .ok_or(Error::NotInvertible)?,
        );

        Ok(PaillierCiphertext {
            c: self.reduce(ciphertext_a.c * inverse),
        })
    }

    fn add_constant(
        &self,
        ciphertext: PaillierCiphertext,
        input: &Integer,
    ) -> Result<PaillierCiphertext> {
        let shift = self.pow_mod(&self.g, input)?;

        Ok(PaillierCiphertext {
            c: self.reduce(ciphertext.c * shift),
        })
    }

    /// Raises the ciphertext to `input`. A negative constant goes through the inverse of the
    /// ciphertext, which fails with [`Error::NotInvertible`] if there is none.
    fn mul_constant(
        &self,
        ciphertext: PaillierCiphertext,
        input: &Integer,
    ) -> Result<PaillierCiphertext> {
        Ok(PaillierCiphertext {
            c: self.pow_mod(&ciphertext.c, input)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cryptosystems::paillier::{Paillier, PaillierCiphertext, PaillierPK, PaillierSK};
    use homoledger_traits::cryptosystems::{
        Associable, AsymmetricCryptosystem, DecryptionKey, EncryptionKey,
    };
    use homoledger_traits::homomorphic::HomomorphicAddition;
    use homoledger_traits::randomness::GeneralRng;
    use homoledger_traits::security::BitsOfSecurity;
    use homoledger_traits::Error;
    use rand_core::OsRng;
    use rug::Integer;

    fn toy_keys() -> (PaillierPK, PaillierSK) {
        let mut rng = GeneralRng::new(OsRng);
        let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
        paillier.generate_keys(&mut rng).unwrap()
    }

    #[test]
    fn test_generate_keys_shape() {
        let (pk, sk) = toy_keys();

        assert_eq!(256, pk.n().significant_bits());
        assert_eq!(Integer::from(pk.n() + 1), *pk.g());
        assert_eq!(Integer::from(pk.n().square_ref()), *pk.n_squared());
        assert_eq!(Integer::from(1), Integer::from(sk.l() * sk.u()) % pk.n());
        assert_eq!(&pk, sk.public_key());
    }

    #[test]
    fn test_encrypt_decrypt() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt(&Integer::from(15), &mut rng).unwrap();

        assert_eq!(15, sk.decrypt(&ciphertext).unwrap());
    }

    #[test]
    fn test_encrypt_decrypt_zero() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt(&Integer::from(0), &mut rng).unwrap();

        assert_eq!(0, sk.decrypt(&ciphertext).unwrap());
    }

    #[test]
    fn test_encrypt_negative() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, _) = toy_keys();

        assert_eq!(
            Err(Error::MessageTooLong),
            pk.encrypt_raw(&Integer::from(-1), &mut rng)
        );
    }

    #[test]
    fn test_encryption_is_probabilistic() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext_a = pk.encrypt_raw(&Integer::from(42), &mut rng).unwrap();
        let ciphertext_b = pk.encrypt_raw(&Integer::from(42), &mut rng).unwrap();

        assert_ne!(ciphertext_a, ciphertext_b);
        assert_eq!(42, sk.decrypt_raw(&ciphertext_a).unwrap());
        assert_eq!(42, sk.decrypt_raw(&ciphertext_b).unwrap());
    }

    #[test]
    fn test_homomorphic_add() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext_a = pk.encrypt(&Integer::from(7), &mut rng).unwrap();
        let ciphertext_b = pk.encrypt(&Integer::from(7), &mut rng).unwrap();
        let ciphertext_twice = ciphertext_a + ciphertext_b;

        assert_eq!(Integer::from(14), sk.decrypt(&ciphertext_twice).unwrap());
    }

    #[test]
    fn test_homomorphic_sub() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext_a = pk.encrypt(&Integer::from(20), &mut rng).unwrap();
        let ciphertext_b = pk.encrypt(&Integer::from(15), &mut rng).unwrap();
        let difference = (ciphertext_a - ciphertext_b).unwrap();

        assert_eq!(Integer::from(5), sk.decrypt(&difference).unwrap());
    }

    #[test]
    fn test_homomorphic_sub_wraps_modulo_n() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext_a = pk.encrypt(&Integer::from(15), &mut rng).unwrap();
        let ciphertext_b = pk.encrypt(&Integer::from(20), &mut rng).unwrap();
        let difference = (ciphertext_a - ciphertext_b).unwrap();

        assert_eq!(Integer::from(pk.n() - 5), sk.decrypt(&difference).unwrap());
    }

    #[test]
    fn test_homomorphic_sub_not_invertible() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, _) = toy_keys();

        let ciphertext = pk.encrypt_raw(&Integer::from(1), &mut rng).unwrap();
        let zero = PaillierCiphertext { c: Integer::new() };

        assert_eq!(Err(Error::NotInvertible), pk.sub(ciphertext, zero));
    }

    #[test]
    fn test_homomorphic_add_constant() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt(&Integer::from(15), &mut rng).unwrap();
        let shifted = ciphertext.add_constant(&Integer::from(10)).unwrap();

        assert_eq!(25, sk.decrypt(&shifted).unwrap());
    }

    #[test]
    fn test_homomorphic_scalar_mul() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt(&Integer::from(9), &mut rng).unwrap();
        let ciphertext_twice = (ciphertext * Integer::from(16)).unwrap();

        assert_eq!(144, sk.decrypt(&ciphertext_twice).unwrap());
    }

    #[test]
    fn test_homomorphic_scalar_mul_negative() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt_raw(&Integer::from(3), &mut rng).unwrap();
        let negated = pk.mul_constant(ciphertext, &Integer::from(-1)).unwrap();

        assert_eq!(
            Integer::from(pk.n() - 3),
            sk.decrypt(&negated.associate(&pk)).unwrap()
        );
    }

    #[test]
    fn test_mixing_keys_does_not_panic() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk_a, sk_a) = toy_keys();
        let (pk_b, _) = toy_keys();

        let ciphertext_a = pk_a.encrypt(&Integer::from(3), &mut rng).unwrap();
        let ciphertext_b = pk_b.encrypt(&Integer::from(4), &mut rng).unwrap();

        match sk_a.decrypt(&ciphertext_b) {
            Ok(plaintext) => assert!(plaintext < *pk_a.n()),
            Err(e) => assert_eq!(Error::CiphertextRange, e),
        }

        // The sum is reduced under the left-hand key, so it stays decryptable there
        let mixed = ciphertext_a + ciphertext_b;
        assert!(sk_a.decrypt(&mixed).unwrap() < *pk_a.n());
    }

    #[test]
    fn test_decrypt_out_of_range() {
        let (pk, sk) = toy_keys();
        let ciphertext = PaillierCiphertext {
            c: pk.n_squared().clone(),
        };

        assert_eq!(Err(Error::CiphertextRange), sk.decrypt_raw(&ciphertext));
    }

    #[test]
    fn test_public_key_rejects_even_modulus() {
        assert!(matches!(
            PaillierPK::new(Integer::from(10)),
            Err(Error::MalformedKey(_))
        ));
        assert!(matches!(
            PaillierPK::new(Integer::from(1)),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn test_secret_key_rejects_wrong_inverse() {
        let (pk, sk) = toy_keys();
        let wrong_u = Integer::from(sk.u() + 1);

        assert!(matches!(
            PaillierSK::from_parts(pk, sk.l().clone(), wrong_u),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let (_, sk) = toy_keys();
        let debug = format!("{:?}", sk);

        assert!(!debug.contains(&sk.u().to_string()));
        assert!(!debug.contains(&sk.l().to_string()));
    }

    #[test]
    fn test_ciphertext_serde() {
        let mut rng = GeneralRng::new(OsRng);
        let (pk, sk) = toy_keys();

        let ciphertext = pk.encrypt_raw(&Integer::from(77), &mut rng).unwrap();
        let serialized = bincode::serialize(&ciphertext).unwrap();
        let deserialized: PaillierCiphertext = bincode::deserialize(&serialized).unwrap();

        assert_eq!(77, sk.decrypt_raw(&deserialized).unwrap());
    }
}
