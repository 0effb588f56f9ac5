#![warn(missing_docs, unused_imports)]

//! _This is a part of **homoledger**. For more information, head to the
//! [homoledger](https://crates.io/crates/homoledger) crate._
//!
//! Number theoretic building blocks for Paillier key generation and encryption. Prime search is
//! the only unbounded step of the engine, so every search here runs under a candidate budget and
//! reports exhaustion as [`Error::KeyGeneration`] instead of looping forever.

use homoledger_traits::randomness::{GeneralRng, SecureRng};
use homoledger_traits::{Error, Result};
use rug::integer::IsPrime;
use rug::Integer;

const REPS: u32 = 25;

/// Smallest modulus size accepted by [`gen_rsa_modulus`]. Anything this small is only useful for
/// tests.
pub const MIN_MODULUS_BITS: u32 = 16;

/// Number of candidates a single prime search may draw before giving up.
pub fn prime_search_budget(bit_length: u32) -> u32 {
    bit_length.saturating_mul(100).max(1_000)
}

/// Generates a uniformly random prime number of a given bit length. The two most significant bits
/// and the least significant bit of every candidate are set, so the product of two such primes
/// always has exactly `2 * bit_length` bits.
pub fn gen_prime<R: SecureRng>(bit_length: u32, rng: &mut GeneralRng<R>) -> Result<Integer> {
    gen_prime_except(bit_length, None, rng)
}

fn gen_prime_except<R: SecureRng>(
    bit_length: u32,
    excluded: Option<&Integer>,
    rng: &mut GeneralRng<R>,
) -> Result<Integer> {
    if bit_length < 2 {
        return Err(Error::KeyGeneration(format!(
            "cannot generate a prime of {} bits",
            bit_length
        )));
    }

    let set_bits = (Integer::from(0b11) << (bit_length - 2)) | Integer::from(1);
    let budget = prime_search_budget(bit_length);

    for _ in 0..budget {
        let mut candidate = Integer::from(Integer::random_bits(bit_length, &mut rng.rug_rng()));
        candidate |= &set_bits;

        if excluded == Some(&candidate) {
            continue;
        }

        if candidate.is_probably_prime(REPS) != IsPrime::No {
            return Ok(candidate);
        }
    }

    Err(Error::KeyGeneration(format!(
        "no {}-bit prime found after {} candidates",
        bit_length, budget
    )))
}

/// Generates a uniformly random RSA modulus $n = pq$, where $p$ and $q$ are distinct primes of
/// `bit_length / 2` bits each. This method returns both the modulus and
/// $\varphi(n) = (p - 1)(q - 1)$.
///
/// `bit_length` must be even and at least [`MIN_MODULUS_BITS`]. Small moduli carry no security
/// guarantee at all; use at least 2048 bits outside of tests.
pub fn gen_rsa_modulus<R: SecureRng>(
    bit_length: u32,
    rng: &mut GeneralRng<R>,
) -> Result<(Integer, Integer)> {
    if bit_length % 2 != 0 {
        return Err(Error::KeyGeneration(format!(
            "modulus size must be even, got {} bits",
            bit_length
        )));
    }
    if bit_length < MIN_MODULUS_BITS {
        return Err(Error::KeyGeneration(format!(
            "modulus size must be at least {} bits, got {}",
            MIN_MODULUS_BITS, bit_length
        )));
    }

    let p = gen_prime(bit_length / 2, rng)?;
    let q = gen_prime_except(bit_length / 2, Some(&p), rng)?;

    let n = Integer::from(&p * &q);
    let phi = (p - Integer::from(1)) * (q - Integer::from(1));

    Ok((n, phi))
}

/// Generates a uniformly random coprime $x$ to the `other` integer $y$, with $0 < x < y$. This
/// means that $\gcd(x, y) = 1$. `other` must be at least 2.
///
/// Rejection sampling: for an RSA modulus a non-coprime draw reveals a factor, so in practice the
/// first candidate is accepted.
pub fn gen_coprime<R: SecureRng>(other: &Integer, rng: &mut GeneralRng<R>) -> Integer {
    debug_assert!(*other > 1);

    loop {
        let candidate = Integer::from(other.random_below_ref(&mut rng.rug_rng()));

        if Integer::from(candidate.gcd_ref(other)) == 1 {
            return candidate;
        }
    }
}
