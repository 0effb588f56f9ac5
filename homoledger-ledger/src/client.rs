//! The sender's side of a transfer. Everything here runs with the sender's private key and never
//! touches the ledger.

use crate::error::{LedgerError, Result};
use crate::tx::TxInfo;
use homoledger_he::encoding::{decode_pem_private_key, decode_pem_public_key};
use homoledger_he::wire;
use homoledger_traits::cryptosystems::DecryptionKey;
use homoledger_traits::randomness::{GeneralRng, SecureRng};
use rug::Integer;

/// Encrypts an opening balance under the public key in `pub_pem`.
pub fn init_balance<R: SecureRng>(
    amount: u64,
    pub_pem: &str,
    rng: &mut GeneralRng<R>,
) -> Result<Vec<u8>> {
    let public_key = decode_pem_public_key(pub_pem)?;
    let plaintext = wire::integer_to_bytes(&Integer::from(amount));

    Ok(wire::encrypt(&public_key, &plaintext, rng)?)
}

/// Prepares a transfer of `amount` from A to B. The current balance is decrypted with A's
/// private key and checked locally; the amount is then encrypted once under each party's key.
pub fn prepare_tx_info<R: SecureRng>(
    cipher_balance_a: &[u8],
    amount: u64,
    pub_a: &str,
    pub_b: &str,
    priv_a: &str,
    rng: &mut GeneralRng<R>,
) -> Result<TxInfo> {
    let public_key_a = decode_pem_public_key(pub_a)?;
    let public_key_b = decode_pem_public_key(pub_b)?;
    let secret_key_a = decode_pem_private_key(priv_a)?;
    if *secret_key_a.public_key() != public_key_a {
        return Err(LedgerError::KeyMismatch("sender"));
    }

    let balance = wire::integer_from_bytes(&wire::decrypt(&secret_key_a, cipher_balance_a)?);
    let amount = Integer::from(amount);
    if balance < amount {
        return Err(LedgerError::InsufficientBalance);
    }

    let plaintext = wire::integer_to_bytes(&amount);
    let cipher_tx_a = wire::encrypt(&public_key_a, &plaintext, rng)?;
    let cipher_tx_b = wire::encrypt(&public_key_b, &plaintext, rng)?;

    Ok(TxInfo {
        cipher_balance_a: cipher_balance_a.to_vec(),
        cipher_tx_a,
        cipher_tx_b,
        pub_key_a: pub_a.to_string(),
        pub_key_b: pub_b.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{init_balance, prepare_tx_info};
    use crate::error::LedgerError;
    use homoledger_he::encoding::{gen_pem_private_key, gen_pem_public_key};
    use homoledger_he::wire;
    use homoledger_traits::cryptosystems::DecryptionKey;
    use homoledger_traits::randomness::GeneralRng;
    use rand_core::OsRng;
    use rug::Integer;

    fn toy_pems(rng: &mut GeneralRng<OsRng>) -> (String, String) {
        let secret_key = wire::generate_key(rng, 256).unwrap();
        (
            gen_pem_public_key(secret_key.public_key()),
            gen_pem_private_key(&secret_key),
        )
    }

    fn decrypt(priv_pem: &str, ciphertext: &[u8]) -> Integer {
        let secret_key = homoledger_he::encoding::decode_pem_private_key(priv_pem).unwrap();
        wire::integer_from_bytes(&wire::decrypt(&secret_key, ciphertext).unwrap())
    }

    #[test]
    fn test_init_balance() {
        let mut rng = GeneralRng::new(OsRng);
        let (pub_pem, priv_pem) = toy_pems(&mut rng);

        let balance = init_balance(100, &pub_pem, &mut rng).unwrap();

        assert_eq!(100, decrypt(&priv_pem, &balance));
    }

    #[test]
    fn test_prepare_tx_info() {
        let mut rng = GeneralRng::new(OsRng);
        let (pub_a, priv_a) = toy_pems(&mut rng);
        let (pub_b, priv_b) = toy_pems(&mut rng);
        let balance = init_balance(100, &pub_a, &mut rng).unwrap();

        let tx = prepare_tx_info(&balance, 40, &pub_a, &pub_b, &priv_a, &mut rng).unwrap();

        assert_eq!(balance, tx.cipher_balance_a);
        assert_eq!(40, decrypt(&priv_a, &tx.cipher_tx_a));
        assert_eq!(40, decrypt(&priv_b, &tx.cipher_tx_b));
        assert_eq!(pub_a, tx.pub_key_a);
        assert_eq!(pub_b, tx.pub_key_b);
    }

    #[test]
    fn test_prepare_whole_balance() {
        let mut rng = GeneralRng::new(OsRng);
        let (pub_a, priv_a) = toy_pems(&mut rng);
        let (pub_b, _) = toy_pems(&mut rng);
        let balance = init_balance(100, &pub_a, &mut rng).unwrap();

        assert!(prepare_tx_info(&balance, 100, &pub_a, &pub_b, &priv_a, &mut rng).is_ok());
    }

    #[test]
    fn test_prepare_insufficient_balance() {
        let mut rng = GeneralRng::new(OsRng);
        let (pub_a, priv_a) = toy_pems(&mut rng);
        let (pub_b, _) = toy_pems(&mut rng);
        let balance = init_balance(100, &pub_a, &mut rng).unwrap();

        assert!(matches!(
            prepare_tx_info(&balance, 101, &pub_a, &pub_b, &priv_a, &mut rng),
            Err(LedgerError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_prepare_with_foreign_private_key() {
        let mut rng = GeneralRng::new(OsRng);
        let (pub_a, _) = toy_pems(&mut rng);
        let (pub_b, priv_b) = toy_pems(&mut rng);
        let balance = init_balance(100, &pub_a, &mut rng).unwrap();

        assert!(matches!(
            prepare_tx_info(&balance, 10, &pub_a, &pub_b, &priv_b, &mut rng),
            Err(LedgerError::KeyMismatch(_))
        ));
    }
}
