use crate::error::{LedgerError, Result};
use crate::tx::{base64_bytes, TxInfo};
use crate::validate::validate_tx_info;
use homoledger_he::cryptosystems::paillier::PaillierPK;
use homoledger_he::encoding::decode_pem_public_key;
use homoledger_he::wire;
use homoledger_traits::Error;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// An account as stored on the ledger: an encrypted balance and the key it is encrypted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherAccount {
    /// The encrypted balance.
    #[serde(with = "base64_bytes")]
    pub balance: Vec<u8>,
    /// The owner's public key in its textual envelope.
    pub public_key: String,
}

impl CipherAccount {
    /// Decodes the owner's public key.
    pub fn decode_public_key(&self) -> Result<PaillierPK> {
        Ok(decode_pem_public_key(&self.public_key)?)
    }
}

/// Derives the address of an account from the textual envelope of its public key, as the
/// hex-encoded SHA-256 digest of that text.
pub fn address_of(pub_pem: &str) -> String {
    hex::encode(Sha256::digest(pub_pem.as_bytes()))
}

/// An in-memory store of encrypted balances. The ledger never sees a plaintext amount or a
/// private key.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<String, CipherAccount>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an account for `pub_pem` holding `cipher_balance`, and returns its address.
    pub fn register(&mut self, pub_pem: &str, cipher_balance: Vec<u8>) -> Result<String> {
        let address = address_of(pub_pem);
        if self.accounts.contains_key(&address) {
            warn!("address {} is already registered", address);
            return Err(LedgerError::AlreadyRegistered(address));
        }

        let public_key = decode_pem_public_key(pub_pem)?;
        if !public_key.contains_ciphertext(&wire::integer_from_bytes(&cipher_balance)) {
            return Err(Error::Decode(
                "opening balance is not a ciphertext under this key".to_string(),
            )
            .into());
        }

        debug!(
            "registering {} with a {}-byte balance",
            address,
            cipher_balance.len()
        );
        self.accounts.insert(
            address.clone(),
            CipherAccount {
                balance: cipher_balance,
                public_key: pub_pem.to_string(),
            },
        );

        Ok(address)
    }

    /// Looks up the account at `address`.
    pub fn query_balance(&self, address: &str) -> Result<&CipherAccount> {
        self.accounts
            .get(address)
            .ok_or_else(|| LedgerError::UnknownAddress(address.to_string()))
    }

    /// Applies a transfer prepared with [`crate::client::prepare_tx_info`]. Both balances are
    /// updated, or neither is.
    pub fn transfer(&mut self, address_a: &str, address_b: &str, tx_json: &str) -> Result<()> {
        if address_a == address_b {
            warn!("rejecting transfer from {} to itself", address_a);
            return Err(LedgerError::SelfTransfer(address_a.to_string()));
        }

        debug!("read sender {}", address_a);
        let sender = self.query_balance(address_a)?;
        debug!("read receiver {}", address_b);
        let receiver = self.query_balance(address_b)?;

        let tx = TxInfo::from_json(tx_json)?;
        let (balance_a, balance_b) = validate_tx_info(&tx, sender, receiver).map_err(|e| {
            warn!("failed to validate transfer from {}: {}", address_a, e);
            e
        })?;

        debug!("update sender {}", address_a);
        if let Some(account) = self.accounts.get_mut(address_a) {
            account.balance = balance_a;
        }
        debug!("update receiver {}", address_b);
        if let Some(account) = self.accounts.get_mut(address_b) {
            account.balance = balance_b;
        }

        Ok(())
    }

    /// Homomorphically adds two ciphertexts under the key in `pub_pem`.
    pub fn homo_add(&self, cipher_1: &[u8], cipher_2: &[u8], pub_pem: &str) -> Result<Vec<u8>> {
        let public_key = decode_pem_public_key(pub_pem)?;

        Ok(wire::add_cipher(&public_key, cipher_1, cipher_2)?)
    }

    /// The number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{address_of, Ledger};
    use crate::client::init_balance;
    use crate::error::LedgerError;
    use homoledger_he::encoding::gen_pem_public_key;
    use homoledger_he::wire;
    use homoledger_traits::cryptosystems::DecryptionKey;
    use homoledger_traits::randomness::GeneralRng;
    use homoledger_traits::Error;
    use rand_core::OsRng;

    fn toy_pub_pem(rng: &mut GeneralRng<OsRng>) -> String {
        let secret_key = wire::generate_key(rng, 256).unwrap();
        gen_pem_public_key(secret_key.public_key())
    }

    #[test]
    fn test_address_is_sha256_hex() {
        assert_eq!(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            address_of("abc")
        );
    }

    #[test]
    fn test_register_and_query() {
        let mut rng = GeneralRng::new(OsRng);
        let pub_pem = toy_pub_pem(&mut rng);
        let balance = init_balance(5, &pub_pem, &mut rng).unwrap();
        let mut ledger = Ledger::new();

        let address = ledger.register(&pub_pem, balance.clone()).unwrap();
        let account = ledger.query_balance(&address).unwrap();

        assert_eq!(address_of(&pub_pem), address);
        assert_eq!(balance, account.balance);
        assert_eq!(pub_pem, account.public_key);
        assert_eq!(1, ledger.len());
    }

    #[test]
    fn test_register_twice() {
        let mut rng = GeneralRng::new(OsRng);
        let pub_pem = toy_pub_pem(&mut rng);
        let mut ledger = Ledger::new();

        ledger
            .register(&pub_pem, init_balance(5, &pub_pem, &mut rng).unwrap())
            .unwrap();

        assert!(matches!(
            ledger.register(&pub_pem, init_balance(6, &pub_pem, &mut rng).unwrap()),
            Err(LedgerError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let mut rng = GeneralRng::new(OsRng);
        let pub_pem = toy_pub_pem(&mut rng);
        let public_key = homoledger_he::encoding::decode_pem_public_key(&pub_pem).unwrap();
        let mut ledger = Ledger::new();

        assert!(matches!(
            ledger.register("not a key", vec![1]),
            Err(LedgerError::Crypto(Error::MalformedKey(_)))
        ));
        assert!(matches!(
            ledger.register(&pub_pem, wire::integer_to_bytes(public_key.n_squared())),
            Err(LedgerError::Crypto(Error::Decode(_)))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_query_unknown() {
        let ledger = Ledger::new();

        assert!(matches!(
            ledger.query_balance("00"),
            Err(LedgerError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_transfer_rejects_self_and_unknown() {
        let mut rng = GeneralRng::new(OsRng);
        let pub_pem = toy_pub_pem(&mut rng);
        let mut ledger = Ledger::new();
        let address = ledger
            .register(&pub_pem, init_balance(5, &pub_pem, &mut rng).unwrap())
            .unwrap();

        assert!(matches!(
            ledger.transfer(&address, &address, "{}"),
            Err(LedgerError::SelfTransfer(_))
        ));
        assert!(matches!(
            ledger.transfer(&address, "00", "{}"),
            Err(LedgerError::UnknownAddress(_))
        ));
        assert!(matches!(
            ledger.transfer("00", &address, "{}"),
            Err(LedgerError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_homo_add() {
        let mut rng = GeneralRng::new(OsRng);
        let secret_key = wire::generate_key(&mut rng, 256).unwrap();
        let pub_pem = gen_pem_public_key(secret_key.public_key());
        let ledger = Ledger::new();

        let c1 = init_balance(7, &pub_pem, &mut rng).unwrap();
        let c2 = init_balance(8, &pub_pem, &mut rng).unwrap();
        let sum = ledger.homo_add(&c1, &c2, &pub_pem).unwrap();

        assert_eq!(vec![15], wire::decrypt(&secret_key, &sum).unwrap());
    }
}
