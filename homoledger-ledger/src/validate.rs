//! The ledger's side of a transfer. Validation works on ciphertexts and public keys only.

use crate::error::{LedgerError, Result};
use crate::ledger::CipherAccount;
use crate::tx::TxInfo;
use homoledger_he::encoding::decode_pem_public_key;
use homoledger_he::wire;

/// Checks a transaction against the accounts it moves funds between, and returns the new
/// encrypted balances of sender and receiver.
///
/// Keys are compared after decoding, so two envelopes of the same key that differ in line
/// endings or surrounding whitespace are treated as equal.
pub fn validate_tx_info(
    tx: &TxInfo,
    on_ledger_sender: &CipherAccount,
    on_ledger_receiver: &CipherAccount,
) -> Result<(Vec<u8>, Vec<u8>)> {
    if tx.cipher_balance_a != on_ledger_sender.balance {
        return Err(LedgerError::BalanceChanged);
    }

    let public_key_a = decode_pem_public_key(&tx.pub_key_a)?;
    if public_key_a != on_ledger_sender.decode_public_key()? {
        return Err(LedgerError::KeyMismatch("sender"));
    }
    let public_key_b = decode_pem_public_key(&tx.pub_key_b)?;
    if public_key_b != on_ledger_receiver.decode_public_key()? {
        return Err(LedgerError::KeyMismatch("receiver"));
    }

    let new_balance_a = wire::sub_cipher(&public_key_a, &tx.cipher_balance_a, &tx.cipher_tx_a)?;
    let new_balance_b =
        wire::add_cipher(&public_key_b, &on_ledger_receiver.balance, &tx.cipher_tx_b)?;

    Ok((new_balance_a, new_balance_b))
}
