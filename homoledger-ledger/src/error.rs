/// Everything that can go wrong while preparing, validating or applying a transfer.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The cryptographic engine rejected a key, a ciphertext or an operation.
    #[error(transparent)]
    Crypto(#[from] homoledger_traits::Error),
    /// A transaction payload is not valid JSON or misses fields.
    #[error("malformed transaction payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The sender's decrypted balance is smaller than the amount to transfer.
    #[error("insufficient balance for transfer")]
    InsufficientBalance,
    /// The balance a transaction was prepared against is no longer the balance on the ledger.
    #[error("the cipher balance has been changed")]
    BalanceChanged,
    /// A key in the transaction does not belong to the account it claims.
    #[error("public key does not match the {0} account")]
    KeyMismatch(&'static str),
    /// An account already exists for this public key.
    #[error("address {0} is already registered")]
    AlreadyRegistered(String),
    /// No account exists at this address.
    #[error("no account at address {0}")]
    UnknownAddress(String),
    /// Sender and receiver are the same account.
    #[error("sender and receiver share address {0}")]
    SelfTransfer(String),
}

/// Result type of the ledger crate.
pub type Result<T> = std::result::Result<T, LedgerError>;
