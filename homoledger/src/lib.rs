#![doc = include_str!("../README.md")]
#![warn(missing_docs, unused_imports)]

pub use homoledger_he::cryptosystems;
pub use homoledger_he::encoding;
pub use homoledger_he::wire;
pub use homoledger_ledger as ledger;
pub use homoledger_numbertheory;
pub use homoledger_traits;
