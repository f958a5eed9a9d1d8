/// CSV ledger export.
pub mod export;
