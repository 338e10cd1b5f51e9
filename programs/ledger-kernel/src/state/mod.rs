// State management for ledger-kernel

pub mod records;
pub mod store;

// Re-exports
pub use records::{
    Blog, Counter, LinkedEntry, LinkedHead, Master, Mint, Post, PostKeying, Puppet, Record,
    RecordData, RecordKind, TokenAccount, AUTHORITY_OFFSET, DISCRIMINATOR_LEN,
};
pub use store::{AccessList, AccountEntry, AccountMeta, ChangeSet, RecordStore, StoreTransaction};
