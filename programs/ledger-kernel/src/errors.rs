// Error taxonomy for ledger-kernel instruction processing
//
// Every instruction either commits in full or is rejected with exactly one of
// these errors. Callers branch on the variant (or its numeric code) to tell
// "not yet initialized" apart from "unauthorized" apart from "arithmetic bound
// violated", so handlers never collapse failures into a generic error.
//
// Codes are grouped in ranges by functional domain, mirroring custom program
// error numbering: records 6000, authorization 6100, arithmetic and balances
// 6200, address derivation 6300, transaction discipline 6400, data 6500.

use thiserror::Error;

use crate::address::Address;
use crate::state::RecordKind;

// ================================
// Kernel Error Types
// ================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    // ===== Record Errors (6000-6099) =====
    #[error("Record already exists at {0}")]
    AlreadyExists(Address),

    #[error("Record not found at {0}")]
    NotFound(Address),

    #[error("Address mismatch: expected {expected}, supplied {supplied}")]
    AddressMismatch { expected: Address, supplied: Address },

    #[error("Record at {address} is not a {expected}")]
    KindMismatch { address: Address, expected: RecordKind },

    // ===== Authorization Errors (6100-6199) =====
    #[error("Unauthorized")]
    Unauthorized,

    // ===== Arithmetic and Balance Errors (6200-6299) =====
    #[error("Cannot decrease a value of 0")]
    Underflow,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    // ===== Derivation Errors (6300-6399) =====
    #[error("Invalid seeds: {0}")]
    InvalidSeeds(&'static str),

    #[error("Unable to find a viable offset for the derived address")]
    NoViableOffset,

    // ===== Transaction Errors (6400-6499) =====
    #[error("Account {0} was not declared by the instruction")]
    AccountNotDeclared(Address),

    #[error("Account {0} was not declared writable")]
    AccountNotWritable(Address),

    #[error("Account {0} is owned by another program")]
    AccountOwnerMismatch(Address),

    #[error("Cross-program invocation depth exceeded")]
    CallDepthExceeded,

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    // ===== Data Errors (6500-6599) =====
    #[error("Invalid record data at {0}")]
    InvalidRecordData(Address),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl KernelError {
    /// Stable numeric code for clients that only see the raw error number
    pub fn code(&self) -> u32 {
        match self {
            Self::AlreadyExists(_) => 6000,
            Self::NotFound(_) => 6001,
            Self::AddressMismatch { .. } => 6002,
            Self::KindMismatch { .. } => 6003,
            Self::Unauthorized => 6100,
            Self::Underflow => 6200,
            Self::Overflow => 6201,
            Self::InsufficientFunds { .. } => 6202,
            Self::InvalidSeeds(_) => 6300,
            Self::NoViableOffset => 6301,
            Self::AccountNotDeclared(_) => 6400,
            Self::AccountNotWritable(_) => 6401,
            Self::AccountOwnerMismatch(_) => 6402,
            Self::CallDepthExceeded => 6403,
            Self::InvalidInstruction(_) => 6404,
            Self::InvalidRecordData(_) => 6500,
            Self::Serialization(_) => 6501,
            Self::InvalidConfiguration(_) => 6502,
        }
    }
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;

/// Return `$err` from the enclosing function unless `$cond` holds
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use require;
