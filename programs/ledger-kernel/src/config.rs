//! Ledger configuration
//!
//! Program namespaces, the token-sale exchange rate and the post keying scheme
//! are explicit configuration handed to every handler through the invocation
//! context. Nothing here is read from ambient global state at call time.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::errors::{KernelError, Result};
use crate::state::PostKeying;

// ================================
// Program IDs
// ================================

/// `6mi3PrgougeFGizsQmkfga5Z6MnRNa5sbnP8yH7261hN`
pub const COUNTER_PROGRAM_ID: Address = Address::new_from_array([
    85, 190, 101, 79, 243, 54, 72, 141, 170, 98, 227, 162, 192, 142, 108, 14, 226, 123, 154, 45,
    127, 13, 239, 20, 190, 58, 80, 12, 23, 146, 241, 189,
]);

/// `Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS`
pub const BLOG_PROGRAM_ID: Address = Address::new_from_array([
    218, 7, 92, 178, 255, 94, 198, 129, 118, 19, 222, 83, 11, 105, 42, 135, 53, 71, 119, 105, 218,
    71, 67, 12, 189, 129, 84, 51, 92, 74, 131, 39,
]);

/// `F8V5RrWUCScHAdy2gSJhU16betLaXsBa87gK3oEkengo`
pub const PUPPET_PROGRAM_ID: Address = Address::new_from_array([
    209, 238, 109, 189, 25, 243, 250, 194, 132, 197, 81, 52, 171, 203, 154, 239, 81, 85, 147, 70,
    0, 158, 104, 217, 222, 79, 175, 21, 117, 41, 39, 112,
]);

/// `HmbTLCmaGvZhKnn1Zfa1JVnp7vkMV4DYVxPLWBVoN65L`
pub const PUPPET_MASTER_PROGRAM_ID: Address = Address::new_from_array([
    249, 39, 128, 240, 50, 8, 35, 65, 120, 95, 239, 198, 95, 149, 95, 60, 109, 56, 108, 54, 12,
    41, 247, 76, 150, 252, 95, 149, 234, 210, 200, 87,
]);

/// `GrANjeU1KDd2BvbNs3MJodKdtaCVmLREnnVK4McN6AtR`
pub const TOKEN_SALE_PROGRAM_ID: Address = Address::new_from_array([
    235, 119, 93, 20, 214, 71, 115, 69, 209, 5, 92, 54, 222, 157, 87, 137, 145, 249, 233, 109, 86,
    45, 104, 34, 36, 130, 195, 135, 86, 194, 254, 98,
]);

/// `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133,
    237, 95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new_from_array([
    140, 151, 37, 143, 78, 36, 137, 241, 187, 61, 16, 41, 20, 142, 13, 131, 11, 90, 19, 153, 218,
    255, 16, 132, 4, 142, 123, 216, 219, 233, 248, 89,
]);

/// Namespaces of every program the ledger hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramIds {
    pub counter: Address,
    pub blog: Address,
    pub puppet: Address,
    pub puppet_master: Address,
    pub token_sale: Address,
    pub token: Address,
    pub associated_token: Address,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            counter: COUNTER_PROGRAM_ID,
            blog: BLOG_PROGRAM_ID,
            puppet: PUPPET_PROGRAM_ID,
            puppet_master: PUPPET_MASTER_PROGRAM_ID,
            token_sale: TOKEN_SALE_PROGRAM_ID,
            token: TOKEN_PROGRAM_ID,
            associated_token: ASSOCIATED_TOKEN_PROGRAM_ID,
        }
    }
}

impl ProgramIds {
    pub fn all(&self) -> [Address; 7] {
        [
            self.counter,
            self.blog,
            self.puppet,
            self.puppet_master,
            self.token_sale,
            self.token,
            self.associated_token,
        ]
    }
}

// ================================
// Ledger Configuration
// ================================

/// Tokens minted per lamport paid (1 SOL buys 5 whole tokens at 9 decimals)
pub const DEFAULT_TOKENS_PER_LAMPORT: u64 = 5;

pub const DEFAULT_ADDRESS_CACHE_CAPACITY: usize = 1024;

/// Maximum nesting of cross-program invocations
pub const DEFAULT_MAX_INVOKE_DEPTH: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Program namespaces
    pub programs: ProgramIds,

    /// Token-sale exchange rate
    pub tokens_per_lamport: u64,

    /// Keying scheme stamped onto newly initialized blogs
    pub post_keying: PostKeying,

    /// Entries kept by the address derivation cache
    pub address_cache_capacity: usize,

    /// Cross-program invocation depth limit
    pub max_invoke_depth: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            programs: ProgramIds::default(),
            tokens_per_lamport: DEFAULT_TOKENS_PER_LAMPORT,
            post_keying: PostKeying::default(),
            address_cache_capacity: DEFAULT_ADDRESS_CACHE_CAPACITY,
            max_invoke_depth: DEFAULT_MAX_INVOKE_DEPTH,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KernelError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            KernelError::InvalidConfiguration(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Load `LEDGER_CONFIG` (if set) and apply the `LEDGER_*` overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("LEDGER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(rate) = std::env::var("LEDGER_TOKENS_PER_LAMPORT") {
            config.tokens_per_lamport = rate.parse().map_err(|_| {
                KernelError::InvalidConfiguration(format!("invalid LEDGER_TOKENS_PER_LAMPORT: {rate}"))
            })?;
        }

        if let Ok(keying) = std::env::var("LEDGER_POST_KEYING") {
            config.post_keying = match keying.as_str() {
                "sequence" => PostKeying::Sequence,
                "title" => PostKeying::Title,
                other => {
                    return Err(KernelError::InvalidConfiguration(format!(
                        "invalid LEDGER_POST_KEYING: {other}"
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ids = self.programs.all();
        let distinct: BTreeSet<_> = ids.iter().collect();
        if distinct.len() != ids.len() {
            return Err(KernelError::InvalidConfiguration(
                "program ids must be pairwise distinct".into(),
            ));
        }
        if self.tokens_per_lamport == 0 {
            return Err(KernelError::InvalidConfiguration(
                "tokens_per_lamport must be non-zero".into(),
            ));
        }
        if self.address_cache_capacity == 0 {
            return Err(KernelError::InvalidConfiguration(
                "address_cache_capacity must be non-zero".into(),
            ));
        }
        if self.max_invoke_depth == 0 {
            return Err(KernelError::InvalidConfiguration(
                "max_invoke_depth must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
