// Addresses and program-address derivation
//
// An address is a 32-byte identity. Externally generated identities are
// compressed Ed25519 points; derived (program) addresses are SHA-256 outputs
// that are guaranteed NOT to decompress to a curve point, so no private key can
// ever exist for them and they can never collide with a key-controlled identity.
//
// Derivation hashes `seed_0 ‖ … ‖ seed_n ‖ [offset] ‖ namespace ‖ marker` and
// searches the single-byte offset from 255 downwards until the hash falls off
// the curve. The first such offset is the canonical one.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{KernelError, Result};

// ================================
// Constants
// ================================

/// Number of bytes in an address
pub const ADDRESS_BYTES: usize = 32;

/// Maximum length of a single derivation seed
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds per derivation (the offset is not counted)
pub const MAX_SEEDS: usize = 16;

/// Domain separator appended to every derivation preimage
pub const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

// ================================
// Address
// ================================

#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    /// The all-zero address: system namespace and the "none" sentinel of linked histories
    pub const NONE: Self = Self([0u8; ADDRESS_BYTES]);

    pub const fn new_from_array(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; ADDRESS_BYTES] {
        self.0
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Whether the bytes decode to an Ed25519 point, i.e. could belong to a keypair
    pub fn is_on_curve(&self) -> bool {
        bytes_are_curve_point(&self.0)
    }

    /// Compute the derived address for exactly one offset
    ///
    /// # Errors
    /// `InvalidSeeds` when the seed limits are exceeded or the hash lands on the curve
    pub fn create_program_address(
        seeds: &[&[u8]],
        offset: u8,
        namespace: &Address,
    ) -> Result<Address> {
        check_seeds(seeds)?;
        let hash = hash_program_address(seeds, offset, namespace);
        if bytes_are_curve_point(&hash) {
            return Err(KernelError::InvalidSeeds("derived address lies on the curve"));
        }
        Ok(Address(hash))
    }

    /// Search offsets from 255 down and return the first off-curve address
    ///
    /// # Errors
    /// `InvalidSeeds` for oversized seeds, `NoViableOffset` if all 256 offsets land on the curve
    pub fn find_program_address(seeds: &[&[u8]], namespace: &Address) -> Result<(Address, u8)> {
        check_seeds(seeds)?;
        for offset in (0..=u8::MAX).rev() {
            let hash = hash_program_address(seeds, offset, namespace);
            if !bytes_are_curve_point(&hash) {
                return Ok((Address(hash), offset));
            }
        }
        Err(KernelError::NoViableOffset)
    }
}

fn check_seeds(seeds: &[&[u8]]) -> Result<()> {
    if seeds.len() > MAX_SEEDS {
        return Err(KernelError::InvalidSeeds("too many seeds"));
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(KernelError::InvalidSeeds("seed exceeds maximum length"));
    }
    Ok(())
}

fn hash_program_address(seeds: &[&[u8]], offset: u8, namespace: &Address) -> [u8; ADDRESS_BYTES] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([offset]);
    hasher.update(namespace.0);
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

fn bytes_are_curve_point(bytes: &[u8; ADDRESS_BYTES]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

// ================================
// Conversions
// ================================

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| KernelError::Serialization(format!("invalid base58 address: {e}")))?;
        let bytes: [u8; ADDRESS_BYTES] = bytes.try_into().map_err(|raw: Vec<u8>| {
            KernelError::Serialization(format!("address must be 32 bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = KernelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}
