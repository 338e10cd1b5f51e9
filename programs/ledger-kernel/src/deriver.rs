// Typed address derivation for every record kind the ledger hosts
//
// Each program kind has exactly one seed shape, and the helpers below are the
// only place those shapes are spelled out. Handlers re-derive the expected
// address from these helpers and compare it with whatever the caller supplied;
// a caller-supplied address is never trusted on its own.
//
// Derivation is a pure function of (namespace, seeds), so results are memoised
// in a bounded LRU keyed by exactly those inputs.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use lru::LruCache;
use tracing::trace;

use crate::address::{Address, MAX_SEED_LEN};
use crate::config::{LedgerConfig, ProgramIds};
use crate::errors::{KernelError, Result};

// ================================
// Seed Tags
// ================================

pub const COUNTER_SEED: &[u8] = b"account";
pub const BLOG_SEED: &[u8] = b"blog";
pub const POST_SEED: &[u8] = b"post";
pub const PUPPET_SEED: &[u8] = b"puppet";
pub const MASTER_SEED: &[u8] = b"master";
pub const MINT_AUTHORITY_SEED: &[u8] = b"MINT_AUTHORITY";

/// Truncate free text to the fixed seed width; every caller must use this
pub fn text_seed(text: &str) -> &[u8] {
    let bytes = text.as_bytes();
    &bytes[..bytes.len().min(MAX_SEED_LEN)]
}

/// Sequence numbers are seeded as 8 big-endian bytes
pub fn sequence_seed(sequence: u64) -> [u8; 8] {
    sequence.to_be_bytes()
}

// ================================
// Program Address
// ================================

/// A derived address together with its canonical offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramAddress {
    pub address: Address,
    pub offset: u8,
}

// ================================
// Address Deriver
// ================================

type CacheKey = (Address, Vec<Vec<u8>>);

pub struct AddressDeriver {
    programs: ProgramIds,
    cache: Mutex<LruCache<CacheKey, ProgramAddress>>,
}

impl AddressDeriver {
    pub fn new(programs: ProgramIds, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            programs,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.programs, config.address_cache_capacity)
    }

    pub fn programs(&self) -> &ProgramIds {
        &self.programs
    }

    /// Canonical derivation of `seeds` under `namespace`, served from cache when possible
    pub fn derive(&self, namespace: &Address, seeds: &[&[u8]]) -> Result<ProgramAddress> {
        let key: CacheKey = (*namespace, seeds.iter().map(|seed| seed.to_vec()).collect());

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&key) {
            trace!(address = %hit.address, "address cache hit");
            return Ok(*hit);
        }

        let (address, offset) = Address::find_program_address(seeds, namespace)?;
        let derived = ProgramAddress { address, offset };
        trace!(address = %address, offset, "address derived");
        cache.put(key, derived);
        Ok(derived)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    // ===== Per-kind seed shapes =====

    pub fn counter(&self, owner: &Address) -> Result<ProgramAddress> {
        self.derive(&self.programs.counter, &[COUNTER_SEED, owner.as_ref()])
    }

    pub fn blog(&self, owner: &Address) -> Result<ProgramAddress> {
        self.derive(&self.programs.blog, &[BLOG_SEED, owner.as_ref()])
    }

    pub fn post_by_title(&self, owner: &Address, title: &str) -> Result<ProgramAddress> {
        self.derive(&self.programs.blog, &[POST_SEED, owner.as_ref(), text_seed(title)])
    }

    /// Keyed under the blog's own address, not its owner, so the count stays per blog
    pub fn post_by_sequence(&self, blog: &Address, sequence: u64) -> Result<ProgramAddress> {
        self.derive(
            &self.programs.blog,
            &[POST_SEED, blog.as_ref(), &sequence_seed(sequence)],
        )
    }

    pub fn puppet(&self, authority: &Address) -> Result<ProgramAddress> {
        self.derive(&self.programs.puppet, &[PUPPET_SEED, authority.as_ref()])
    }

    pub fn master(&self, controller: &Address) -> Result<ProgramAddress> {
        self.derive(&self.programs.puppet_master, &[MASTER_SEED, controller.as_ref()])
    }

    pub fn mint_authority(&self, mint: &Address) -> Result<ProgramAddress> {
        self.derive(&self.programs.token_sale, &[MINT_AUTHORITY_SEED, mint.as_ref()])
    }

    pub fn associated_token_account(&self, owner: &Address, mint: &Address) -> Result<ProgramAddress> {
        self.derive(
            &self.programs.associated_token,
            &[owner.as_ref(), self.programs.token.as_ref(), mint.as_ref()],
        )
    }
}

/// Reject a caller-supplied address that differs from the derived one
pub fn check_address(expected: &ProgramAddress, supplied: &Address) -> Result<()> {
    if expected.address != *supplied {
        return Err(KernelError::AddressMismatch {
            expected: expected.address,
            supplied: *supplied,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deriver() -> AddressDeriver {
        AddressDeriver::new(ProgramIds::default(), 8)
    }

    #[test]
    fn test_derive_is_cached_and_stable() {
        let deriver = deriver();
        let owner = Address::new_from_array([3u8; 32]);

        let first = deriver.counter(&owner).unwrap();
        assert_eq!(deriver.cached_len(), 1);
        let second = deriver.counter(&owner).unwrap();
        assert_eq!(first, second);
        assert_eq!(deriver.cached_len(), 1);

        let uncached = Address::find_program_address(
            &[COUNTER_SEED, owner.as_ref()],
            &deriver.programs().counter,
        )
        .unwrap();
        assert_eq!((first.address, first.offset), uncached);
    }

    #[test]
    fn test_cache_is_bounded() {
        let deriver = AddressDeriver::new(ProgramIds::default(), 2);
        for i in 0..5u8 {
            deriver.blog(&Address::new_from_array([i; 32])).unwrap();
        }
        assert_eq!(deriver.cached_len(), 2);
    }

    #[test]
    fn test_title_seed_truncates_to_32_bytes() {
        let deriver = deriver();
        let owner = Address::new_from_array([5u8; 32]);
        let long = "a".repeat(40);
        let prefix = "a".repeat(32);

        assert_eq!(text_seed(&long).len(), MAX_SEED_LEN);
        assert_eq!(
            deriver.post_by_title(&owner, &long).unwrap(),
            deriver.post_by_title(&owner, &prefix).unwrap()
        );
        assert_ne!(
            deriver.post_by_title(&owner, "t1").unwrap(),
            deriver.post_by_title(&owner, "t2").unwrap()
        );
    }

    #[test]
    fn test_sequence_seed_is_big_endian() {
        assert_eq!(sequence_seed(1), [0, 0, 0, 0, 0, 0, 0, 1]);

        let deriver = deriver();
        let blog = Address::new_from_array([6u8; 32]);
        assert_ne!(
            deriver.post_by_sequence(&blog, 0).unwrap(),
            deriver.post_by_sequence(&blog, 1).unwrap()
        );

        // Two blogs each start their own numbering at zero
        let other = Address::new_from_array([7u8; 32]);
        assert_ne!(
            deriver.post_by_sequence(&blog, 0).unwrap(),
            deriver.post_by_sequence(&other, 0).unwrap()
        );
    }

    #[test]
    fn test_same_seeds_differ_across_programs() {
        let deriver = deriver();
        let owner = Address::new_from_array([7u8; 32]);
        let puppet = deriver.puppet(&owner).unwrap().address;
        let master = deriver.master(&owner).unwrap().address;
        let counter = deriver.counter(&owner).unwrap().address;
        assert_ne!(puppet, master);
        assert_ne!(puppet, counter);
    }

    #[test]
    fn test_check_address() {
        let deriver = deriver();
        let owner = Address::new_from_array([8u8; 32]);
        let expected = deriver.blog(&owner).unwrap();
        check_address(&expected, &expected.address).unwrap();
        assert!(matches!(
            check_address(&expected, &owner),
            Err(KernelError::AddressMismatch { .. })
        ));
    }
}
