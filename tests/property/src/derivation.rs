use ledger_kernel::deriver::text_seed;
use ledger_kernel::{Address, AddressDeriver, KernelError, ProgramIds};
use proptest::prelude::*;

mod support;

fn seeds_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..=32), 0..4)
}

/// Property: derivation is a pure function of (namespace, seeds)
#[test]
fn prop_derivation_is_deterministic() {
    proptest!(|(namespace in any::<[u8; 32]>(), seeds in seeds_strategy())| {
        let namespace = Address::new_from_array(namespace);
        let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();

        let first = Address::find_program_address(&seeds, &namespace).unwrap();
        let second = Address::find_program_address(&seeds, &namespace).unwrap();
        prop_assert_eq!(first, second);

        let deriver = AddressDeriver::new(ProgramIds::default(), 16);
        let cached = deriver.derive(&namespace, &seeds).unwrap();
        let again = deriver.derive(&namespace, &seeds).unwrap();
        prop_assert_eq!((cached.address, cached.offset), first);
        prop_assert_eq!(cached, again);
    });
}

/// Property: derived addresses never collide with key-controlled identities
#[test]
fn prop_derived_addresses_are_off_curve() {
    proptest!(|(namespace in any::<[u8; 32]>(), seeds in seeds_strategy())| {
        let namespace = Address::new_from_array(namespace);
        let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();

        let (address, offset) = Address::find_program_address(&seeds, &namespace).unwrap();
        prop_assert!(!address.is_on_curve());
        prop_assert_eq!(Address::create_program_address(&seeds, offset, &namespace).unwrap(), address);
    });
}

/// Property: key-controlled identities are always on the curve
#[test]
fn prop_identities_are_on_curve() {
    proptest!(|(n in 1u64..u64::MAX)| {
        prop_assert!(support::identity(n).is_on_curve());
    });
}

/// Property: oversized seeds are rejected instead of silently truncated
#[test]
fn prop_oversized_seed_rejected() {
    proptest!(|(seed in prop::collection::vec(any::<u8>(), 33..64))| {
        prop_assert_eq!(
            Address::find_program_address(&[seed.as_slice()], &Address::NONE),
            Err(KernelError::InvalidSeeds("seed exceeds maximum length"))
        );
    });
}

/// Property: post titles only contribute their first 32 bytes
#[test]
fn prop_title_seed_truncation() {
    proptest!(|(title in "[a-z0-9 ]{0,64}", owner in 1u64..1_000)| {
        let deriver = AddressDeriver::new(ProgramIds::default(), 16);
        let owner = support::identity(owner);
        let prefix = &title[..title.len().min(32)];

        prop_assert_eq!(text_seed(&title), prefix.as_bytes());
        prop_assert_eq!(
            deriver.post_by_title(&owner, &title).unwrap(),
            deriver.post_by_title(&owner, prefix).unwrap()
        );
    });
}
