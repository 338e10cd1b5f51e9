use ledger_kernel::{Counter, CounterInstruction, Instruction, KernelError, Ledger};
use proptest::prelude::*;

mod support;

fn initialized(owner: u64) -> (Ledger, ledger_kernel::Address, ledger_kernel::Address) {
    let mut ledger = support::ledger();
    let owner = support::identity(owner);
    let counter = ledger.deriver().counter(&owner).unwrap().address;
    support::send(
        &mut ledger,
        &[owner],
        vec![Instruction::Counter(CounterInstruction::Initialize { counter, authority: owner })],
    )
    .unwrap();
    (ledger, owner, counter)
}

/// Property: decreasing a zero counter always underflows and changes nothing
#[test]
fn prop_decrease_at_zero_underflows() {
    proptest!(ProptestConfig::with_cases(64), |(owner in 1u64..10_000)| {
        let (mut ledger, owner, counter) = initialized(owner);
        let result = support::send(
            &mut ledger,
            &[owner],
            vec![Instruction::Counter(CounterInstruction::Decrease { counter, authority: owner })],
        );
        prop_assert_eq!(result, Err(KernelError::Underflow));
        prop_assert_eq!(ledger.store().read_as::<Counter>(&counter).unwrap().data, 0);
    });
}

/// Property: Increase then Decrease is the identity on data
#[test]
fn prop_increase_then_decrease_is_identity() {
    proptest!(ProptestConfig::with_cases(64), |(owner in 1u64..10_000, value in 0u64..u64::MAX)| {
        let (mut ledger, owner, counter) = initialized(owner);
        support::send(
            &mut ledger,
            &[owner],
            vec![
                Instruction::Counter(CounterInstruction::Set { counter, authority: owner, value }),
                Instruction::Counter(CounterInstruction::Increase { counter, authority: owner }),
                Instruction::Counter(CounterInstruction::Decrease { counter, authority: owner }),
            ],
        )
        .unwrap();
        prop_assert_eq!(ledger.store().read_as::<Counter>(&counter).unwrap().data, value);
    });
}

/// Property: only the stored authority can mutate a counter
#[test]
fn prop_foreign_signer_is_unauthorized() {
    proptest!(ProptestConfig::with_cases(64), |(owner in 1u64..5_000, other in 5_000u64..10_000, value: u64)| {
        let (mut ledger, _, counter) = initialized(owner);
        let intruder = support::identity(other);
        let result = support::send(
            &mut ledger,
            &[intruder],
            vec![Instruction::Counter(CounterInstruction::Set { counter, authority: intruder, value })],
        );
        prop_assert_eq!(result, Err(KernelError::Unauthorized));
        prop_assert_eq!(ledger.store().read_as::<Counter>(&counter).unwrap().data, 0);
    });
}
