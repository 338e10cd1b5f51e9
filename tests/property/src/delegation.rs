use ledger_kernel::{Instruction, KernelError, Puppet, PuppetInstruction, PuppetMasterInstruction};
use proptest::prelude::*;

mod support;

/// Property: PullStrings succeeds exactly for the canonical offset
#[test]
fn prop_only_canonical_offset_pulls_strings() {
    proptest!(ProptestConfig::with_cases(64), |(
        controller in 1u64..10_000,
        offset: u8,
        data: u64,
    )| {
        let mut ledger = support::ledger();
        let controller = support::identity(controller);
        let master = ledger.deriver().master(&controller).unwrap();
        let puppet = ledger.deriver().puppet(&master.address).unwrap().address;
        support::send(
            &mut ledger,
            &[controller],
            vec![Instruction::Puppet(PuppetInstruction::Initialize {
                puppet,
                payer: controller,
                authority: master.address,
            })],
        )
        .unwrap();

        let result = support::send(
            &mut ledger,
            &[controller],
            vec![Instruction::PuppetMaster(PuppetMasterInstruction::PullStrings {
                puppet,
                master: master.address,
                controller,
                offset,
                data,
            })],
        );

        let stored: Puppet = ledger.store().read_as(&puppet).unwrap();
        if offset == master.offset {
            prop_assert!(result.is_ok());
            prop_assert_eq!(stored.data, data);
        } else {
            prop_assert_eq!(result, Err(KernelError::Unauthorized));
            prop_assert_eq!(stored.data, 0);
        }
    });
}

/// Property: a different controller never reaches someone else's puppet
#[test]
fn prop_foreign_controller_is_unauthorized() {
    proptest!(ProptestConfig::with_cases(64), |(
        owner in 1u64..5_000,
        rogue in 5_000u64..10_000,
        data: u64,
    )| {
        let mut ledger = support::ledger();
        let owner = support::identity(owner);
        let rogue = support::identity(rogue);
        let master = ledger.deriver().master(&owner).unwrap().address;
        let puppet = ledger.deriver().puppet(&master).unwrap().address;
        support::send(
            &mut ledger,
            &[owner],
            vec![Instruction::Puppet(PuppetInstruction::Initialize { puppet, payer: owner, authority: master })],
        )
        .unwrap();

        let rogue_master = ledger.deriver().master(&rogue).unwrap();
        let result = support::send(
            &mut ledger,
            &[rogue],
            vec![Instruction::PuppetMaster(PuppetMasterInstruction::PullStrings {
                puppet,
                master: rogue_master.address,
                controller: rogue,
                offset: rogue_master.offset,
                data,
            })],
        );
        prop_assert_eq!(result, Err(KernelError::Unauthorized));
        prop_assert_eq!(ledger.store().read_as::<Puppet>(&puppet).unwrap().data, 0);
    });
}
