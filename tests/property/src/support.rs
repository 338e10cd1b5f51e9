// Fixtures shared by the property test targets
#![allow(dead_code)]

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use ledger_kernel::{Address, Clock, Instruction, KernelError, Ledger, LedgerConfig, Transaction};

/// Key-controlled identity `n * B`
pub fn identity(n: u64) -> Address {
    Address::new_from_array((ED25519_BASEPOINT_POINT * Scalar::from(n)).compress().to_bytes())
}

pub fn ledger() -> Ledger {
    ledger_with(LedgerConfig::default())
}

pub fn ledger_with(config: LedgerConfig) -> Ledger {
    Ledger::new(config).expect("valid config")
}

pub fn send(
    ledger: &mut Ledger,
    signers: &[Address],
    instructions: Vec<Instruction>,
) -> Result<(), KernelError> {
    let clock = Clock { slot: 1, unix_timestamp: 1_700_000_000 };
    ledger.process(&Transaction::new(signers.to_vec(), instructions, clock))
}
