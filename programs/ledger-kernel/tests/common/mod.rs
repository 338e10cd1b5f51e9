// Shared fixtures for ledger-kernel integration tests
#![allow(dead_code)]

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use ledger_kernel::{
    Address, Clock, Instruction, KernelError, Ledger, LedgerConfig, ProgramIds, RecordData,
    Transaction,
};
use tracing_subscriber::EnvFilter;

/// Genesis time used by every fixture clock
pub const GENESIS_TIMESTAMP: i64 = 1_700_000_000;

pub const ONE_SOL: u64 = 1_000_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A key-controlled identity: the compressed point `n * B`
pub fn identity(n: u64) -> Address {
    Address::new_from_array((ED25519_BASEPOINT_POINT * Scalar::from(n)).compress().to_bytes())
}

pub struct TestContext {
    pub ledger: Ledger,
    pub clock: Clock,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        init_tracing();
        Self {
            ledger: Ledger::new(config).expect("valid test config"),
            clock: Clock { slot: 0, unix_timestamp: GENESIS_TIMESTAMP },
        }
    }

    pub fn programs(&self) -> ProgramIds {
        self.ledger.config().programs
    }

    /// A fresh identity funded with `lamports`
    pub fn funded_identity(&mut self, n: u64, lamports: u64) -> Address {
        let address = identity(n);
        self.ledger.deposit(&address, lamports).expect("deposit");
        address
    }

    /// Process one transaction, advancing the clock by a slot first
    pub fn send(&mut self, signers: &[Address], instructions: Vec<Instruction>) -> Result<(), KernelError> {
        self.clock.slot += 1;
        self.clock.unix_timestamp += 1;
        let transaction = Transaction::new(signers.to_vec(), instructions, self.clock);
        self.ledger.process(&transaction)
    }

    pub fn read<T: RecordData>(&self, address: &Address) -> T {
        self.ledger.store().read_as(address).expect("record present")
    }

    pub fn lamports(&self, address: &Address) -> u64 {
        self.ledger.store().lamports(address)
    }
}
