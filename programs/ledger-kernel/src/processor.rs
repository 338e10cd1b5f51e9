// Transaction processing for the ledger
//
// A transaction names its signers and a list of instructions. Processing:
//
// 1. Signer validation: every listed signer must be a key-controlled identity
//    and every account an instruction marks as a signer must be listed.
// 2. Access declaration: the union of every instruction's accounts becomes the
//    access list of one store overlay.
// 3. Execution: instructions run in order against the overlay, each inside an
//    invocation context for its program.
// 4. Commit: the overlay is folded into the store only if every instruction
//    succeeded. The first error rejects the whole transaction.
//
// Cross-program calls reuse the same overlay through a nested invocation
// context whose depth is bounded by configuration.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::config::LedgerConfig;
use crate::deriver::AddressDeriver;
use crate::errors::{require, KernelError, Result};
use crate::guards::{ProxyAuthority, SignerSet};
use crate::instructions::{self, Instruction};
use crate::state::{AccessList, AccountMeta, ChangeSet, RecordStore};

// ================================
// Transaction
// ================================

/// Ledger time observed by a transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Clock {
    pub slot: u64,
    pub unix_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    /// Identities whose signatures the substrate already verified
    pub signers: Vec<Address>,
    pub instructions: Vec<Instruction>,
    pub clock: Clock,
}

impl Transaction {
    pub fn new(signers: Vec<Address>, instructions: Vec<Instruction>, clock: Clock) -> Self {
        Self { signers, instructions, clock }
    }

    pub fn accounts(&self) -> Vec<AccountMeta> {
        self.instructions.iter().flat_map(Instruction::accounts).collect()
    }
}

// ================================
// Invocation Context
// ================================

/// Everything a handler may consult besides the store overlay
pub struct InvokeContext<'a> {
    program_id: Address,
    config: &'a LedgerConfig,
    deriver: &'a AddressDeriver,
    signers: &'a SignerSet,
    clock: Clock,
    depth: u8,
}

impl<'a> InvokeContext<'a> {
    pub fn new(
        program_id: Address,
        config: &'a LedgerConfig,
        deriver: &'a AddressDeriver,
        signers: &'a SignerSet,
        clock: Clock,
    ) -> Self {
        Self { program_id, config, deriver, signers, clock, depth: 1 }
    }

    /// Namespace of the executing program
    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn config(&self) -> &'a LedgerConfig {
        self.config
    }

    pub fn deriver(&self) -> &'a AddressDeriver {
        self.deriver
    }

    pub fn signers(&self) -> &'a SignerSet {
        self.signers
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Context for a cross-program call into `program_id`
    pub fn invoke(&self, program_id: Address) -> Result<InvokeContext<'a>> {
        require!(
            self.depth < self.config.max_invoke_depth,
            KernelError::CallDepthExceeded
        );
        debug!(caller = %self.program_id, callee = %program_id, depth = self.depth + 1, "cross-program invocation");
        Ok(InvokeContext {
            program_id,
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Delegated authority over `(tag, controller)` under the executing program
    pub fn proxy(&self, tag: &'static [u8], controller: Address, offset: u8) -> ProxyAuthority {
        ProxyAuthority::new(self.program_id, tag, controller, offset)
    }
}

// ================================
// Ledger
// ================================

pub struct Ledger {
    config: LedgerConfig,
    deriver: AddressDeriver,
    store: RecordStore,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let deriver = AddressDeriver::from_config(&config);
        Ok(Self { config, deriver, store: RecordStore::new() })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Fund an identity from outside the ledger
    pub fn deposit(&mut self, address: &Address, lamports: u64) -> Result<u64> {
        self.store.deposit(address, lamports)
    }

    /// Execute `transaction` atomically
    ///
    /// # Errors
    /// The first error raised by signer validation or any instruction; the
    /// store is left exactly as it was.
    pub fn process(&mut self, transaction: &Transaction) -> Result<()> {
        match self.execute(transaction) {
            Ok(changes) => {
                info!(
                    instructions = transaction.instructions.len(),
                    accounts = changes.len(),
                    slot = transaction.clock.slot,
                    "transaction committed"
                );
                self.store.commit(changes);
                Ok(())
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "transaction rejected");
                Err(err)
            }
        }
    }

    fn execute(&self, transaction: &Transaction) -> Result<ChangeSet> {
        for signer in &transaction.signers {
            require!(signer.is_on_curve(), KernelError::Unauthorized);
        }
        let signers = SignerSet::new(transaction.signers.iter().copied());

        let accounts = transaction.accounts();
        for meta in accounts.iter().filter(|meta| meta.is_signer) {
            signers.require(&meta.address)?;
        }
        let access: AccessList = accounts.into_iter().collect();

        let mut overlay = self.store.begin(access);
        for instruction in &transaction.instructions {
            let ctx = InvokeContext::new(
                instruction.program_id(&self.config.programs),
                &self.config,
                &self.deriver,
                &signers,
                transaction.clock,
            );
            instructions::process_instruction(&ctx, &mut overlay, instruction)?;
        }
        Ok(overlay.into_changes())
    }
}
