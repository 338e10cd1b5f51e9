// Instruction module for ledger-kernel
// One submodule per hosted program: its instruction enum, account
// declarations and handlers.

pub mod associated_token;
pub mod blog;
pub mod counter;
pub mod puppet;
pub mod puppet_master;
pub mod token;
pub mod token_sale;

pub use associated_token::AssociatedTokenInstruction;
pub use blog::BlogInstruction;
pub use counter::CounterInstruction;
pub use puppet::PuppetInstruction;
pub use puppet_master::PuppetMasterInstruction;
pub use token::TokenInstruction;
pub use token_sale::TokenSaleInstruction;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::address::Address;
use crate::config::ProgramIds;
use crate::errors::{KernelError, Result};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, StoreTransaction};

// ================================
// Instruction Envelope
// ================================

/// An instruction addressed to one of the hosted programs
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Instruction {
    Counter(CounterInstruction),
    Blog(BlogInstruction),
    Puppet(PuppetInstruction),
    PuppetMaster(PuppetMasterInstruction),
    Token(TokenInstruction),
    AssociatedToken(AssociatedTokenInstruction),
    TokenSale(TokenSaleInstruction),
}

impl Instruction {
    pub fn program_id(&self, programs: &ProgramIds) -> Address {
        match self {
            Instruction::Counter(_) => programs.counter,
            Instruction::Blog(_) => programs.blog,
            Instruction::Puppet(_) => programs.puppet,
            Instruction::PuppetMaster(_) => programs.puppet_master,
            Instruction::Token(_) => programs.token,
            Instruction::AssociatedToken(_) => programs.associated_token,
            Instruction::TokenSale(_) => programs.token_sale,
        }
    }

    /// Accounts the instruction reads or writes, including cross-program callees' accounts
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Instruction::Counter(ix) => ix.accounts(),
            Instruction::Blog(ix) => ix.accounts(),
            Instruction::Puppet(ix) => ix.accounts(),
            Instruction::PuppetMaster(ix) => ix.accounts(),
            Instruction::Token(ix) => ix.accounts(),
            Instruction::AssociatedToken(ix) => ix.accounts(),
            Instruction::TokenSale(ix) => ix.accounts(),
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        Self::try_from_slice(data).map_err(|e| KernelError::InvalidInstruction(e.to_string()))
    }
}

/// Route an instruction to its program's handler
pub fn process_instruction(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &Instruction,
) -> Result<()> {
    match instruction {
        Instruction::Counter(ix) => counter::process(ctx, tx, ix),
        Instruction::Blog(ix) => blog::process(ctx, tx, ix),
        Instruction::Puppet(ix) => puppet::process(ctx, tx, ix),
        Instruction::PuppetMaster(ix) => puppet_master::process(ctx, tx, ix),
        Instruction::Token(ix) => token::process(ctx, tx, ix),
        Instruction::AssociatedToken(ix) => associated_token::process(ctx, tx, ix),
        Instruction::TokenSale(ix) => token_sale::process(ctx, tx, ix),
    }
}
