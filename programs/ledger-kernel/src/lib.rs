// ================================
// Module Declarations
// ================================

pub mod address;
pub mod config;
pub mod deriver;
pub mod errors;
pub mod guards;
pub mod instructions;
pub mod processor;
pub mod state;

// ================================
// Public API Exports
// ================================

pub use address::Address;
pub use config::{LedgerConfig, ProgramIds};
pub use deriver::{AddressDeriver, ProgramAddress};
pub use errors::{KernelError, Result};
pub use guards::{authorize, Authority, ProxyAuthority, Signer, SignerSet};
pub use instructions::{
    AssociatedTokenInstruction, BlogInstruction, CounterInstruction, Instruction,
    PuppetInstruction, PuppetMasterInstruction, TokenInstruction, TokenSaleInstruction,
};
pub use processor::{Clock, InvokeContext, Ledger, Transaction};
pub use state::*;
