// Puppet-master program
//
// A controller owns a master address ("master", controller) under this
// program. Puppets created with that master address as their authority can
// then be driven through `PullStrings`, which proves the master derivation
// with a caller-supplied offset and calls into the puppet program.
// `PullOwnStrings` forwards the caller's own signature instead, for puppets
// whose authority is a plain identity.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::deriver::{check_address, MASTER_SEED};
use crate::errors::Result;
use crate::guards::Authority;
use crate::instructions::puppet;
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Master, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PuppetMasterInstruction {
    /// Record the controller behind its master address
    Initialize { master: Address, controller: Address },
    PullStrings {
        puppet: Address,
        master: Address,
        controller: Address,
        offset: u8,
        data: u64,
    },
    /// Drive a puppet whose authority is the signing caller itself
    PullOwnStrings {
        puppet: Address,
        authority: Address,
        data: u64,
    },
}

impl PuppetMasterInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::Initialize { master, controller } => vec![
                AccountMeta::new(*master, false),
                AccountMeta::new(*controller, true),
            ],
            Self::PullStrings { puppet, master, controller, .. } => vec![
                AccountMeta::new(*puppet, false),
                AccountMeta::new_readonly(*master, false),
                AccountMeta::new_readonly(*controller, true),
            ],
            Self::PullOwnStrings { puppet, authority, .. } => vec![
                AccountMeta::new(*puppet, false),
                AccountMeta::new_readonly(*authority, true),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &PuppetMasterInstruction,
) -> Result<()> {
    match instruction {
        PuppetMasterInstruction::Initialize { master, controller } => {
            ctx.signers().require(controller)?;
            check_address(&ctx.deriver().master(controller)?, master)?;
            tx.create(ctx.program_id(), master, Master { authority: *controller })?;
            info!(master = %master, controller = %controller, "master initialized");
            Ok(())
        }
        PuppetMasterInstruction::PullStrings { puppet, master, controller, offset, data } => {
            pull_strings(ctx, tx, puppet, master, controller, *offset, *data)
        }
        PuppetMasterInstruction::PullOwnStrings { puppet, authority, data } => {
            let signer = ctx.signers().require(authority)?;
            let callee = ctx.invoke(ctx.config().programs.puppet)?;
            puppet::set_data(&callee, tx, puppet, &Authority::Direct(signer), *data)?;
            info!(puppet = %puppet, authority = %authority, data, "strings pulled with forwarded signature");
            Ok(())
        }
    }
}

fn pull_strings(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    puppet_address: &Address,
    master: &Address,
    controller: &Address,
    offset: u8,
    data: u64,
) -> Result<()> {
    ctx.signers().require(controller)?;
    check_address(&ctx.deriver().master(controller)?, master)?;

    // The offset is taken as supplied; a wrong one fails at the puppet's gate
    let proxy = ctx.proxy(MASTER_SEED, *controller, offset);
    let callee = ctx.invoke(ctx.config().programs.puppet)?;
    puppet::set_data(&callee, tx, puppet_address, &Authority::Delegated(proxy), data)?;

    info!(puppet = %puppet_address, master = %master, data, "strings pulled");
    Ok(())
}
