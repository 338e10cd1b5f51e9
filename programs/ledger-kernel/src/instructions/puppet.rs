// Puppet program
//
// A puppet holds one integer and an authority fixed at creation. The
// authority may be a plain identity or a derived address controlled by
// another program, in which case only that program can reach `set_data`.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::deriver::check_address;
use crate::errors::Result;
use crate::guards::{authorize, Authority};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Puppet, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PuppetInstruction {
    /// Create the puppet for `authority`; `payer` signs, `authority` need not
    Initialize {
        puppet: Address,
        payer: Address,
        authority: Address,
    },
    SetData {
        puppet: Address,
        authority: Address,
        data: u64,
    },
}

impl PuppetInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::Initialize { puppet, payer, authority } => vec![
                AccountMeta::new(*puppet, false),
                AccountMeta::new(*payer, true),
                AccountMeta::new_readonly(*authority, false),
            ],
            Self::SetData { puppet, authority, .. } => vec![
                AccountMeta::new(*puppet, false),
                AccountMeta::new_readonly(*authority, true),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &PuppetInstruction,
) -> Result<()> {
    match instruction {
        PuppetInstruction::Initialize { puppet, payer, authority } => {
            ctx.signers().require(payer)?;
            check_address(&ctx.deriver().puppet(authority)?, puppet)?;
            tx.create(ctx.program_id(), puppet, Puppet { authority: *authority, data: 0 })?;
            info!(puppet = %puppet, authority = %authority, "puppet initialized");
            Ok(())
        }
        PuppetInstruction::SetData { puppet, authority, data } => {
            let signer = ctx.signers().require(authority)?;
            set_data(ctx, tx, puppet, &Authority::Direct(signer), *data)
        }
    }
}

/// Overwrite the puppet's data; also the entry point for cross-program calls
pub fn set_data(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    puppet: &Address,
    authority: &Authority,
    data: u64,
) -> Result<()> {
    let current: Puppet = tx.read_as(puppet)?;
    check_address(&ctx.deriver().puppet(&current.authority)?, puppet)?;
    authorize(&current.authority, authority)?;

    tx.update::<Puppet, _>(ctx.program_id(), puppet, |record| {
        record.data = data;
        Ok(())
    })?;
    info!(puppet = %puppet, from = current.data, to = data, depth = ctx.depth(), "puppet data set");
    Ok(())
}
