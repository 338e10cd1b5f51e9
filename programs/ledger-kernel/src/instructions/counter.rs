// Counter program
//
// One counter per owner at ("account", owner). Every mutation re-derives the
// counter address from the stored authority and requires that authority's
// signature.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::deriver::check_address;
use crate::errors::{KernelError, Result};
use crate::guards::{authorize, Authority};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Counter, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum CounterInstruction {
    /// Create the owner's counter at zero; the owner signs and pays
    Initialize { counter: Address, authority: Address },
    Increase { counter: Address, authority: Address },
    Decrease { counter: Address, authority: Address },
    Set { counter: Address, authority: Address, value: u64 },
}

impl CounterInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::Initialize { counter, authority } => vec![
                AccountMeta::new(*counter, false),
                AccountMeta::new(*authority, true),
            ],
            Self::Increase { counter, authority }
            | Self::Decrease { counter, authority }
            | Self::Set { counter, authority, .. } => vec![
                AccountMeta::new(*counter, false),
                AccountMeta::new_readonly(*authority, true),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &CounterInstruction,
) -> Result<()> {
    match instruction {
        CounterInstruction::Initialize { counter, authority } => initialize(ctx, tx, counter, authority),
        CounterInstruction::Increase { counter, authority } => {
            mutate(ctx, tx, counter, authority, |data| {
                data.checked_add(1).ok_or(KernelError::Overflow)
            })
        }
        CounterInstruction::Decrease { counter, authority } => {
            mutate(ctx, tx, counter, authority, |data| {
                data.checked_sub(1).ok_or(KernelError::Underflow)
            })
        }
        CounterInstruction::Set { counter, authority, value } => {
            mutate(ctx, tx, counter, authority, |_| Ok(*value))
        }
    }
}

fn initialize(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    counter: &Address,
    authority: &Address,
) -> Result<()> {
    ctx.signers().require(authority)?;
    check_address(&ctx.deriver().counter(authority)?, counter)?;

    tx.create(ctx.program_id(), counter, Counter { authority: *authority, data: 0 })?;
    info!(counter = %counter, authority = %authority, "counter initialized");
    Ok(())
}

fn mutate<F>(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    counter: &Address,
    authority: &Address,
    apply: F,
) -> Result<()>
where
    F: FnOnce(u64) -> Result<u64>,
{
    let current: Counter = tx.read_as(counter)?;
    check_address(&ctx.deriver().counter(&current.authority)?, counter)?;
    let signer = ctx.signers().require(authority)?;
    authorize(&current.authority, &Authority::Direct(signer))?;

    let updated = tx.update::<Counter, _>(ctx.program_id(), counter, |record| {
        record.data = apply(record.data)?;
        Ok(())
    })?;
    info!(counter = %counter, from = current.data, to = updated.data, "counter changed");
    Ok(())
}
