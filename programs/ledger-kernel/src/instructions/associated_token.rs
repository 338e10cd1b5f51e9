// Associated-token program
//
// Each (owner, mint) pair has exactly one canonical token account, derived
// from (owner, token program, mint). Creation is idempotent so callers can
// request it unconditionally before minting.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::{debug, info};

use crate::address::Address;
use crate::deriver::check_address;
use crate::errors::{require, KernelError, Result};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Mint, StoreTransaction, TokenAccount};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AssociatedTokenInstruction {
    Create {
        payer: Address,
        account: Address,
        owner: Address,
        mint: Address,
    },
}

impl AssociatedTokenInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::Create { payer, account, owner, mint } => vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(*account, false),
                AccountMeta::new_readonly(*owner, false),
                AccountMeta::new_readonly(*mint, false),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &AssociatedTokenInstruction,
) -> Result<()> {
    match instruction {
        AssociatedTokenInstruction::Create { payer, account, owner, mint } => {
            create_associated_account(ctx, tx, payer, account, owner, mint).map(|_| ())
        }
    }
}

/// Create the owner's token account for `mint` unless it already exists
///
/// Returns whether an account was created. An existing account is left
/// untouched, balance included.
pub fn create_associated_account(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    payer: &Address,
    account: &Address,
    owner: &Address,
    mint: &Address,
) -> Result<bool> {
    ctx.signers().require(payer)?;
    check_address(&ctx.deriver().associated_token_account(owner, mint)?, account)?;
    tx.read_as::<Mint>(mint)?;

    if tx.contains(account)? {
        let existing: TokenAccount = tx.read_as(account)?;
        require!(
            existing.owner == *owner && existing.mint == *mint,
            KernelError::InvalidRecordData(*account)
        );
        debug!(account = %account, "associated token account already exists");
        return Ok(false);
    }

    let token_program = ctx.config().programs.token;
    tx.create(
        &token_program,
        account,
        TokenAccount { owner: *owner, mint: *mint, amount: 0 },
    )?;
    info!(account = %account, owner = %owner, mint = %mint, "associated token account created");
    Ok(true)
}
