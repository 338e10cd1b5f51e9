// Token-sale program
//
// The sale owns a mint through the derived address ("MINT_AUTHORITY", mint).
// A purchase pays lamports to that address and mints tokens at a fixed rate
// into the payer's associated token account, creating the account on first
// purchase. Minting goes through the token program with the mint authority
// proven by derivation, since the derived address has no key to sign with.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::deriver::MINT_AUTHORITY_SEED;
use crate::errors::{require, KernelError, Result};
use crate::guards::{authorize, Authority};
use crate::instructions::{associated_token, token};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Mint, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TokenSaleInstruction {
    Purchase {
        payer: Address,
        mint: Address,
        mint_authority: Address,
        token_account: Address,
        offset: u8,
        lamports: u64,
    },
}

impl TokenSaleInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::Purchase { payer, mint, mint_authority, token_account, .. } => vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(*mint, false),
                AccountMeta::new(*mint_authority, false),
                AccountMeta::new(*token_account, false),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &TokenSaleInstruction,
) -> Result<()> {
    match instruction {
        TokenSaleInstruction::Purchase {
            payer,
            mint,
            mint_authority,
            token_account,
            offset,
            lamports,
        } => purchase(ctx, tx, payer, mint, mint_authority, token_account, *offset, *lamports),
    }
}

/// Tokens bought for `lamports` at the configured rate
pub fn tokens_for(ctx: &InvokeContext<'_>, lamports: u64) -> Result<u64> {
    lamports
        .checked_mul(ctx.config().tokens_per_lamport)
        .ok_or(KernelError::Overflow)
}

#[allow(clippy::too_many_arguments)]
fn purchase(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    payer: &Address,
    mint: &Address,
    mint_authority: &Address,
    token_account: &Address,
    offset: u8,
    lamports: u64,
) -> Result<()> {
    ctx.signers().require(payer)?;
    let current: Mint = tx.read_as(mint)?;

    let proxy = ctx.proxy(MINT_AUTHORITY_SEED, *mint, offset);
    let authority = Authority::Delegated(proxy);
    authorize(&current.mint_authority, &authority)?;
    require!(
        *mint_authority == current.mint_authority,
        KernelError::AddressMismatch {
            expected: current.mint_authority,
            supplied: *mint_authority,
        }
    );

    let tokens = tokens_for(ctx, lamports)?;
    tx.transfer(payer, mint_authority, lamports)?;

    let ata_program = ctx.invoke(ctx.config().programs.associated_token)?;
    associated_token::create_associated_account(&ata_program, tx, payer, token_account, payer, mint)?;

    let token_program = ctx.invoke(ctx.config().programs.token)?;
    token::mint_to(&token_program, tx, mint, token_account, &authority, tokens)?;

    info!(payer = %payer, mint = %mint, lamports, tokens, "purchase settled");
    Ok(())
}
