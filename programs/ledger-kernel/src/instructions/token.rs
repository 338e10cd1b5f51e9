// Token program (the subset the sale needs)
//
// Mints live at key-controlled identities that sign their own
// initialization. Token accounts are created by the associated-token program
// but owned by this one, so only `mint_to` here can change a balance.

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::errors::{require, KernelError, Result};
use crate::guards::{authorize, Authority};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Mint, StoreTransaction, TokenAccount};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TokenInstruction {
    InitializeMint {
        mint: Address,
        mint_authority: Address,
        decimals: u8,
    },
    SetMintAuthority {
        mint: Address,
        current_authority: Address,
        new_authority: Address,
    },
    MintTo {
        mint: Address,
        destination: Address,
        mint_authority: Address,
        amount: u64,
    },
}

impl TokenInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::InitializeMint { mint, .. } => vec![AccountMeta::new(*mint, true)],
            Self::SetMintAuthority { mint, current_authority, .. } => vec![
                AccountMeta::new(*mint, false),
                AccountMeta::new_readonly(*current_authority, true),
            ],
            Self::MintTo { mint, destination, mint_authority, .. } => vec![
                AccountMeta::new(*mint, false),
                AccountMeta::new(*destination, false),
                AccountMeta::new_readonly(*mint_authority, true),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &TokenInstruction,
) -> Result<()> {
    match instruction {
        TokenInstruction::InitializeMint { mint, mint_authority, decimals } => {
            ctx.signers().require(mint)?;
            tx.create(
                ctx.program_id(),
                mint,
                Mint { mint_authority: *mint_authority, supply: 0, decimals: *decimals },
            )?;
            info!(mint = %mint, mint_authority = %mint_authority, decimals, "mint initialized");
            Ok(())
        }
        TokenInstruction::SetMintAuthority { mint, current_authority, new_authority } => {
            let current: Mint = tx.read_as(mint)?;
            let signer = ctx.signers().require(current_authority)?;
            authorize(&current.mint_authority, &Authority::Direct(signer))?;
            tx.reassign::<Mint, _>(ctx.program_id(), mint, |record| {
                record.mint_authority = *new_authority;
                Ok(())
            })?;
            info!(mint = %mint, from = %current.mint_authority, to = %new_authority, "mint authority changed");
            Ok(())
        }
        TokenInstruction::MintTo { mint, destination, mint_authority, amount } => {
            let signer = ctx.signers().require(mint_authority)?;
            mint_to(ctx, tx, mint, destination, &Authority::Direct(signer), *amount)
        }
    }
}

/// Mint `amount` into `destination`; also the entry point for cross-program calls
pub fn mint_to(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    mint: &Address,
    destination: &Address,
    authority: &Authority,
    amount: u64,
) -> Result<()> {
    let current: Mint = tx.read_as(mint)?;
    authorize(&current.mint_authority, authority)?;

    let account: TokenAccount = tx.read_as(destination)?;
    require!(
        account.mint == *mint,
        KernelError::InvalidInstruction(format!("token account {destination} holds another mint"))
    );
    let supply = current.supply.checked_add(amount).ok_or(KernelError::Overflow)?;
    let balance = account.amount.checked_add(amount).ok_or(KernelError::Overflow)?;

    tx.update::<Mint, _>(ctx.program_id(), mint, |record| {
        record.supply = supply;
        Ok(())
    })?;
    tx.update::<TokenAccount, _>(ctx.program_id(), destination, |record| {
        record.amount = balance;
        Ok(())
    })?;
    info!(mint = %mint, destination = %destination, amount, balance, "tokens minted");
    Ok(())
}
