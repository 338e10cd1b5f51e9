use ledger_kernel::config::DEFAULT_TOKENS_PER_LAMPORT as RATE;
use ledger_kernel::{
    Address, Instruction, KernelError, Ledger, Mint, TokenAccount, TokenInstruction,
    TokenSaleInstruction,
};
use proptest::prelude::*;

mod support;

const MAX_LAMPORTS: u64 = 1_000_000_000_000;

struct Sale {
    ledger: Ledger,
    payer: Address,
    mint: Address,
    mint_authority: Address,
    token_account: Address,
    offset: u8,
}

fn sale(balance: u64) -> Sale {
    let mut ledger = support::ledger();
    let mint = support::identity(1_000_003);
    let payer = support::identity(7);
    let derived = ledger.deriver().mint_authority(&mint).unwrap();
    let token_account = ledger.deriver().associated_token_account(&payer, &mint).unwrap().address;
    support::send(
        &mut ledger,
        &[mint],
        vec![Instruction::Token(TokenInstruction::InitializeMint {
            mint,
            mint_authority: derived.address,
            decimals: 9,
        })],
    )
    .unwrap();
    ledger.deposit(&payer, balance).unwrap();
    Sale { ledger, payer, mint, mint_authority: derived.address, token_account, offset: derived.offset }
}

impl Sale {
    fn purchase(&mut self, lamports: u64) -> Result<(), KernelError> {
        let instruction = Instruction::TokenSale(TokenSaleInstruction::Purchase {
            payer: self.payer,
            mint: self.mint,
            mint_authority: self.mint_authority,
            token_account: self.token_account,
            offset: self.offset,
            lamports,
        });
        support::send(&mut self.ledger, &[self.payer], vec![instruction])
    }

    fn tokens(&self) -> Option<u64> {
        self.ledger
            .store()
            .read_as::<TokenAccount>(&self.token_account)
            .ok()
            .map(|account| account.amount)
    }
}

/// Property: a purchase either settles completely or leaves no trace
#[test]
fn prop_purchase_is_all_or_nothing() {
    proptest!(ProptestConfig::with_cases(64), |(balance in 0..MAX_LAMPORTS, lamports in 0..2 * MAX_LAMPORTS)| {
        let mut sale = sale(balance);
        let result = sale.purchase(lamports);

        if lamports <= balance {
            prop_assert!(result.is_ok());
            prop_assert_eq!(sale.ledger.store().lamports(&sale.payer), balance - lamports);
            prop_assert_eq!(sale.ledger.store().lamports(&sale.mint_authority), lamports);
            prop_assert_eq!(sale.tokens(), Some(lamports * RATE));
        } else {
            prop_assert_eq!(
                result,
                Err(KernelError::InsufficientFunds { requested: lamports, available: balance })
            );
            prop_assert_eq!(sale.ledger.store().lamports(&sale.payer), balance);
            prop_assert_eq!(sale.ledger.store().lamports(&sale.mint_authority), 0);
            prop_assert_eq!(sale.tokens(), None);
            prop_assert_eq!(sale.ledger.store().read_as::<Mint>(&sale.mint).unwrap().supply, 0);
        }
    });
}

/// Property: repeat purchases accumulate instead of resetting the token account
#[test]
fn prop_purchases_accumulate() {
    proptest!(ProptestConfig::with_cases(64), |(first in 0..MAX_LAMPORTS, second in 0..MAX_LAMPORTS)| {
        let mut sale = sale(first + second);
        sale.purchase(first).unwrap();
        sale.purchase(second).unwrap();

        prop_assert_eq!(sale.tokens(), Some((first + second) * RATE));
        prop_assert_eq!(sale.ledger.store().lamports(&sale.payer), 0);
        prop_assert_eq!(
            sale.ledger.store().read_as::<Mint>(&sale.mint).unwrap().supply,
            (first + second) * RATE
        );
    });
}
