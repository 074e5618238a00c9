#![allow(dead_code)]

use chrono::NaiveDate;
use minibank::application::engine::BankEngine;
use minibank::domain::account::Account;
use minibank::domain::commerciant::{CashbackKind, Commerciant};
use minibank::domain::exchange::ExchangeGraph;
use minibank::domain::operation::{AccountType, Operation, OperationOutcome};
use minibank::domain::ports::{AccountStore, CommerciantStore, UserStore};
use minibank::domain::transaction::TransactionKind;
use minibank::domain::user::User;
use minibank::infrastructure::clock::FixedClock;
use minibank::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryCommerciantStore, InMemoryUserStore,
};
use minibank::infrastructure::numbers::SeededNumbers;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Engine plus handles onto the same stores it mutates.
pub struct Harness {
    pub engine: BankEngine,
    pub users: InMemoryUserStore,
    pub accounts: InMemoryAccountStore,
}

/// Standard fixture: three users (Carmen is 17 on the fixed date), three
/// commerciants covering both cashback strategies, EUR/USD/RON rates.
pub async fn harness() -> Harness {
    let users = InMemoryUserStore::new();
    let accounts = InMemoryAccountStore::new();
    let commerciants = InMemoryCommerciantStore::new();

    for (first, last, email, birth, occupation) in [
        ("Ana", "Pop", "ana@minibank.ro", (1999, 4, 12), "engineer"),
        ("Bogdan", "Ionescu", "bogdan@minibank.ro", (2001, 9, 30), "student"),
        ("Carmen", "Dinu", "carmen@minibank.ro", (2008, 1, 15), "student"),
    ] {
        let birth = NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap();
        users
            .store(User::new(first, last, email, birth, occupation))
            .await
            .unwrap();
    }

    for (name, id, settlement, category, cashback) in [
        (
            "Corner Shop",
            1,
            Some("RO99SHOP"),
            "Food",
            CashbackKind::TransactionCount,
        ),
        ("MegaMall", 2, None, "Clothes", CashbackKind::SpendingThreshold),
        ("ByteStore", 3, None, "Tech", CashbackKind::TransactionCount),
    ] {
        commerciants
            .store(Commerciant {
                name: name.to_string(),
                id,
                settlement_iban: settlement.map(str::to_string),
                category: category.to_string(),
                cashback,
            })
            .await
            .unwrap();
    }

    let mut exchange = ExchangeGraph::new();
    exchange.add_rate("EUR", "RON", dec!(5.0));
    exchange.add_rate("USD", "RON", dec!(4.0));
    exchange.materialize_inverses();

    let engine = BankEngine::new(
        Box::new(users.clone()),
        Box::new(accounts.clone()),
        Box::new(commerciants),
        exchange,
        Box::new(SeededNumbers::new(7)),
        Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())),
    );

    Harness {
        engine,
        users,
        accounts,
    }
}

impl Harness {
    pub async fn run(&self, operation: Operation) -> OperationOutcome {
        self.engine.process(operation).await.unwrap()
    }

    /// Opens an account of the given type and returns its IBAN, optionally
    /// funding it in the same breath.
    pub async fn open_account(
        &self,
        timestamp: u64,
        email: &str,
        currency: &str,
        account_type: AccountType,
        interest_rate: Option<Decimal>,
        funds: Decimal,
    ) -> String {
        self.run(Operation::AddAccount {
            timestamp,
            email: email.to_string(),
            currency: currency.to_string(),
            account_type,
            interest_rate,
        })
        .await;
        let iban = self.last_iban_of(email).await;
        if funds > Decimal::ZERO {
            self.run(Operation::AddFunds {
                timestamp,
                email: email.to_string(),
                account: iban.clone(),
                amount: funds,
            })
            .await;
        }
        iban
    }

    pub async fn open_classic(
        &self,
        timestamp: u64,
        email: &str,
        currency: &str,
        funds: Decimal,
    ) -> String {
        self.open_account(timestamp, email, currency, AccountType::Classic, None, funds)
            .await
    }

    /// Issues a card on the account and returns its number.
    pub async fn issue_card(&self, timestamp: u64, email: &str, iban: &str, one_time: bool) -> String {
        let operation = if one_time {
            Operation::CreateOneTimeCard {
                timestamp,
                email: email.to_string(),
                account: iban.to_string(),
            }
        } else {
            Operation::CreateCard {
                timestamp,
                email: email.to_string(),
                account: iban.to_string(),
            }
        };
        self.run(operation).await;
        self.account(iban)
            .await
            .cards
            .last()
            .expect("card was issued")
            .number
            .clone()
    }

    pub async fn account(&self, iban: &str) -> Account {
        self.accounts.get(iban).await.unwrap().expect("account exists")
    }

    pub async fn user(&self, email: &str) -> User {
        self.users.get(email).await.unwrap().expect("user exists")
    }

    pub async fn last_iban_of(&self, email: &str) -> String {
        self.user(email)
            .await
            .accounts
            .last()
            .expect("user owns an account")
            .clone()
    }

    pub async fn balance(&self, iban: &str) -> Decimal {
        self.account(iban).await.balance.value()
    }
}

/// Counts ledger records matching a predicate on the kind.
pub fn count_kinds<'a>(
    records: impl Iterator<Item = &'a minibank::domain::transaction::TransactionRecord>,
    predicate: impl Fn(&TransactionKind) -> bool,
) -> usize {
    records.filter(|record| predicate(&record.kind)).count()
}
