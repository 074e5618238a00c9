use crate::domain::account::{
    Account, AccountKind, AssociateRole, BusinessProfile, Card, CardKind, CardStatus,
};
use crate::domain::exchange::ExchangeGraph;
use crate::domain::money::{Amount, Balance};
use crate::domain::operation::{AccountType, Operation, OperationOutcome};
use crate::domain::ports::{
    AccountStoreBox, ClockBox, CommerciantStoreBox, NumberFactoryBox, UserStoreBox,
};
use crate::domain::split::{Consent, SplitPaymentCoordinator};
use crate::domain::transaction::{TransactionKind, TransactionRecord};
use crate::domain::user::ServicePlan;
use crate::error::{BankError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;
use tracing::warn;

/// Who is acting on an account.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum SpenderRole {
    Owner,
    Manager,
    Employee,
}

/// Resolves the acting email against the account's owner and, for business
/// accounts, its associate roster. `None` means the actor has no access.
pub(crate) fn classify_spender(account: &Account, email: &str) -> Option<SpenderRole> {
    if account.owner == email {
        return Some(SpenderRole::Owner);
    }
    let profile = account.business()?;
    profile.associate(email).map(|a| match a.role {
        AssociateRole::Manager => SpenderRole::Manager,
        AssociateRole::Employee => SpenderRole::Employee,
    })
}

enum BusinessLimit {
    Spending,
    Deposit,
}

/// The main entry point of the back office.
///
/// `BankEngine` replays operations strictly sequentially: each handler
/// awaits every store access, so the full effect of operation *i* is visible
/// before operation *i + 1* starts. Business failures never surface as
/// `Err`; they become ledger records or error outcomes.
pub struct BankEngine {
    users: UserStoreBox,
    accounts: AccountStoreBox,
    commerciants: CommerciantStoreBox,
    clock: ClockBox,
    exchange: ExchangeGraph,
    splits: Mutex<SplitPaymentCoordinator>,
    numbers: Mutex<NumberFactoryBox>,
}

impl BankEngine {
    pub fn new(
        users: UserStoreBox,
        accounts: AccountStoreBox,
        commerciants: CommerciantStoreBox,
        exchange: ExchangeGraph,
        numbers: NumberFactoryBox,
        clock: ClockBox,
    ) -> Self {
        Self {
            users,
            accounts,
            commerciants,
            clock,
            exchange,
            splits: Mutex::new(SplitPaymentCoordinator::new()),
            numbers: Mutex::new(numbers),
        }
    }

    /// Executes one operation and returns what the driver should report.
    pub async fn process(&self, operation: Operation) -> Result<OperationOutcome> {
        match operation {
            Operation::AddAccount {
                timestamp,
                email,
                currency,
                account_type,
                interest_rate,
            } => {
                self.add_account(timestamp, &email, &currency, account_type, interest_rate)
                    .await
            }
            Operation::CreateCard {
                timestamp,
                email,
                account,
            } => {
                self.create_card(timestamp, &email, &account, CardKind::Regular)
                    .await
            }
            Operation::CreateOneTimeCard {
                timestamp,
                email,
                account,
            } => {
                self.create_card(timestamp, &email, &account, CardKind::OneTime)
                    .await
            }
            Operation::AddFunds {
                timestamp: _,
                email,
                account,
                amount,
            } => self.add_funds(&email, &account, amount).await,
            Operation::DeleteAccount {
                timestamp,
                email,
                account,
            } => self.delete_account(timestamp, &email, &account).await,
            Operation::DeleteCard {
                timestamp,
                email,
                card_number,
            } => self.delete_card(timestamp, &email, &card_number).await,
            Operation::SetMinimumBalance {
                timestamp: _,
                account,
                amount,
            } => self.set_minimum_balance(&account, amount).await,
            Operation::SetAlias {
                timestamp: _,
                email,
                alias,
                account,
            } => self.set_alias(&email, &alias, &account).await,
            Operation::CheckCardStatus {
                timestamp,
                card_number,
            } => self.check_card_status(timestamp, &card_number).await,
            Operation::PayOnline {
                timestamp,
                email,
                card_number,
                amount,
                currency,
                commerciant,
                description: _,
            } => {
                self.pay_online(timestamp, &email, &card_number, amount, &currency, &commerciant)
                    .await
            }
            Operation::SendMoney {
                timestamp,
                email,
                account,
                receiver,
                amount,
                description,
            } => {
                self.send_money(
                    timestamp,
                    &email,
                    &account,
                    &receiver,
                    amount,
                    description.unwrap_or_default(),
                )
                .await
            }
            Operation::CashWithdrawal {
                timestamp,
                email,
                card_number,
                amount,
            } => {
                self.cash_withdrawal(timestamp, &email, &card_number, amount)
                    .await
            }
            Operation::AddInterest { timestamp, account } => {
                self.add_interest(timestamp, &account).await
            }
            Operation::ChangeInterestRate {
                timestamp,
                account,
                interest_rate,
            } => {
                self.change_interest_rate(timestamp, &account, interest_rate)
                    .await
            }
            Operation::WithdrawSavings {
                timestamp,
                account,
                amount,
                currency,
            } => {
                self.withdraw_savings(timestamp, &account, amount, &currency)
                    .await
            }
            Operation::UpgradePlan {
                timestamp,
                account,
                new_plan_type,
            } => self.upgrade_plan(timestamp, &account, new_plan_type).await,
            Operation::SplitPayment {
                timestamp,
                split_payment_type,
                accounts,
                amount,
                amounts,
                currency,
            } => {
                self.create_split(timestamp, split_payment_type, &accounts, amount, amounts, &currency)
                    .await
            }
            Operation::AcceptSplitPayment {
                timestamp: _,
                email,
                split_payment_type,
            } => {
                self.respond_split(&email, split_payment_type, Consent::Accepted)
                    .await
            }
            Operation::RejectSplitPayment {
                timestamp: _,
                email,
                split_payment_type,
            } => {
                self.respond_split(&email, split_payment_type, Consent::Rejected)
                    .await
            }
            Operation::Report {
                timestamp: _,
                account,
                start_timestamp,
                end_timestamp,
            } => self.report(&account, start_timestamp, end_timestamp).await,
            Operation::SpendingsReport {
                timestamp: _,
                account,
                start_timestamp,
                end_timestamp,
            } => {
                self.spendings_report(&account, start_timestamp, end_timestamp)
                    .await
            }
            Operation::AddNewBusinessAssociate {
                timestamp: _,
                account,
                role,
                email,
            } => self.add_business_associate(&account, role, &email).await,
            Operation::ChangeSpendingLimit {
                timestamp: _,
                account,
                amount,
                email,
            } => {
                self.change_business_limit(&account, amount, &email, BusinessLimit::Spending)
                    .await
            }
            Operation::ChangeDepositLimit {
                timestamp: _,
                account,
                amount,
                email,
            } => {
                self.change_business_limit(&account, amount, &email, BusinessLimit::Deposit)
                    .await
            }
        }
    }

    /// Final state of every account, in creation order.
    pub async fn accounts_snapshot(&self) -> Result<Vec<Account>> {
        self.accounts.all().await
    }

    pub(crate) fn exchange(&self) -> &ExchangeGraph {
        &self.exchange
    }

    pub(crate) fn accounts(&self) -> &AccountStoreBox {
        &self.accounts
    }

    pub(crate) fn users(&self) -> &UserStoreBox {
        &self.users
    }

    pub(crate) fn commerciants(&self) -> &CommerciantStoreBox {
        &self.commerciants
    }

    pub(crate) fn clock(&self) -> &ClockBox {
        &self.clock
    }

    pub(crate) fn splits(&self) -> &Mutex<SplitPaymentCoordinator> {
        &self.splits
    }

    pub(crate) async fn mint_card_number(&self) -> String {
        self.numbers.lock().await.next_card_number()
    }

    /// Service plan of the account's owner. A validated account whose owner
    /// is missing from the registry is a broken invariant, not a business
    /// failure.
    pub(crate) async fn plan_of(&self, account: &Account) -> Result<ServicePlan> {
        let owner = self.users.get(&account.owner).await?.ok_or_else(|| {
            BankError::Storage(format!("owner {} is not registered", account.owner))
        })?;
        Ok(owner.plan)
    }

    /// Appends the record to the account's ledger and to the acting user's
    /// personal ledger. The caller still owns storing the account.
    pub(crate) async fn append_record(
        &self,
        account: &mut Account,
        actor: &str,
        record: TransactionRecord,
    ) -> Result<()> {
        account.ledger.append(record.clone());
        if let Some(mut user) = self.users.get(actor).await? {
            user.record(record);
            self.users.store(user).await?;
        }
        Ok(())
    }

    async fn add_account(
        &self,
        timestamp: u64,
        email: &str,
        currency: &str,
        account_type: AccountType,
        interest_rate: Option<Decimal>,
    ) -> Result<OperationOutcome> {
        let Some(mut user) = self.users.get(email).await? else {
            return Ok(OperationOutcome::error("User not found"));
        };

        let kind = match account_type {
            AccountType::Classic => AccountKind::Classic,
            AccountType::Savings => AccountKind::Savings {
                interest_rate: interest_rate.unwrap_or_default(),
            },
            AccountType::Business => {
                // Spend/deposit limits start at the equivalent of 500 RON.
                let rate = self.exchange.convert("RON", currency);
                let limit = if rate.is_zero() {
                    dec!(500)
                } else {
                    dec!(500) * rate
                };
                AccountKind::Business(BusinessProfile::new(limit))
            }
        };

        let iban = self.numbers.lock().await.next_iban();
        let mut account = Account::new(&iban, currency, email, kind);
        let record =
            TransactionRecord::new(timestamp, "New account created", TransactionKind::AccountCreated);
        account.ledger.append(record.clone());
        user.record(record);
        user.attach_account(&iban);

        self.users.store(user).await?;
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn create_card(
        &self,
        timestamp: u64,
        email: &str,
        iban: &str,
        kind: CardKind,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.get(iban).await? else {
            warn!(iban, "createCard for unknown account ignored");
            return Ok(OperationOutcome::None);
        };
        if classify_spender(&account, email).is_none() {
            warn!(iban, email, "createCard by a stranger ignored");
            return Ok(OperationOutcome::None);
        }

        let number = self.numbers.lock().await.next_card_number();
        account.cards.push(Card::new(number.clone(), kind, email));
        let record = TransactionRecord::new(
            timestamp,
            "New card created",
            TransactionKind::CardCreated {
                card: number,
                holder: email.to_string(),
                account: iban.to_string(),
            },
        );
        self.append_record(&mut account, email, record).await?;
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn add_funds(&self, email: &str, iban: &str, amount: Decimal) -> Result<OperationOutcome> {
        let Ok(amount) = Amount::new(amount) else {
            return Ok(OperationOutcome::None);
        };
        let Some(mut account) = self.accounts.get(iban).await? else {
            warn!(iban, "addFunds for unknown account ignored");
            return Ok(OperationOutcome::None);
        };

        let is_owner = account.owner == email;
        if let Some(profile) = account.business_mut()
            && !is_owner
        {
            let deposit_limit = profile.deposit_limit.value();
            let Some(associate) = profile.associate_mut(email) else {
                warn!(iban, email, "deposit by a stranger ignored");
                return Ok(OperationOutcome::None);
            };
            if associate.role == AssociateRole::Employee && amount.value() > deposit_limit {
                warn!(iban, email, "employee deposit over the limit ignored");
                return Ok(OperationOutcome::None);
            }
            associate.deposited += Balance::new(amount.value());
        }

        account.credit(amount.value());
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn delete_account(
        &self,
        timestamp: u64,
        email: &str,
        iban: &str,
    ) -> Result<OperationOutcome> {
        let Some(account) = self.accounts.get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        if account.owner != email {
            return Ok(OperationOutcome::error("Account not found"));
        }

        if !account.balance.is_zero() {
            // The account survives; the refusal lands in the user's history.
            if let Some(mut user) = self.users.get(email).await? {
                user.record(TransactionRecord::new(
                    timestamp,
                    "Account couldn't be deleted - there are funds remaining",
                    TransactionKind::AccountNotDeleted,
                ));
                self.users.store(user).await?;
            }
            return Ok(OperationOutcome::error(
                "Account couldn't be deleted - see account transactions for details",
            ));
        }

        self.accounts.remove(iban).await?;
        if let Some(mut user) = self.users.get(email).await? {
            user.detach_account(iban);
            self.users.store(user).await?;
        }
        Ok(OperationOutcome::Success {
            description: "Account deleted".to_string(),
        })
    }

    async fn delete_card(
        &self,
        timestamp: u64,
        email: &str,
        number: &str,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.find_by_card(number).await? else {
            warn!(number, "deleteCard for unknown card ignored");
            return Ok(OperationOutcome::None);
        };
        if classify_spender(&account, email).is_none() {
            warn!(number, email, "deleteCard by a stranger ignored");
            return Ok(OperationOutcome::None);
        }

        if account.remove_card(number).is_some() {
            let record = TransactionRecord::new(
                timestamp,
                "The card has been destroyed",
                TransactionKind::CardDestroyed {
                    card: number.to_string(),
                    holder: email.to_string(),
                    account: account.iban.clone(),
                },
            );
            self.append_record(&mut account, email, record).await?;
            self.accounts.store(account).await?;
        }
        Ok(OperationOutcome::None)
    }

    async fn set_minimum_balance(&self, iban: &str, amount: Decimal) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        account.minimum_balance = Balance::new(amount);
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn set_alias(&self, email: &str, alias: &str, iban: &str) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.get(iban).await? else {
            warn!(iban, "setAlias for unknown account ignored");
            return Ok(OperationOutcome::None);
        };
        if account.owner != email {
            warn!(iban, email, "setAlias by a stranger ignored");
            return Ok(OperationOutcome::None);
        }
        account.alias = Some(alias.to_string());
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn check_card_status(&self, timestamp: u64, number: &str) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.find_by_card(number).await? else {
            return Ok(OperationOutcome::error("Card not found"));
        };

        if account.balance.value() <= account.minimum_balance.value() {
            let owner = account.owner.clone();
            if let Some(card) = account.card_mut(number) {
                card.status = CardStatus::Frozen;
            }
            let record = TransactionRecord::new(
                timestamp,
                "You have reached the minimum amount of funds, the card will be frozen",
                TransactionKind::MinBalanceWarning,
            );
            self.append_record(&mut account, &owner, record).await?;
            self.accounts.store(account).await?;
        }
        Ok(OperationOutcome::None)
    }

    async fn add_business_associate(
        &self,
        iban: &str,
        role: AssociateRole,
        email: &str,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        let is_owner = account.owner == email;
        let Some(profile) = account.business_mut() else {
            return Ok(OperationOutcome::error("This is not a business account"));
        };
        if is_owner {
            warn!(iban, email, "owner cannot be added as an associate");
            return Ok(OperationOutcome::None);
        }
        profile.add_associate(email, role);
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }

    async fn change_business_limit(
        &self,
        iban: &str,
        amount: Decimal,
        email: &str,
        limit: BusinessLimit,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts.get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        let is_owner = account.owner == email;
        let Some(profile) = account.business_mut() else {
            return Ok(OperationOutcome::error("This is not a business account"));
        };
        if !is_owner {
            return Ok(OperationOutcome::error(match limit {
                BusinessLimit::Spending => {
                    "You must be owner in order to change spending limit."
                }
                BusinessLimit::Deposit => "You must be owner in order to change deposit limit.",
            }));
        }
        match limit {
            BusinessLimit::Spending => profile.spending_limit = Balance::new(amount),
            BusinessLimit::Deposit => profile.deposit_limit = Balance::new(amount),
        }
        self.accounts.store(account).await?;
        Ok(OperationOutcome::None)
    }
}
