use super::engine::{BankEngine, SpenderRole, classify_spender};
use crate::domain::account::{Account, Card, CardKind, CardStatus};
use crate::domain::cashback;
use crate::domain::commerciant::Commerciant;
use crate::domain::commission::with_commission;
use crate::domain::money::{Amount, Balance};
use crate::domain::operation::OperationOutcome;
use crate::domain::transaction::{TransactionKind, TransactionRecord};
use crate::domain::user::ServicePlan;
use crate::error::{BankError, Result};
use rust_decimal::Decimal;
use tracing::{debug, warn};

enum Receiver {
    Account(Account, Decimal),
    Commerciant(Commerciant),
}

impl BankEngine {
    pub(crate) async fn pay_online(
        &self,
        timestamp: u64,
        email: &str,
        card_number: &str,
        amount: Decimal,
        currency: &str,
        commerciant_name: &str,
    ) -> Result<OperationOutcome> {
        // Zero and negative amounts are silently ignored.
        let Ok(amount) = Amount::new(amount) else {
            return Ok(OperationOutcome::None);
        };
        let Some(mut account) = self.accounts().find_by_card(card_number).await? else {
            return Ok(OperationOutcome::error("Card not found"));
        };
        let Some(role) = classify_spender(&account, email) else {
            return Ok(OperationOutcome::error("Card not found"));
        };
        let Some(commerciant) = self.commerciants().get(commerciant_name).await? else {
            return Ok(OperationOutcome::error("Commerciant not found"));
        };

        if account.card(card_number).is_some_and(Card::is_frozen) {
            let record =
                TransactionRecord::new(timestamp, "The card is frozen", TransactionKind::CardFrozen);
            self.append_record(&mut account, email, record).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }

        let rate = self.exchange().convert(currency, &account.currency);
        if rate.is_zero() {
            return Ok(OperationOutcome::error("Exchange rates unavailable"));
        }
        let local_amount = amount.value() * rate;
        let plan = self.plan_of(&account).await?;
        let total = with_commission(local_amount, plan, &account.currency, self.exchange());

        if role == SpenderRole::Employee
            && let Some(profile) = account.business()
            && local_amount > profile.spending_limit.value()
        {
            warn!(email, iban = %account.iban, "employee payment over the spending limit ignored");
            return Ok(OperationOutcome::None);
        }

        if !account.try_debit(total) {
            let record = TransactionRecord::new(
                timestamp,
                "Insufficient funds",
                TransactionKind::InsufficientFunds,
            );
            self.append_record(&mut account, email, record).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }

        let record = TransactionRecord::new(
            timestamp,
            "Card payment",
            TransactionKind::CardPayment {
                amount: local_amount,
                commerciant: commerciant.name.clone(),
            },
        );
        self.append_record(&mut account, email, record).await?;

        if role != SpenderRole::Owner
            && let Some(profile) = account.business_mut()
            && let Some(associate) = profile.associate_mut(email)
        {
            associate.spent += Balance::new(local_amount);
        }

        // A debit that lands exactly on the floor freezes the card.
        if account.balance.value() <= account.minimum_balance.value() {
            if let Some(card) = account.card_mut(card_number) {
                card.status = CardStatus::Frozen;
            }
            let record = TransactionRecord::new(
                timestamp,
                "You have reached the minimum amount of funds, the card will be frozen",
                TransactionKind::MinBalanceWarning,
            );
            self.append_record(&mut account, email, record).await?;
        }

        self.settle_commerce(&mut account, &commerciant, local_amount, plan);

        if account.card(card_number).map(|c| c.kind) == Some(CardKind::OneTime) {
            self.cycle_one_time_card(&mut account, card_number, timestamp)
                .await?;
        }

        self.accounts().store(account).await?;
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn send_money(
        &self,
        timestamp: u64,
        email: &str,
        sender_key: &str,
        receiver_key: &str,
        amount: Decimal,
        description: String,
    ) -> Result<OperationOutcome> {
        let Ok(amount) = Amount::new(amount) else {
            return Ok(OperationOutcome::None);
        };
        let Some(mut sender) = self.accounts().resolve(sender_key).await? else {
            return Ok(OperationOutcome::error("User not found"));
        };
        let Some(role) = classify_spender(&sender, email) else {
            return Ok(OperationOutcome::error("User not found"));
        };

        // Resolve the receiving side before any mutation: an account by IBAN
        // or alias, otherwise a commerciant by settlement IBAN.
        let receiver = if let Some(account) = self.accounts().resolve(receiver_key).await? {
            let rate = self.exchange().convert(&sender.currency, &account.currency);
            if rate.is_zero() {
                return Ok(OperationOutcome::error("Exchange rates unavailable"));
            }
            Receiver::Account(account, rate)
        } else if let Some(commerciant) = self.commerciants().find_by_iban(receiver_key).await? {
            Receiver::Commerciant(commerciant)
        } else {
            return Ok(OperationOutcome::error("User not found"));
        };
        let receiver_iban = match &receiver {
            Receiver::Account(account, _) => account.iban.clone(),
            Receiver::Commerciant(_) => receiver_key.to_string(),
        };

        let plan = self.plan_of(&sender).await?;
        let total = with_commission(amount.value(), plan, &sender.currency, self.exchange());

        if role == SpenderRole::Employee
            && let Some(profile) = sender.business()
            && amount.value() > profile.spending_limit.value()
        {
            warn!(email, iban = %sender.iban, "employee transfer over the spending limit ignored");
            return Ok(OperationOutcome::None);
        }

        if !sender.try_debit(total) {
            let record = TransactionRecord::new(
                timestamp,
                "Insufficient funds",
                TransactionKind::InsufficientFunds,
            );
            self.append_record(&mut sender, email, record).await?;
            self.accounts().store(sender).await?;
            return Ok(OperationOutcome::None);
        }

        let record = TransactionRecord::new(
            timestamp,
            description.clone(),
            TransactionKind::TransferOut {
                sender: sender.iban.clone(),
                receiver: receiver_iban,
                amount: amount.value(),
                currency: sender.currency.clone(),
            },
        );
        self.append_record(&mut sender, email, record).await?;

        if role != SpenderRole::Owner
            && let Some(profile) = sender.business_mut()
            && let Some(associate) = profile.associate_mut(email)
        {
            associate.spent += Balance::new(amount.value());
        }

        match receiver {
            Receiver::Account(mut account, rate) => {
                let credited = amount.value() * rate;
                account.credit(credited);
                let record = TransactionRecord::new(
                    timestamp,
                    description,
                    TransactionKind::TransferIn {
                        sender: sender.iban.clone(),
                        receiver: account.iban.clone(),
                        amount: credited,
                        currency: account.currency.clone(),
                    },
                );
                let receiver_owner = account.owner.clone();
                self.append_record(&mut account, &receiver_owner, record).await?;
                self.accounts().store(account).await?;
            }
            Receiver::Commerciant(commerciant) => {
                // No credit leg; the sender runs the cashback pipeline.
                self.settle_commerce(&mut sender, &commerciant, amount.value(), plan);
            }
        }

        self.accounts().store(sender).await?;
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn cash_withdrawal(
        &self,
        timestamp: u64,
        email: &str,
        card_number: &str,
        amount: Decimal,
    ) -> Result<OperationOutcome> {
        // The requested amount is in RON, whatever the account currency.
        let Ok(amount) = Amount::new(amount) else {
            return Ok(OperationOutcome::None);
        };
        let Some(user) = self.users().get(email).await? else {
            return Ok(OperationOutcome::error("User not found"));
        };
        let Some(mut account) = self.accounts().find_by_card(card_number).await? else {
            return Ok(OperationOutcome::error("Card not found"));
        };
        if classify_spender(&account, email).is_none() {
            return Ok(OperationOutcome::error("Card not found"));
        }

        if account.card(card_number).is_some_and(Card::is_frozen) {
            let record =
                TransactionRecord::new(timestamp, "The card is frozen", TransactionKind::CardFrozen);
            self.append_record(&mut account, email, record).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }

        let rate = self.exchange().convert("RON", &account.currency);
        if rate.is_zero() {
            return Ok(OperationOutcome::error("Exchange rates unavailable"));
        }
        let total_ron = with_commission(amount.value(), user.plan, "RON", self.exchange());
        let local_total = total_ron * rate;

        if !account.try_debit(local_total) {
            let record = TransactionRecord::new(
                timestamp,
                "Insufficient funds",
                TransactionKind::InsufficientFunds,
            );
            self.append_record(&mut account, email, record).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }

        let record = TransactionRecord::new(
            timestamp,
            format!("Cash withdrawal of {}", amount.value()),
            TransactionKind::CashWithdrawal {
                amount: amount.value(),
            },
        );
        self.append_record(&mut account, email, record).await?;
        self.accounts().store(account).await?;
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn withdraw_savings(
        &self,
        timestamp: u64,
        iban: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<OperationOutcome> {
        let Ok(amount) = Amount::new(amount) else {
            return Ok(OperationOutcome::None);
        };
        let Some(mut savings) = self.accounts().get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        if !savings.is_savings() {
            return Ok(OperationOutcome::error("Account is not of type savings."));
        }
        let mut user = self.users().get(&savings.owner).await?.ok_or_else(|| {
            BankError::Storage(format!("owner {} is not registered", savings.owner))
        })?;

        if self.clock().age_of(user.birth_date) < 21 {
            let record = TransactionRecord::new(
                timestamp,
                "You don't have the minimum age required.",
                TransactionKind::AgeRestriction,
            );
            savings.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(savings).await?;
            return Ok(OperationOutcome::None);
        }

        // The target is the user's first classic account in the requested
        // currency.
        let mut classic = None;
        for owned in &user.accounts {
            if let Some(candidate) = self.accounts().get(owned).await?
                && candidate.is_classic()
                && candidate.currency == currency
            {
                classic = Some(candidate);
                break;
            }
        }
        let Some(mut classic) = classic else {
            let record = TransactionRecord::new(
                timestamp,
                "You do not have a classic account.",
                TransactionKind::NoClassicAccount,
            );
            savings.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(savings).await?;
            return Ok(OperationOutcome::None);
        };

        let rate = self.exchange().convert(currency, &savings.currency);
        if rate.is_zero() {
            return Ok(OperationOutcome::error("Exchange rates unavailable"));
        }
        if !savings.try_debit(amount.value() * rate) {
            let record = TransactionRecord::new(
                timestamp,
                "Insufficient funds",
                TransactionKind::InsufficientFunds,
            );
            savings.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(savings).await?;
            return Ok(OperationOutcome::None);
        }

        classic.credit(amount.value());
        let record = TransactionRecord::new(
            timestamp,
            "Savings withdrawal",
            TransactionKind::SavingsWithdrawal {
                amount: amount.value(),
                savings: savings.iban.clone(),
                classic: classic.iban.clone(),
            },
        );
        // Both accounts log the move; the user sees it once per account.
        savings.ledger.append(record.clone());
        classic.ledger.append(record.clone());
        user.record(record.clone());
        user.record(record);

        self.users().store(user).await?;
        self.accounts().store(savings).await?;
        self.accounts().store(classic).await?;
        Ok(OperationOutcome::None)
    }

    /// Shared tail of every commerciant payment: apply earned discounts,
    /// then let the commerciant's strategy accrue history and grant new ones.
    pub(crate) fn settle_commerce(
        &self,
        account: &mut Account,
        commerciant: &Commerciant,
        amount: Decimal,
        plan: ServicePlan,
    ) {
        let credit = cashback::apply_discounts(account, &commerciant.category, amount);
        if credit > Decimal::ZERO {
            account.credit(credit);
            debug!(iban = %account.iban, %credit, "cashback credited");
        }
        let ron_rate = self.exchange().convert(&account.currency, "RON");
        cashback::accrue(account, commerciant, amount, amount * ron_rate, plan);
    }

    /// Destroys a one-time card after its first successful payment and issues
    /// a replacement with a fresh number. Ownership carries over.
    async fn cycle_one_time_card(
        &self,
        account: &mut Account,
        card_number: &str,
        timestamp: u64,
    ) -> Result<()> {
        let Some(old) = account.remove_card(card_number) else {
            return Ok(());
        };
        let destroyed = TransactionRecord::new(
            timestamp,
            "The card has been destroyed",
            TransactionKind::CardDestroyed {
                card: old.number.clone(),
                holder: old.owner.clone(),
                account: account.iban.clone(),
            },
        );
        self.append_record(account, &old.owner, destroyed).await?;

        let fresh = self.mint_card_number().await;
        account
            .cards
            .push(Card::new(fresh.clone(), CardKind::OneTime, &old.owner));
        let created = TransactionRecord::new(
            timestamp,
            "New card created",
            TransactionKind::CardCreated {
                card: fresh,
                holder: old.owner.clone(),
                account: account.iban.clone(),
            },
        );
        self.append_record(account, &old.owner, created).await?;
        Ok(())
    }
}
