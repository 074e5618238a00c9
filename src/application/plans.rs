use super::engine::BankEngine;
use crate::domain::operation::OperationOutcome;
use crate::domain::transaction::{TransactionKind, TransactionRecord};
use crate::domain::user::ServicePlan;
use crate::error::{BankError, Result};
use rust_decimal::Decimal;

impl BankEngine {
    pub(crate) async fn add_interest(
        &self,
        timestamp: u64,
        iban: &str,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts().get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        let Some(rate) = account.interest_rate() else {
            return Ok(OperationOutcome::error("This is not a savings account"));
        };

        let interest = account.balance.value() * rate;
        account.credit(interest);
        let owner = account.owner.clone();
        let record = TransactionRecord::new(
            timestamp,
            "Interest rate income",
            TransactionKind::InterestCollected {
                amount: interest,
                currency: account.currency.clone(),
            },
        );
        self.append_record(&mut account, &owner, record).await?;
        self.accounts().store(account).await?;
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn change_interest_rate(
        &self,
        timestamp: u64,
        iban: &str,
        rate: Decimal,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts().get(iban).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        if !account.set_interest_rate(rate) {
            return Ok(OperationOutcome::error("This is not a savings account"));
        }

        let owner = account.owner.clone();
        let record = TransactionRecord::new(
            timestamp,
            format!("The interest rate of the account changed to {rate}"),
            TransactionKind::InterestRateChanged { rate },
        );
        self.append_record(&mut account, &owner, record).await?;
        self.accounts().store(account).await?;
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn upgrade_plan(
        &self,
        timestamp: u64,
        account_key: &str,
        new_plan: ServicePlan,
    ) -> Result<OperationOutcome> {
        let Some(mut account) = self.accounts().resolve(account_key).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        let mut user = self.users().get(&account.owner).await?.ok_or_else(|| {
            BankError::Storage(format!("owner {} is not registered", account.owner))
        })?;

        if user.plan.is_downgrade_to(new_plan) {
            let record = TransactionRecord::new(
                timestamp,
                "You cannot downgrade your plan.",
                TransactionKind::PlanUpgradeRejected,
            );
            account.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }
        let Some(fee_ron) = user.plan.upgrade_fee_ron(new_plan) else {
            // Same tier: nothing to buy.
            let record = TransactionRecord::new(
                timestamp,
                format!("The user already has the {} plan.", new_plan.name()),
                TransactionKind::PlanUpgradeRejected,
            );
            account.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        };

        let rate = self.exchange().convert("RON", &account.currency);
        if rate.is_zero() {
            return Ok(OperationOutcome::error("Exchange rates unavailable"));
        }
        // The upgrade fee carries no commission.
        if !account.try_debit(fee_ron * rate) {
            let record = TransactionRecord::new(
                timestamp,
                "Insufficient funds",
                TransactionKind::InsufficientFunds,
            );
            account.ledger.append(record.clone());
            user.record(record);
            self.users().store(user).await?;
            self.accounts().store(account).await?;
            return Ok(OperationOutcome::None);
        }

        user.plan = new_plan;
        let record = TransactionRecord::new(
            timestamp,
            "Upgrade plan",
            TransactionKind::PlanUpgraded {
                account: account.iban.clone(),
                plan: new_plan,
            },
        );
        account.ledger.append(record.clone());
        user.record(record);
        self.users().store(user).await?;
        self.accounts().store(account).await?;
        Ok(OperationOutcome::None)
    }
}
