use super::engine::BankEngine;
use crate::domain::operation::{AccountReport, CommerciantTotal, OperationOutcome, SpendingsReport};
use crate::domain::transaction::TransactionKind;
use crate::error::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

impl BankEngine {
    pub(crate) async fn report(
        &self,
        account_key: &str,
        start: u64,
        end: u64,
    ) -> Result<OperationOutcome> {
        let Some(account) = self.accounts().get(account_key).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        Ok(OperationOutcome::AccountReport(AccountReport {
            iban: account.iban.clone(),
            currency: account.currency.clone(),
            balance: account.balance.value(),
            transactions: account.ledger.range(start, end).cloned().collect(),
        }))
    }

    pub(crate) async fn spendings_report(
        &self,
        account_key: &str,
        start: u64,
        end: u64,
    ) -> Result<OperationOutcome> {
        let Some(account) = self.accounts().get(account_key).await? else {
            return Ok(OperationOutcome::error("Account not found"));
        };
        if account.is_savings() {
            return Ok(OperationOutcome::error(
                "This kind of report is not supported for a saving account",
            ));
        }

        let transactions: Vec<_> = account
            .ledger
            .range(start, end)
            .filter(|record| matches!(record.kind, TransactionKind::CardPayment { .. }))
            .cloned()
            .collect();

        // BTreeMap keeps the per-commerciant totals sorted by name.
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for record in &transactions {
            if let TransactionKind::CardPayment { amount, commerciant } = &record.kind {
                *totals.entry(commerciant.clone()).or_default() += *amount;
            }
        }

        Ok(OperationOutcome::SpendingsReport(SpendingsReport {
            iban: account.iban.clone(),
            currency: account.currency.clone(),
            balance: account.balance.value(),
            transactions,
            commerciants: totals
                .into_iter()
                .map(|(commerciant, total)| CommerciantTotal { commerciant, total })
                .collect(),
        }))
    }
}
