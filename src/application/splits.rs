use super::engine::BankEngine;
use crate::domain::account::Account;
use crate::domain::operation::OperationOutcome;
use crate::domain::split::{Consent, Participant, SplitDecision, SplitKind, SplitPayment};
use crate::domain::transaction::{TransactionKind, TransactionRecord};
use crate::error::Result;
use rust_decimal::Decimal;
use tracing::debug;

impl BankEngine {
    pub(crate) async fn create_split(
        &self,
        timestamp: u64,
        kind: SplitKind,
        account_keys: &[String],
        total: Decimal,
        amounts: Option<Vec<Decimal>>,
        currency: &str,
    ) -> Result<OperationOutcome> {
        if account_keys.is_empty() {
            return Ok(OperationOutcome::error("One of the accounts is invalid"));
        }

        let shares: Vec<Decimal> = match kind {
            SplitKind::Equal => {
                let share = total / Decimal::from(account_keys.len());
                vec![share; account_keys.len()]
            }
            SplitKind::Custom => {
                let Some(amounts) = amounts else {
                    return Ok(OperationOutcome::error(
                        "Split amounts do not sum to the total",
                    ));
                };
                if amounts.len() != account_keys.len()
                    || amounts.iter().sum::<Decimal>() != total
                {
                    return Ok(OperationOutcome::error(
                        "Split amounts do not sum to the total",
                    ));
                }
                amounts
            }
        };

        // Every participant must exist before anything is enqueued.
        let mut participants = Vec::with_capacity(account_keys.len());
        for (iban, share) in account_keys.iter().zip(shares) {
            let Some(account) = self.accounts().get(iban).await? else {
                return Ok(OperationOutcome::error(format!("Account {iban} is invalid")));
            };
            if kind == SplitKind::Custom && account.business().is_some() {
                return Ok(OperationOutcome::error(
                    "Business accounts cannot take part in custom split payments",
                ));
            }
            participants.push(Participant::new(&account.iban, share, &account.owner));
        }

        self.splits().lock().await.enqueue(SplitPayment {
            kind,
            total,
            currency: currency.to_string(),
            timestamp,
            participants,
        });
        Ok(OperationOutcome::None)
    }

    pub(crate) async fn respond_split(
        &self,
        email: &str,
        kind: SplitKind,
        consent: Consent,
    ) -> Result<OperationOutcome> {
        if self.users().get(email).await?.is_none() {
            return Ok(OperationOutcome::error("User not found"));
        }

        let decision = self.splits().lock().await.register(email, kind, consent);
        match decision {
            None => Ok(OperationOutcome::error(match consent {
                Consent::Rejected => "No split payment to reject",
                _ => "No split payment to accept",
            })),
            Some(SplitDecision::Waiting) => Ok(OperationOutcome::None),
            Some(SplitDecision::Cancelled(split)) => {
                self.cancel_split(split, "One user rejected the payment.")
                    .await?;
                Ok(OperationOutcome::None)
            }
            Some(SplitDecision::Ready(split)) => {
                self.settle_split(split).await?;
                Ok(OperationOutcome::None)
            }
        }
    }

    /// All-or-nothing settlement of a unanimously accepted split.
    ///
    /// Every leg is re-priced and checked against live balances first; the
    /// first account that cannot cover its share cancels the whole split.
    async fn settle_split(&self, split: SplitPayment) -> Result<()> {
        let mut staged: Vec<(Account, Decimal)> = Vec::with_capacity(split.participants.len());
        let mut shortfall = None;

        for participant in &split.participants {
            let Some(account) = self.accounts().get(&participant.iban).await? else {
                shortfall = Some(participant.iban.clone());
                break;
            };
            let rate = self.exchange().convert(&split.currency, &account.currency);
            let local_share = participant.share * rate;
            if rate.is_zero() || !account.can_debit(local_share) {
                shortfall = Some(participant.iban.clone());
                break;
            }
            staged.push((account, local_share));
        }

        if let Some(iban) = shortfall {
            let reason = format!("Account {iban} has insufficient funds for a split payment.");
            return self.cancel_split(split, &reason).await;
        }

        debug!(total = %split.total, currency = %split.currency, "split payment settled");
        for (index, (mut account, local_share)) in staged.into_iter().enumerate() {
            account.try_debit(local_share);
            let record = TransactionRecord::new(
                split.timestamp,
                split_description(&split),
                success_kind(&split, index),
            );
            let owner = account.owner.clone();
            self.append_record(&mut account, &owner, record).await?;
            self.accounts().store(account).await?;
        }
        Ok(())
    }

    /// Cancels a split: an error record for every participant, no balance
    /// movement anywhere.
    async fn cancel_split(&self, split: SplitPayment, reason: &str) -> Result<()> {
        for (index, participant) in split.participants.iter().enumerate() {
            let record = TransactionRecord::new(
                split.timestamp,
                split_description(&split),
                error_kind(&split, index, reason),
            );
            if let Some(mut account) = self.accounts().get(&participant.iban).await? {
                let owner = account.owner.clone();
                self.append_record(&mut account, &owner, record).await?;
                self.accounts().store(account).await?;
            } else if let Some(mut user) = self.users().get(&participant.owner).await? {
                // The account vanished while the split was pending; the
                // owner still learns about the cancellation.
                user.record(record);
                self.users().store(user).await?;
            }
        }
        Ok(())
    }
}

fn split_description(split: &SplitPayment) -> String {
    format!("Split payment of {:.2} {}", split.total, split.currency)
}

fn success_kind(split: &SplitPayment, index: usize) -> TransactionKind {
    match split.kind {
        SplitKind::Equal => TransactionKind::EqualSplitCompleted {
            total: split.total,
            share: split.participants[index].share,
            currency: split.currency.clone(),
            involved: split.involved(),
        },
        SplitKind::Custom => TransactionKind::CustomSplitCompleted {
            total: split.total,
            amounts: split.shares(),
            currency: split.currency.clone(),
            involved: split.involved(),
        },
    }
}

fn error_kind(split: &SplitPayment, index: usize, reason: &str) -> TransactionKind {
    match split.kind {
        SplitKind::Equal => TransactionKind::EqualSplitError {
            total: split.total,
            share: split.participants[index].share,
            currency: split.currency.clone(),
            involved: split.involved(),
            error: reason.to_string(),
        },
        SplitKind::Custom => TransactionKind::CustomSplitError {
            total: split.total,
            amounts: split.shares(),
            currency: split.currency.clone(),
            involved: split.involved(),
            error: reason.to_string(),
        },
    }
}
