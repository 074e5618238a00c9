use crate::domain::user::ServicePlan;
use rust_decimal::Decimal;
use serde::Serialize;

/// Discriminates every event the ledger can record.
///
/// Each variant carries the fields specific to that event; the shared
/// timestamp and human description live on [`TransactionRecord`].
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransactionKind {
    AccountCreated,
    CardCreated {
        card: String,
        holder: String,
        account: String,
    },
    CardDestroyed {
        card: String,
        holder: String,
        account: String,
    },
    CardPayment {
        amount: Decimal,
        commerciant: String,
    },
    TransferOut {
        sender: String,
        receiver: String,
        amount: Decimal,
        currency: String,
    },
    TransferIn {
        sender: String,
        receiver: String,
        amount: Decimal,
        currency: String,
    },
    InsufficientFunds,
    CardFrozen,
    MinBalanceWarning,
    AccountNotDeleted,
    InterestRateChanged {
        rate: Decimal,
    },
    InterestCollected {
        amount: Decimal,
        currency: String,
    },
    EqualSplitCompleted {
        total: Decimal,
        share: Decimal,
        currency: String,
        involved: Vec<String>,
    },
    CustomSplitCompleted {
        total: Decimal,
        amounts: Vec<Decimal>,
        currency: String,
        involved: Vec<String>,
    },
    EqualSplitError {
        total: Decimal,
        share: Decimal,
        currency: String,
        involved: Vec<String>,
        error: String,
    },
    CustomSplitError {
        total: Decimal,
        amounts: Vec<Decimal>,
        currency: String,
        involved: Vec<String>,
        error: String,
    },
    PlanUpgraded {
        account: String,
        plan: ServicePlan,
    },
    PlanUpgradeRejected,
    CashWithdrawal {
        amount: Decimal,
    },
    SavingsWithdrawal {
        amount: Decimal,
        savings: String,
        classic: String,
    },
    NoClassicAccount,
    AgeRestriction,
}

/// An immutable ledger entry. Created once, never mutated, appended to both
/// the originating account's ledger and the acting user's ledger.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub timestamp: u64,
    pub description: String,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl TransactionRecord {
    pub fn new(timestamp: u64, description: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            timestamp,
            description: description.into(),
            kind,
        }
    }
}

/// Append-only transaction history.
///
/// `append` never fails. Consumers only ever get borrowing iterators; the
/// backing storage is not exposed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionLedger {
    records: Vec<TransactionRecord>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// Stable re-sort by timestamp. The per-user ledger runs this after every
    /// append so it stays chronological even when the driver delivers
    /// operations slightly out of order.
    pub fn sort_by_timestamp(&mut self) {
        self.records.sort_by_key(|record| record.timestamp);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    /// Records with `start <= timestamp <= end`, in append order.
    pub fn range(&self, start: u64, end: u64) -> impl Iterator<Item = &TransactionRecord> {
        self.records
            .iter()
            .filter(move |record| record.timestamp >= start && record.timestamp <= end)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: u64) -> TransactionRecord {
        TransactionRecord::new(timestamp, "New account created", TransactionKind::AccountCreated)
    }

    #[test]
    fn test_range_round_trip() {
        let mut ledger = TransactionLedger::new();
        for ts in [1, 3, 3, 7, 9] {
            ledger.append(record(ts));
        }

        let all: Vec<_> = ledger.range(1, 9).collect();
        assert_eq!(all.len(), 5);
        let timestamps: Vec<_> = all.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1, 3, 3, 7, 9]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let mut ledger = TransactionLedger::new();
        for ts in [1, 2, 3, 4, 5] {
            ledger.append(record(ts));
        }

        let timestamps: Vec<_> = ledger.range(2, 4).map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![2, 3, 4]);
    }

    #[test]
    fn test_range_is_restartable() {
        let mut ledger = TransactionLedger::new();
        ledger.append(record(1));
        ledger.append(record(2));

        assert_eq!(ledger.range(0, 10).count(), 2);
        assert_eq!(ledger.range(0, 10).count(), 2);
    }

    #[test]
    fn test_sort_by_timestamp_is_stable() {
        let mut ledger = TransactionLedger::new();
        ledger.append(TransactionRecord::new(5, "first", TransactionKind::AccountCreated));
        ledger.append(TransactionRecord::new(2, "second", TransactionKind::AccountCreated));
        ledger.append(TransactionRecord::new(5, "third", TransactionKind::AccountCreated));
        ledger.sort_by_timestamp();

        let descriptions: Vec<_> = ledger.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["second", "first", "third"]);
    }
}
