use crate::domain::transaction::{TransactionLedger, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Service tier controlling commission and upgrade cost.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ServicePlan {
    Student,
    Standard,
    Silver,
    Gold,
}

impl ServicePlan {
    /// Student and standard share the bottom tier of the upgrade ladder.
    fn tier(self) -> u8 {
        match self {
            ServicePlan::Student | ServicePlan::Standard => 0,
            ServicePlan::Silver => 1,
            ServicePlan::Gold => 2,
        }
    }

    /// Upgrade fee in RON, or `None` when `to` is not a strict upgrade.
    pub fn upgrade_fee_ron(self, to: ServicePlan) -> Option<Decimal> {
        match (self.tier(), to.tier()) {
            (0, 1) => Some(dec!(100)),
            (1, 2) => Some(dec!(250)),
            (0, 2) => Some(dec!(350)),
            _ => None,
        }
    }

    pub fn is_downgrade_to(self, to: ServicePlan) -> bool {
        to.tier() < self.tier()
    }

    pub fn name(self) -> &'static str {
        match self {
            ServicePlan::Student => "student",
            ServicePlan::Standard => "standard",
            ServicePlan::Silver => "silver",
            ServicePlan::Gold => "gold",
        }
    }
}

/// A registered user and their personal transaction history.
///
/// The user exclusively owns the accounts listed in `accounts`; the ledger is
/// re-sorted by timestamp after every append so it stays chronological even if
/// the driver delivers operations slightly out of order.
#[derive(Debug, PartialEq, Clone)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub occupation: String,
    pub plan: ServicePlan,
    pub accounts: Vec<String>,
    pub ledger: TransactionLedger,
}

impl User {
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        birth_date: NaiveDate,
        occupation: &str,
    ) -> Self {
        let plan = if occupation == "student" {
            ServicePlan::Student
        } else {
            ServicePlan::Standard
        };
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            birth_date,
            occupation: occupation.to_string(),
            plan,
            accounts: Vec::new(),
            ledger: TransactionLedger::new(),
        }
    }

    pub fn record(&mut self, record: TransactionRecord) {
        self.ledger.append(record);
        self.ledger.sort_by_timestamp();
    }

    pub fn attach_account(&mut self, iban: &str) {
        self.accounts.push(iban.to_string());
    }

    pub fn detach_account(&mut self, iban: &str) {
        self.accounts.retain(|owned| owned != iban);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionKind;

    fn user(occupation: &str) -> User {
        User::new(
            "Ana",
            "Pop",
            "ana@minibank.ro",
            NaiveDate::from_ymd_opt(2000, 4, 12).unwrap(),
            occupation,
        )
    }

    #[test]
    fn test_plan_follows_occupation() {
        assert_eq!(user("student").plan, ServicePlan::Student);
        assert_eq!(user("engineer").plan, ServicePlan::Standard);
    }

    #[test]
    fn test_upgrade_fee_matrix() {
        assert_eq!(
            ServicePlan::Standard.upgrade_fee_ron(ServicePlan::Silver),
            Some(dec!(100))
        );
        assert_eq!(
            ServicePlan::Student.upgrade_fee_ron(ServicePlan::Gold),
            Some(dec!(350))
        );
        assert_eq!(
            ServicePlan::Silver.upgrade_fee_ron(ServicePlan::Gold),
            Some(dec!(250))
        );
        assert_eq!(ServicePlan::Gold.upgrade_fee_ron(ServicePlan::Silver), None);
        assert_eq!(
            ServicePlan::Student.upgrade_fee_ron(ServicePlan::Standard),
            None
        );
        assert!(ServicePlan::Gold.is_downgrade_to(ServicePlan::Silver));
        assert!(!ServicePlan::Standard.is_downgrade_to(ServicePlan::Silver));
    }

    #[test]
    fn test_personal_ledger_stays_chronological() {
        let mut user = user("engineer");
        user.record(TransactionRecord::new(
            7,
            "New account created",
            TransactionKind::AccountCreated,
        ));
        user.record(TransactionRecord::new(
            3,
            "New account created",
            TransactionKind::AccountCreated,
        ));

        let timestamps: Vec<_> = user.ledger.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![3, 7]);
    }
}
