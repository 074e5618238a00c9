use crate::domain::account::AssociateRole;
use crate::domain::split::SplitKind;
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::ServicePlan;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account variant requested by an `addAccount` operation.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Classic,
    Savings,
    Business,
}

/// One replayed operation, tagged by its `command` field.
///
/// Identifiers arrive as raw strings; handlers resolve them through the
/// stores by exact key only.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    AddAccount {
        timestamp: u64,
        email: String,
        currency: String,
        account_type: AccountType,
        #[serde(default)]
        interest_rate: Option<Decimal>,
    },
    CreateCard {
        timestamp: u64,
        email: String,
        account: String,
    },
    CreateOneTimeCard {
        timestamp: u64,
        email: String,
        account: String,
    },
    AddFunds {
        timestamp: u64,
        email: String,
        account: String,
        amount: Decimal,
    },
    DeleteAccount {
        timestamp: u64,
        email: String,
        account: String,
    },
    DeleteCard {
        timestamp: u64,
        email: String,
        card_number: String,
    },
    SetMinimumBalance {
        timestamp: u64,
        account: String,
        amount: Decimal,
    },
    SetAlias {
        timestamp: u64,
        email: String,
        alias: String,
        account: String,
    },
    CheckCardStatus {
        timestamp: u64,
        card_number: String,
    },
    PayOnline {
        timestamp: u64,
        email: String,
        card_number: String,
        amount: Decimal,
        currency: String,
        commerciant: String,
        #[serde(default)]
        description: Option<String>,
    },
    SendMoney {
        timestamp: u64,
        email: String,
        account: String,
        receiver: String,
        amount: Decimal,
        #[serde(default)]
        description: Option<String>,
    },
    CashWithdrawal {
        timestamp: u64,
        email: String,
        card_number: String,
        amount: Decimal,
    },
    AddInterest {
        timestamp: u64,
        account: String,
    },
    ChangeInterestRate {
        timestamp: u64,
        account: String,
        interest_rate: Decimal,
    },
    WithdrawSavings {
        timestamp: u64,
        account: String,
        amount: Decimal,
        currency: String,
    },
    UpgradePlan {
        timestamp: u64,
        account: String,
        new_plan_type: ServicePlan,
    },
    SplitPayment {
        timestamp: u64,
        split_payment_type: SplitKind,
        accounts: Vec<String>,
        amount: Decimal,
        #[serde(default)]
        amounts: Option<Vec<Decimal>>,
        currency: String,
    },
    AcceptSplitPayment {
        timestamp: u64,
        email: String,
        split_payment_type: SplitKind,
    },
    RejectSplitPayment {
        timestamp: u64,
        email: String,
        split_payment_type: SplitKind,
    },
    Report {
        timestamp: u64,
        account: String,
        start_timestamp: u64,
        end_timestamp: u64,
    },
    SpendingsReport {
        timestamp: u64,
        account: String,
        start_timestamp: u64,
        end_timestamp: u64,
    },
    AddNewBusinessAssociate {
        timestamp: u64,
        account: String,
        role: AssociateRole,
        email: String,
    },
    ChangeSpendingLimit {
        timestamp: u64,
        account: String,
        amount: Decimal,
        email: String,
    },
    ChangeDepositLimit {
        timestamp: u64,
        account: String,
        amount: Decimal,
        email: String,
    },
}

impl Operation {
    /// The wire name of the command, as it appears in the input file.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddAccount { .. } => "addAccount",
            Operation::CreateCard { .. } => "createCard",
            Operation::CreateOneTimeCard { .. } => "createOneTimeCard",
            Operation::AddFunds { .. } => "addFunds",
            Operation::DeleteAccount { .. } => "deleteAccount",
            Operation::DeleteCard { .. } => "deleteCard",
            Operation::SetMinimumBalance { .. } => "setMinimumBalance",
            Operation::SetAlias { .. } => "setAlias",
            Operation::CheckCardStatus { .. } => "checkCardStatus",
            Operation::PayOnline { .. } => "payOnline",
            Operation::SendMoney { .. } => "sendMoney",
            Operation::CashWithdrawal { .. } => "cashWithdrawal",
            Operation::AddInterest { .. } => "addInterest",
            Operation::ChangeInterestRate { .. } => "changeInterestRate",
            Operation::WithdrawSavings { .. } => "withdrawSavings",
            Operation::UpgradePlan { .. } => "upgradePlan",
            Operation::SplitPayment { .. } => "splitPayment",
            Operation::AcceptSplitPayment { .. } => "acceptSplitPayment",
            Operation::RejectSplitPayment { .. } => "rejectSplitPayment",
            Operation::Report { .. } => "report",
            Operation::SpendingsReport { .. } => "spendingsReport",
            Operation::AddNewBusinessAssociate { .. } => "addNewBusinessAssociate",
            Operation::ChangeSpendingLimit { .. } => "changeSpendingLimit",
            Operation::ChangeDepositLimit { .. } => "changeDepositLimit",
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            Operation::AddAccount { timestamp, .. }
            | Operation::CreateCard { timestamp, .. }
            | Operation::CreateOneTimeCard { timestamp, .. }
            | Operation::AddFunds { timestamp, .. }
            | Operation::DeleteAccount { timestamp, .. }
            | Operation::DeleteCard { timestamp, .. }
            | Operation::SetMinimumBalance { timestamp, .. }
            | Operation::SetAlias { timestamp, .. }
            | Operation::CheckCardStatus { timestamp, .. }
            | Operation::PayOnline { timestamp, .. }
            | Operation::SendMoney { timestamp, .. }
            | Operation::CashWithdrawal { timestamp, .. }
            | Operation::AddInterest { timestamp, .. }
            | Operation::ChangeInterestRate { timestamp, .. }
            | Operation::WithdrawSavings { timestamp, .. }
            | Operation::UpgradePlan { timestamp, .. }
            | Operation::SplitPayment { timestamp, .. }
            | Operation::AcceptSplitPayment { timestamp, .. }
            | Operation::RejectSplitPayment { timestamp, .. }
            | Operation::Report { timestamp, .. }
            | Operation::SpendingsReport { timestamp, .. }
            | Operation::AddNewBusinessAssociate { timestamp, .. }
            | Operation::ChangeSpendingLimit { timestamp, .. }
            | Operation::ChangeDepositLimit { timestamp, .. } => *timestamp,
        }
    }
}

/// What one handler hands back to the driver.
///
/// Business failures never surface as `Err`; they are either ledger records
/// or an `Error` outcome here, depending on whether there is an account to
/// attach the failure to.
#[derive(Debug, PartialEq, Clone)]
pub enum OperationOutcome {
    /// Nothing for the driver to print.
    None,
    Success { description: String },
    Error { description: String },
    AccountReport(AccountReport),
    SpendingsReport(SpendingsReport),
}

impl OperationOutcome {
    pub fn error(description: impl Into<String>) -> Self {
        Self::Error {
            description: description.into(),
        }
    }
}

/// Snapshot of an account and its ledger slice for the `report` operation.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountReport {
    #[serde(rename = "IBAN")]
    pub iban: String,
    pub currency: String,
    pub balance: Decimal,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CommerciantTotal {
    pub commerciant: String,
    pub total: Decimal,
}

/// Card spendings in a timestamp range, with per-commerciant totals sorted
/// by commerciant name.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SpendingsReport {
    #[serde(rename = "IBAN")]
    pub iban: String,
    pub currency: String,
    pub balance: Decimal,
    pub transactions: Vec<TransactionRecord>,
    pub commerciants: Vec<CommerciantTotal>,
}
