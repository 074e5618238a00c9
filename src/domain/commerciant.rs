use serde::Deserialize;

/// Cashback strategy attached to a commerciant by the simulation input.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum CashbackKind {
    #[serde(rename = "nrOfTransactions")]
    TransactionCount,
    #[serde(rename = "spendingThreshold")]
    SpendingThreshold,
}

/// A registered commerciant.
///
/// The settlement IBAN, when present, lets transfers target the commerciant
/// directly; such transfers run the same cashback pipeline as card payments.
#[derive(Debug, Clone, PartialEq)]
pub struct Commerciant {
    pub name: String,
    pub id: u32,
    pub settlement_iban: Option<String>,
    pub category: String,
    pub cashback: CashbackKind,
}
