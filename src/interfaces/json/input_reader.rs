use crate::domain::commerciant::{CashbackKind, Commerciant};
use crate::domain::operation::Operation;
use crate::domain::user::User;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One full simulation: the registries to seed and the commands to replay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    #[serde(default)]
    pub users: Vec<UserSeed>,
    #[serde(default)]
    pub exchange_rates: Vec<RateSeed>,
    #[serde(default)]
    pub commerciants: Vec<CommerciantSeed>,
    #[serde(default)]
    pub commands: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub occupation: String,
}

impl UserSeed {
    pub fn into_user(self) -> User {
        User::new(
            &self.first_name,
            &self.last_name,
            &self.email,
            self.birth_date,
            &self.occupation,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct RateSeed {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
    #[serde(default)]
    pub timestamp: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerciantSeed {
    pub commerciant: String,
    pub id: u32,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(rename = "type")]
    pub category: String,
    pub cashback_strategy: CashbackKind,
}

impl CommerciantSeed {
    pub fn into_commerciant(self) -> Commerciant {
        Commerciant {
            name: self.commerciant,
            id: self.id,
            settlement_iban: self.account,
            category: self.category,
            cashback: self.cashback_strategy,
        }
    }
}

/// Reads and deserializes a whole simulation input from any `Read` source.
pub fn read_input<R: Read>(source: R) -> Result<SimulationInput> {
    Ok(serde_json::from_reader(source)?)
}
