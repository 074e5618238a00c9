use super::account::Account;
use super::commerciant::Commerciant;
use super::user::User;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, email: &str) -> Result<Option<User>>;
    async fn all(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: Account) -> Result<()>;
    async fn get(&self, iban: &str) -> Result<Option<Account>>;
    /// Exact lookup by IBAN, falling back to exact alias match. Never fuzzy.
    async fn resolve(&self, key: &str) -> Result<Option<Account>>;
    async fn find_by_card(&self, number: &str) -> Result<Option<Account>>;
    async fn remove(&self, iban: &str) -> Result<()>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait CommerciantStore: Send + Sync {
    async fn store(&self, commerciant: Commerciant) -> Result<()>;
    async fn get(&self, name: &str) -> Result<Option<Commerciant>>;
    async fn find_by_iban(&self, iban: &str) -> Result<Option<Commerciant>>;
}

/// Supplies the engine with a computed age; wall-clock time stays outside
/// the engine.
pub trait Clock: Send + Sync {
    fn age_of(&self, birth_date: NaiveDate) -> u32;
}

/// Mints IBANs and card numbers.
pub trait NumberFactory: Send + Sync {
    fn next_iban(&mut self) -> String;
    fn next_card_number(&mut self) -> String;
}

pub type UserStoreBox = Box<dyn UserStore>;
pub type AccountStoreBox = Box<dyn AccountStore>;
pub type CommerciantStoreBox = Box<dyn CommerciantStore>;
pub type ClockBox = Box<dyn Clock>;
pub type NumberFactoryBox = Box<dyn NumberFactory>;
