use crate::domain::account::Account;
use crate::domain::commerciant::Commerciant;
use crate::domain::ports::{AccountStore, CommerciantStore, UserStore};
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for users, keyed by email.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access; `Clone`
/// shares the underlying map, which lets tests keep a handle onto the same
/// data the engine mutates.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for accounts, keyed by IBAN.
///
/// Keeps insertion order so exports are deterministic. Alias and card-number
/// lookups scan the map; both are exact-key only.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    inner: Arc<RwLock<AccountMap>>,
}

#[derive(Default)]
struct AccountMap {
    accounts: HashMap<String, Account>,
    order: Vec<String>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&account.iban) {
            inner.order.push(account.iban.clone());
        }
        inner.accounts.insert(account.iban.clone(), account);
        Ok(())
    }

    async fn get(&self, iban: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(iban).cloned())
    }

    async fn resolve(&self, key: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        if let Some(account) = inner.accounts.get(key) {
            return Ok(Some(account.clone()));
        }
        Ok(inner
            .accounts
            .values()
            .find(|account| account.alias.as_deref() == Some(key))
            .cloned())
    }

    async fn find_by_card(&self, number: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|account| account.card(number).is_some())
            .cloned())
    }

    async fn remove(&self, iban: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.accounts.remove(iban);
        inner.order.retain(|owned| owned != iban);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|iban| inner.accounts.get(iban).cloned())
            .collect())
    }
}

/// A thread-safe in-memory store for commerciants, keyed by name.
#[derive(Default, Clone)]
pub struct InMemoryCommerciantStore {
    commerciants: Arc<RwLock<HashMap<String, Commerciant>>>,
}

impl InMemoryCommerciantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommerciantStore for InMemoryCommerciantStore {
    async fn store(&self, commerciant: Commerciant) -> Result<()> {
        let mut commerciants = self.commerciants.write().await;
        commerciants.insert(commerciant.name.clone(), commerciant);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Commerciant>> {
        let commerciants = self.commerciants.read().await;
        Ok(commerciants.get(name).cloned())
    }

    async fn find_by_iban(&self, iban: &str) -> Result<Option<Commerciant>> {
        let commerciants = self.commerciants.read().await;
        Ok(commerciants
            .values()
            .find(|c| c.settlement_iban.as_deref() == Some(iban))
            .cloned())
    }
}
