use crate::domain::cashback::{CommerciantStats, Discount};
use crate::domain::money::Balance;
use crate::domain::transaction::TransactionLedger;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CardStatus {
    Active,
    Frozen,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CardKind {
    Regular,
    /// Invalidated and re-issued with a fresh number after its first
    /// successful payment.
    OneTime,
}

/// A payment card attached to an account.
#[derive(Debug, PartialEq, Clone)]
pub struct Card {
    pub number: String,
    pub kind: CardKind,
    pub status: CardStatus,
    pub owner: String,
}

impl Card {
    pub fn new(number: String, kind: CardKind, owner: &str) -> Self {
        Self {
            number,
            kind,
            status: CardStatus::Active,
            owner: owner.to_string(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.status == CardStatus::Frozen
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AssociateRole {
    Manager,
    Employee,
}

/// A manager or employee granted access to a business account.
#[derive(Debug, PartialEq, Clone)]
pub struct Associate {
    pub email: String,
    pub role: AssociateRole,
    pub spent: Balance,
    pub deposited: Balance,
}

impl Associate {
    pub fn new(email: &str, role: AssociateRole) -> Self {
        Self {
            email: email.to_string(),
            role,
            spent: Balance::ZERO,
            deposited: Balance::ZERO,
        }
    }
}

/// Business-account state: spend/deposit limits and the associate roster.
/// Employees are bounded by the limits; managers and the owner are not.
#[derive(Debug, PartialEq, Clone)]
pub struct BusinessProfile {
    pub spending_limit: Balance,
    pub deposit_limit: Balance,
    pub associates: Vec<Associate>,
}

impl BusinessProfile {
    pub fn new(initial_limit: Decimal) -> Self {
        Self {
            spending_limit: Balance::new(initial_limit),
            deposit_limit: Balance::new(initial_limit),
            associates: Vec::new(),
        }
    }

    pub fn associate(&self, email: &str) -> Option<&Associate> {
        self.associates.iter().find(|a| a.email == email)
    }

    pub fn associate_mut(&mut self, email: &str) -> Option<&mut Associate> {
        self.associates.iter_mut().find(|a| a.email == email)
    }

    /// Registers an associate; an email already on the roster keeps its
    /// original role.
    pub fn add_associate(&mut self, email: &str, role: AssociateRole) -> bool {
        if self.associate(email).is_some() {
            return false;
        }
        self.associates.push(Associate::new(email, role));
        true
    }
}

/// Account variant tag and its variant-specific payload.
#[derive(Debug, PartialEq, Clone)]
pub enum AccountKind {
    Classic,
    Savings { interest_rate: Decimal },
    Business(BusinessProfile),
}

/// The state of one bank account.
///
/// Invariant: `balance >= minimum_balance` after every committed debit; all
/// debits go through [`Account::try_debit`], the single choke point that
/// checks it.
#[derive(Debug, PartialEq, Clone)]
pub struct Account {
    pub iban: String,
    pub currency: String,
    /// Email of the owning user.
    pub owner: String,
    pub balance: Balance,
    pub minimum_balance: Balance,
    pub alias: Option<String>,
    pub kind: AccountKind,
    pub cards: Vec<Card>,
    pub discounts: Vec<Discount>,
    /// Cumulative RON-equivalent spend at spending-threshold commerciants.
    pub threshold_spend: Balance,
    /// One entry per distinct commerciant name, kept sorted by name.
    pub commerciants: Vec<CommerciantStats>,
    pub ledger: TransactionLedger,
}

impl Account {
    pub fn new(iban: &str, currency: &str, owner: &str, kind: AccountKind) -> Self {
        Self {
            iban: iban.to_string(),
            currency: currency.to_string(),
            owner: owner.to_string(),
            balance: Balance::ZERO,
            minimum_balance: Balance::ZERO,
            alias: None,
            kind,
            cards: Vec::new(),
            discounts: Vec::new(),
            threshold_spend: Balance::ZERO,
            commerciants: Vec::new(),
            ledger: TransactionLedger::new(),
        }
    }

    /// Whether a debit of `amount` keeps the balance at or above the floor.
    pub fn can_debit(&self, amount: Decimal) -> bool {
        self.balance.value() - amount >= self.minimum_balance.value()
    }

    /// Debits `amount` if the minimum-balance invariant survives it.
    /// Returns `false` (and mutates nothing) otherwise.
    pub fn try_debit(&mut self, amount: Decimal) -> bool {
        if self.can_debit(amount) {
            self.balance -= Balance::new(amount);
            true
        } else {
            false
        }
    }

    pub fn credit(&mut self, amount: Decimal) {
        self.balance += Balance::new(amount);
    }

    pub fn card(&self, number: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.number == number)
    }

    pub fn card_mut(&mut self, number: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.number == number)
    }

    pub fn remove_card(&mut self, number: &str) -> Option<Card> {
        let pos = self.cards.iter().position(|c| c.number == number)?;
        Some(self.cards.remove(pos))
    }

    pub fn interest_rate(&self) -> Option<Decimal> {
        match &self.kind {
            AccountKind::Savings { interest_rate } => Some(*interest_rate),
            _ => None,
        }
    }

    pub fn set_interest_rate(&mut self, rate: Decimal) -> bool {
        match &mut self.kind {
            AccountKind::Savings { interest_rate } => {
                *interest_rate = rate;
                true
            }
            _ => false,
        }
    }

    pub fn is_classic(&self) -> bool {
        self.kind == AccountKind::Classic
    }

    pub fn is_savings(&self) -> bool {
        matches!(self.kind, AccountKind::Savings { .. })
    }

    pub fn business(&self) -> Option<&BusinessProfile> {
        match &self.kind {
            AccountKind::Business(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn business_mut(&mut self) -> Option<&mut BusinessProfile> {
        match &mut self.kind {
            AccountKind::Business(profile) => Some(profile),
            _ => None,
        }
    }

    /// Adds a discount unless the same (category, rate) pair is already held.
    pub fn grant_discount(&mut self, discount: Discount) {
        let duplicate = self
            .discounts
            .iter()
            .any(|d| d.category == discount.category && d.rate == discount.rate);
        if !duplicate {
            self.discounts.push(discount);
        }
    }

    /// Interaction stats for a commerciant, inserted in name order on first
    /// contact.
    pub fn stats_mut(&mut self, name: &str) -> &mut CommerciantStats {
        match self
            .commerciants
            .binary_search_by(|stats| stats.name.as_str().cmp(name))
        {
            Ok(pos) => &mut self.commerciants[pos],
            Err(pos) => {
                self.commerciants.insert(pos, CommerciantStats::new(name));
                &mut self.commerciants[pos]
            }
        }
    }
}
