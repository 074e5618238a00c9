use crate::domain::account::Account;
use crate::domain::commerciant::{CashbackKind, Commerciant};
use crate::domain::money::Balance;
use crate::domain::user::ServicePlan;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Category a discount can be earned for.
///
/// `SpendingThreshold` is the odd one out: it is not tied to a commerciant
/// category and is removed outright on first use instead of being flagged.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum DiscountCategory {
    Food,
    Clothes,
    Tech,
    SpendingThreshold,
}

impl DiscountCategory {
    /// Maps a commerciant category name onto a discount category, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Food" => Some(Self::Food),
            "Clothes" => Some(Self::Clothes),
            "Tech" => Some(Self::Tech),
            _ => None,
        }
    }
}

/// A single-use percentage discount earned by an account.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Discount {
    pub category: DiscountCategory,
    pub rate: Decimal,
    pub used: bool,
}

impl Discount {
    pub fn new(category: DiscountCategory, rate: Decimal) -> Self {
        Self {
            category,
            rate,
            used: false,
        }
    }
}

/// Per-account interaction history with one commerciant.
#[derive(Debug, PartialEq, Clone)]
pub struct CommerciantStats {
    pub name: String,
    pub spent: Balance,
    pub transactions: u32,
}

impl CommerciantStats {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            spent: Balance::ZERO,
            transactions: 0,
        }
    }
}

/// Discount granted at 2, 5 and 10 cumulative payments to a
/// transaction-count commerciant. Counts past 10 grant nothing further.
fn count_milestone(transactions: u32) -> Option<Discount> {
    match transactions {
        2 => Some(Discount::new(DiscountCategory::Food, dec!(0.02))),
        5 => Some(Discount::new(DiscountCategory::Clothes, dec!(0.05))),
        10 => Some(Discount::new(DiscountCategory::Tech, dec!(0.10))),
        _ => None,
    }
}

/// Cashback rate for a cumulative RON spend at threshold commerciants,
/// tiered by service plan.
fn threshold_rate(total_spent_ron: Decimal, plan: ServicePlan) -> Decimal {
    let tiers: [(Decimal, Decimal, Decimal, Decimal); 3] = [
        (dec!(500), dec!(0.007), dec!(0.005), dec!(0.0025)),
        (dec!(300), dec!(0.0055), dec!(0.004), dec!(0.002)),
        (dec!(100), dec!(0.005), dec!(0.003), dec!(0.001)),
    ];
    for (threshold, gold, silver, other) in tiers {
        if total_spent_ron >= threshold {
            return match plan {
                ServicePlan::Gold => gold,
                ServicePlan::Silver => silver,
                _ => other,
            };
        }
    }
    Decimal::ZERO
}

/// Applies every unused discount that matches this payment and returns the
/// amount to credit back.
///
/// A category discount (Food/Clothes/Tech) fires when the commerciant category
/// matches and is flagged used; an unused SpendingThreshold discount fires on
/// any commerciant payment and is removed. Both may fire on the same payment.
pub fn apply_discounts(account: &mut Account, commerciant_category: &str, amount: Decimal) -> Decimal {
    let category = DiscountCategory::from_name(commerciant_category);
    let mut rate = Decimal::ZERO;

    for discount in account.discounts.iter_mut() {
        if !discount.used && Some(discount.category) == category {
            discount.used = true;
            rate += discount.rate;
        }
    }
    if let Some(pos) = account
        .discounts
        .iter()
        .position(|d| d.category == DiscountCategory::SpendingThreshold && !d.used)
    {
        rate += account.discounts[pos].rate;
        account.discounts.remove(pos);
    }

    amount * rate
}

/// Records the payment in the account's commerciant history and grants any
/// discount the strategy has earned.
///
/// Runs after [`apply_discounts`], so a freshly granted discount never rebates
/// the payment that earned it.
pub fn accrue(
    account: &mut Account,
    commerciant: &Commerciant,
    amount: Decimal,
    amount_ron: Decimal,
    plan: ServicePlan,
) {
    let transactions = {
        let stats = account.stats_mut(&commerciant.name);
        stats.spent += Balance::new(amount);
        if commerciant.cashback == CashbackKind::TransactionCount {
            stats.transactions += 1;
        }
        stats.transactions
    };

    match commerciant.cashback {
        CashbackKind::TransactionCount => {
            if let Some(discount) = count_milestone(transactions) {
                account.grant_discount(discount);
            }
        }
        CashbackKind::SpendingThreshold => {
            account.threshold_spend += Balance::new(amount_ron);
            let rate = threshold_rate(account.threshold_spend.value(), plan);
            if rate > Decimal::ZERO {
                account
                    .discounts
                    .retain(|d| !(d.category == DiscountCategory::SpendingThreshold && !d.used));
                account.grant_discount(Discount::new(DiscountCategory::SpendingThreshold, rate));
            }
        }
    }
}
