mod common;

use common::harness;
use minibank::domain::cashback::DiscountCategory;
use minibank::domain::operation::Operation;
use rust_decimal_macros::dec;

async fn pay(bank: &common::Harness, ts: u64, email: &str, card: &str, amount: rust_decimal::Decimal, commerciant: &str) {
    bank.run(Operation::PayOnline {
        timestamp: ts,
        email: email.to_string(),
        card_number: card.to_string(),
        amount,
        currency: "RON".to_string(),
        commerciant: commerciant.to_string(),
        description: None,
    })
    .await;
}

#[tokio::test]
async fn test_transaction_count_milestones() {
    let bank = harness().await;
    let iban = bank
        .open_classic(1, "bogdan@minibank.ro", "RON", dec!(1000))
        .await;
    let card = bank.issue_card(2, "bogdan@minibank.ro", &iban, false).await;

    for ts in 0..2 {
        pay(&bank, 3 + ts, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    }
    let account = bank.account(&iban).await;
    let food = account
        .discounts
        .iter()
        .find(|d| d.category == DiscountCategory::Food)
        .expect("food discount granted at the second payment");
    assert_eq!(food.rate, dec!(0.02));
    assert!(!food.used);

    for ts in 0..3 {
        pay(&bank, 5 + ts, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    }
    let account = bank.account(&iban).await;
    assert!(
        account
            .discounts
            .iter()
            .any(|d| d.category == DiscountCategory::Clothes && d.rate == dec!(0.05))
    );

    for ts in 0..5 {
        pay(&bank, 8 + ts, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    }
    let account = bank.account(&iban).await;
    assert!(
        account
            .discounts
            .iter()
            .any(|d| d.category == DiscountCategory::Tech && d.rate == dec!(0.10))
    );
    assert_eq!(
        account
            .commerciants
            .iter()
            .find(|s| s.name == "Corner Shop")
            .unwrap()
            .transactions,
        10
    );
}

#[tokio::test]
async fn test_category_discount_credits_the_matching_payment() {
    let bank = harness().await;
    let iban = bank
        .open_classic(1, "bogdan@minibank.ro", "RON", dec!(1000))
        .await;
    let card = bank.issue_card(2, "bogdan@minibank.ro", &iban, false).await;

    // Two payments earn the Food discount; the third consumes it.
    pay(&bank, 3, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    pay(&bank, 4, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    pay(&bank, 5, "bogdan@minibank.ro", &card, dec!(100), "Corner Shop").await;

    // 1000 - 10 - 10 - 100 + 2% of 100.
    assert_eq!(bank.balance(&iban).await, dec!(882.00));
    let account = bank.account(&iban).await;
    let food = account
        .discounts
        .iter()
        .find(|d| d.category == DiscountCategory::Food)
        .unwrap();
    assert!(food.used);

    // Used means spent: a later food payment earns nothing back.
    pay(&bank, 6, "bogdan@minibank.ro", &card, dec!(100), "Corner Shop").await;
    assert_eq!(bank.balance(&iban).await, dec!(782.00));
}

#[tokio::test]
async fn test_spending_threshold_grant_and_burn() {
    let bank = harness().await;
    let iban = bank
        .open_classic(1, "bogdan@minibank.ro", "RON", dec!(1000))
        .await;
    let card = bank.issue_card(2, "bogdan@minibank.ro", &iban, false).await;

    // 150 RON at a threshold commerciant crosses the 100 RON tier.
    pay(&bank, 3, "bogdan@minibank.ro", &card, dec!(150), "MegaMall").await;
    let account = bank.account(&iban).await;
    let threshold = account
        .discounts
        .iter()
        .find(|d| d.category == DiscountCategory::SpendingThreshold)
        .expect("threshold discount granted");
    assert_eq!(threshold.rate, dec!(0.001));

    // The next commerciant payment of any category burns it.
    pay(&bank, 4, "bogdan@minibank.ro", &card, dec!(100), "Corner Shop").await;
    let account = bank.account(&iban).await;
    assert!(
        !account
            .discounts
            .iter()
            .any(|d| d.category == DiscountCategory::SpendingThreshold)
    );
    // 1000 - 150 - 100 + 100 * 0.001.
    assert_eq!(bank.balance(&iban).await, dec!(750.100));
}

#[tokio::test]
async fn test_clothes_discount_fires_at_a_clothes_commerciant() {
    let bank = harness().await;
    let iban = bank
        .open_classic(1, "bogdan@minibank.ro", "RON", dec!(1000))
        .await;
    let card = bank.issue_card(2, "bogdan@minibank.ro", &iban, false).await;

    // Five count-strategy payments earn the Clothes discount.
    for ts in 0..5 {
        pay(&bank, 3 + ts, "bogdan@minibank.ro", &card, dec!(10), "Corner Shop").await;
    }
    // MegaMall is a Clothes commerciant: 5% of 100 comes back. The payment
    // itself also accrues threshold spend, but 100 RON only earns the grant,
    // which cannot rebate the payment that earned it.
    pay(&bank, 9, "bogdan@minibank.ro", &card, dec!(100), "MegaMall").await;

    // 1000 - 50 + 0.2 (the Food discount fired on the third shop payment)
    // - 100 + 5.
    assert_eq!(bank.balance(&iban).await, dec!(855.20));
    let account = bank.account(&iban).await;
    assert!(
        account
            .discounts
            .iter()
            .any(|d| d.category == DiscountCategory::SpendingThreshold && !d.used)
    );
}
