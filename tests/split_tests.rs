mod common;

use common::{count_kinds, harness};
use minibank::domain::operation::{AccountType, Operation, OperationOutcome};
use minibank::domain::split::SplitKind;
use minibank::domain::transaction::TransactionKind;
use rust_decimal_macros::dec;

async fn accept(bank: &common::Harness, ts: u64, email: &str, kind: SplitKind) {
    bank.run(Operation::AcceptSplitPayment {
        timestamp: ts,
        email: email.to_string(),
        split_payment_type: kind,
    })
    .await;
}

#[tokio::test]
async fn test_equal_split_settles_after_unanimous_consent() {
    let bank = harness().await;
    let a = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let b = bank.open_classic(2, "bogdan@minibank.ro", "RON", dec!(500)).await;
    let c = bank.open_classic(3, "carmen@minibank.ro", "RON", dec!(500)).await;

    bank.run(Operation::SplitPayment {
        timestamp: 4,
        split_payment_type: SplitKind::Equal,
        accounts: vec![a.clone(), b.clone(), c.clone()],
        amount: dec!(300),
        amounts: None,
        currency: "RON".to_string(),
    })
    .await;

    accept(&bank, 5, "ana@minibank.ro", SplitKind::Equal).await;
    accept(&bank, 6, "bogdan@minibank.ro", SplitKind::Equal).await;
    // Nothing settles before the last consent.
    assert_eq!(bank.balance(&a).await, dec!(500));

    accept(&bank, 7, "carmen@minibank.ro", SplitKind::Equal).await;

    for iban in [&a, &b, &c] {
        assert_eq!(bank.balance(iban).await, dec!(400));
        let account = bank.account(iban).await;
        assert_eq!(
            count_kinds(account.ledger.iter(), |k| matches!(
                k,
                TransactionKind::EqualSplitCompleted { .. }
            )),
            1
        );
    }
}

#[tokio::test]
async fn test_split_share_is_currency_converted() {
    let bank = harness().await;
    let ron = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let eur = bank.open_classic(2, "bogdan@minibank.ro", "EUR", dec!(500)).await;

    // 200 RON split equally: 100 RON each, the EUR account pays 20 EUR.
    bank.run(Operation::SplitPayment {
        timestamp: 3,
        split_payment_type: SplitKind::Equal,
        accounts: vec![ron.clone(), eur.clone()],
        amount: dec!(200),
        amounts: None,
        currency: "RON".to_string(),
    })
    .await;
    accept(&bank, 4, "ana@minibank.ro", SplitKind::Equal).await;
    accept(&bank, 5, "bogdan@minibank.ro", SplitKind::Equal).await;

    assert_eq!(bank.balance(&ron).await, dec!(400));
    assert_eq!(bank.balance(&eur).await, dec!(480.0));
}

#[tokio::test]
async fn test_one_rejection_cancels_everything() {
    let bank = harness().await;
    let a = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let b = bank.open_classic(2, "bogdan@minibank.ro", "RON", dec!(500)).await;
    let c = bank.open_classic(3, "carmen@minibank.ro", "RON", dec!(500)).await;

    bank.run(Operation::SplitPayment {
        timestamp: 4,
        split_payment_type: SplitKind::Equal,
        accounts: vec![a.clone(), b.clone(), c.clone()],
        amount: dec!(300),
        amounts: None,
        currency: "RON".to_string(),
    })
    .await;

    accept(&bank, 5, "ana@minibank.ro", SplitKind::Equal).await;
    bank.run(Operation::RejectSplitPayment {
        timestamp: 6,
        email: "bogdan@minibank.ro".to_string(),
        split_payment_type: SplitKind::Equal,
    })
    .await;

    for iban in [&a, &b, &c] {
        assert_eq!(bank.balance(iban).await, dec!(500));
        let account = bank.account(iban).await;
        let rejected = account
            .ledger
            .iter()
            .find_map(|record| match &record.kind {
                TransactionKind::EqualSplitError { error, .. } => Some(error.clone()),
                _ => None,
            })
            .expect("error record present");
        assert_eq!(rejected, "One user rejected the payment.");
    }
}

#[tokio::test]
async fn test_settlement_shortfall_names_the_account() {
    let bank = harness().await;
    let a = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let b = bank.open_classic(2, "bogdan@minibank.ro", "RON", dec!(50)).await;

    bank.run(Operation::SplitPayment {
        timestamp: 3,
        split_payment_type: SplitKind::Equal,
        accounts: vec![a.clone(), b.clone()],
        amount: dec!(300),
        amounts: None,
        currency: "RON".to_string(),
    })
    .await;
    accept(&bank, 4, "ana@minibank.ro", SplitKind::Equal).await;
    accept(&bank, 5, "bogdan@minibank.ro", SplitKind::Equal).await;

    // Nobody pays; the broke account is named for every participant.
    assert_eq!(bank.balance(&a).await, dec!(500));
    assert_eq!(bank.balance(&b).await, dec!(50));
    let expected = format!("Account {b} has insufficient funds for a split payment.");
    for iban in [&a, &b] {
        let account = bank.account(iban).await;
        let error = account
            .ledger
            .iter()
            .find_map(|record| match &record.kind {
                TransactionKind::EqualSplitError { error, .. } => Some(error.clone()),
                _ => None,
            })
            .expect("error record present");
        assert_eq!(error, expected);
    }
}

#[tokio::test]
async fn test_custom_split_uses_the_allocations() {
    let bank = harness().await;
    let a = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let b = bank.open_classic(2, "bogdan@minibank.ro", "RON", dec!(500)).await;

    bank.run(Operation::SplitPayment {
        timestamp: 3,
        split_payment_type: SplitKind::Custom,
        accounts: vec![a.clone(), b.clone()],
        amount: dec!(300),
        amounts: Some(vec![dec!(100), dec!(200)]),
        currency: "RON".to_string(),
    })
    .await;
    accept(&bank, 4, "ana@minibank.ro", SplitKind::Custom).await;
    accept(&bank, 5, "bogdan@minibank.ro", SplitKind::Custom).await;

    assert_eq!(bank.balance(&a).await, dec!(400));
    assert_eq!(bank.balance(&b).await, dec!(300));
}

#[tokio::test]
async fn test_custom_split_validations() {
    let bank = harness().await;
    let a = bank.open_classic(1, "ana@minibank.ro", "RON", dec!(500)).await;
    let b = bank.open_classic(2, "bogdan@minibank.ro", "RON", dec!(500)).await;

    // Allocations must sum exactly to the total.
    let outcome = bank
        .run(Operation::SplitPayment {
            timestamp: 3,
            split_payment_type: SplitKind::Custom,
            accounts: vec![a.clone(), b.clone()],
            amount: dec!(300),
            amounts: Some(vec![dec!(100), dec!(150)]),
            currency: "RON".to_string(),
        })
        .await;
    assert_eq!(
        outcome,
        OperationOutcome::error("Split amounts do not sum to the total")
    );

    // Business accounts are rejected from custom splits.
    let business = bank
        .open_account(
            4,
            "carmen@minibank.ro",
            "RON",
            AccountType::Business,
            None,
            dec!(500),
        )
        .await;
    let outcome = bank
        .run(Operation::SplitPayment {
            timestamp: 5,
            split_payment_type: SplitKind::Custom,
            accounts: vec![a.clone(), business],
            amount: dec!(200),
            amounts: Some(vec![dec!(100), dec!(100)]),
            currency: "RON".to_string(),
        })
        .await;
    assert_eq!(
        outcome,
        OperationOutcome::error("Business accounts cannot take part in custom split payments")
    );

    // Unknown participant, by name.
    let outcome = bank
        .run(Operation::SplitPayment {
            timestamp: 6,
            split_payment_type: SplitKind::Equal,
            accounts: vec![a, "RO00GHOST".to_string()],
            amount: dec!(200),
            amounts: None,
            currency: "RON".to_string(),
        })
        .await;
    assert_eq!(outcome, OperationOutcome::error("Account RO00GHOST is invalid"));
}

#[tokio::test]
async fn test_consent_with_nothing_pending() {
    let bank = harness().await;
    let outcome = bank
        .run(Operation::AcceptSplitPayment {
            timestamp: 1,
            email: "ana@minibank.ro".to_string(),
            split_payment_type: SplitKind::Equal,
        })
        .await;
    assert_eq!(outcome, OperationOutcome::error("No split payment to accept"));

    let outcome = bank
        .run(Operation::RejectSplitPayment {
            timestamp: 2,
            email: "ghost@minibank.ro".to_string(),
            split_payment_type: SplitKind::Equal,
        })
        .await;
    assert_eq!(outcome, OperationOutcome::error("User not found"));
}
