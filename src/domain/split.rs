use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    Equal,
    Custom,
}

impl SplitKind {
    pub fn name(self) -> &'static str {
        match self {
            SplitKind::Equal => "equal",
            SplitKind::Custom => "custom",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Consent {
    Undecided,
    Accepted,
    Rejected,
}

/// One account's stake in a split payment, with the owning user's consent.
#[derive(Debug, PartialEq, Clone)]
pub struct Participant {
    pub iban: String,
    /// Allocated amount, in the split's currency.
    pub share: Decimal,
    pub owner: String,
    pub consent: Consent,
}

impl Participant {
    pub fn new(iban: &str, share: Decimal, owner: &str) -> Self {
        Self {
            iban: iban.to_string(),
            share,
            owner: owner.to_string(),
            consent: Consent::Undecided,
        }
    }
}

/// A pending multi-account payment awaiting unanimous consent.
#[derive(Debug, PartialEq, Clone)]
pub struct SplitPayment {
    pub kind: SplitKind,
    pub total: Decimal,
    pub currency: String,
    pub timestamp: u64,
    pub participants: Vec<Participant>,
}

impl SplitPayment {
    pub fn involved(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.iban.clone()).collect()
    }

    pub fn shares(&self) -> Vec<Decimal> {
        self.participants.iter().map(|p| p.share).collect()
    }

    fn all_accepted(&self) -> bool {
        self.participants
            .iter()
            .all(|p| p.consent == Consent::Accepted)
    }
}

/// What registering one user's consent did to the split.
#[derive(Debug, PartialEq, Clone)]
pub enum SplitDecision {
    /// Consent recorded; other participants are still undecided.
    Waiting,
    /// Everyone accepted. The caller must settle all-or-nothing.
    Ready(SplitPayment),
    /// Someone rejected. The caller must notify every participant; no
    /// balances move.
    Cancelled(SplitPayment),
}

/// Registry of pending split payments, in creation order.
///
/// Resolution removes the split from the registry; partial settlement is
/// forbidden, so the coordinator only ever hands back whole splits.
#[derive(Debug, Default)]
pub struct SplitPaymentCoordinator {
    pending: Vec<SplitPayment>,
}

impl SplitPaymentCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, split: SplitPayment) {
        self.pending.push(split);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Applies one user's consent to the oldest pending split of the given
    /// kind in which they still have an undecided stake.
    ///
    /// Returns `None` when no such split exists.
    pub fn register(
        &mut self,
        email: &str,
        kind: SplitKind,
        consent: Consent,
    ) -> Option<SplitDecision> {
        let pos = self.pending.iter().position(|split| {
            split.kind == kind
                && split
                    .participants
                    .iter()
                    .any(|p| p.owner == email && p.consent == Consent::Undecided)
        })?;

        let split = &mut self.pending[pos];
        if let Some(stake) = split
            .participants
            .iter_mut()
            .find(|p| p.owner == email && p.consent == Consent::Undecided)
        {
            stake.consent = consent;
        }

        if consent == Consent::Rejected {
            return Some(SplitDecision::Cancelled(self.pending.remove(pos)));
        }
        if split.all_accepted() {
            return Some(SplitDecision::Ready(self.pending.remove(pos)));
        }
        Some(SplitDecision::Waiting)
    }
}
