use crate::domain::ports::NumberFactory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded identifier factory.
///
/// IBANs and card numbers come from a `StdRng`, so a run with the same seed
/// and the same operation sequence mints the same identifiers.
pub struct SeededNumbers {
    rng: StdRng,
}

impl SeededNumbers {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NumberFactory for SeededNumbers {
    fn next_iban(&mut self) -> String {
        let check: u8 = self.rng.gen_range(10..100);
        let digits: u64 = self.rng.gen_range(0..10_000_000_000_000_000);
        format!("RO{check:02}MINB{digits:016}")
    }

    fn next_card_number(&mut self) -> String {
        let digits: u64 = self.rng.gen_range(0..10_000_000_000_000_000);
        format!("{digits:016}")
    }
}
