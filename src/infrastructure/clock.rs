use crate::domain::ports::Clock;
use chrono::{Datelike, NaiveDate, Utc};

fn age_between(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Wall-clock backed implementation used by the binary.
pub struct SystemClock;

impl Clock for SystemClock {
    fn age_of(&self, birth_date: NaiveDate) -> u32 {
        age_between(birth_date, Utc::now().date_naive())
    }
}

/// Deterministic clock pinned to a fixed date, for tests.
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn age_of(&self, birth_date: NaiveDate) -> u32 {
        age_between(birth_date, self.today)
    }
}
