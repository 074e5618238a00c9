use crate::domain::account::Account;
use crate::error::Result;
use std::io::Write;

/// Writes the final account balances as CSV, one row per account in
/// creation order.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn write_balances(&mut self, accounts: &[Account]) -> Result<()> {
        self.writer.write_record(["iban", "currency", "balance"])?;
        for account in accounts {
            self.writer.write_record([
                account.iban.as_str(),
                account.currency.as_str(),
                &account.balance.value().to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
