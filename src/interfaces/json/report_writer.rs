use crate::domain::operation::OperationOutcome;
use crate::error::Result;
use serde_json::{Value, json};
use std::io::Write;

/// One replayed command and what the engine handed back for it.
pub struct ReportEntry {
    pub command: &'static str,
    pub timestamp: u64,
    pub outcome: OperationOutcome,
}

/// Serializes the per-operation report array to any `Write` sink.
///
/// Silent operations (`OperationOutcome::None`) are skipped; everything else
/// becomes a `{command, timestamp, output}` object.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, entries: &[ReportEntry]) -> Result<()> {
        let mut report = Vec::new();
        for entry in entries {
            let output = match &entry.outcome {
                OperationOutcome::None => continue,
                OperationOutcome::Success { description } => {
                    json!({"success": description, "timestamp": entry.timestamp})
                }
                OperationOutcome::Error { description } => {
                    json!({"description": description, "timestamp": entry.timestamp})
                }
                OperationOutcome::AccountReport(payload) => serde_json::to_value(payload)?,
                OperationOutcome::SpendingsReport(payload) => serde_json::to_value(payload)?,
            };
            report.push(json!({
                "command": entry.command,
                "timestamp": entry.timestamp,
                "output": output,
            }));
        }

        serde_json::to_writer_pretty(&mut self.out, &Value::Array(report))?;
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::AccountReport;
    use crate::domain::transaction::{TransactionKind, TransactionRecord};
    use rust_decimal_macros::dec;

    fn written(entries: &[ReportEntry]) -> Value {
        let mut buffer = Vec::new();
        ReportWriter::new(&mut buffer).write(entries).unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_silent_outcomes_are_skipped() {
        let report = written(&[
            ReportEntry {
                command: "addFunds",
                timestamp: 1,
                outcome: OperationOutcome::None,
            },
            ReportEntry {
                command: "deleteAccount",
                timestamp: 2,
                outcome: OperationOutcome::error("Account not found"),
            },
        ]);

        let entries = report.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["command"], "deleteAccount");
        assert_eq!(entries[0]["output"]["description"], "Account not found");
        assert_eq!(entries[0]["output"]["timestamp"], 2);
    }

    #[test]
    fn test_account_report_serialization() {
        let outcome = OperationOutcome::AccountReport(AccountReport {
            iban: "RO01".to_string(),
            currency: "RON".to_string(),
            balance: dec!(120.5),
            transactions: vec![TransactionRecord::new(
                3,
                "Card payment",
                TransactionKind::CardPayment {
                    amount: dec!(10),
                    commerciant: "Corner Shop".to_string(),
                },
            )],
        });
        let report = written(&[ReportEntry {
            command: "report",
            timestamp: 9,
            outcome,
        }]);

        let output = &report[0]["output"];
        assert_eq!(output["IBAN"], "RO01");
        let tx = &output["transactions"][0];
        assert_eq!(tx["kind"], "cardPayment");
        assert_eq!(tx["commerciant"], "Corner Shop");
        assert_eq!(tx["description"], "Card payment");
    }
}
