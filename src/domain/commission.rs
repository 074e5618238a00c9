use crate::domain::exchange::ExchangeGraph;
use crate::domain::user::ServicePlan;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Adds the payer's commission to a debit amount.
///
/// The fee depends on the payer's service plan; for silver the transaction is
/// priced in RON first and small transactions stay free. Applied to the debited
/// leg only, before the minimum-balance check. A missing RON conversion path
/// (zero rate) prices the transaction at zero RON, which lands in the fee-free
/// band.
pub fn with_commission(
    amount: Decimal,
    plan: ServicePlan,
    currency: &str,
    exchange: &ExchangeGraph,
) -> Decimal {
    match plan {
        ServicePlan::Student | ServicePlan::Gold => amount,
        ServicePlan::Standard => amount + amount * dec!(0.002),
        ServicePlan::Silver => {
            let ron_equivalent = amount * exchange.convert(currency, "RON");
            if ron_equivalent < dec!(500) {
                amount
            } else {
                amount + amount * dec!(0.001)
            }
        }
    }
}
