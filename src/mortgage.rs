//! Interest and repayment calculators. The annual rate is supplied by the
//! caller, e.g. the current Bank of England base rate.

use crate::tax::TaxError;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// A year's simple interest on `principal`, rounded to pence
pub fn interest(principal: Decimal, annual_rate: Decimal) -> Result<Decimal, TaxError> {
    check_non_negative("principal", principal)?;
    check_non_negative("rate", annual_rate)?;
    principal
        .checked_mul(annual_rate)
        .map(|i| i.round_dp(2))
        .ok_or_else(|| TaxError::invalid("interest is too large to represent"))
}

/// Level monthly repayment that clears `principal` over `years`
pub fn monthly_payment(
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
) -> Result<Decimal, TaxError> {
    check_non_negative("principal", principal)?;
    check_non_negative("rate", annual_rate)?;
    if years == 0 {
        return Err(TaxError::invalid("term must be at least one year"));
    }

    let payments = i64::from(years) * 12;
    let monthly_rate = annual_rate / dec!(12);
    if monthly_rate.is_zero() {
        return Ok((principal / Decimal::from(payments)).round_dp(2));
    }

    // (1 + r)^-n; past Decimal's range it is below the smallest representable value
    let discount = match (Decimal::ONE + monthly_rate).checked_powi(payments) {
        Some(growth) => Decimal::ONE / growth,
        None => Decimal::ZERO,
    };
    let payment = principal
        .checked_mul(monthly_rate)
        .and_then(|p| p.checked_div(Decimal::ONE - discount))
        .ok_or_else(|| TaxError::invalid("payment is too large to represent"))?;
    Ok(payment.round_dp(2))
}

fn check_non_negative(name: &str, value: Decimal) -> Result<(), TaxError> {
    if value < Decimal::ZERO {
        return Err(TaxError::invalid(format!("{} {} is negative", name, value)));
    }
    Ok(())
}
