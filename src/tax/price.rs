use super::error::TaxError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a price as typed by a user, e.g. `300000`, `£300,000` or `250000.50`
pub fn parse_price(text: &str) -> Result<Decimal, TaxError> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return Err(TaxError::invalid("price is empty"));
    }
    let price = Decimal::from_str(&cleaned)
        .map_err(|_| TaxError::invalid(format!("price '{}' is not a number", text.trim())))?;
    ensure_non_negative(price)
}

/// Convert a float price, as received from a JSON form, into a decimal
pub fn price_from_f64(value: f64) -> Result<Decimal, TaxError> {
    if !value.is_finite() {
        return Err(TaxError::invalid(format!("price {} is not finite", value)));
    }
    let price = Decimal::from_f64(value)
        .ok_or_else(|| TaxError::invalid(format!("price {} is out of range", value)))?;
    ensure_non_negative(price)
}

pub fn ensure_non_negative(price: Decimal) -> Result<Decimal, TaxError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(TaxError::invalid(format!("price {} is negative", price)));
    }
    Ok(price)
}
