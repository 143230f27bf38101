//! Stamp Duty Land Tax banding

use super::error::TaxError;
use super::price::{ensure_non_negative, parse_price, price_from_f64};
use super::schedule::{RateSchedule, TableKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Parameters of a single purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CalculationInput {
    /// Purchase price of the property in GBP
    #[serde(
        rename = "property_price",
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_price"
    )]
    #[schemars(with = "f64")]
    pub price: Decimal,
    /// The buyer has never owned a home, in the UK or abroad
    #[serde(default)]
    pub is_first_time_buyer: bool,
    /// The buyer will own more than one residential property after the purchase
    #[serde(default)]
    pub is_additional_property: bool,
}

impl CalculationInput {
    pub fn new(price: Decimal, is_first_time_buyer: bool, is_additional_property: bool) -> Self {
        CalculationInput {
            price,
            is_first_time_buyer,
            is_additional_property,
        }
    }
}

/// Tool callers send the price either as a JSON number or as typed text
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceArg {
    Number(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match PriceArg::deserialize(deserializer)? {
        PriceArg::Number(value) => price_from_f64(value),
        PriceArg::Text(text) => parse_price(&text),
    };
    price.map_err(serde::de::Error::custom)
}

/// The slice of the price that fell into one band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "BreakdownEntry")]
pub struct BandContribution {
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    pub amount: Decimal,
    /// Band rate plus any surcharge, in percent
    pub rate_percent: Decimal,
    pub duty: Decimal,
}

impl BandContribution {
    pub fn band_label(&self) -> String {
        format!(
            "{}-{}",
            self.lower_bound.normalize(),
            self.upper_bound.normalize()
        )
    }

    pub fn rate_label(&self) -> String {
        format!("{:.1}%", self.rate_percent)
    }
}

#[derive(Serialize)]
struct BreakdownEntry {
    band: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    rate: String,
    #[serde(with = "rust_decimal::serde::float")]
    duty: Decimal,
}

impl From<BandContribution> for BreakdownEntry {
    fn from(contribution: BandContribution) -> Self {
        BreakdownEntry {
            band: contribution.band_label(),
            amount: contribution.amount,
            rate: contribution.rate_label(),
            duty: contribution.duty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    #[serde(rename = "total_stamp_duty", with = "rust_decimal::serde::float")]
    pub total_duty: Decimal,
    #[serde(rename = "property_price", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// As given, even when the price was over the relief limit
    pub is_first_time_buyer: bool,
    pub is_additional_property: bool,
    pub breakdown: Vec<BandContribution>,
    #[serde(skip)]
    pub table: TableKind,
}

impl TaxResult {
    /// Total duty as a percentage of the price
    pub fn effective_rate_percent(&self) -> Decimal {
        if self.price.is_zero() {
            Decimal::ZERO
        } else {
            (self.total_duty / self.price * dec!(100)).round_dp(2)
        }
    }
}

/// Calculate SDLT against the schedule currently in force
pub fn calculate_tax(
    price: Decimal,
    is_first_time_buyer: bool,
    is_additional_property: bool,
) -> Result<TaxResult, TaxError> {
    let input = CalculationInput::new(price, is_first_time_buyer, is_additional_property);
    calculate(RateSchedule::current(), &input)
}

/// Split the price across the bands of the applicable table.
///
/// Each band takes the slice above the previous threshold up to and including
/// its own, so a price sitting exactly on a threshold is taxed wholly in the
/// lower band. The surcharge for additional properties is added per band, and
/// the total is rounded to pence once, after summing.
pub fn calculate(schedule: &RateSchedule, input: &CalculationInput) -> Result<TaxResult, TaxError> {
    let price = ensure_non_negative(input.price)?;
    let kind = schedule.table_kind(price, input.is_first_time_buyer);
    let surcharge = if input.is_additional_property {
        schedule.additional_property_surcharge
    } else {
        Decimal::ZERO
    };
    log::debug!(
        "Price {} using {} table (rates from {}), surcharge {}",
        price,
        kind,
        schedule.effective_from,
        surcharge
    );

    let mut remaining = price;
    let mut previous_threshold = Decimal::ZERO;
    let mut total_duty = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for band in schedule.table(kind).bands() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let band_amount = match band.threshold {
            Some(threshold) => remaining.min(threshold - previous_threshold),
            None => remaining,
        };
        let mut band_duty = checked_mul(band_amount, band.rate)?;
        if input.is_additional_property {
            band_duty = checked_add(band_duty, checked_mul(band_amount, surcharge)?)?;
        }
        total_duty = checked_add(total_duty, band_duty)?;

        if band_amount > Decimal::ZERO {
            let upper_bound = band.threshold.map_or(price, |t| t.min(price));
            log::debug!(
                "Band {}-{}: {} @ {} = {}",
                previous_threshold,
                upper_bound,
                band_amount,
                band.rate + surcharge,
                band_duty
            );
            breakdown.push(BandContribution {
                lower_bound: previous_threshold,
                upper_bound,
                amount: band_amount,
                rate_percent: (band.rate + surcharge) * dec!(100),
                duty: band_duty,
            });
        }

        remaining -= band_amount;
        match band.threshold {
            Some(threshold) if threshold < price => previous_threshold = threshold,
            _ => break,
        }
    }

    Ok(TaxResult {
        total_duty: total_duty.round_dp(2),
        price,
        is_first_time_buyer: input.is_first_time_buyer,
        is_additional_property: input.is_additional_property,
        breakdown,
        table: kind,
    })
}

fn checked_mul(amount: Decimal, rate: Decimal) -> Result<Decimal, TaxError> {
    amount
        .checked_mul(rate)
        .ok_or_else(|| TaxError::invalid(format!("price {} is too large", amount)))
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, TaxError> {
    a.checked_add(b)
        .ok_or_else(|| TaxError::invalid("duty is too large to represent"))
}
