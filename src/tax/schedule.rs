use super::error::TaxError;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("band table has no bands")]
    EmptyTable,
    #[error("band threshold must be positive, got {0}")]
    NonPositiveThreshold(Decimal),
    #[error("band thresholds must be strictly increasing: {previous} followed by {next}")]
    ThresholdsNotIncreasing { previous: Decimal, next: Decimal },
    #[error("only the final band may be unbounded")]
    UnboundedBandNotLast,
    #[error("final band must be unbounded (threshold null)")]
    MissingUnboundedBand,
    #[error("band rate must be between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),
    #[error("additional property surcharge must be between 0 and 1, got {0}")]
    SurchargeOutOfRange(Decimal),
    #[error("first-time buyer limit must be positive, got {0}")]
    NonPositiveLimit(Decimal),
    #[error("invalid rates file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A band covers the slice of price above the previous band's threshold, up
/// to and including its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBand {
    /// Upper bound of the band in GBP, `null` for the unbounded top band
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schemars(with = "Option<f64>")]
    pub threshold: Option<Decimal>,
    /// Rate as a fraction (0.05 = 5%)
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub rate: Decimal,
}

impl TaxBand {
    pub const fn upto(threshold: Decimal, rate: Decimal) -> Self {
        TaxBand {
            threshold: Some(threshold),
            rate,
        }
    }

    pub const fn above(rate: Decimal) -> Self {
        TaxBand {
            threshold: None,
            rate,
        }
    }
}

/// Ordered bands with an implicit lower edge of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "Vec<TaxBand>", into = "Vec<TaxBand>")]
pub struct BandTable(Vec<TaxBand>);

impl BandTable {
    pub fn new(bands: Vec<TaxBand>) -> Result<Self, ScheduleError> {
        let (last, init) = bands.split_last().ok_or(ScheduleError::EmptyTable)?;
        if last.threshold.is_some() {
            return Err(ScheduleError::MissingUnboundedBand);
        }

        let mut previous = Decimal::ZERO;
        for band in init {
            let threshold = band.threshold.ok_or(ScheduleError::UnboundedBandNotLast)?;
            if threshold <= Decimal::ZERO {
                return Err(ScheduleError::NonPositiveThreshold(threshold));
            }
            if threshold <= previous {
                return Err(ScheduleError::ThresholdsNotIncreasing {
                    previous,
                    next: threshold,
                });
            }
            previous = threshold;
        }

        if let Some(band) = bands.iter().find(|b| !is_fraction(b.rate)) {
            return Err(ScheduleError::RateOutOfRange(band.rate));
        }

        Ok(BandTable(bands))
    }

    pub fn bands(&self) -> &[TaxBand] {
        &self.0
    }

    /// Lower edge of each band paired with the band itself
    pub fn ranges(&self) -> impl Iterator<Item = (Decimal, &TaxBand)> + '_ {
        let lowers = std::iter::once(Decimal::ZERO)
            .chain(self.0.iter().filter_map(|b| b.threshold));
        lowers.zip(self.0.iter())
    }
}

impl TryFrom<Vec<TaxBand>> for BandTable {
    type Error = ScheduleError;

    fn try_from(bands: Vec<TaxBand>) -> Result<Self, Self::Error> {
        BandTable::new(bands)
    }
}

impl From<BandTable> for Vec<TaxBand> {
    fn from(table: BandTable) -> Self {
        table.0
    }
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

/// Which of a schedule's two tables a calculation used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Standard,
    FirstTimeBuyer,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Standard => write!(f, "standard"),
            TableKind::FirstTimeBuyer => write!(f, "first-time buyer"),
        }
    }
}

/// SDLT rates for residential property in England and Northern Ireland, as
/// they stood from `effective_from` until the next schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RateSchedule {
    /// Date the rates took effect
    pub effective_from: NaiveDate,
    /// Bands for everyone not getting first-time buyer relief
    pub standard: BandTable,
    /// Bands for first-time buyers at or below the eligibility limit
    pub first_time_buyer: BandTable,
    /// Highest price at which first-time buyer relief applies
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub first_time_buyer_limit: Decimal,
    /// Extra rate added to every band for additional properties (0.05 = 5%)
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub additional_property_surcharge: Decimal,
}

lazy_static! {
    static ref SCHEDULES: Vec<RateSchedule> = vec![
        // 1 October 2021, end of the temporary nil-rate band increase
        RateSchedule {
            effective_from: date(2021, 10, 1),
            standard: standard_bands(),
            first_time_buyer: first_time_buyer_bands(),
            first_time_buyer_limit: dec!(500000),
            additional_property_surcharge: dec!(0.03),
        },
        // 23 September 2022
        RateSchedule {
            effective_from: date(2022, 9, 23),
            standard: raised_nil_band(),
            first_time_buyer: raised_first_time_buyer(),
            first_time_buyer_limit: dec!(625000),
            additional_property_surcharge: dec!(0.03),
        },
        // 31 October 2024, higher rates for additional dwellings go to 5%
        RateSchedule {
            effective_from: date(2024, 10, 31),
            standard: raised_nil_band(),
            first_time_buyer: raised_first_time_buyer(),
            first_time_buyer_limit: dec!(625000),
            additional_property_surcharge: dec!(0.05),
        },
        // 1 April 2025
        RateSchedule {
            effective_from: date(2025, 4, 1),
            standard: standard_bands(),
            first_time_buyer: first_time_buyer_bands(),
            first_time_buyer_limit: dec!(500000),
            additional_property_surcharge: dec!(0.05),
        },
    ];
}

fn standard_bands() -> BandTable {
    builtin(&[
        TaxBand::upto(dec!(125000), dec!(0)),
        TaxBand::upto(dec!(250000), dec!(0.02)),
        TaxBand::upto(dec!(925000), dec!(0.05)),
        TaxBand::upto(dec!(1500000), dec!(0.10)),
        TaxBand::above(dec!(0.12)),
    ])
}

fn first_time_buyer_bands() -> BandTable {
    builtin(&[
        TaxBand::upto(dec!(300000), dec!(0)),
        TaxBand::upto(dec!(500000), dec!(0.05)),
        TaxBand::above(dec!(0.05)),
    ])
}

fn raised_nil_band() -> BandTable {
    builtin(&[
        TaxBand::upto(dec!(250000), dec!(0)),
        TaxBand::upto(dec!(925000), dec!(0.05)),
        TaxBand::upto(dec!(1500000), dec!(0.10)),
        TaxBand::above(dec!(0.12)),
    ])
}

fn raised_first_time_buyer() -> BandTable {
    builtin(&[
        TaxBand::upto(dec!(425000), dec!(0)),
        TaxBand::upto(dec!(625000), dec!(0.05)),
        TaxBand::above(dec!(0.05)),
    ])
}

// Built-in tables are checked by `builtin_schedules_are_valid` below.
fn builtin(bands: &[TaxBand]) -> BandTable {
    BandTable(bands.to_vec())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl RateSchedule {
    /// All built-in schedules, oldest first
    pub fn builtin() -> &'static [RateSchedule] {
        &SCHEDULES
    }

    /// The schedule in force today
    pub fn current() -> &'static RateSchedule {
        &SCHEDULES[SCHEDULES.len() - 1]
    }

    /// The schedule in force on `date`
    pub fn for_date(date: NaiveDate) -> Result<&'static RateSchedule, TaxError> {
        SCHEDULES
            .iter()
            .rev()
            .find(|s| s.effective_from <= date)
            .ok_or_else(|| {
                TaxError::invalid(format!(
                    "no rate schedule covers {}, earliest is {}",
                    date, SCHEDULES[0].effective_from
                ))
            })
    }

    /// Read a schedule from JSON, validating the tables along the way
    pub fn from_json<R: Read>(reader: R) -> Result<Self, ScheduleError> {
        let schedule: RateSchedule = serde_json::from_reader(reader)?;
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.first_time_buyer_limit <= Decimal::ZERO {
            return Err(ScheduleError::NonPositiveLimit(self.first_time_buyer_limit));
        }
        if !is_fraction(self.additional_property_surcharge) {
            return Err(ScheduleError::SurchargeOutOfRange(
                self.additional_property_surcharge,
            ));
        }
        Ok(())
    }

    /// First-time buyer relief only applies up to the eligibility limit
    pub fn table_kind(&self, price: Decimal, is_first_time_buyer: bool) -> TableKind {
        if is_first_time_buyer && price <= self.first_time_buyer_limit {
            TableKind::FirstTimeBuyer
        } else {
            TableKind::Standard
        }
    }

    pub fn table(&self, kind: TableKind) -> &BandTable {
        match kind {
            TableKind::Standard => &self.standard,
            TableKind::FirstTimeBuyer => &self.first_time_buyer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_RATES: &str = r#"{
        "effective_from": "2025-04-01",
        "standard": [
            {"threshold": 125000, "rate": 0.0},
            {"threshold": 250000, "rate": 0.02},
            {"threshold": 925000, "rate": 0.05},
            {"threshold": 1500000, "rate": 0.10},
            {"threshold": null, "rate": 0.12}
        ],
        "first_time_buyer": [
            {"threshold": 300000, "rate": 0.0},
            {"threshold": 500000, "rate": 0.05},
            {"threshold": null, "rate": 0.05}
        ],
        "first_time_buyer_limit": 500000,
        "additional_property_surcharge": 0.05
    }"#;

    #[test]
    fn builtin_schedules_are_valid() {
        for schedule in RateSchedule::builtin() {
            BandTable::new(schedule.standard.bands().to_vec()).unwrap();
            BandTable::new(schedule.first_time_buyer.bands().to_vec()).unwrap();
            schedule.validate().unwrap();
        }
    }

    #[test]
    fn builtin_schedules_are_in_date_order() {
        let dates: Vec<_> = RateSchedule::builtin()
            .iter()
            .map(|s| s.effective_from)
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(dates, sorted);
        // `date` falls back to MIN on a mistyped day
        assert!(dates.iter().all(|d| *d != NaiveDate::MIN));
    }

    #[test]
    fn current_schedule_matches_april_2025_rates() {
        let current = RateSchedule::current();
        assert_eq!(current.effective_from, date(2025, 4, 1));
        assert_eq!(current.first_time_buyer_limit, dec!(500000));
        assert_eq!(current.additional_property_surcharge, dec!(0.05));
        assert_eq!(current.standard.bands()[0], TaxBand::upto(dec!(125000), dec!(0)));
        assert_eq!(current.standard.bands()[4], TaxBand::above(dec!(0.12)));
    }

    #[test]
    fn for_date_picks_latest_effective_schedule() {
        let on_start = RateSchedule::for_date(date(2025, 4, 1)).unwrap();
        assert_eq!(on_start.effective_from, date(2025, 4, 1));

        let day_before = RateSchedule::for_date(date(2025, 3, 31)).unwrap();
        assert_eq!(day_before.effective_from, date(2024, 10, 31));
        assert_eq!(day_before.first_time_buyer_limit, dec!(625000));

        let surcharge_change = RateSchedule::for_date(date(2024, 10, 30)).unwrap();
        assert_eq!(surcharge_change.additional_property_surcharge, dec!(0.03));

        let far_future = RateSchedule::for_date(date(2040, 1, 1)).unwrap();
        assert_eq!(far_future, RateSchedule::current());
    }

    #[test]
    fn for_date_before_earliest_schedule_is_invalid() {
        let err = RateSchedule::for_date(date(2021, 9, 30)).unwrap_err();
        assert!(matches!(err, TaxError::InvalidInput(_)));
    }

    #[test]
    fn table_kind_respects_eligibility_limit() {
        let current = RateSchedule::current();
        assert_eq!(current.table_kind(dec!(500000), true), TableKind::FirstTimeBuyer);
        assert_eq!(current.table_kind(dec!(500000.01), true), TableKind::Standard);
        assert_eq!(current.table_kind(dec!(100000), false), TableKind::Standard);
    }

    #[test]
    fn ranges_pair_lower_edges_with_bands() {
        let ranges: Vec<_> = RateSchedule::current()
            .first_time_buyer
            .ranges()
            .map(|(lower, band)| (lower, band.threshold))
            .collect();
        assert_eq!(
            ranges,
            vec![
                (dec!(0), Some(dec!(300000))),
                (dec!(300000), Some(dec!(500000))),
                (dec!(500000), None),
            ]
        );
    }

    #[test]
    fn rates_file_round_trips_to_current_schedule() {
        let schedule = RateSchedule::from_json(CURRENT_RATES.as_bytes()).unwrap();
        assert_eq!(&schedule, RateSchedule::current());
    }

    #[test]
    fn table_must_end_unbounded() {
        let err = BandTable::new(vec![TaxBand::upto(dec!(100), dec!(0))]).unwrap_err();
        assert!(matches!(err, ScheduleError::MissingUnboundedBand));
    }

    #[test]
    fn unbounded_band_must_be_last() {
        let err = BandTable::new(vec![
            TaxBand::above(dec!(0)),
            TaxBand::above(dec!(0.05)),
        ])
        .unwrap_err();
        assert!(matches!(err, ScheduleError::UnboundedBandNotLast));
    }

    #[test]
    fn thresholds_must_increase() {
        let err = BandTable::new(vec![
            TaxBand::upto(dec!(250000), dec!(0)),
            TaxBand::upto(dec!(125000), dec!(0.02)),
            TaxBand::above(dec!(0.05)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::ThresholdsNotIncreasing { previous, next }
                if previous == dec!(250000) && next == dec!(125000)
        ));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            BandTable::new(vec![]).unwrap_err(),
            ScheduleError::EmptyTable
        ));
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let err = BandTable::new(vec![
            TaxBand::upto(dec!(125000), dec!(0)),
            TaxBand::above(dec!(5)),
        ])
        .unwrap_err();
        assert!(matches!(err, ScheduleError::RateOutOfRange(r) if r == dec!(5)));
    }

    #[test]
    fn invalid_table_in_rates_file_is_a_parse_error() {
        let json = CURRENT_RATES.replace(r#"{"threshold": null, "rate": 0.12}"#, r#"{"threshold": 2000000, "rate": 0.12}"#);
        let err = RateSchedule::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ScheduleError::Parse(_)));
        assert!(err.to_string().contains("unbounded"));
    }

    #[test]
    fn surcharge_is_validated() {
        let json = CURRENT_RATES.replace(
            r#""additional_property_surcharge": 0.05"#,
            r#""additional_property_surcharge": 1.5"#,
        );
        let err = RateSchedule::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ScheduleError::SurchargeOutOfRange(_)));
    }
}
