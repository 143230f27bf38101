//! Batch command - stamp duty for every purchase in a CSV file

use crate::cmd::calc::format_gbp;
use crate::cmd::{open_input, ScheduleArgs};
use crate::utils::write_csv;
use clap::Args;
use rust_decimal::Decimal;
use sdltc::tax::{calculate, parse_price, CalculationInput, RateSchedule, TaxError};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file of purchases. Reads from stdin if not specified.
    #[arg(short = 'f', long, default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    schedule: ScheduleArgs,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// One purchase in the input CSV
#[derive(Debug, Deserialize)]
pub struct PurchaseRecord {
    pub id: String,
    pub price: String,
    #[serde(default)]
    pub first_time_buyer: Option<bool>,
    #[serde(default)]
    pub additional_property: Option<bool>,
}

pub const CSV_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    ("id", true, "Identifier echoed back in the output"),
    ("price", true, "Purchase price in GBP (e.g. 300000 or \"£300,000\")"),
    ("first_time_buyer", false, "true if the buyer has never owned a home"),
    (
        "additional_property",
        false,
        "true if the buyer will own more than one home after the purchase",
    ),
];

/// Row for the batch output
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct BatchRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Rates")]
    pub table: String,
    #[tabled(rename = "FTB")]
    pub first_time_buyer: bool,
    #[tabled(rename = "Additional")]
    pub additional_property: bool,
    #[tabled(rename = "Duty")]
    pub duty: String,
    #[tabled(rename = "Eff. Rate")]
    pub effective_rate: String,
    #[tabled(rename = "Error")]
    pub error: String,
    #[tabled(skip)]
    #[serde(skip)]
    pub total_duty: Option<Decimal>,
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schedule = self.schedule.schedule()?;
        let reader = open_input(&self.file)?;
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut records: Vec<PurchaseRecord> = Vec::new();
        for record in rdr.deserialize() {
            records.push(record?);
        }
        let rows = build_rows(&schedule, records);

        let failed = rows.iter().filter(|r| !r.error.is_empty()).count();
        let total: Decimal = rows.iter().filter_map(|r| r.total_duty).sum();
        log::info!(
            "Calculated {} purchases ({} failed), total duty {}",
            rows.len() - failed,
            failed,
            format_gbp(total)
        );

        if self.csv {
            write_csv(rows, io::stdout())
        } else {
            print_table(&rows);
            Ok(())
        }
    }
}

/// Rows that fail validation carry their error instead of aborting the batch
pub fn build_rows(schedule: &RateSchedule, records: Vec<PurchaseRecord>) -> Vec<BatchRow> {
    records
        .into_iter()
        .map(|record| {
            let first_time_buyer = record.first_time_buyer.unwrap_or(false);
            let additional_property = record.additional_property.unwrap_or(false);
            match calculate_record(schedule, &record) {
                Ok(result) => BatchRow {
                    id: record.id,
                    price: format_gbp(result.price),
                    table: result.table.to_string(),
                    first_time_buyer,
                    additional_property,
                    duty: format_gbp(result.total_duty),
                    effective_rate: format!("{:.2}%", result.effective_rate_percent()),
                    error: String::new(),
                    total_duty: Some(result.total_duty),
                },
                Err(err) => {
                    log::warn!("Skipping purchase {}: {}", record.id, err);
                    BatchRow {
                        id: record.id,
                        price: record.price,
                        table: String::new(),
                        first_time_buyer,
                        additional_property,
                        duty: String::new(),
                        effective_rate: String::new(),
                        error: err.to_string(),
                        total_duty: None,
                    }
                }
            }
        })
        .collect()
}

fn calculate_record(
    schedule: &RateSchedule,
    record: &PurchaseRecord,
) -> Result<sdltc::tax::TaxResult, TaxError> {
    let price = parse_price(&record.price)?;
    let input = CalculationInput::new(
        price,
        record.first_time_buyer.unwrap_or(false),
        record.additional_property.unwrap_or(false),
    );
    calculate(schedule, &input)
}

fn print_table(rows: &[BatchRow]) {
    if rows.is_empty() {
        println!("No purchases found");
        return;
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, price: &str, ftb: Option<bool>, additional: Option<bool>) -> PurchaseRecord {
        PurchaseRecord {
            id: id.to_string(),
            price: price.to_string(),
            first_time_buyer: ftb,
            additional_property: additional,
        }
    }

    #[test]
    fn builds_one_row_per_purchase() {
        let rows = build_rows(
            RateSchedule::current(),
            vec![
                record("a", "300000", None, None),
                record("b", "300000", Some(true), None),
                record("c", "300000", Some(false), Some(true)),
            ],
        );
        let duties: Vec<_> = rows.iter().map(|r| r.duty.as_str()).collect();
        assert_eq!(duties, vec!["£5000.00", "£0.00", "£20000.00"]);
        assert_eq!(rows[1].table, "first-time buyer");
        assert_eq!(rows[2].effective_rate, "6.67%");
    }

    #[test]
    fn invalid_rows_are_reported_not_fatal() {
        let rows = build_rows(
            RateSchedule::current(),
            vec![
                record("bad", "-100", None, None),
                record("words", "lots", None, None),
                record("good", "125000", None, None),
            ],
        );
        assert_eq!(rows.len(), 3);
        assert!(rows[0].error.contains("negative"));
        assert_eq!(rows[0].price, "-100");
        assert!(rows[1].error.contains("not a number"));
        assert!(rows[2].error.is_empty());
        assert_eq!(rows[2].duty, "£0.00");
    }

    #[test]
    fn reads_csv_with_optional_flags() {
        let data = "id,price,first_time_buyer,additional_property\n\
                    flat,\"£250,000\",true,\n\
                    house,600000,,true\n";
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let records: Vec<PurchaseRecord> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first_time_buyer, Some(true));
        assert_eq!(records[0].additional_property, None);
        assert_eq!(records[1].first_time_buyer, None);

        let rows = build_rows(RateSchedule::current(), records);
        assert_eq!(rows[0].duty, "£0.00");
        // 20000 standard + 30000 surcharge
        assert_eq!(rows[1].duty, "£50000.00");
    }

    #[test]
    fn failed_rows_carry_no_duty() {
        let rows = build_rows(
            RateSchedule::current(),
            vec![
                record("a", "300000", None, None),
                record("bad", "3OO000", None, None),
                record("b", "300000", None, Some(true)),
            ],
        );
        let duties: Vec<_> = rows.iter().map(|r| r.total_duty).collect();
        assert_eq!(
            duties,
            vec![Some(Decimal::new(5000, 0)), None, Some(Decimal::new(20000, 0))]
        );
        let total: Decimal = rows.iter().filter_map(|r| r.total_duty).sum();
        assert_eq!(total, Decimal::new(25000, 0));
    }
}
