//! Rates command - show the bands a calculation would use

use crate::cmd::ScheduleArgs;
use crate::cmd::calc::format_gbp;
use clap::Args;
use rust_decimal_macros::dec;
use sdltc::tax::{BandTable, RateSchedule};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RatesCommand {
    #[command(flatten)]
    schedule: ScheduleArgs,

    /// Output as JSON (the rates file format) instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct RateRow {
    #[tabled(rename = "From")]
    pub from: String,
    #[tabled(rename = "Up to")]
    pub upto: String,
    #[tabled(rename = "Rate")]
    pub rate: String,
}

impl RatesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schedule = self.schedule.schedule()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(schedule.as_ref())?);
        } else {
            print_schedule(&schedule);
        }
        Ok(())
    }
}

fn print_schedule(schedule: &RateSchedule) {
    println!();
    println!("SDLT RATES (effective from {})", schedule.effective_from);
    println!();
    println!("STANDARD");
    print_table(&schedule.standard);
    println!();
    println!(
        "FIRST-TIME BUYER (purchases up to {})",
        format_gbp(schedule.first_time_buyer_limit)
    );
    print_table(&schedule.first_time_buyer);
    println!();
    println!(
        "Additional properties pay a further {:.1}% in every band",
        schedule.additional_property_surcharge * dec!(100)
    );
    println!();
}

fn print_table(table: &BandTable) {
    let table = Table::new(rate_rows(table))
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

pub fn rate_rows(table: &BandTable) -> Vec<RateRow> {
    table
        .ranges()
        .map(|(lower, band)| RateRow {
            from: format_gbp(lower),
            upto: band
                .threshold
                .map_or_else(|| "and above".to_string(), format_gbp),
            rate: format!("{:.1}%", band.rate * dec!(100)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_time_buyer_rows() {
        let rows = rate_rows(&RateSchedule::current().first_time_buyer);
        assert_eq!(
            rows,
            vec![
                RateRow {
                    from: "£0.00".to_string(),
                    upto: "£300000.00".to_string(),
                    rate: "0.0%".to_string(),
                },
                RateRow {
                    from: "£300000.00".to_string(),
                    upto: "£500000.00".to_string(),
                    rate: "5.0%".to_string(),
                },
                RateRow {
                    from: "£500000.00".to_string(),
                    upto: "and above".to_string(),
                    rate: "5.0%".to_string(),
                },
            ]
        );
    }
}
