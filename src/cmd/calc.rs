//! Calc command - stamp duty for a single purchase

use crate::cmd::ScheduleArgs;
use clap::Args;
use rust_decimal::Decimal;
use sdltc::tax::{calculate, parse_price, CalculationInput, TaxResult};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// Purchase price in GBP (e.g. 300000 or £300,000)
    #[arg(value_parser = parse_price, allow_hyphen_values = true)]
    price: Decimal,

    /// The buyer has never owned a home
    #[arg(short = 'f', long)]
    first_time_buyer: bool,

    /// The buyer will own more than one home after the purchase
    #[arg(short = 'a', long)]
    additional_property: bool,

    #[command(flatten)]
    schedule: ScheduleArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Row for the breakdown table output
#[derive(Debug, Clone, Tabled)]
pub struct BandRow {
    #[tabled(rename = "Band")]
    pub band: String,
    #[tabled(rename = "Taxable")]
    pub amount: String,
    #[tabled(rename = "Rate")]
    pub rate: String,
    #[tabled(rename = "Duty")]
    pub duty: String,
}

impl CalcCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schedule = self.schedule.schedule()?;
        let input =
            CalculationInput::new(self.price, self.first_time_buyer, self.additional_property);
        let result = calculate(&schedule, &input)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }
        Ok(())
    }
}

fn print_result(result: &TaxResult) {
    println!();
    println!("STAMP DUTY LAND TAX");
    println!("  Price: {}", format_gbp(result.price));
    println!(
        "  First-time buyer: {} | Additional property: {} | Rates: {}",
        yes_no(result.is_first_time_buyer),
        yes_no(result.is_additional_property),
        result.table
    );
    println!();

    if !result.breakdown.is_empty() {
        let rows: Vec<BandRow> = result
            .breakdown
            .iter()
            .map(|c| BandRow {
                band: c.band_label(),
                amount: format_gbp(c.amount),
                rate: c.rate_label(),
                duty: format_gbp(c.duty),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();
    }

    println!(
        "TOTAL STAMP DUTY: {} (effective rate {:.2}%)",
        format_gbp(result.total_duty),
        result.effective_rate_percent()
    );
    println!();
}

pub fn format_gbp(amount: Decimal) -> String {
    format!("£{:.2}", amount)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
