use clap::{Parser, Subcommand};

use crate::cmd::{
    batch::BatchCommand,
    calc::CalcCommand,
    mortgage::{InterestCommand, PaymentCommand},
    rates::RatesCommand,
    schema::SchemaCommand,
    tool::ToolCommand,
};

mod cmd;
mod utils;

#[derive(Parser, Debug)]
#[command(name = "sdltc", version, about = "UK Stamp Duty Land Tax Calculator")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate stamp duty for a single purchase
    Calc(CalcCommand),
    /// Calculate stamp duty for every purchase in a CSV file
    Batch(BatchCommand),
    /// Calculate from JSON tool arguments, printing the JSON result
    Tool(ToolCommand),
    /// Show the band tables in force
    Rates(RatesCommand),
    /// Print expected input formats
    Schema(SchemaCommand),
    /// Simple annual interest on a principal
    Interest(InterestCommand),
    /// Monthly repayment on a loan
    Payment(PaymentCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Calc(calc) => calc.exec(),
        Command::Batch(batch) => batch.exec(),
        Command::Tool(tool) => tool.exec(),
        Command::Rates(rates) => rates.exec(),
        Command::Schema(schema) => schema.exec(),
        Command::Interest(interest) => interest.exec(),
        Command::Payment(payment) => payment.exec(),
    }
}
