//! Interest and payment commands

use crate::cmd::calc::format_gbp;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sdltc::mortgage;
use sdltc::tax::parse_price;

#[derive(Args, Debug)]
pub struct InterestCommand {
    /// Principal in GBP
    #[arg(value_parser = parse_price, allow_hyphen_values = true)]
    principal: Decimal,

    /// Annual interest rate in percent (e.g. 4.25)
    #[arg(short, long)]
    rate: Decimal,
}

impl InterestCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let interest = mortgage::interest(self.principal, self.rate / dec!(100))?;
        println!(
            "For a principal of {}, the interest payable is {} (at an annual rate of {:.2}%).",
            format_gbp(self.principal),
            format_gbp(interest),
            self.rate
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PaymentCommand {
    /// Amount borrowed in GBP
    #[arg(value_parser = parse_price, allow_hyphen_values = true)]
    principal: Decimal,

    /// Term in years
    #[arg(short, long)]
    years: u32,

    /// Annual interest rate in percent (e.g. 4.25)
    #[arg(short, long)]
    rate: Decimal,
}

impl PaymentCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let payment = mortgage::monthly_payment(self.principal, self.rate / dec!(100), self.years)?;
        println!(
            "Borrowing {} over {} years at {:.2}%: {} per month.",
            format_gbp(self.principal),
            self.years,
            self.rate,
            format_gbp(payment)
        );
        Ok(())
    }
}
