//! Schema command - print expected input formats

use crate::cmd::batch::CSV_FIELD_DESCRIPTIONS;
use clap::Args;
use schemars::schema_for;
use sdltc::tax::{CalculationInput, RateSchedule};

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the calculator's tool arguments
    JsonSchema,
    /// JSON Schema for a custom rates file
    RatesSchema,
    /// CSV header row for batch input
    CsvHeader,
    /// Batch CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(CalculationInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::RatesSchema => {
                let schema = schema_for!(RateSchedule);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                let columns: Vec<_> = CSV_FIELD_DESCRIPTIONS.iter().map(|(name, _, _)| *name).collect();
                println!("{}", columns.join(","));
            }
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("Batch CSV Format");
        println!("================");
        println!();
        for (name, required, description) in CSV_FIELD_DESCRIPTIONS {
            let req = if *required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", name, req, description);
        }
        println!();
        println!("Flags default to false when the column is empty or missing");
    }
}
