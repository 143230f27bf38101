//! Tool command - JSON arguments in, JSON result out, for callers that
//! invoke the calculator as a remote tool

use crate::cmd::{open_input, ScheduleArgs};
use clap::Args;
use sdltc::tax::{calculate, CalculationInput};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ToolCommand {
    /// JSON arguments (see `schema json-schema`). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    schedule: ScheduleArgs,
}

impl ToolCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schedule = self.schedule.schedule()?;
        let input: CalculationInput = serde_json::from_reader(open_input(&self.file)?)?;
        let result = calculate(&schedule, &input)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
