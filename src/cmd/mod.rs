pub mod batch;
pub mod calc;
pub mod mortgage;
pub mod rates;
pub mod schema;
pub mod tool;

use chrono::NaiveDate;
use clap::Args;
use sdltc::tax::RateSchedule;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Selects the rate schedule a command calculates with
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Effective date of the purchase (YYYY-MM-DD), defaults to the current rates
    #[arg(short, long, conflicts_with = "rates")]
    date: Option<NaiveDate>,

    /// JSON file with custom rates (see `schema rates-schema`)
    #[arg(short, long)]
    rates: Option<PathBuf>,
}

impl ScheduleArgs {
    pub fn schedule(&self) -> anyhow::Result<Cow<'static, RateSchedule>> {
        let schedule = match (&self.rates, self.date) {
            (Some(path), _) => {
                let file = File::open(path)?;
                let schedule = RateSchedule::from_json(BufReader::new(file))?;
                log::info!("Loaded rates from {}", path.display());
                Cow::Owned(schedule)
            }
            (None, Some(date)) => Cow::Borrowed(RateSchedule::for_date(date)?),
            (None, None) => Cow::Borrowed(RateSchedule::current()),
        };
        log::info!("Using rates effective from {}", schedule.effective_from);
        Ok(schedule)
    }
}

/// Open a file for reading, or stdin with "-"
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_from_stdin() -> anyhow::Result<Box<dyn Read>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    Ok(Box::new(Cursor::new(buffer)))
}
