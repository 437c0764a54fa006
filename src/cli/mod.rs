use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::export;
use crate::services::{fetcher, Aggregator};
use crate::types::{DateRange, DayRecord, NormalizedReport};

/// Terminal dashboard for AWS cost reports
#[derive(Parser)]
#[command(name = "costboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Report URL (overrides COSTBOARD_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Range start (YYYY-MM-DD, defaults to the report's earliest day)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD, defaults to the report's latest day)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive dashboard (default)
    Tui,

    /// List the distinct services in the report
    Services,

    /// Write the weekly cost rollup as CSV
    Weekly {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the filtered report as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::resolve(self.url.clone());

        match &self.command {
            None | Some(Commands::Tui) => crate::tui::run(config),
            Some(Commands::Services) => {
                let report = fetcher::fetch_report(&config.data_url)?;
                for service in Aggregator::services(&report.data) {
                    println!("{service}");
                }
                Ok(())
            }
            Some(Commands::Weekly { output }) => {
                let (report, _, filtered) = self.load_filtered(&config)?;
                // Columns cover the whole report's services, not just the
                // filtered days
                let services = Aggregator::services(&report.data);
                let weeks = Aggregator::group_by_week(&filtered);
                match output {
                    Some(path) => {
                        export::write_weekly_csv(File::create(path)?, &weeks, &services)?
                    }
                    None => export::write_weekly_csv(io::stdout().lock(), &weeks, &services)?,
                }
                Ok(())
            }
            Some(Commands::Export { output }) => {
                let (report, range, filtered) = self.load_filtered(&config)?;
                let payload = export::ExportPayload::new(&report, range, &filtered);
                match output {
                    Some(path) => export::write_json(File::create(path)?, &payload)?,
                    None => {
                        let mut stdout = io::stdout().lock();
                        export::write_json(&mut stdout, &payload)?;
                        writeln!(stdout)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Fetch, resolve the active range, and filter. An empty filtered view is
    /// informational, not fatal: the command still emits its (empty) output.
    fn load_filtered(
        &self,
        config: &Config,
    ) -> anyhow::Result<(NormalizedReport, DateRange, Vec<DayRecord>)> {
        let report = fetcher::fetch_report(&config.data_url)?;
        let today = Local::now().date_naive();
        let (min, max) = report.date_bounds().unwrap_or((today, today));
        let range = DateRange::new(self.start.unwrap_or(min), self.end.unwrap_or(max));

        let filtered = match Aggregator::filter_nonempty(&report.data, range) {
            Ok(filtered) => filtered,
            Err(e) => {
                eprintln!(
                    "[costboard] Warning: {e} ({} to {})",
                    range.start, range.end
                );
                Vec::new()
            }
        };
        Ok((report, range, filtered))
    }
}
