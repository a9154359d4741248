use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use time::Date;

use freight_cost_calculator::domain::{CostCategory, OtherCost};
use freight_cost_calculator::util::{dates, version};

#[derive(Parser, Debug)]
#[command(
    name = "freight_cost_calculator",
    version = version::version_label(),
    about = "Prices sea + inland freight routes from a rate snapshot"
)]
pub struct Cli {
    /// Rate snapshot export (defaults to the configured path, then the app data directory)
    #[arg(short, long, global = true, env = "FREIGHT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Settings file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Price every route for a request and pick the cheapest
    Quote(QuoteArgs),

    /// List expired, not-yet-valid and soon-expiring rates
    Audit {
        /// Reference date (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<Date>,

        /// Flag active rates ending within this many days
        #[arg(long)]
        expiring_within: Option<u32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the effective settings as JSON
    Settings {
        /// Write them to the settings file, creating it if needed
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// JSON request file, `-` for stdin
    #[arg(long, conflicts_with_all = ["origin", "destination", "final_destination", "weight"])]
    pub request: Option<PathBuf>,

    /// Port of loading
    #[arg(long)]
    pub origin: Option<String>,

    /// Port of discharge
    #[arg(long)]
    pub destination: Option<String>,

    #[arg(long)]
    pub final_destination: Option<String>,

    /// Cargo weight in kg
    #[arg(long)]
    pub weight: Option<f64>,

    /// Reference date (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<Date>,

    /// Add the origin port's DP cost
    #[arg(long, conflicts_with = "no_dp")]
    pub include_dp: bool,

    /// Leave out the DP cost even when the settings include it
    #[arg(long)]
    pub no_dp: bool,

    /// Ignore `--other` costs
    #[arg(long)]
    pub no_other_costs: bool,

    /// Only consider these sea-freight ids
    #[arg(long = "sea-freight", value_name = "ID")]
    pub sea_freights: Vec<String>,

    /// Leave a category out of the total (e.g. dthc, weight_surcharge, other:Customs)
    #[arg(long, value_name = "CATEGORY")]
    pub exclude: Vec<CostCategory>,

    /// Ad-hoc cost as `label=amount`
    #[arg(long, value_name = "LABEL=AMOUNT", value_parser = parse_other_cost)]
    pub other: Vec<OtherCost>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

fn parse_date_arg(raw: &str) -> Result<Date, String> {
    dates::parse_date(raw).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_other_cost(raw: &str) -> Result<OtherCost, String> {
    let (label, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected label=amount, got `{raw}`"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err("label must not be empty".to_string());
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", amount.trim()))?;
    if !amount.is_finite() {
        return Err(format!("`{label}` amount must be finite"));
    }
    Ok(OtherCost {
        label: label.to_string(),
        amount,
    })
}
