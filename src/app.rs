use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};

use freight_cost_calculator::{
    domain::{audit_snapshot, calculate, CalculationError, CalculationRequest},
    infra::snapshot_file::{default_snapshot_path, load_snapshot, LoadedSnapshot, SnapshotLoadError},
    ui::table::{render_report, render_result},
    util::{
        dates,
        settings::{
            load_settings, load_settings_from, save_settings, save_settings_to, Settings,
            SettingsError,
        },
    },
};

use crate::cli::{Cli, Commands, OutputFormat, QuoteArgs};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotLoadError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error("failed to read request {path}: {source}")]
    RequestIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

/// `--settings` wins; otherwise the platform config file, or defaults when there is none.
pub fn resolve_settings(cli: &Cli) -> Result<Settings, AppError> {
    match &cli.settings {
        Some(path) => Ok(load_settings_from(path)?),
        None => match load_settings() {
            Err(SettingsError::StorageUnavailable) => Ok(Settings::default()),
            other => Ok(other?),
        },
    }
}

pub fn run(cli: &Cli, settings: &Settings) -> Result<(), AppError> {
    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| settings.snapshot_path.clone())
        .unwrap_or_else(default_snapshot_path);

    let output = match &cli.command {
        Commands::Quote(args) => {
            let request = build_request(args, settings)?;
            let loaded = open_snapshot(&snapshot_path, settings)?;
            let result = calculate(&request, &loaded.snapshot)?;
            match args.format {
                OutputFormat::Table => render_result(&result),
                OutputFormat::Json => serde_json::to_string_pretty(&result)?,
            }
        }
        Commands::Audit {
            date,
            expiring_within,
            format,
        } => {
            let loaded = open_snapshot(&snapshot_path, settings)?;
            let reference_date = date.unwrap_or_else(dates::today);
            let horizon = expiring_within.unwrap_or(settings.expiring_within_days);
            let report = audit_snapshot(&loaded.snapshot, reference_date, horizon);
            info!(
                entries = report.entries.len(),
                reference_date = %dates::format_date(reference_date),
                "audited snapshot"
            );
            match format {
                OutputFormat::Table => render_report(&report),
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            }
        }
        Commands::Settings { write } => {
            if *write {
                let path = write_settings(cli, settings)?;
                info!(path = %path.display(), "saved settings");
            }
            serde_json::to_string_pretty(settings)?
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

/// Saves to `--settings` when given, otherwise to the platform config file.
pub fn write_settings(cli: &Cli, settings: &Settings) -> Result<PathBuf, AppError> {
    match &cli.settings {
        Some(path) => {
            save_settings_to(path, settings)?;
            Ok(path.clone())
        }
        None => Ok(save_settings(settings)?),
    }
}

fn open_snapshot(path: &Path, settings: &Settings) -> Result<LoadedSnapshot, AppError> {
    let loaded = load_snapshot(path)?;
    if loaded.is_stale(settings.snapshot_max_age()) {
        warn!(
            path = %path.display(),
            age = %loaded.age_string(),
            max_age_days = settings.snapshot_max_age_days,
            "rate snapshot is stale, re-export it for current rates"
        );
    }
    Ok(loaded)
}

/// Request from `--request`, or from flags with settings filling the defaults.
pub fn build_request(args: &QuoteArgs, settings: &Settings) -> Result<CalculationRequest, AppError> {
    if let Some(path) = &args.request {
        let raw = read_request(path)?;
        let mut request: CalculationRequest = serde_json::from_str(&raw)?;
        if args.date.is_some() {
            request.reference_date = args.date;
        }
        return Ok(request);
    }

    let required = |value: &Option<String>, flag: &str| {
        value
            .clone()
            .ok_or_else(|| AppError::Usage(format!("--{flag} is required without --request")))
    };
    let mut request = CalculationRequest::new(
        required(&args.origin, "origin")?,
        required(&args.destination, "destination")?,
        required(&args.final_destination, "final-destination")?,
        args.weight
            .ok_or_else(|| AppError::Usage("--weight is required without --request".to_string()))?,
    );

    request.reference_date = args.date;
    request.include_dp = !args.no_dp && (args.include_dp || settings.include_dp);
    request.include_other_costs = !args.no_other_costs && settings.include_other_costs;
    request.excluded_categories = args.exclude.iter().cloned().collect();
    request.other_costs = args.other.clone();
    if !args.sea_freights.is_empty() {
        request = request.restrict_sea_freights(args.sea_freights.iter().cloned());
    }
    Ok(request)
}

fn read_request(path: &Path) -> Result<String, AppError> {
    let to_error = |source| AppError::RequestIo {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).map_err(to_error)?;
        Ok(raw)
    } else {
        fs::read_to_string(path).map_err(to_error)
    }
}
