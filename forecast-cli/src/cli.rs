use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastError, ReportKind, Reporter};
use inquire::{CustomType, Text};
use std::path::{Path, PathBuf};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather reports from api.weather.gov")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Narrative forecast for the next few day/night periods.
    Daily {
        /// Place name or "lat,lon"; defaults to the configured location.
        location: Option<String>,

        /// Number of periods to show.
        #[arg(short = 'n', long, default_value_t = 4)]
        periods: usize,
    },

    /// Hour-by-hour forecast.
    Hourly {
        /// Place name or "lat,lon"; defaults to the configured location.
        location: Option<String>,

        /// Number of hours to show.
        #[arg(short = 'n', long, default_value_t = 6)]
        hours: usize,
    },

    /// Latest observation from the nearest station.
    Current {
        /// Place name or "lat,lon"; defaults to the configured station.
        location: Option<String>,
    },

    /// Active watches, warnings and advisories.
    Alerts {
        /// Place name or "lat,lon"; defaults to the configured location.
        location: Option<String>,
    },

    /// Radar imagery (not implemented).
    Radar {
        location: Option<String>,
    },

    /// Set the default location, station and user agent.
    Configure,
}

impl Command {
    /// The report this command runs, with its location and period count.
    /// `None` for commands that do not produce a report.
    pub fn report(&self) -> Option<(ReportKind, Option<&str>, Option<usize>)> {
        match self {
            Command::Daily { location, periods } => {
                Some((ReportKind::Daily, location.as_deref(), Some(*periods)))
            }
            Command::Hourly { location, hours } => {
                Some((ReportKind::Hourly, location.as_deref(), Some(*hours)))
            }
            Command::Current { location } => Some((ReportKind::Current, location.as_deref(), None)),
            Command::Alerts { location } => Some((ReportKind::Alerts, location.as_deref(), None)),
            Command::Radar { location } => Some((ReportKind::Radar, location.as_deref(), None)),
            Command::Configure => None,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        let Some((kind, location, count)) = self.command.report() else {
            return configure(&path);
        };

        let config = Config::load_from(&path)?;
        let reporter = Reporter::from_config(config);

        let text = reporter
            .run(kind, location, count)
            .await
            .map_err(|err| explain(kind, err))?;

        println!("{text}");
        Ok(())
    }
}

fn explain(kind: ReportKind, err: ForecastError) -> anyhow::Error {
    let hint = if err.is_upstream() {
        "\nHint: api.weather.gov only covers US locations and requires a valid `user_agent`."
    } else {
        ""
    };

    anyhow::Error::new(err).context(format!("Failed to build the {kind} report{hint}"))
}

/// Prompt for every setting, pre-filled from the existing file if any.
fn configure(path: &Path) -> Result<()> {
    let existing = Config::load_from(path).ok();

    let user_agent = Text::new("User agent:")
        .with_help_message("An app name and contact, e.g. (forecast, you@example.com)")
        .with_default(existing.as_ref().map_or("", |c| c.user_agent.as_str()))
        .prompt()
        .context("Failed to read user agent")?;

    let latitude = coordinate_prompt("Default latitude:", existing.as_ref().map(|c| c.latitude))
        .context("Failed to read latitude")?;
    let longitude = coordinate_prompt("Default longitude:", existing.as_ref().map(|c| c.longitude))
        .context("Failed to read longitude")?;

    let station = Text::new("Observation station:")
        .with_help_message(
            "e.g. KOKC; listed at https://api.weather.gov/points/<lat>,<lon>/stations",
        )
        .with_default(existing.as_ref().map_or("", |c| c.station.as_str()))
        .prompt()
        .context("Failed to read observation station")?;

    let radar_station = Text::new("Radar station (optional):")
        .with_default(existing.as_ref().and_then(|c| c.radar_station.as_deref()).unwrap_or(""))
        .prompt()
        .context("Failed to read radar station")?;

    let mut config = Config::new(
        user_agent.trim().to_string(),
        latitude,
        longitude,
        station.trim().to_uppercase(),
    );
    config.radar_station = Some(radar_station.trim().to_uppercase()).filter(|s| !s.is_empty());
    if let Some(existing) = existing {
        config.api_base_url = existing.api_base_url;
        config.geocoder_url = existing.geocoder_url;
    }

    config.validate()?;
    config.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn coordinate_prompt(message: &str, current: Option<f64>) -> Result<f64, inquire::InquireError> {
    let mut prompt =
        CustomType::<f64>::new(message).with_error_message("Please enter a decimal number");
    if let Some(value) = current {
        prompt = prompt.with_default(value);
    }
    prompt.prompt()
}
