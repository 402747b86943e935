use anyhow::Result;
use clap::{Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};

use dashboard_core::config::{API_KEY_ENV, API_KEY_LEN, Config, Units};
use dashboard_core::dashboard::{RunOutcome, run_dashboard};
use dashboard_core::provider::openweather::OpenWeatherProvider;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-dashboard",
    version,
    about = "Five-day weather forecast dashboard"
)]
pub struct Cli {
    /// Log at debug level.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Fetch the forecast and render the dashboard image. This is the
    /// default when no subcommand is given.
    Render {
        /// City to fetch the forecast for.
        #[arg(long)]
        city: Option<String>,

        /// Unit system: "metric" or "imperial".
        #[arg(long)]
        units: Option<String>,

        /// Path of the PNG to write.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Open the rendered image in the platform viewer.
        #[arg(long)]
        open: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Render { city, units, output, open }) => {
                render(city, units, output, open).await
            }
            None => render(None, None, None, false).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let api_key = api_key.trim().to_string();

    if !Config::api_key_is_plausible(&api_key) {
        println!(
            "Warning: OpenWeather keys are normally {API_KEY_LEN} characters; this one is {}.",
            api_key.len()
        );
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn render(
    city: Option<String>,
    units: Option<String>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(city) = city {
        config.city = city;
    }
    if let Some(units) = units {
        config.units = Units::try_from(units.as_str())?;
    }
    if let Some(output) = output {
        config.output = output;
    }

    let provider = OpenWeatherProvider::new(config.api_key.clone().unwrap_or_default())?;

    match run_dashboard(&config, &provider).await? {
        RunOutcome::Completed { output, records } => {
            println!(
                "Dashboard with {records} forecast points saved as '{}'",
                output.display()
            );
            if open {
                open_image(&output);
            }
        }
        RunOutcome::MissingApiKey => {
            println!("No API key configured.");
            println!("Hint: run `weather-dashboard configure` or set {API_KEY_ENV}.");
        }
        RunOutcome::InvalidApiKey => {
            println!("Invalid API key format. Please check your API key.");
        }
        RunOutcome::FetchFailed(err) => {
            println!("Error fetching data: {err}");
        }
        RunOutcome::NoData => {
            println!("No valid data available to process.");
        }
    }

    Ok(())
}

fn open_image(path: &Path) {
    #[cfg(target_os = "macos")]
    let viewer = "open";
    #[cfg(not(target_os = "macos"))]
    let viewer = "xdg-open";

    if let Err(err) = std::process::Command::new(viewer).arg(path).spawn() {
        warn!("Could not open '{}' with {viewer}: {err}", path.display());
    }
}
