use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, InputController, Outcome, SubmitError, WeatherReading, provider_from_config,
};
use inquire::{InquireError, Password, Text};
use std::path::{Path, PathBuf};

use crate::view::render_card;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    /// Read and write this config file instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output from this tool to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show the current weather for one city and exit.
    Show {
        /// City name, passed to OpenWeather as typed.
        city: String,
    },

    /// Interactive form: ask for a city, show its weather, repeat. Esc quits.
    Form,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(self.config.as_deref()),
            Command::Show { city } => show(&load_config(self.config.as_deref())?, &city).await,
            Command::Form => form(&load_config(self.config.as_deref())?).await,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn configure(path: Option<&Path>) -> Result<()> {
    let mut cfg = load_config(path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    cfg.set_api_key(api_key.trim().to_owned());

    let saved_to = match path {
        Some(path) => {
            cfg.save_to(path)?;
            path.to_path_buf()
        }
        None => cfg.save()?,
    };

    println!("Saved API key to {}", saved_to.display());
    Ok(())
}

async fn show(cfg: &Config, city: &str) -> Result<()> {
    let controller = InputController::new(provider_from_config(&cfg.client_config()));

    let outcome = controller.submit(city)?.await?;
    let (Outcome::Displayed(reading) | Outcome::Superseded(reading)) = outcome;
    print_card(&reading)
}

async fn form(cfg: &Config) -> Result<()> {
    let controller = InputController::new(provider_from_config(&cfg.client_config()));
    // The typed text survives submissions, like the web form's input box.
    let mut query = String::new();

    loop {
        let input = Text::new("City:")
            .with_placeholder("Enter city name")
            .with_initial_value(&query)
            .prompt();

        query = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        let fetch = match controller.submit(&query) {
            Ok(fetch) => fetch,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match fetch.await {
            Ok(Outcome::Displayed(reading)) => {
                if let Err(err) = print_card(&reading) {
                    tracing::error!(error = %err, "failed to render weather card");
                    eprintln!("Could not show weather data: {err}");
                }
            }
            Ok(Outcome::Superseded(_)) => {}
            // Already logged by the controller; the previous card stands.
            Err(SubmitError::Transport(_)) => {}
            Err(SubmitError::Schema(err)) => eprintln!("Could not read weather data: {err}"),
        }
    }

    Ok(())
}

fn print_card(reading: &WeatherReading) -> Result<()> {
    let card = render_card(reading, &Local::now())?;
    println!("\n{card}\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_keeps_city_verbatim() {
        let cli = Cli::parse_from(["cityweather", "show", " New York "]);
        match cli.command {
            Command::Show { city } => assert_eq!(city, " New York "),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cityweather", "form", "--config", "/tmp/cw.toml", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/cw.toml")));
        assert!(matches!(cli.command, Command::Form));
    }
}
