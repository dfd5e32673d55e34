use anyhow::Context;
use clap::{Parser, Subcommand};
use skycast_core::{
    Config, FileCache, HomeLocation, LocationProvider, QueryState, ReadinessSource, SearchSession,
    SearchUiState, StaticLocation, provider_from_config,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather search CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and optional home coordinates.
    Configure,

    /// Look up current weather for a city and exit.
    Show {
        /// City name, e.g. "London".
        city: String,
    },

    /// Interactive search: every submitted query runs through the full
    /// reconciliation pipeline. Submit an empty line to exit.
    Search,

    /// Fetch weather for the configured home coordinates. Once a city has
    /// been looked up, the cached lookup is shown instead.
    Locate,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Search => search().await,
            Command::Locate => locate().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let wants_home = inquire::Confirm::new("Set home coordinates for `skycast locate`?")
        .with_default(false)
        .prompt()
        .context("Failed to read answer")?;
    if wants_home {
        let lat = inquire::CustomType::<f64>::new("Latitude:")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = inquire::CustomType::<f64>::new("Longitude:")
            .prompt()
            .context("Failed to read longitude")?;
        config.home = Some(HomeLocation { lat, lon });
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// A running session plus the handles the CLI needs to drive it.
struct Surface {
    session: SearchSession,
    readiness: ReadinessSource,
    ui: watch::Receiver<SearchUiState>,
}

fn start_session(config: &Config) -> anyhow::Result<Surface> {
    let provider = provider_from_config(config)?;
    let cache = Arc::new(FileCache::open_default()?);
    let location = location_from_config(config);
    let readiness = ReadinessSource::new();
    debug!(min_query_len = config.search.min_query_len, "starting search session");

    let session = SearchSession::start(
        provider,
        cache,
        location,
        readiness.subscribe(),
        QueryState::default(),
        config.search.clone(),
    );
    let ui = session.ui_state();

    Ok(Surface { session, readiness, ui })
}

fn location_from_config(config: &Config) -> Arc<dyn LocationProvider> {
    match config.home {
        Some(home) => Arc::new(StaticLocation::granted(home.lat, home.lon)),
        None => Arc::new(StaticLocation::denied()),
    }
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut surface = start_session(&config)?;

    // The CLI's backing index is the single local lookup source; mark it
    // populated so the gate opens.
    surface.readiness.publish(1);

    surface.ui.borrow_and_update();
    surface.session.on_query_triggered(city);

    let state = await_settled(&mut surface.ui).await?;
    render::print_state(&state);
    Ok(())
}

async fn search() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut surface = start_session(&config)?;
    surface.readiness.publish(1);

    // Startup convenience: resolve a location-based snapshot when nothing
    // was ever searched.
    surface.session.fetch_location().await;
    {
        let state = surface.ui.borrow_and_update().clone();
        if matches!(state, SearchUiState::Success(_)) {
            render::print_state(&state);
        }
    }

    loop {
        let line = match inquire::Text::new("City:").prompt() {
            Ok(line) => line,
            Err(
                inquire::InquireError::OperationCanceled
                | inquire::InquireError::OperationInterrupted,
            ) => break,
            Err(err) => return Err(err.into()),
        };

        let city = line.trim();
        if city.is_empty() {
            break;
        }

        // Re-submitting the identical query is conflated away by the query
        // stream; just show the state it already settled on.
        if city == surface.session.query().current() {
            render::print_state(&surface.ui.borrow());
            continue;
        }

        surface.ui.borrow_and_update();
        surface.session.on_query_triggered(city);

        let state = await_settled(&mut surface.ui).await?;
        render::print_state(&state);
    }

    Ok(())
}

async fn locate() -> anyhow::Result<()> {
    let config = Config::load()?;
    if config.home.is_none() {
        anyhow::bail!(
            "No home coordinates configured.\n\
             Hint: run `skycast configure` and set home coordinates first."
        );
    }

    let surface = start_session(&config)?;
    surface.session.fetch_location().await;
    render::print_state(&surface.ui.borrow());
    Ok(())
}

/// Wait until the pipeline settles on something other than `Loading`.
async fn await_settled(
    ui: &mut watch::Receiver<SearchUiState>,
) -> anyhow::Result<SearchUiState> {
    loop {
        ui.changed().await.context("search session ended unexpectedly")?;
        let state = ui.borrow_and_update().clone();
        if !matches!(state, SearchUiState::Loading) {
            return Ok(state);
        }
    }
}
