use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use weather_widget::api::AppState;
use weather_widget::{
    Coordinates, Geolocator, ReportedPosition, SearchOutcome, WeatherWidget, WidgetConfig,
    logging, web,
};

#[derive(Debug, Parser)]
#[command(
    name = "weather-widget",
    version,
    about = "Weather lookup widget: current conditions and a 5-day forecast by city or position"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the widget page and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the weather for a city
    Lookup { city: String },
    /// Show the weather at a position (defaults to the configured one)
    Here {
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
    },
    /// Read one search per line; `:here` uses the configured position, `:quit` exits
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WidgetConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init(&config.logging);

    let state = AppState::from_config(&config)?;

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            web::run(state, &host, port).await
        }
        Command::Lookup { city } => {
            let widget = state.widget();
            let outcome = widget.search_city(&city).await;
            finish(&widget, outcome)
        }
        Command::Here {
            latitude,
            longitude,
        } => {
            let position = match (latitude, longitude) {
                (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                _ => config.geolocation.position(),
            };
            let reported = position.map(ReportedPosition::Position);
            let widget = state.widget();
            let outcome = widget
                .search_current_location(reported.as_ref().map(|r| r as &dyn Geolocator))
                .await;
            finish(&widget, outcome)
        }
        Command::Interactive => {
            let home = config.geolocation.position().map(ReportedPosition::Position);
            let widget = state.widget().with_view_listener(|view| print!("{view}"));
            interactive(Arc::new(widget), home).await
        }
    }
}

fn finish(widget: &WeatherWidget, outcome: SearchOutcome) -> Result<()> {
    match outcome {
        SearchOutcome::Ignored => bail!("City name cannot be empty"),
        SearchOutcome::Failed(message) => bail!(message),
        SearchOutcome::Rendered | SearchOutcome::Superseded => {
            print!("{}", widget.view());
            Ok(())
        }
    }
}

async fn interactive(widget: Arc<WeatherWidget>, home: Option<ReportedPosition>) -> Result<()> {
    println!("Enter a city name, :here for your configured position, :quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut searches = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line == ":quit" {
            break;
        }

        let widget = widget.clone();
        let home = home.clone();
        searches.spawn(async move {
            let outcome = if line == ":here" {
                widget
                    .search_current_location(home.as_ref().map(|r| r as &dyn Geolocator))
                    .await
            } else {
                widget.search_city(&line).await
            };
            tracing::debug!("Search for '{}' finished: {:?}", line, outcome);
        });

        while let Some(finished) = searches.try_join_next() {
            if let Err(e) = finished {
                tracing::warn!("Search task failed: {}", e);
            }
        }
    }

    while let Some(finished) = searches.join_next().await {
        if let Err(e) = finished {
            tracing::warn!("Search task failed: {}", e);
        }
    }
    Ok(())
}
