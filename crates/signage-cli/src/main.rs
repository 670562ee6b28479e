//! signage - library hours and events for digital signage.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use signage_api::widget::WidgetClient;
use signage_schedule::{
    EVENTS_ERROR_MESSAGE, HOURS_ERROR_MESSAGE, HoursDisplay, LocationEvents, NO_EVENTS_SENTINEL,
    Orientation, WeeklyHours, collect_events, display_url, format_day, load_hours_display,
};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show this week's hours for a location.
    Hours(HoursArgs),
    /// Show today's events for one or more locations.
    Events(EventsArgs),
    /// Print the hours display URL for a sign.
    Url(UrlArgs),
    /// List configured locations.
    Locations,
}

/// Arguments for the `hours` subcommand.
#[derive(clap::Args)]
struct HoursArgs {
    /// LibCal location ID.
    #[arg(long, required = true)]
    location: u32,
}

/// Arguments for the `events` subcommand.
#[derive(clap::Args)]
struct EventsArgs {
    /// Comma-separated location IDs (e.g. "3363,4357"). Falls back to config events locations if omitted.
    #[arg(long, value_delimiter = ',')]
    location: Option<Vec<u32>>,
}

/// Arguments for the `url` subcommand.
#[derive(clap::Args)]
struct UrlArgs {
    /// LibCal location ID.
    #[arg(long, required = true)]
    location: u32,
    /// Screen orientation (landscape, portrait_small, portrait_large).
    #[arg(long, required = true)]
    orientation: Orientation,
    /// Base URL of the display server.
    #[arg(long, default_value = "http://localhost:8000")]
    base: String,
}

/// Loads the config from `--dir` or the default location.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds the widget client from config.
///
/// # Errors
///
/// Returns an error if a configured URL is invalid or the timeout is zero.
#[instrument(skip_all)]
fn build_widget_client(config: &AppConfig) -> Result<WidgetClient> {
    WidgetClient::builder()
        .hours_url(config.hours_url()?)
        .events_url(config.events_url()?)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.timeout())
        .build()
        .context("failed to build widget client")
}

/// Formats a week as two columns of rows, marking today with `*`.
///
/// An empty line separates the Monday-Thursday and Friday-Sunday columns.
fn hours_lines(hours: &WeeklyHours, today: NaiveDate) -> Vec<String> {
    let today = hours.today_index(today);
    let (left, _) = hours.columns();
    let mut lines = Vec::with_capacity(hours.days().len().saturating_add(1));

    for (index, day) in hours.days().iter().enumerate() {
        if index == left.len() {
            lines.push(String::new());
        }
        let marker = if today == Some(index) { "*" } else { " " };
        lines.push(format!(
            "{marker} {:<9}\t{}\t{}",
            day.weekday_name(),
            format_day(day.date),
            day.rendered_hours,
        ));
    }
    lines
}

/// Runs the `hours` subcommand.
///
/// An unavailable location is reported, not returned as an error.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the client fails to build.
#[instrument(skip_all)]
async fn run_hours(args: &HoursArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let location = config.directory()?.resolve(args.location);
    let client = build_widget_client(&config)?;

    match load_hours_display(&client, &location).await {
        HoursDisplay::Ready {
            location,
            start,
            end,
            hours,
        } => {
            tracing::info!("{} ({start} - {end})", location.name);
            for line in hours_lines(&hours, chrono::Local::now().date_naive()) {
                tracing::info!("{line}");
            }
        }
        HoursDisplay::Unavailable { location, .. } => {
            tracing::error!("{}: {HOURS_ERROR_MESSAGE}", location.name);
        }
    }

    Ok(())
}

/// Resolves location IDs from CLI args or config fallback.
fn resolve_event_locations(location: Option<Vec<u32>>, config: &AppConfig) -> Result<Vec<u32>> {
    if let Some(ids) = location {
        return Ok(ids);
    }

    if config.events.locations.is_empty() {
        bail!("no locations given: pass --location or set [events] locations in config.toml");
    }
    tracing::info!(
        "Using {} location(s) from config: {:?}",
        config.events.locations.len(),
        config.events.locations
    );
    Ok(config.events.locations.clone())
}

/// Logs one location's events as a timetable listing.
fn report_location_events(result: &LocationEvents) {
    let name = &result.location.name;
    if let Some(message) = result.error_message() {
        tracing::error!("{name}: {message}");
        return;
    }

    let events = result.events();
    if events.is_empty() {
        tracing::info!("{name}: {NO_EVENTS_SENTINEL}");
        return;
    }

    tracing::info!("{name}");
    tracing::info!("Start\tEnd\tRows\tTitle");
    for event in events {
        tracing::info!(
            "{}\t{}\t{}-{}\t{}",
            event.start_time.format("%-I:%M%P"),
            event.end_time.format("%-I:%M%P"),
            event.start_row,
            event.end_row,
            event.display_title(),
        );
    }
}

/// Runs the `events` subcommand.
///
/// Falls back to `config.toml` events locations when `--location` is not specified.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, no locations are given,
/// or the client fails to build.
#[instrument(skip_all)]
async fn run_events(args: &EventsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let directory = config.directory()?;
    let ids = resolve_event_locations(args.location.clone(), &config)?;
    let locations: Vec<_> = ids.into_iter().map(|id| directory.resolve(id)).collect();
    let client = build_widget_client(&config)?;

    let results = collect_events(&client, &locations).await;
    for result in &results {
        report_location_events(result);
    }

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    if failed > 0 {
        tracing::warn!("{failed} of {} location(s): {EVENTS_ERROR_MESSAGE}", results.len());
    }

    Ok(())
}

/// Runs the `url` subcommand.
///
/// # Errors
///
/// Returns an error if `--base` is not a URL with a host.
fn run_url(args: &UrlArgs) -> Result<()> {
    let base = Url::parse(&args.base).with_context(|| format!("invalid --base: {}", args.base))?;
    let Some(host) = base.host_str() else {
        bail!("--base has no host: {}", args.base);
    };
    let host = base
        .port()
        .map_or_else(|| String::from(host), |port| format!("{host}:{port}"));

    tracing::info!(
        "{}",
        display_url(base.scheme(), &host, args.location, args.orientation)
    );
    tracing::info!("{}", args.orientation.label());

    Ok(())
}

/// Runs the `locations` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or has duplicate IDs.
fn run_locations(dir: Option<&PathBuf>) -> Result<()> {
    let directory = load_config(dir)?.directory()?;
    if directory.is_empty() {
        tracing::info!("No locations configured");
        return Ok(());
    }

    tracing::info!("ID\tName");
    for location in directory.sorted_by_name() {
        tracing::info!("{}\t{}", location.location_id, location.name);
    }
    tracing::info!("Total: {} locations", directory.len());

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Hours(args) => run_hours(&args, cli.dir.as_ref()).await,
        Commands::Events(args) => run_events(&args, cli.dir.as_ref()).await,
        Commands::Url(args) => run_url(&args),
        Commands::Locations => run_locations(cli.dir.as_ref()),
    }
}
