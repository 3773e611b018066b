use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use gluco_glance::config::keys;
use gluco_glance::{
    AppConfig, DataClient, Direction, DisplayScheduler, DisplayUnit, FetchError, MemoryProperties,
    Reading, Renderer, SessionHandles, SessionRegistry,
};
use log::{info, warn};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// gluco-glance - glucose readings on a heads-up display, simulated in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "gluco-glance")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "1")]
    debug: u8,

    /// Engine config file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Nightscout base URL; leave empty to see the setup message
    #[arg(long, default_value = "demo.nightscout.local")]
    url: String,

    /// Nightscout access token
    #[arg(long, default_value = "demo-token")]
    token: String,

    /// Refresh interval in minutes
    #[arg(long = "interval", value_name = "MINUTES")]
    interval: Option<u32>,

    /// Low alert threshold (mg/dL, or mmol/L below 33)
    #[arg(long)]
    low: Option<f64>,

    /// High alert threshold (mg/dL, or mmol/L below 33)
    #[arg(long)]
    high: Option<f64>,

    /// Display unit (mg/dL or mmol/L); probed from the source when omitted
    #[arg(short = 'u', long)]
    unit: Option<String>,

    /// Display language (en, es, fr, de, pt)
    #[arg(short = 'l', long)]
    language: Option<String>,

    /// IANA timezone for the clock, e.g. Europe/Madrid
    #[arg(short = 't', long)]
    timezone: Option<String>,

    /// Show every refreshed reading, not just alerts
    #[arg(long)]
    show_on_refresh: bool,

    /// Starting glucose value of the simulated sensor, in mg/dL
    #[arg(long, default_value = "110")]
    start_value: f64,

    /// How long to run the simulated session, in seconds
    #[arg(long = "duration", value_name = "SECONDS", default_value = "30")]
    duration: u64,
}

impl Cli {
    /// Settings document as a wearable host would push it
    fn settings(&self) -> Value {
        let mut settings = Map::new();
        if !self.url.is_empty() {
            settings.insert(keys::URL.to_string(), json!(self.url));
        }
        if !self.token.is_empty() {
            settings.insert(keys::TOKEN.to_string(), json!({ "value": self.token }));
        }
        if let Some(interval) = self.interval {
            settings.insert(keys::UPDATE_INTERVAL.to_string(), json!(interval));
        }
        if let Some(low) = self.low {
            settings.insert(keys::LOW_ALERT.to_string(), json!(low));
        }
        if let Some(high) = self.high {
            settings.insert(keys::HIGH_ALERT.to_string(), json!(high));
        }
        if let Some(unit) = &self.unit {
            settings.insert(keys::DISPLAY_UNIT.to_string(), json!(unit));
        }
        if let Some(language) = &self.language {
            settings.insert(keys::LANGUAGE.to_string(), json!(language));
        }
        if let Some(timezone) = &self.timezone {
            settings.insert(keys::TIMEZONE.to_string(), json!(timezone));
        }
        settings.insert(keys::SHOW_ON_REFRESH.to_string(), json!(self.show_on_refresh));
        Value::Object(settings)
    }
}

/// Simulated sensor: a bounded random walk
struct DemoClient {
    value: Mutex<f64>,
}

impl DemoClient {
    fn new(start: f64) -> Self {
        Self {
            value: Mutex::new(start.clamp(40.0, 400.0)),
        }
    }

    fn step(&self) -> Result<Reading, FetchError> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let delta: f64 = rand::thread_rng().gen_range(-12.0..=12.0);
        let next = (*value + delta).clamp(40.0, 400.0).round();
        let direction = match next - *value {
            d if d >= 10.0 => Direction::SingleUp,
            d if d >= 5.0 => Direction::FortyFiveUp,
            d if d <= -10.0 => Direction::SingleDown,
            d if d <= -5.0 => Direction::FortyFiveDown,
            _ => Direction::Flat,
        };
        *value = next;
        Ok(Reading::new(next, direction, Utc::now()))
    }
}

#[async_trait]
impl DataClient for DemoClient {
    async fn fetch_current_reading(&self, url: &str, _token: &str) -> Result<Reading, FetchError> {
        let reading = self.step()?;
        info!(
            "GET {} -> {} mg/dL {:?}",
            gluco_glance_core::endpoint_url(url),
            reading.value,
            reading.direction
        );
        Ok(reading)
    }

    async fn fetch_display_unit(&self, _url: &str, _token: &str) -> Result<DisplayUnit, FetchError> {
        Ok(DisplayUnit::MgDl)
    }
}

/// Prints what the wearable would show
struct StdoutRenderer;

impl Renderer for StdoutRenderer {
    fn show_text(&self, text: &str) {
        let width = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        println!("+{}+", "-".repeat(width + 2));
        for line in text.lines() {
            println!("| {:<width$} |", line, width = width);
        }
        println!("+{}+", "-".repeat(width + 2));
    }

    fn clear(&self) {
        println!("(display cleared)");
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        })),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0: warn only, 1: info, 2: debug, 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting gluco-glance v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let scheduler = DisplayScheduler::new(
        Arc::new(DemoClient::new(cli.start_value)),
        Arc::new(SessionRegistry::new()),
        &config,
    );

    let properties = Arc::new(MemoryProperties::from_json(cli.settings()));
    let session_id = uuid::Uuid::new_v4().to_string();
    scheduler.on_session_start(
        &session_id,
        "demo-user",
        SessionHandles {
            properties,
            renderer: Arc::new(StdoutRenderer),
            supports_disconnect: true,
        },
    );

    let total = Duration::from_secs(cli.duration);
    let press_at = total / 3;
    let voice_at = total * 2 / 3;

    tokio::time::sleep(press_at).await;
    info!("Simulating button press");
    scheduler.on_button_press(&session_id);

    tokio::time::sleep(voice_at - press_at).await;
    info!("Simulating voice command");
    scheduler.on_voice_command(&session_id, "what's my glucose?");

    let summary = scheduler.glucose_summary("demo-user", cli.language.as_deref()).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    tokio::time::sleep(total - voice_at).await;
    scheduler.on_session_end(&session_id);
    scheduler.shutdown_all();
    info!("Active sessions: {}", scheduler.active_sessions());

    Ok(())
}
