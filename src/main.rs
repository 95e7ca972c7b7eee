#![forbid(unsafe_code)]

mod assets;
mod category;
mod config;
mod constants;
mod desktop;
mod environment;
mod rotation;
mod weather;

use clap::Parser;
use std::path::PathBuf;
use tracing::{Level as TraceLevel, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use assets::{AssetProvider, LocalPool, UnsplashFetcher};
use category::CategoryResolver;
use config::{Config, ConfigError};
use desktop::{SettingsApplier, SettingsThemeProbe, backend_for};
use environment::Environment;
use rotation::{RefreshPolicy, RotationContext, SystemClock};
use weather::{OpenWeather, WeatherLookup};

/// Rotate the desktop wallpaper by time of day, weather and theme
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use this category instead of the time/weather one (e.g. evening, cars)
    #[arg(long)]
    category: Option<String>,

    /// Change the wallpaper once and exit
    #[arg(long)]
    once: bool,

    /// Create a new empty category folder and exit
    #[arg(long, value_name = "NAME")]
    add_category: Option<String>,

    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn load_config(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(Config::default_path);
    match Config::load(&path) {
        Ok(config) => config,
        Err(e @ ConfigError::Missing(_)) => {
            error!(path = %path.display(), "{e}");
            error!("Please create a config file before running.");
            std::process::exit(1);
        }
        Err(e) => {
            let cause = std::error::Error::source(&e)
                .map(|s| s.to_string())
                .unwrap_or_default();
            error!(path = %path.display(), error = %cause, "{e}");
            error!("Please fix the errors in your config file.");
            std::process::exit(1);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = load_config(cli.config);

    if let Some(name) = cli.add_category.as_deref() {
        LocalPool::new(&config.categories_dir, &config.base_cycle).add_category(name)?;
        return Ok(());
    }

    let env = Environment::discover();
    let settings = backend_for(config.desktop_backend, env);
    let theme = SettingsThemeProbe::new(settings.as_ref());
    let applier = SettingsApplier::new(settings.as_ref(), &theme);

    // Local wallpapers follow the clock, so only online mode needs weather
    let weather = if config.weather_enabled() && config.use_online_assets {
        match OpenWeather::new(config.api_key.clone()) {
            Ok(lookup) => Some(lookup),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Weather lookup unavailable");
                None
            }
        }
    } else {
        None
    };
    let resolver = CategoryResolver::new(
        &config,
        cli.category,
        weather.as_ref().map(|w| w as &dyn WeatherLookup),
    );

    // Online mode fetches a fresh image every tick; the local pool only
    // changes wallpaper when the category or theme moves.
    let (assets, policy) = if config.use_online_assets {
        let fetcher = UnsplashFetcher::new(config.unsplash_access_key.clone(), &config.download_dir)?;
        (Box::new(fetcher) as Box<dyn AssetProvider>, RefreshPolicy::EveryTick)
    } else {
        let pool = LocalPool::new(&config.categories_dir, &config.base_cycle);
        (Box::new(pool) as Box<dyn AssetProvider>, RefreshPolicy::OnChange)
    };

    let ctx = RotationContext {
        resolver: &resolver,
        clock: &SystemClock,
        theme: &theme,
        assets: assets.as_ref(),
        applier: &applier,
        policy,
        interval: config.interval(),
    };

    info!(
        base_cycle = %config.base_cycle,
        online = config.use_online_assets,
        interval_secs = ctx.interval.as_secs(),
        once = cli.once,
        "Starting wallpaper rotation"
    );
    rotation::run(&ctx, cli.once);
    Ok(())
}
