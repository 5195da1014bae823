//! Logging Configuration
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! formats both `tracing` events and bridged `log` records.

use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "CAMPUS_LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: log::LevelFilter,
    pub is_debug: bool,
}

impl LogConfig {
    pub fn new(is_debug: bool) -> Self {
        let level = resolve_default_level(std::env::var(LOG_LEVEL_ENV).ok(), is_debug);
        Self { level, is_debug }
    }
}

fn resolve_default_level(env_value: Option<String>, is_debug: bool) -> log::LevelFilter {
    let fallback = if is_debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    match env_value {
        Some(val) => parse_log_level(&val).unwrap_or_else(|| {
            eprintln!(
                "Warning: Invalid {} '{}', falling back to default",
                LOG_LEVEL_ENV, val
            );
            fallback
        }),
        None => fallback,
    }
}

pub fn parse_log_level(value: &str) -> Option<log::LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(log::LevelFilter::Trace),
        "debug" => Some(log::LevelFilter::Debug),
        "info" => Some(log::LevelFilter::Info),
        "warn" => Some(log::LevelFilter::Warn),
        "error" => Some(log::LevelFilter::Error),
        "off" => Some(log::LevelFilter::Off),
        _ => None,
    }
}

pub fn level_to_str(level: log::LevelFilter) -> &'static str {
    match level {
        log::LevelFilter::Trace => "trace",
        log::LevelFilter::Debug => "debug",
        log::LevelFilter::Info => "info",
        log::LevelFilter::Warn => "warn",
        log::LevelFilter::Error => "error",
        log::LevelFilter::Off => "off",
    }
}

/// `RUST_LOG` wins when set; otherwise the resolved level applies to every
/// target except the noisier HTTP internals.
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_to_str(config.level);
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn,h2=warn"))
    })
}

pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(true)
        .with_ansi(config.is_debug)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        "Logging initialized: level={}, debug={}",
        level_to_str(config.level),
        config.is_debug
    );
    Ok(())
}
