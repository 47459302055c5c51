use anyhow::Context;
use log::info;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{load_config, General};
use crate::errors::RainviewInitError;
use crate::shell::{Dashboard, Interaction};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Loads configuration, sets up logging and returns the dashboard together with the
/// interaction described by the configuration
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn init(config_path: &str) -> Result<(Dashboard, Interaction), RainviewInitError> {
    let config = load_config(config_path)?;

    let log_config = log_config(&config.general)?;
    log4rs::init_config(log_config).context("failed to initialize logger")?;

    info!("rainview version: {}", env!("CARGO_PKG_VERSION"));
    info!("Using configuration {}", config_path);

    let dashboard = Dashboard::new(&config.files);
    let interaction = Interaction::from_config(&config);

    Ok((dashboard, interaction))
}

/// Builds the logger configuration, output never goes to stdout since the page is written there
///
/// # Arguments
///
/// * 'general' - general configuration holding log level and destinations
fn log_config(general: &General) -> anyhow::Result<LogConfig> {
    let mut builder = LogConfig::builder();
    let mut root = Root::builder();

    if general.log_to_stderr {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stderr", Box::new(stderr)));
        root = root.appender("stderr");
    }

    if let Some(path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(path)
            .with_context(|| format!("failed to open log file {}", path))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder
        .build(root.build(general.log_level))
        .context("invalid logger configuration")?;

    Ok(config)
}
