use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, LogSettings, ServerOverrides, ServerSettings, Settings};

/// Looked up next to the working directory when no file is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "config";
/// Environment variables such as `ADVERTS__SERVER__PORT` override file values.
pub const ENV_PREFIX: &str = "ADVERTS";

/// Loads the application configuration.
///
/// Sources, later ones winning: built-in defaults, `DATABASE_URL`, the TOML
/// file (`path`, or an optional `config.toml`), then `ADVERTS__*` variables.
/// A `.env` file in the working directory is read first if present.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = base_builder(std::env::var("DATABASE_URL").ok())?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

    build(builder)
}

fn base_builder(database_url: Option<String>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.max_connections", 10)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("log.filter", "info")?;
    if let Some(url) = database_url {
        builder = builder.set_default("database.url", url)?;
    }
    Ok(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
