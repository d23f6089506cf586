use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Backend, LoggingSettings, PaginationSettings, ServerSettings, Settings, StorageSettings,
};

/// Prefix of the environment variables that override file settings,
/// e.g. `SHIFTBOARD__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "SHIFTBOARD";

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at `path`
/// (or an optional `config.toml` in the working directory), then
/// `SHIFTBOARD__SECTION__KEY` environment variables. `DATABASE_URL`, read
/// through `.env` when present, fills in a missing database URL. A `backend`
/// given here wins over every source.
pub fn load_settings(
    path: Option<&Path>,
    backend: Option<Backend>,
) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from("config.toml"), false),
    };

    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout_secs", 30)?
        .set_default("storage.backend", "postgres")?
        .set_default("storage.max_connections", 10)?
        .set_default("storage.acquire_timeout_secs", 5)?
        .set_default("storage.run_migrations", true)?
        .set_default("pagination.default_page_size", 10)?
        .set_default("pagination.max_page_size", 100)?
        .set_default("logging.filter", "info,sqlx=warn,tower_http=info")?
        .set_default("logging.file_prefix", "shiftboard.log")?
        // Tells the builder to look for the TOML file; only an explicit path must exist.
        .add_source(config::File::from(file).required(required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("storage.backend", backend.map(|b| b.as_str()))?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let mut settings = builder.try_deserialize::<Settings>()?;

    if settings.storage.database_url.is_none() {
        settings.storage.database_url = std::env::var("DATABASE_URL").ok();
    }

    settings.validate()?;
    Ok(settings)
}
