use config::{Config, Environment, File};
use dhub_domain::config::PlatformConfig;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for overrides, e.g. `DHUB__VISIBILITY__HIDDEN_CLASS`.
pub const ENV_PREFIX: &str = "DHUB";
/// Base name of the configuration file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dhub";

/// Custom error type for config loading.
#[dhub_derive::dhub_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader: a file plus environment overrides.
///
/// 1. **Base File**: `path` when given (must exist), otherwise an optional `dhub.{toml,yaml,json}`
///    in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `DHUB__`; nested keys use double
///    underscores (`DHUB__LOGGING__LEVEL=debug` maps to `logging.level`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicitly requested file is missing, a source is
/// malformed, or the merged values do not match `T`.
///
/// # Example
/// ```rust
/// use dhub_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the [`PlatformConfig`] used by `DonationHub` binaries.
///
/// # Errors
/// See [`load_config`].
pub fn load_platform_config(path: Option<impl AsRef<Path>>) -> Result<PlatformConfig, ConfigError> {
    load_config::<PlatformConfig>(path)
}
