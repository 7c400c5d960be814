use crate::constants::{
    DONATION_FORM_CLASS, FORM_ROW_CLASS, HIDDEN_CLASS, MANUAL_GATEWAY, OFFLINE_GATEWAY,
};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level platform configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfigInner {
    pub logging: LoggingConfig,
    pub gateways: GatewaysConfig,
    pub visibility: VisibilityConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(flatten, default)]
    inner: Arc<PlatformConfigInner>,
}

impl Deref for PlatformConfig {
    type Target = PlatformConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PlatformConfig {
    fn deref_mut(&mut self) -> &mut PlatformConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Logging setup applied by binaries at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    pub console: bool,
    pub ansi: bool,
    pub filter: Option<String>,
    pub file: Option<FileLoggingConfig>,
}

/// Rolling file output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    pub max_files: usize,
    pub json: bool,
}

/// Gateways activated at startup, in registration order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaysConfig {
    pub enabled: Vec<String>,
    /// Payment instructions shown by the offline gateway.
    pub offline_instructions: String,
}

/// Markup conventions and event buffering of the form runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub form_class: String,
    pub row_class: String,
    pub hidden_class: String,
    pub event_capacity: usize,
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "dhub".to_owned(),
            level: "info".to_owned(),
            console: true,
            ansi: true,
            filter: None,
            file: None,
        }
    }
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("logs"), max_files: 10, json: false }
    }
}

impl Default for GatewaysConfig {
    fn default() -> Self {
        Self {
            enabled: vec![MANUAL_GATEWAY.to_owned(), OFFLINE_GATEWAY.to_owned()],
            offline_instructions: "Make your check payable to the organization and mail it to \
                                   the address listed on this page."
                .to_owned(),
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            form_class: DONATION_FORM_CLASS.to_owned(),
            row_class: FORM_ROW_CLASS.to_owned(),
            hidden_class: HIDDEN_CLASS.to_owned(),
            event_capacity: 128,
        }
    }
}
