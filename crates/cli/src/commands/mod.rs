pub mod config_cmd;
pub mod run;

use baton_config::{AppConfig, ConfigError};
use std::path::Path;

/// Load configuration from `path` if given, else from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
}
