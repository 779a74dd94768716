mod types;

pub use types::*;

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./moodshift.toml",
        "~/.config/moodshift/config.toml",
        "/etc/moodshift/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let url = Url::parse(&config.server.base_url)
        .with_context(|| format!("Invalid server base_url: {}", config.server.base_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!(
            "Server base_url must be http or https, got {}",
            config.server.base_url
        );
    }

    if config.server.request_timeout_secs == 0 {
        anyhow::bail!("Server request_timeout_secs cannot be 0");
    }

    if config.polling.interval_ms == 0 {
        anyhow::bail!("Polling interval_ms cannot be 0");
    }

    for ext in &config.upload.allowed_extensions {
        if ext.is_empty() || ext.starts_with('.') {
            anyhow::bail!("Allowed extension {:?} must be given without a leading dot", ext);
        }
    }

    Ok(())
}
