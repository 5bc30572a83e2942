//! Overlay configuration files
//!
//! TOML on disk, [`OverlayConfig`] in memory.

use std::fs;
use std::path::{Path, PathBuf};

use hotspot_types::OverlayConfig;

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Load an overlay config from a TOML file
pub fn load_file(path: &Path) -> Result<OverlayConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = parse_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(
        path = %path.display(),
        interactions = config.interactions.len(),
        "Loaded overlay config"
    );
    Ok(config)
}

pub fn parse_str(contents: &str) -> Result<OverlayConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Save a config to a TOML file, creating parent directories as needed
pub fn save_file(path: &Path, config: &OverlayConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, contents).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Where the diagram lives. Relative resources are taken relative to the
/// directory holding the config file; URIs are returned untouched.
pub fn resolve_resource(config_path: &Path, config: &OverlayConfig) -> PathBuf {
    let resource = Path::new(&config.diagram_resource);
    if resource.is_absolute() || config.diagram_resource.contains("://") {
        return resource.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(resource),
        None => resource.to_path_buf(),
    }
}

/// Get the default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hotspot").join("overlay.toml"))
}
