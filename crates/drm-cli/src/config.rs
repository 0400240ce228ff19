//! Station configuration.
//!
//! Stored as TOML in the platform config directory:
//! - Linux: ~/.config/drm/station.toml
//! - macOS: ~/Library/Application Support/com.depot-dispatch.drm/station.toml
//! - Windows: %APPDATA%/depot-dispatch/drm/config/station.toml
//!
//! Relative paths inside the file resolve against the platform data directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use drm_core::{AUTOSCAN_DELAY, MIN_BARCODE_LENGTH, ScanOptions};
use drm_model::{ColumnLayout, DepotId, OriginId};
use drm_sync::DEFAULT_BACKLOG_LIMIT;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "depot-dispatch";
const APP_NAME: &str = "drm";
const CONFIG_FILENAME: &str = "station.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub depot_id: String,
    /// Shown in report envelopes; the depot id when absent.
    pub depot_name: Option<String>,
    /// Identity of this station in the shared scan log; random per process when absent.
    pub origin_id: Option<String>,
    /// Recorded on pushed file metadata.
    pub pushed_by: Option<String>,
    pub min_barcode_length: usize,
    pub autoscan_delay_ms: u64,
    pub backlog_limit: usize,
    pub state_path: PathBuf,
    pub scan_log_path: PathBuf,
    pub manifest_store_path: PathBuf,
    pub reports_dir: PathBuf,
    pub layout: ColumnLayout,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            depot_id: "default".to_string(),
            depot_name: None,
            origin_id: None,
            pushed_by: None,
            min_barcode_length: MIN_BARCODE_LENGTH,
            autoscan_delay_ms: u64::try_from(AUTOSCAN_DELAY.as_millis()).unwrap_or(120),
            backlog_limit: DEFAULT_BACKLOG_LIMIT,
            state_path: PathBuf::from("state.json"),
            scan_log_path: PathBuf::from("scans.jsonl"),
            manifest_store_path: PathBuf::from("manifests"),
            reports_dir: PathBuf::from("reports"),
            layout: ColumnLayout::default(),
        }
    }
}

/// Default location of the configuration file, if the platform has one.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Directory that relative paths resolve against.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.data_dir().to_path_buf())
}

/// Load the configuration from `explicit`, or from the platform location.
///
/// A missing or unparsable file yields the defaults with a warning; the
/// result is always resolved against the data directory.
pub fn load_config(explicit: Option<&Path>) -> StationConfig {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_path(),
    };
    let Some(path) = path else {
        warn!("could not determine config path, using defaults");
        return StationConfig::default().resolved(&data_dir());
    };
    let base = match explicit {
        Some(path) => path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        None => data_dir(),
    };
    read_config(&path).resolved(&base)
}

fn read_config(path: &Path) -> StationConfig {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                info!(path = %path.display(), "loaded station config");
                config
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "could not parse station config, using defaults");
                StationConfig::default()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no station config, using defaults");
            StationConfig::default()
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "could not read station config, using defaults");
            StationConfig::default()
        }
    }
}

impl StationConfig {
    /// Make every relative path absolute under `base`.
    #[must_use]
    pub fn resolved(mut self, base: &Path) -> Self {
        for path in [
            &mut self.state_path,
            &mut self.scan_log_path,
            &mut self.manifest_store_path,
            &mut self.reports_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    pub fn depot(&self) -> Result<DepotId> {
        DepotId::new(&self.depot_id)
            .with_context(|| format!("invalid depot_id {:?}", self.depot_id))
    }

    pub fn depot_name(&self) -> &str {
        self.depot_name.as_deref().unwrap_or(&self.depot_id)
    }

    pub fn origin(&self) -> Result<OriginId> {
        match &self.origin_id {
            Some(value) => {
                OriginId::new(value).with_context(|| format!("invalid origin_id {value:?}"))
            }
            None => Ok(OriginId::random()),
        }
    }

    pub fn pushed_by(&self) -> &str {
        self.pushed_by.as_deref().unwrap_or("drm")
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            min_barcode_length: self.min_barcode_length,
            autoscan_delay: Duration::from_millis(self.autoscan_delay_ms),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize station config")
    }
}
