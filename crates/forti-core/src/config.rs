//! Exporter configuration parser (`fortid.toml`).

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::version::FirmwareVersion;

const DEFAULT_LISTEN: &str = "0.0.0.0:9710";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(rename = "target", default)]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

/// One scrape target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    /// `host:port` of the monitoring API.
    pub address: String,
    /// Bearer token sent with every API call.
    pub token: Option<String>,
    /// Pinned firmware version; when absent it is discovered per scrape.
    pub version: Option<String>,
    /// Per-request timeout, e.g. `"10s"` or `"500ms"`.
    pub timeout: Option<String>,
    /// Probes to run; all probes when absent.
    pub probes: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl TargetConfig {
    pub fn timeout(&self) -> CoreResult<Duration> {
        match &self.timeout {
            None => Ok(DEFAULT_TIMEOUT),
            Some(raw) => parse_duration(raw).ok_or_else(|| {
                CoreError::Config(format!("target {}: invalid timeout {raw:?}", self.name))
            }),
        }
    }

    pub fn firmware_version(&self) -> CoreResult<Option<FirmwareVersion>> {
        self.version
            .as_deref()
            .map(FirmwareVersion::parse)
            .transpose()
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: ExporterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> CoreResult<()> {
        if self.targets.is_empty() {
            return Err(CoreError::Config("no targets configured".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(CoreError::Config("target with empty name".to_string()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "duplicate target name {:?}",
                    target.name
                )));
            }
            if target.address.trim().is_empty() {
                return Err(CoreError::Config(format!(
                    "target {}: empty address",
                    target.name
                )));
            }
            target.timeout()?;
            target.firmware_version()?;
        }
        Ok(())
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
