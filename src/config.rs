use crate::common::ConfigError;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_WAIT: u64 = 0;

/// Raw DRAM description as written in the configuration document.
///
/// Numeric fields are signed so that a negative value is reported as a
/// validation failure naming the field, not as a parse error. Use
/// [`DeviceGeometry::from_config`](crate::memory::DeviceGeometry::from_config)
/// to obtain a validated geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DramConfig {
    /// Total DRAM capacity in GB.
    pub capacity: i64,
    /// Cycles per abstract time unit.
    pub clock: i64,
    pub chips: ChipsConfig,
    pub times: TimesConfig,

    /// Cycle at which the bus is first free.
    #[serde(default = "default_wait")]
    pub wait: u64,

    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChipsConfig {
    pub number: i64,
    /// Capacity of a single chip in MB.
    pub capacity: i64,
    pub rows: i64,
    pub columns: i64,
    pub banks: i64,
}

/// DRAM timing constants in cycles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimesConfig {
    /// Row precharge.
    #[serde(rename = "RP")]
    pub rp: i64,
    /// Row to column delay.
    #[serde(rename = "RCD")]
    pub rcd: i64,
    /// Column latency.
    #[serde(rename = "CL")]
    pub cl: i64,
    /// Write recovery.
    #[serde(rename = "WR")]
    pub wr: i64,
}

/// How much open-row state an access invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Every access closes all banks of the chip before opening its row.
    #[default]
    Chip,
    /// Every access only replaces the open row of the bank it touches.
    Bank,
}

fn default_wait() -> u64 {
    DEFAULT_WAIT
}

/// Command-line replacements for the chip geometry.
///
/// Any field left as `None` keeps the value from the document.
#[derive(Debug, Clone, Default)]
pub struct GeometryOverrides {
    pub capacity: Option<i64>,
    pub chips: Option<i64>,
    pub chip_capacity: Option<i64>,
    pub rows: Option<i64>,
    pub columns: Option<i64>,
    pub banks: Option<i64>,
}

impl GeometryOverrides {
    /// Returns `true` if no value would be replaced.
    pub fn is_empty(&self) -> bool {
        self.capacity.is_none()
            && self.chips.is_none()
            && self.chip_capacity.is_none()
            && self.rows.is_none()
            && self.columns.is_none()
            && self.banks.is_none()
    }

    pub fn apply(&self, config: &mut DramConfig) {
        if let Some(v) = self.capacity {
            config.capacity = v;
        }
        if let Some(v) = self.chips {
            config.chips.number = v;
        }
        if let Some(v) = self.chip_capacity {
            config.chips.capacity = v;
        }
        if let Some(v) = self.rows {
            config.chips.rows = v;
        }
        if let Some(v) = self.columns {
            config.chips.columns = v;
        }
        if let Some(v) = self.banks {
            config.chips.banks = v;
        }
    }
}

/// Supported configuration document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }
}

/// Reads the configuration document at `path`.
///
/// The document holds one top-level entry naming the DRAM device. If more
/// than one entry is present the first is used.
///
/// # Arguments
///
/// * `path` - A `.yml`, `.yaml` or `.toml` file.
///
/// # Returns
///
/// The raw, not yet validated, DRAM description.
pub fn load_config(path: &Path) -> Result<DramConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

/// Parses a configuration document held in memory.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<DramConfig, ConfigError> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => parse_toml(content),
    }
}

fn parse_yaml(content: &str) -> Result<DramConfig, ConfigError> {
    let document: serde_yaml::Mapping =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut entries = document.into_iter();
    let (name, value) = entries.next().ok_or(ConfigError::EmptyDocument)?;
    if entries.next().is_some() {
        warn!(
            "configuration holds several DRAM entries, using '{}'",
            name.as_str().unwrap_or("?")
        );
    }

    serde_yaml::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))
}

fn parse_toml(content: &str) -> Result<DramConfig, ConfigError> {
    let document: toml::Table =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut entries = document.into_iter();
    let (name, value) = entries.next().ok_or(ConfigError::EmptyDocument)?;
    if entries.next().is_some() {
        warn!("configuration holds several DRAM entries, using '{}'", name);
    }

    value
        .try_into::<DramConfig>()
        .map_err(|e| ConfigError::Parse(e.to_string()))
}
