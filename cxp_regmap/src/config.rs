//! Device-model configuration loading.
//!
//! A device model is a TOML file with a `[device]` table and one
//! `[[register]]` entry per descriptor (or descriptor array).
//!
//! # Usage
//!
//! ```rust,no_run
//! use cxp_regmap::config::ConfigError;
//! use cxp_regmap::map::RegisterMap;
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let map = RegisterMap::load(Path::new("models/camera.toml"))?;
//!     println!("{} registers", map.len());
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! [device]
//! name = "PhantomS991"
//!
//! [[register]]
//! name = "PixelFormatReg"
//! base = "uint_be"
//! offset = 0x8008
//! mode = "RW"
//! enum = { Undefined = 0x00000000, Mono8 = 0x01080001 }
//!
//! [[register]]
//! name = "DigitalIOReg"
//! base = "uint_be"
//! offset = 0x8198
//! bit_size = 8
//! bit_offset = 24
//! array = { count = 3, bit_offset_stride = -8 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::descriptor::{AccessMode, BaseType, EnumTable, RegisterDescriptor};
use crate::error::RegisterError;
use crate::map::RegisterMap;

/// Error type for device-model loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A descriptor was rejected by the register map.
    #[error("Register rejected: {0}")]
    Register(#[from] RegisterError),
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax or schema is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Any serde-deserializable struct can be loaded from TOML.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── DeviceSection ──────────────────────────────────────────────────

/// `[device]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    /// Device model name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Base address added to every register offset. Default: 0.
    #[serde(default)]
    pub base_address: u64,
}

impl DeviceSection {
    /// Returns `ConfigError::ValidationError` if `name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "device name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── ArraySpec ──────────────────────────────────────────────────────

/// Repetition of one register entry as `Name[0]..Name[count-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArraySpec {
    /// Number of elements (at least 1).
    pub count: u32,

    /// Byte offset added per element. May be negative.
    #[serde(default)]
    pub offset_stride: i64,

    /// Bit offset added per element. May be negative.
    #[serde(default)]
    pub bit_offset_stride: i32,
}

// ─── RegisterEntry ──────────────────────────────────────────────────

/// A single `[[register]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterEntry {
    /// Register name (array elements get an `[i]` suffix).
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Field encoding.
    pub base: BaseType,

    /// Byte offset of the containing word.
    pub offset: u64,

    /// Field width. Default: natural width of `base`.
    #[serde(default)]
    pub bit_size: Option<u32>,

    /// Position within the word. Default: 0.
    #[serde(default)]
    pub bit_offset: u32,

    /// Access mode. Default: RW.
    #[serde(default)]
    pub mode: AccessMode,

    #[serde(default)]
    pub units: Option<String>,

    /// Enum table as `label = value`.
    #[serde(default, rename = "enum")]
    pub enum_table: Option<BTreeMap<String, u32>>,

    /// Allow aliasing bits of other registers. Default: false.
    #[serde(default)]
    pub overlap: bool,

    #[serde(default)]
    pub array: Option<ArraySpec>,
}

impl RegisterEntry {
    /// Expand the entry into descriptors (one, or `array.count`).
    pub fn descriptors(&self) -> Result<Vec<RegisterDescriptor>, ConfigError> {
        let table = self.build_enum_table()?;
        let bit_size = self.bit_size.unwrap_or(self.base.natural_bits());

        let Some(array) = self.array else {
            return Ok(vec![self.descriptor(
                self.name.clone(),
                self.offset,
                bit_size,
                self.bit_offset,
                table,
            )]);
        };

        if array.count == 0 {
            return Err(ConfigError::ValidationError(format!(
                "register '{}': array count must be at least 1",
                self.name
            )));
        }

        (0..array.count)
            .map(|i| {
                let name = format!("{}[{i}]", self.name);
                let offset = element_position(self.offset, i, array.offset_stride);
                let bit_offset =
                    element_position(self.bit_offset as u64, i, array.bit_offset_stride as i64)
                        .and_then(|b| u32::try_from(b).ok());
                match (offset, bit_offset) {
                    (Some(offset), Some(bit_offset)) => {
                        Ok(self.descriptor(name, offset, bit_size, bit_offset, table.clone()))
                    }
                    _ => Err(ConfigError::Register(RegisterError::InvalidFieldLayout {
                        register: name,
                        reason: format!(
                            "array element {i} resolves to a negative or out-of-range position"
                        ),
                    })),
                }
            })
            .collect()
    }

    fn descriptor(
        &self,
        name: String,
        offset: u64,
        bit_size: u32,
        bit_offset: u32,
        table: Option<EnumTable>,
    ) -> RegisterDescriptor {
        RegisterDescriptor {
            name,
            description: self.description.clone(),
            base: self.base,
            byte_offset: offset,
            bit_size,
            bit_offset,
            mode: self.mode,
            units: self.units.clone(),
            enum_table: table,
            overlap: self.overlap,
        }
    }

    /// Invert `label = value` into a value-keyed table. Two labels sharing
    /// a value make decoding ambiguous and are rejected.
    fn build_enum_table(&self) -> Result<Option<EnumTable>, ConfigError> {
        let Some(labels) = &self.enum_table else {
            return Ok(None);
        };
        let mut table = EnumTable::new();
        for (label, &value) in labels {
            if let Some(prev) = table.insert(value, label.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "register '{}': enum labels '{prev}' and '{label}' share value {value:#x}",
                    self.name
                )));
            }
        }
        Ok(Some(table))
    }
}

/// `base + index * stride`, or `None` if it is negative or overflows.
fn element_position(base: u64, index: u32, stride: i64) -> Option<u64> {
    let delta = i64::from(index).checked_mul(stride)?;
    let position = i64::try_from(base).ok()?.checked_add(delta)?;
    u64::try_from(position).ok()
}

// ─── DeviceModelConfig ──────────────────────────────────────────────

/// Top-level device-model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceModelConfig {
    pub device: DeviceSection,

    /// Register entries in declaration order.
    #[serde(default, rename = "register")]
    pub registers: Vec<RegisterEntry>,
}

impl DeviceModelConfig {
    /// Parse from TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl RegisterMap {
    /// Build a map from a parsed device model, registering every entry in
    /// declaration order. Fails fast on the first rejected descriptor.
    pub fn from_config(config: &DeviceModelConfig) -> Result<Self, ConfigError> {
        config.device.validate()?;

        let mut map = RegisterMap::new(config.device.name.clone())
            .with_description(config.device.description.clone())
            .with_base_address(config.device.base_address);
        for entry in &config.registers {
            for descriptor in entry.descriptors()? {
                map.register(descriptor)?;
            }
        }

        info!(
            device = %map.name(),
            registers = map.len(),
            base_address = format_args!("{:#x}", map.base_address()),
            "register map built"
        );
        Ok(map)
    }

    /// Load and build a map from a device-model TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = DeviceModelConfig::load(path)?;
        Self::from_config(&config)
    }
}
