//! Phantom S991 CoaXPress camera.
//!
//! Manufacturer-specific register space (0x8000–0x8340): device info,
//! image format, acquisition, trigger, lens, gain/black level, GPIO lines,
//! link banks and serial ports. The CoaXPress bootstrap block at offset 0
//! is not part of this model.

use crate::config::{ConfigError, DeviceModelConfig};
use crate::map::RegisterMap;

/// Embedded device-model source.
pub const PHANTOM_S991_TOML: &str = include_str!("phantom_s991.toml");

/// Number of registers in the model (`DigitalIOReg` expands to three).
pub const PHANTOM_S991_REGISTERS: usize = 57;

/// Build the Phantom S991 register map.
pub fn phantom_s991() -> Result<RegisterMap, ConfigError> {
    let config = DeviceModelConfig::from_toml(PHANTOM_S991_TOML)?;
    RegisterMap::from_config(&config)
}
