//! Prelude module for common re-exports.
//!
//! ```rust
//! use cxp_regmap::prelude::*;
//! ```

// ─── Descriptors ────────────────────────────────────────────────────
pub use crate::descriptor::{AccessMode, BaseType, EnumTable, RegisterDescriptor};

// ─── Engine ─────────────────────────────────────────────────────────
pub use crate::error::RegisterError;
pub use crate::map::RegisterMap;
pub use crate::value::RegisterValue;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, DeviceModelConfig};

// ─── Transport ──────────────────────────────────────────────────────
pub use crate::bus::{BusError, MemoryBus, RegisterBus};
pub use crate::device::{DeviceError, RegisterDevice};

// ─── Models ─────────────────────────────────────────────────────────
pub use crate::models::phantom_s991;
