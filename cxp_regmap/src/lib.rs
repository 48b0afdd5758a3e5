//! CXP Register Map Library
//!
//! Typed register map engine for CoaXPress camera device models: register
//! descriptors, a validating per-device namespace, and the codec between
//! raw register spans and typed values.
//!
//! # Module Structure
//!
//! - [`descriptor`] - Register descriptor, base types, access modes, enum tables
//! - [`map`] - `RegisterMap` namespace (register, lookup, enumerate, sealing)
//! - [`codec`] - Raw span ↔ typed value conversion
//! - [`value`] - `RegisterValue` and operator text parsing
//! - [`config`] - TOML device-model loading
//! - [`bus`] - Transport seam and in-memory bus
//! - [`device`] - Name-based get/set over a bus with read-modify-write
//! - [`models`] - Built-in device models
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use cxp_regmap::prelude::*;
//!
//! let mut map = RegisterMap::new("Camera");
//! map.register(
//!     RegisterDescriptor::new("WidthReg", BaseType::UIntBE, 0x8000).units("pixels"),
//! )?;
//!
//! let raw = map.encode("WidthReg", &RegisterValue::UInt(1920), None)?;
//! assert_eq!(raw, [0x00, 0x00, 0x07, 0x80]);
//! assert_eq!(map.decode("WidthReg", &raw)?, RegisterValue::UInt(1920));
//! # Ok::<(), RegisterError>(())
//! ```

pub mod bus;
pub mod codec;
pub mod config;
pub mod consts;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod map;
pub mod models;
pub mod prelude;
pub mod value;
