//! Built-in device models.
//!
//! Each model is a TOML device description embedded at compile time and
//! built through the same path as user-supplied model files.

pub mod phantom_s991;

pub use phantom_s991::phantom_s991;
