//! Typed register values.
//!
//! [`RegisterValue`] is what the codec produces from raw bytes and consumes
//! when encoding. Operator text is turned into a value with
//! [`RegisterDescriptor::parse_value`].

use core::fmt;

use serde::Serialize;

use crate::descriptor::{BaseType, RegisterDescriptor};
use crate::error::RegisterError;

/// A decoded or to-be-encoded register value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegisterValue {
    /// Raw unsigned integer (also the fallback for unmapped enum values).
    UInt(u64),
    /// IEEE-754 binary32 value.
    Float(f32),
    /// String contents without NUL padding.
    Text(String),
    /// Enum label resolved through the descriptor's enum table.
    Enum(String),
}

impl RegisterValue {
    /// Enum label value.
    pub fn label(label: impl Into<String>) -> Self {
        Self::Enum(label.into())
    }

    /// String value.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Short name of the value kind, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Enum(_) => "enum label",
        }
    }

    /// Integer payload, if any.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload, if any.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String or label payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) | Self::Enum(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for RegisterValue {
    fn from(v: u32) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<u64> for RegisterValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f32> for RegisterValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer. `_` separators
/// are ignored.
pub fn parse_uint(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        cleaned.parse().ok()
    }
}

impl RegisterDescriptor {
    /// Interpret operator text as a value for this descriptor.
    ///
    /// - `uint_be`: decimal or `0x` hex integer, or a label of the enum table.
    /// - `float_be`: any `f32` literal; finite literals outside `f32` range
    ///   are rejected.
    /// - `string`: the text verbatim.
    pub fn parse_value(&self, text: &str) -> Result<RegisterValue, RegisterError> {
        match self.base {
            BaseType::UIntBE => {
                if let Some(v) = parse_uint(text) {
                    return Ok(RegisterValue::UInt(v));
                }
                match &self.enum_table {
                    Some(table) if table.value_of(text).is_some() => {
                        Ok(RegisterValue::Enum(text.to_string()))
                    }
                    Some(_) => Err(RegisterError::UnknownEnumLabel {
                        register: self.name.clone(),
                        label: text.to_string(),
                    }),
                    None => Err(RegisterError::InvalidValue {
                        register: self.name.clone(),
                        reason: format!("{text:?} is not an unsigned integer"),
                    }),
                }
            }
            BaseType::FloatBE => {
                let trimmed = text.trim();
                let v: f32 = trimmed.parse().map_err(|_| RegisterError::InvalidValue {
                    register: self.name.clone(),
                    reason: format!("{text:?} is not a float"),
                })?;
                if v.is_infinite() && !trimmed.to_ascii_lowercase().contains("inf") {
                    return Err(RegisterError::InvalidValue {
                        register: self.name.clone(),
                        reason: format!("{text:?} is outside the f32 range"),
                    });
                }
                Ok(RegisterValue::Float(v))
            }
            BaseType::String => Ok(RegisterValue::Text(text.to_string())),
        }
    }
}
