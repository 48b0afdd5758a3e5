//! Register descriptor types.
//!
//! A [`RegisterDescriptor`] is the static metadata of one addressable
//! register field: where it lives, how wide it is, how its bits are encoded
//! and whether it may be read or written.
//!
//! # Bit numbering
//!
//! A word is [`WORD_BYTES`] bytes at `byte_offset`. Bit `b` of the word is
//! bit `b % 8` (LSB first) of byte `b / 8` in memory order. A field's bits
//! are gathered in that order into `ceil(bit_size / 8)` bytes which are then
//! read big-endian. A full 32-bit field is therefore plain big-endian, and
//! `bit_offset = 24, bit_size = 8` selects the last byte of the word.

use core::fmt;
use core::ops::Range;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_STRING_BITS, DEFAULT_UINT_BITS, FLOAT_BITS, WORD_BITS, WORD_BYTES};
use crate::error::RegisterError;

// ─── BaseType ───────────────────────────────────────────────────────

/// Semantic encoding of a register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    /// Unsigned integer, big-endian byte order.
    #[serde(rename = "uint_be")]
    UIntBE,
    /// IEEE-754 binary32, big-endian byte order.
    #[serde(rename = "float_be")]
    FloatBE,
    /// Fixed-length, NUL-padded UTF-8 string.
    #[serde(rename = "string")]
    String,
}

impl BaseType {
    /// Field width used when a descriptor does not specify `bit_size`.
    pub const fn natural_bits(self) -> u32 {
        match self {
            Self::UIntBE => DEFAULT_UINT_BITS,
            Self::FloatBE => FLOAT_BITS,
            Self::String => DEFAULT_STRING_BITS,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UIntBE => write!(f, "uint_be"),
            Self::FloatBE => write!(f, "float_be"),
            Self::String => write!(f, "string"),
        }
    }
}

impl FromStr for BaseType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint_be" => Ok(Self::UIntBE),
            "float_be" => Ok(Self::FloatBE),
            "string" => Ok(Self::String),
            _ => Err(format!(
                "unknown BaseType: {s:?}, expected \"uint_be\", \"float_be\" or \"string\""
            )),
        }
    }
}

// ─── AccessMode ─────────────────────────────────────────────────────

/// Access permitted on a register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Read-only.
    RO,
    /// Write-only. Never decoded.
    WO,
    /// Read-write.
    #[default]
    RW,
}

impl AccessMode {
    /// Whether the field may be decoded.
    pub const fn can_read(self) -> bool {
        matches!(self, Self::RO | Self::RW)
    }

    /// Whether the field may be encoded.
    pub const fn can_write(self) -> bool {
        matches!(self, Self::WO | Self::RW)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RO => write!(f, "RO"),
            Self::WO => write!(f, "WO"),
            Self::RW => write!(f, "RW"),
        }
    }
}

impl FromStr for AccessMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RO" => Ok(Self::RO),
            "WO" => Ok(Self::WO),
            "RW" => Ok(Self::RW),
            _ => Err(format!(
                "unknown AccessMode: {s:?}, expected \"RO\", \"WO\" or \"RW\""
            )),
        }
    }
}

// ─── EnumTable ──────────────────────────────────────────────────────

/// Mapping from raw field value to symbolic label, ordered by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumTable {
    entries: BTreeMap<u32, String>,
}

impl EnumTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, value: u32, label: impl Into<String>) -> Self {
        self.insert(value, label);
        self
    }

    /// Bind `label` to `value`, returning the label previously bound to it.
    pub fn insert(&mut self, value: u32, label: impl Into<String>) -> Option<String> {
        self.entries.insert(value, label.into())
    }

    /// Label for a raw value.
    pub fn label(&self, value: u32) -> Option<&str> {
        self.entries.get(&value).map(String::as_str)
    }

    /// Raw value for a label.
    pub fn value_of(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(v, _)| *v)
    }

    /// Entries in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(v, l)| (*v, l.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for EnumTable {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (value, label) in iter {
            table.insert(value, label);
        }
        table
    }
}

// ─── RegisterDescriptor ─────────────────────────────────────────────

/// Static metadata describing one register field.
///
/// Built once during device-model construction and never mutated after
/// registration; the owning [`RegisterMap`](crate::map::RegisterMap) only
/// hands out shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterDescriptor {
    /// Unique name within the device namespace.
    pub name: String,
    /// Human-readable text, may be empty.
    pub description: String,
    /// Field encoding.
    pub base: BaseType,
    /// Byte offset of the containing word in the device address space.
    pub byte_offset: u64,
    /// Field width in bits.
    pub bit_size: u32,
    /// Position of the field's first bit within the word.
    pub bit_offset: u32,
    /// Access mode.
    pub mode: AccessMode,
    /// Physical unit tag, informational only.
    pub units: Option<String>,
    /// Symbolic labels for raw values (`uint_be` only).
    pub enum_table: Option<EnumTable>,
    /// Allow this field to alias bits of other fields.
    pub overlap: bool,
}

impl RegisterDescriptor {
    /// Create a read-write descriptor of natural width at bit offset 0.
    pub fn new(name: impl Into<String>, base: BaseType, byte_offset: u64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base,
            byte_offset,
            bit_size: base.natural_bits(),
            bit_offset: 0,
            mode: AccessMode::default(),
            units: None,
            enum_table: None,
            overlap: false,
        }
    }

    /// Set the human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set field width and position within the word.
    pub fn bits(mut self, bit_size: u32, bit_offset: u32) -> Self {
        self.bit_size = bit_size;
        self.bit_offset = bit_offset;
        self
    }

    /// Set the access mode.
    pub fn mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Tag the field with a physical unit.
    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Attach symbolic labels for raw values.
    pub fn enum_table(mut self, table: EnumTable) -> Self {
        self.enum_table = Some(table);
        self
    }

    /// Let the field alias bits of other registered fields.
    pub fn allow_overlap(mut self) -> Self {
        self.overlap = true;
        self
    }

    /// Number of bytes the field's container occupies: one word for
    /// numeric types, `bit_size / 8` bytes for strings.
    pub fn span_bytes(&self) -> usize {
        match self.base {
            BaseType::UIntBE | BaseType::FloatBE => WORD_BYTES,
            BaseType::String => (self.bit_size / 8) as usize,
        }
    }

    /// Number of bytes the field value itself occupies.
    pub fn field_bytes(&self) -> usize {
        self.bit_size.div_ceil(8) as usize
    }

    /// Whether the field covers its whole container, so encoding needs no
    /// current contents.
    pub fn covers_span(&self) -> bool {
        self.bit_offset == 0 && self.bit_size as usize == self.span_bytes() * 8
    }

    /// Absolute bit range in the device address space.
    ///
    /// Saturates at `u64::MAX`; [`validate`](Self::validate) rejects
    /// offsets where that would happen.
    pub fn bit_range(&self) -> Range<u64> {
        let start = self
            .byte_offset
            .saturating_mul(8)
            .saturating_add(self.bit_offset as u64);
        start..start.saturating_add(self.bit_size as u64)
    }

    /// Largest raw value the field can hold.
    pub fn max_raw(&self) -> u64 {
        if self.bit_size >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bit_size) - 1
        }
    }

    /// Check bit geometry and enum table consistency.
    ///
    /// Name uniqueness and overlap are checked by the owning map.
    pub fn validate(&self) -> Result<(), RegisterError> {
        self.validate_layout()?;
        self.validate_enum()
    }

    fn layout_error(&self, reason: impl Into<String>) -> RegisterError {
        RegisterError::InvalidFieldLayout {
            register: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn validate_layout(&self) -> Result<(), RegisterError> {
        if self.name.is_empty() {
            return Err(self.layout_error("name cannot be empty"));
        }
        if self.bit_size == 0 {
            return Err(self.layout_error("bit_size must be at least 1"));
        }
        let span_bits = self.span_bytes() as u64 * 8;
        if self
            .byte_offset
            .checked_mul(8)
            .and_then(|start| start.checked_add(span_bits))
            .is_none()
        {
            return Err(self.layout_error(format!(
                "byte_offset {:#x} is beyond the addressable range",
                self.byte_offset
            )));
        }
        match self.base {
            BaseType::UIntBE => {
                if self.bit_offset as u64 + self.bit_size as u64 > WORD_BITS as u64 {
                    return Err(self.layout_error(format!(
                        "bit_offset {} + bit_size {} exceeds {WORD_BITS} bit word",
                        self.bit_offset, self.bit_size
                    )));
                }
                if self.bit_size > 8 && self.bit_size % 8 != 0 {
                    return Err(self.layout_error(format!(
                        "multi-byte big-endian field must be whole bytes, got {} bits",
                        self.bit_size
                    )));
                }
            }
            BaseType::FloatBE => {
                if self.bit_size != FLOAT_BITS || self.bit_offset != 0 {
                    return Err(self.layout_error(format!(
                        "float_be requires bit_size {FLOAT_BITS} at bit_offset 0"
                    )));
                }
            }
            BaseType::String => {
                if self.bit_offset != 0 {
                    return Err(self.layout_error("string requires bit_offset 0"));
                }
                if self.bit_size % 8 != 0 {
                    return Err(self.layout_error(format!(
                        "string bit_size must be a multiple of 8, got {}",
                        self.bit_size
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_enum(&self) -> Result<(), RegisterError> {
        let Some(table) = &self.enum_table else {
            return Ok(());
        };
        if self.base != BaseType::UIntBE {
            return Err(self.layout_error(format!(
                "enum table requires uint_be, got {}",
                self.base
            )));
        }
        let max = self.max_raw();
        let mut seen: Vec<&str> = Vec::with_capacity(table.len());
        for (value, label) in table.iter() {
            if value as u64 > max {
                return Err(RegisterError::InvalidEnumRange {
                    register: self.name.clone(),
                    value,
                    bit_size: self.bit_size,
                });
            }
            if seen.contains(&label) {
                return Err(RegisterError::DuplicateEnumLabel {
                    register: self.name.clone(),
                    label: label.to_string(),
                });
            }
            seen.push(label);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(name: &str, offset: u64) -> RegisterDescriptor {
        RegisterDescriptor::new(name, BaseType::UIntBE, offset)
    }

    #[test]
    fn natural_widths() {
        assert_eq!(uint("A", 0).bit_size, 32);
        assert_eq!(RegisterDescriptor::new("F", BaseType::FloatBE, 0).bit_size, 32);
        assert_eq!(BaseType::String.natural_bits(), 32);
    }

    #[test]
    fn base_type_parse_and_display() {
        for base in [BaseType::UIntBE, BaseType::FloatBE, BaseType::String] {
            assert_eq!(base.to_string().parse::<BaseType>(), Ok(base));
        }
        assert!("UIntBE".parse::<BaseType>().is_err());
    }

    #[test]
    fn access_mode_permissions() {
        assert!(AccessMode::RO.can_read() && !AccessMode::RO.can_write());
        assert!(!AccessMode::WO.can_read() && AccessMode::WO.can_write());
        assert!(AccessMode::RW.can_read() && AccessMode::RW.can_write());
        assert_eq!("WO".parse::<AccessMode>(), Ok(AccessMode::WO));
        assert!("rw".parse::<AccessMode>().is_err());
    }

    #[test]
    fn uint_layout_limits() {
        assert!(uint("A", 0).bits(8, 24).validate().is_ok());
        assert!(uint("A", 0).bits(16, 16).validate().is_ok());
        assert!(uint("A", 0).bits(3, 5).validate().is_ok());

        let err = uint("A", 0).bits(16, 24).validate().unwrap_err();
        assert!(matches!(err, RegisterError::InvalidFieldLayout { .. }));

        let err = uint("A", 0).bits(12, 0).validate().unwrap_err();
        assert!(matches!(err, RegisterError::InvalidFieldLayout { .. }));

        let err = uint("A", 0).bits(0, 0).validate().unwrap_err();
        assert!(matches!(err, RegisterError::InvalidFieldLayout { .. }));
    }

    #[test]
    fn float_and_string_layout() {
        let float = RegisterDescriptor::new("F", BaseType::FloatBE, 0);
        assert!(float.validate().is_ok());
        assert!(float.clone().bits(16, 0).validate().is_err());
        assert!(float.bits(32, 8).validate().is_err());

        let string = RegisterDescriptor::new("S", BaseType::String, 0).bits(8 * 32, 0);
        assert!(string.validate().is_ok());
        assert_eq!(string.span_bytes(), 32);
        assert!(string.clone().bits(8 * 32, 8).validate().is_err());
        assert!(string.bits(20, 0).validate().is_err());
    }

    #[test]
    fn enum_keys_must_fit() {
        let table = EnumTable::new().with(0, "Off").with(1, "On");
        assert!(uint("A", 0).bits(1, 0).enum_table(table).validate().is_ok());

        let table = EnumTable::new().with(0, "Off").with(0x100, "Huge");
        let err = uint("A", 0)
            .bits(8, 24)
            .enum_table(table)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            RegisterError::InvalidEnumRange {
                register: "A".to_string(),
                value: 0x100,
                bit_size: 8,
            }
        );
    }

    #[test]
    fn enum_labels_must_be_unique() {
        let table = EnumTable::new().with(0, "Off").with(1, "Off");
        let err = uint("A", 0).enum_table(table).validate().unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateEnumLabel { label, .. } if label == "Off"));
    }

    #[test]
    fn enum_requires_uint() {
        let table = EnumTable::new().with(0, "Zero");
        let err = RegisterDescriptor::new("F", BaseType::FloatBE, 0)
            .enum_table(table)
            .validate()
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidFieldLayout { .. }));
    }

    #[test]
    fn enum_table_lookups() {
        let table: EnumTable = [(0x01080001, "Mono8"), (0, "Undefined")]
            .into_iter()
            .collect();
        assert_eq!(table.label(0x01080001), Some("Mono8"));
        assert_eq!(table.value_of("Undefined"), Some(0));
        assert_eq!(table.value_of("Mono16"), None);
        let values: Vec<u32> = table.iter().map(|(v, _)| v).collect();
        assert_eq!(values, vec![0, 0x01080001]);
    }

    #[test]
    fn span_and_bit_range() {
        let d = uint("T", 0x8168).bits(16, 16);
        assert_eq!(d.span_bytes(), 4);
        assert_eq!(d.field_bytes(), 2);
        assert!(!d.covers_span());
        assert_eq!(d.bit_range(), 0x8168 * 8 + 16..0x8168 * 8 + 32);
        assert!(uint("W", 0x8000).covers_span());
        assert_eq!(uint("W", 0).max_raw(), u32::MAX as u64);
        assert_eq!(uint("B", 0).bits(3, 0).max_raw(), 7);
    }

    #[test]
    fn far_offset_rejected_without_overflow() {
        let far = uint("FarReg", 0x2000_0000_0000_0000);
        assert!(matches!(
            far.validate(),
            Err(RegisterError::InvalidFieldLayout { register, .. }) if register == "FarReg"
        ));
        assert_eq!(far.bit_range().end, u64::MAX);

        let last_word = uint("LastReg", u64::MAX / 8 - 4);
        assert!(last_word.validate().is_ok());
    }
}
