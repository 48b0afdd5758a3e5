//! Register map error types.
//!
//! Every failure is local and synchronous: registration errors abort
//! device-model construction, codec errors are returned to the caller and
//! never touch the descriptor table.

use thiserror::Error;

use crate::descriptor::BaseType;

/// Errors raised by registration, lookup and the register codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A descriptor with this name is already registered.
    #[error("duplicate register name '{name}'")]
    DuplicateName { name: String },

    /// Bit geometry does not fit the descriptor's base type.
    #[error("invalid field layout for '{register}': {reason}")]
    InvalidFieldLayout { register: String, reason: String },

    /// An enum key cannot be represented in the field width.
    #[error("enum value {value:#x} of '{register}' does not fit in {bit_size} bits")]
    InvalidEnumRange {
        register: String,
        value: u32,
        bit_size: u32,
    },

    /// The same enum label is bound to more than one raw value.
    #[error("enum label '{label}' of '{register}' is bound to more than one value")]
    DuplicateEnumLabel { register: String, label: String },

    /// The field's bits intersect another registered field.
    #[error("field '{register}' overlaps bits of '{other}'")]
    OverlappingField { register: String, other: String },

    /// Registration attempted after the table was sealed.
    #[error("register map is sealed, cannot register '{name}'")]
    Sealed { name: String },

    /// No descriptor with this name.
    #[error("unknown register '{name}'")]
    UnknownRegister { name: String },

    /// Label not present in the descriptor's enum table.
    #[error("unknown enum label '{label}' for '{register}'")]
    UnknownEnumLabel { register: String, label: String },

    /// String value does not fit the field.
    #[error("string of {len} bytes exceeds {max} byte field '{register}'")]
    StringTooLong {
        register: String,
        len: usize,
        max: usize,
    },

    /// Encode requested on a read-only descriptor.
    #[error("register '{register}' is read-only")]
    WriteNotPermitted { register: String },

    /// Decode requested on a write-only descriptor.
    #[error("register '{register}' is write-only")]
    ReadNotPermitted { register: String },

    /// Value kind does not match the descriptor's base type.
    #[error("register '{register}' expects {expected} but got {found}")]
    ValueTypeMismatch {
        register: String,
        expected: BaseType,
        found: &'static str,
    },

    /// Integer does not fit in the field width.
    #[error("value {value} does not fit in {bit_size} bit field '{register}'")]
    ValueOutOfRange {
        register: String,
        value: u64,
        bit_size: u32,
    },

    /// Value is malformed for the field (bad literal, embedded NUL, ...).
    #[error("invalid value for '{register}': {reason}")]
    InvalidValue { register: String, reason: String },

    /// Raw buffer length does not match the descriptor span.
    #[error("register '{register}' spans {expected} bytes, buffer has {actual}")]
    BufferLength {
        register: String,
        expected: usize,
        actual: usize,
    },

    /// Partial-word encode needs the current word contents.
    #[error("register '{register}' shares its word, current contents are required")]
    CurrentWordRequired { register: String },

    /// Base address plus byte offset does not fit the transport address space.
    #[error("address of '{register}' overflows: base {base_address:#x} + offset {offset:#x}")]
    AddressOverflow {
        register: String,
        base_address: u64,
        offset: u64,
    },

    /// Decoded string bytes are not valid UTF-8.
    #[error("register '{register}' holds bytes that are not valid UTF-8")]
    MalformedString { register: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_register() {
        let err = RegisterError::WriteNotPermitted {
            register: "WidthMaxReg".to_string(),
        };
        assert_eq!(err.to_string(), "register 'WidthMaxReg' is read-only");

        let err = RegisterError::InvalidEnumRange {
            register: "TriggerModeReg".to_string(),
            value: 0x100,
            bit_size: 8,
        };
        assert_eq!(
            err.to_string(),
            "enum value 0x100 of 'TriggerModeReg' does not fit in 8 bits"
        );
    }

    #[test]
    fn type_mismatch_uses_base_type_display() {
        let err = RegisterError::ValueTypeMismatch {
            register: "GainReg".to_string(),
            expected: BaseType::FloatBE,
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "register 'GainReg' expects float_be but got string"
        );
    }
}
