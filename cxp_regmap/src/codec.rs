//! Raw span ↔ typed value codec.
//!
//! Pure functions over a [`RegisterDescriptor`]; no descriptor state is
//! touched, so both directions are safe to call concurrently.
//!
//! ## Span
//!
//! The raw buffer is always the descriptor's span: the 4-byte word for
//! `uint_be`/`float_be`, `bit_size / 8` bytes for `string`.
//!
//! ## Read-modify-write
//!
//! A field that does not cover its whole word is merged into the current
//! word contents supplied by the caller; bits outside
//! `[bit_offset, bit_offset + bit_size)` are preserved.

use tracing::trace;

use crate::consts::WORD_BYTES;
use crate::descriptor::{BaseType, RegisterDescriptor};
use crate::error::RegisterError;
use crate::value::RegisterValue;

/// Convert a typed value into the raw span to write at `byte_offset`.
///
/// `current` holds the span's present contents and is required when the
/// field shares its word with other bits; it is ignored otherwise.
///
/// # Errors
///
/// - `WriteNotPermitted` for read-only descriptors
/// - `ValueTypeMismatch`, `ValueOutOfRange`, `UnknownEnumLabel`,
///   `StringTooLong`, `InvalidValue` for values that do not fit
/// - `CurrentWordRequired`, `BufferLength` for a missing or mis-sized
///   current word
pub fn encode(
    desc: &RegisterDescriptor,
    value: &RegisterValue,
    current: Option<&[u8]>,
) -> Result<Vec<u8>, RegisterError> {
    if !desc.mode.can_write() {
        return Err(RegisterError::WriteNotPermitted {
            register: desc.name.clone(),
        });
    }

    let out = match desc.base {
        BaseType::UIntBE => {
            let raw = uint_value(desc, value)?;
            let word = base_word(desc, current)?;
            insert_field(desc, word, raw).to_vec()
        }
        BaseType::FloatBE => match value {
            RegisterValue::Float(v) => v.to_be_bytes().to_vec(),
            other => return Err(mismatch(desc, other)),
        },
        BaseType::String => match value {
            RegisterValue::Text(s) => encode_string(desc, s)?,
            other => return Err(mismatch(desc, other)),
        },
    };

    trace!(register = %desc.name, value = %value, raw = ?out, "encoded");
    Ok(out)
}

/// Convert a raw span read at `byte_offset` into a typed value.
///
/// Enum descriptors return the label when the raw value is in the table
/// and fall back to [`RegisterValue::UInt`] otherwise. An integer that was
/// encoded for a labelled value therefore decodes to its label.
///
/// # Errors
///
/// - `ReadNotPermitted` for write-only descriptors
/// - `BufferLength` when `raw` is not exactly the descriptor span
/// - `MalformedString` when string bytes are not UTF-8
pub fn decode(desc: &RegisterDescriptor, raw: &[u8]) -> Result<RegisterValue, RegisterError> {
    if !desc.mode.can_read() {
        return Err(RegisterError::ReadNotPermitted {
            register: desc.name.clone(),
        });
    }
    check_len(desc, raw)?;

    let value = match desc.base {
        BaseType::UIntBE => {
            let word = word_from(raw);
            let field = extract_field(desc, word);
            match desc.enum_table.as_ref().and_then(|t| t.label(field)) {
                Some(label) => RegisterValue::Enum(label.to_string()),
                None => RegisterValue::UInt(field as u64),
            }
        }
        BaseType::FloatBE => RegisterValue::Float(f32::from_be_bytes(word_from(raw))),
        BaseType::String => {
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            let text = core::str::from_utf8(&raw[..end]).map_err(|_| {
                RegisterError::MalformedString {
                    register: desc.name.clone(),
                }
            })?;
            RegisterValue::Text(text.to_string())
        }
    };

    trace!(register = %desc.name, raw = ?raw, value = %value, "decoded");
    Ok(value)
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mismatch(desc: &RegisterDescriptor, value: &RegisterValue) -> RegisterError {
    RegisterError::ValueTypeMismatch {
        register: desc.name.clone(),
        expected: desc.base,
        found: value.kind(),
    }
}

fn check_len(desc: &RegisterDescriptor, raw: &[u8]) -> Result<(), RegisterError> {
    let expected = desc.span_bytes();
    if raw.len() != expected {
        return Err(RegisterError::BufferLength {
            register: desc.name.clone(),
            expected,
            actual: raw.len(),
        });
    }
    Ok(())
}

/// Copy a length-checked word span into an array.
fn word_from(raw: &[u8]) -> [u8; WORD_BYTES] {
    let mut word = [0u8; WORD_BYTES];
    word.copy_from_slice(&raw[..WORD_BYTES]);
    word
}

/// Mask of `bits` low bits.
#[inline]
fn low_mask(bits: u32) -> u32 {
    if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 }
}

/// Resolve an integer or enum label into the raw field value.
fn uint_value(desc: &RegisterDescriptor, value: &RegisterValue) -> Result<u32, RegisterError> {
    let raw = match value {
        RegisterValue::UInt(v) => *v,
        RegisterValue::Enum(label) => desc
            .enum_table
            .as_ref()
            .and_then(|t| t.value_of(label))
            .ok_or_else(|| RegisterError::UnknownEnumLabel {
                register: desc.name.clone(),
                label: label.clone(),
            })? as u64,
        other => return Err(mismatch(desc, other)),
    };
    if raw > desc.max_raw() {
        return Err(RegisterError::ValueOutOfRange {
            register: desc.name.clone(),
            value: raw,
            bit_size: desc.bit_size,
        });
    }
    Ok(raw as u32)
}

/// Word the field is merged into: zeros for whole-word fields, the
/// caller's current contents otherwise.
fn base_word(
    desc: &RegisterDescriptor,
    current: Option<&[u8]>,
) -> Result<[u8; WORD_BYTES], RegisterError> {
    if desc.covers_span() {
        return Ok([0u8; WORD_BYTES]);
    }
    let current = current.ok_or_else(|| RegisterError::CurrentWordRequired {
        register: desc.name.clone(),
    })?;
    check_len(desc, current)?;
    Ok(word_from(current))
}

/// Pull the field out of a word and read its bytes big-endian.
fn extract_field(desc: &RegisterDescriptor, word: [u8; WORD_BYTES]) -> u32 {
    let bits = (u32::from_le_bytes(word) >> desc.bit_offset) & low_mask(desc.bit_size);
    bits.to_le_bytes()[..desc.field_bytes()]
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | *b as u32)
}

/// Inverse of [`extract_field`]: lay `value` out big-endian and splice its
/// bits into `word`, preserving everything outside the field.
fn insert_field(desc: &RegisterDescriptor, word: [u8; WORD_BYTES], value: u32) -> [u8; WORD_BYTES] {
    let n = desc.field_bytes();
    let mut le = [0u8; WORD_BYTES];
    le[..n].copy_from_slice(&value.to_be_bytes()[WORD_BYTES - n..]);
    let bits = u32::from_le_bytes(le);

    let mask = low_mask(desc.bit_size) << desc.bit_offset;
    let merged = (u32::from_le_bytes(word) & !mask) | (bits << desc.bit_offset);
    merged.to_le_bytes()
}

fn encode_string(desc: &RegisterDescriptor, s: &str) -> Result<Vec<u8>, RegisterError> {
    let max = desc.span_bytes();
    if s.len() > max {
        return Err(RegisterError::StringTooLong {
            register: desc.name.clone(),
            len: s.len(),
            max,
        });
    }
    if s.as_bytes().contains(&0) {
        return Err(RegisterError::InvalidValue {
            register: desc.name.clone(),
            reason: "string contains a NUL byte".to_string(),
        });
    }
    let mut out = vec![0u8; max];
    out[..s.len()].copy_from_slice(s.as_bytes());
    Ok(out)
}
