//! Register map: the per-device descriptor namespace.
//!
//! Populated once during device-model construction, then sealed. All
//! queries are O(1) HashMap lookups over an insertion-ordered table.
//!
//! ## Sealing
//!
//! The first `lookup`, `encode`, `decode`, `enumerate` or explicit `seal`
//! flips a one-way atomic flag. Registration afterwards fails with
//! [`RegisterError::Sealed`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use static_assertions::assert_impl_all;
use tracing::debug;

use crate::codec;
use crate::descriptor::RegisterDescriptor;
use crate::error::RegisterError;
use crate::value::RegisterValue;

/// Descriptor table for one device.
#[derive(Debug, Default)]
pub struct RegisterMap {
    name: String,
    description: String,
    base_address: u64,
    descriptors: Vec<RegisterDescriptor>,
    index: HashMap<String, usize>,
    sealed: AtomicBool,
}

assert_impl_all!(RegisterMap: Send, Sync);

impl RegisterMap {
    /// Create an empty, unsealed map for a device.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the device description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the device base address added by [`address_of`](Self::address_of).
    pub fn with_base_address(mut self, base_address: u64) -> Self {
        self.base_address = base_address;
        self
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable device description, may be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Device base address in the transport's address space.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Add a descriptor to the namespace.
    ///
    /// The table is unchanged when any check fails.
    ///
    /// # Errors
    ///
    /// - `Sealed` after the first query
    /// - `DuplicateName` if the name is taken
    /// - `InvalidFieldLayout`, `InvalidEnumRange`, `DuplicateEnumLabel`
    ///   from [`RegisterDescriptor::validate`]
    /// - `OverlappingField` if the bits intersect another field and neither
    ///   descriptor allows overlap
    pub fn register(&mut self, descriptor: RegisterDescriptor) -> Result<(), RegisterError> {
        if *self.sealed.get_mut() {
            return Err(RegisterError::Sealed {
                name: descriptor.name,
            });
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(RegisterError::DuplicateName {
                name: descriptor.name,
            });
        }
        descriptor.validate()?;
        self.check_overlap(&descriptor)?;

        debug!(
            device = %self.name,
            register = %descriptor.name,
            offset = format_args!("{:#06x}", descriptor.byte_offset),
            bit_size = descriptor.bit_size,
            bit_offset = descriptor.bit_offset,
            mode = %descriptor.mode,
            "registered"
        );
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    fn check_overlap(&self, descriptor: &RegisterDescriptor) -> Result<(), RegisterError> {
        if descriptor.overlap {
            return Ok(());
        }
        let range = descriptor.bit_range();
        let clash = self.descriptors.iter().find(|other| {
            let other_range = other.bit_range();
            !other.overlap && range.start < other_range.end && other_range.start < range.end
        });
        match clash {
            Some(other) => Err(RegisterError::OverlappingField {
                register: descriptor.name.clone(),
                other: other.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Freeze the table. Idempotent.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            debug!(
                device = %self.name,
                registers = self.descriptors.len(),
                "register map sealed"
            );
        }
    }

    /// Whether registration is closed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Retrieve a descriptor by name.
    pub fn lookup(&self, name: &str) -> Result<&RegisterDescriptor, RegisterError> {
        self.seal();
        self.index
            .get(name)
            .map(|&idx| &self.descriptors[idx])
            .ok_or_else(|| RegisterError::UnknownRegister {
                name: name.to_string(),
            })
    }

    /// Descriptors in registration order. Restartable; every call yields
    /// the same sequence.
    pub fn enumerate(&self) -> impl ExactSizeIterator<Item = &RegisterDescriptor> {
        self.seal();
        self.descriptors.iter()
    }

    /// Whether a descriptor with this name exists. Does not seal.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no descriptor is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Absolute transport address of a register's span.
    ///
    /// Fails with `AddressOverflow` when `base_address + byte_offset` does
    /// not fit in a `u64`.
    pub fn address_of(&self, name: &str) -> Result<u64, RegisterError> {
        let desc = self.lookup(name)?;
        self.base_address
            .checked_add(desc.byte_offset)
            .ok_or_else(|| RegisterError::AddressOverflow {
                register: desc.name.clone(),
                base_address: self.base_address,
                offset: desc.byte_offset,
            })
    }

    /// Encode `value` for the named register. See [`codec::encode`].
    pub fn encode(
        &self,
        name: &str,
        value: &RegisterValue,
        current: Option<&[u8]>,
    ) -> Result<Vec<u8>, RegisterError> {
        codec::encode(self.lookup(name)?, value, current)
    }

    /// Decode a raw span of the named register. See [`codec::decode`].
    pub fn decode(&self, name: &str, raw: &[u8]) -> Result<RegisterValue, RegisterError> {
        codec::decode(self.lookup(name)?, raw)
    }
}

impl<'a> IntoIterator for &'a RegisterMap {
    type Item = &'a RegisterDescriptor;
    type IntoIter = std::slice::Iter<'a, RegisterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.seal();
        self.descriptors.iter()
    }
}
