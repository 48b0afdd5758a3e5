//! Register device facade.
//!
//! Pairs a sealed [`RegisterMap`] with a [`RegisterBus`] so callers can get
//! and set registers by name. Partial-word writes read the current word
//! first (read-modify-write). Nothing is cached: every `get` is a fresh
//! bus read.

use thiserror::Error;
use tracing::debug;

use crate::bus::{BusError, RegisterBus};
use crate::codec;
use crate::error::RegisterError;
use crate::map::RegisterMap;
use crate::value::RegisterValue;

/// Error types for device register access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// Codec or lookup failure.
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Transport failure.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// A device model bound to a transport.
#[derive(Debug)]
pub struct RegisterDevice<B: RegisterBus> {
    map: RegisterMap,
    bus: B,
}

impl<B: RegisterBus> RegisterDevice<B> {
    /// Bind `map` to `bus`. The map is sealed.
    pub fn new(map: RegisterMap, bus: B) -> Self {
        map.seal();
        Self { map, bus }
    }

    /// The sealed register map.
    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Shared access to the transport.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Exclusive access to the transport.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the transport.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Read and decode the named register.
    ///
    /// Write-only registers fail before any bus traffic.
    pub fn get(&mut self, name: &str) -> Result<RegisterValue, DeviceError> {
        let desc = self.map.lookup(name)?;
        if !desc.mode.can_read() {
            return Err(RegisterError::ReadNotPermitted {
                register: desc.name.clone(),
            }
            .into());
        }
        let address = self.map.address_of(name)?;
        let mut raw = vec![0u8; desc.span_bytes()];
        self.bus.read(address, &mut raw)?;
        Ok(codec::decode(desc, &raw)?)
    }

    /// Encode and write the named register.
    ///
    /// Read-only registers and invalid values fail before any bus traffic
    /// other than the read of a shared word.
    pub fn set(&mut self, name: &str, value: &RegisterValue) -> Result<(), DeviceError> {
        let desc = self.map.lookup(name)?;
        if !desc.mode.can_write() {
            return Err(RegisterError::WriteNotPermitted {
                register: desc.name.clone(),
            }
            .into());
        }
        let address = self.map.address_of(name)?;

        let current = if desc.covers_span() {
            None
        } else {
            let mut word = vec![0u8; desc.span_bytes()];
            self.bus.read(address, &mut word)?;
            Some(word)
        };
        let raw = codec::encode(desc, value, current.as_deref())?;
        self.bus.write(address, &raw)?;

        debug!(
            device = %self.map.name(),
            register = %desc.name,
            value = %value,
            rmw = current.is_some(),
            "register set"
        );
        Ok(())
    }
}
