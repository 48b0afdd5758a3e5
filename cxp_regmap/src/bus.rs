//! Transport seam and in-memory bus.
//!
//! The register map never performs I/O itself. A [`RegisterBus`] moves raw
//! spans between the device and the codec; real links (frame grabbers,
//! CoaXPress control channels) implement it outside this crate.
//! [`MemoryBus`] is a flat byte window used for simulation and tests.

use core::ops::Range;
use thiserror::Error;
use tracing::trace;

/// Error types for bus transfers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// Access falls outside the bus address window.
    #[error("access of {len} bytes at {address:#x} is outside the bus window")]
    OutOfRange { address: u64, len: usize },

    /// Link-level failure reported by the transport.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Raw byte transport for register spans.
///
/// Buffers are exactly the span requested, in device byte order.
/// Retries and timeouts are the implementor's concern.
pub trait RegisterBus: Send {
    /// Fill `buf` with the bytes at `address`.
    fn read(&mut self, address: u64, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` at `address`.
    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), BusError>;
}

/// Zero-initialised memory window standing in for device registers.
#[derive(Debug, Clone)]
pub struct MemoryBus {
    base: u64,
    mem: Vec<u8>,
    reads: u64,
    writes: u64,
}

impl MemoryBus {
    /// Window of `size` bytes starting at `base`.
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            mem: vec![0; size],
            reads: 0,
            writes: 0,
        }
    }

    fn window(&self, address: u64, len: usize) -> Result<Range<usize>, BusError> {
        let out_of_range = BusError::OutOfRange { address, len };
        let start = address
            .checked_sub(self.base)
            .and_then(|s| usize::try_from(s).ok())
            .ok_or(out_of_range.clone())?;
        let end = start.checked_add(len).ok_or(out_of_range.clone())?;
        if end > self.mem.len() {
            return Err(out_of_range);
        }
        Ok(start..end)
    }

    /// Device-side view of a span, bypassing transfer counters.
    pub fn peek(&self, address: u64, len: usize) -> Result<&[u8], BusError> {
        let range = self.window(address, len)?;
        Ok(&self.mem[range])
    }

    /// Device-side update of a span (e.g. a sensor refreshing a status
    /// word), bypassing transfer counters.
    pub fn poke(&mut self, address: u64, data: &[u8]) -> Result<(), BusError> {
        let range = self.window(address, data.len())?;
        self.mem[range].copy_from_slice(data);
        Ok(())
    }

    /// Number of bus reads served.
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    /// Number of bus writes served.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl RegisterBus for MemoryBus {
    fn read(&mut self, address: u64, buf: &mut [u8]) -> Result<(), BusError> {
        let range = self.window(address, buf.len())?;
        buf.copy_from_slice(&self.mem[range]);
        self.reads += 1;
        trace!(address = format_args!("{address:#x}"), len = buf.len(), "bus read");
        Ok(())
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), BusError> {
        let range = self.window(address, data.len())?;
        self.mem[range].copy_from_slice(data);
        self.writes += 1;
        trace!(address = format_args!("{address:#x}"), len = data.len(), "bus write");
        Ok(())
    }
}
