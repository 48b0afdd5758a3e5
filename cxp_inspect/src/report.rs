//! Device and descriptor reports for `info`, `list` and `show`.
//!
//! Rows serialize to JSON with `serde_json` or render as plain text.

use cxp_regmap::descriptor::{AccessMode, BaseType, RegisterDescriptor};
use cxp_regmap::map::RegisterMap;
use serde::Serialize;
use std::fmt::Write;

/// Device-level summary of a register map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub base_address: String,
    pub registers: usize,
}

impl<'a> DeviceSummary<'a> {
    /// Summarise `map`. The map is not sealed.
    pub fn new(map: &'a RegisterMap) -> Self {
        Self {
            name: map.name(),
            description: Some(map.description()).filter(|d| !d.is_empty()),
            base_address: format!("{:#010x}", map.base_address()),
            registers: map.len(),
        }
    }

    /// Multi-line plain-text view.
    pub fn render(&self) -> String {
        let mut out = self.name.to_string();
        if let Some(description) = self.description {
            let _ = write!(out, "\n  description:  {description}");
        }
        let _ = write!(
            out,
            "\n  base address: {}\n  registers:    {}",
            self.base_address, self.registers
        );
        out
    }
}

/// One enum table entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumEntry<'a> {
    pub label: &'a str,
    pub value: u32,
}

/// Report view of a descriptor with its absolute address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRow<'a> {
    pub name: &'a str,
    pub address: String,
    pub base: BaseType,
    pub bit_size: u32,
    pub bit_offset: u32,
    pub mode: AccessMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_entries: Vec<EnumEntry<'a>>,
}

impl<'a> RegisterRow<'a> {
    /// Build a row for `desc` at absolute `address`. Enum entries and the
    /// description are only carried for detailed views.
    pub fn new(address: u64, desc: &'a RegisterDescriptor, detailed: bool) -> Self {
        let enum_entries = match (&desc.enum_table, detailed) {
            (Some(table), true) => table
                .iter()
                .map(|(value, label)| EnumEntry { label, value })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            name: &desc.name,
            address: format!("{address:#010x}"),
            base: desc.base,
            bit_size: desc.bit_size,
            bit_offset: desc.bit_offset,
            mode: desc.mode,
            units: desc.units.as_deref(),
            description: Some(desc.description.as_str()).filter(|d| detailed && !d.is_empty()),
            enum_entries,
        }
    }
}

/// Fixed-width table, one row per register.
pub fn render_table(rows: &[RegisterRow<'_>]) -> String {
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let mut out = format!(
        "{:<width$}  {:<10}  {:<8}  {:>6}  {:<4}  UNITS",
        "NAME", "ADDRESS", "BASE", "BITS", "MODE"
    );
    for row in rows {
        let bits = format!("{}@{}", row.bit_size, row.bit_offset);
        let _ = write!(
            out,
            "\n{:<width$}  {:<10}  {:<8}  {:>6}  {:<4}  {}",
            row.name,
            row.address,
            row.base.to_string(),
            bits,
            row.mode.to_string(),
            row.units.unwrap_or("-")
        );
    }
    out
}

/// Multi-line view of a single register.
pub fn render_detail(row: &RegisterRow<'_>) -> String {
    let mut out = format!(
        "{}\n  address:     {}\n  base:        {}\n  bits:        {} at offset {}\n  mode:        {}",
        row.name, row.address, row.base, row.bit_size, row.bit_offset, row.mode
    );
    if let Some(units) = row.units {
        let _ = write!(out, "\n  units:       {units}");
    }
    if let Some(description) = row.description {
        let _ = write!(out, "\n  description: {description}");
    }
    if !row.enum_entries.is_empty() {
        out.push_str("\n  enum:");
        for entry in &row.enum_entries {
            let _ = write!(out, "\n    {:#010x}  {}", entry.value, entry.label);
        }
    }
    out
}
