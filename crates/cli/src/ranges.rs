//! Range-override options (`--page`, `--segment`, `--extr`, `--dpp`).
//!
//! Numbers accept a `0x` prefix for hex and are decimal otherwise. Page and DPP values are
//! 10-bit page numbers and segments are 8-bit; larger values are rejected rather than
//! truncated. Each option applies one override to every 2-byte slot of its range before
//! decoding starts.

use c166_core::ExtensionStore;
use c166_core::common::constants::{PAGE10_MASK, SEGMENT8_MASK};

/// Largest page number.
const MAX_PAGE: u32 = PAGE10_MASK;

/// Largest segment number.
const MAX_SEGMENT: u32 = SEGMENT8_MASK;

/// `START:LEN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// First address.
    pub start: u64,
    /// Length in bytes.
    pub length: u64,
}

/// `START:LEN:VALUE` (page or segment number).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueRange {
    /// Covered addresses.
    pub span: Span,
    /// Page (10-bit) or segment (8-bit) number.
    pub value: u32,
}

/// `START:LEN:D0,D1,D2,D3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DppRange {
    /// Covered addresses.
    pub span: Span,
    /// DPP0..DPP3 page numbers.
    pub dpp: [u32; 4],
}

/// Every range override given on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--page` ranges.
    pub pages: Vec<ValueRange>,
    /// `--segment` ranges.
    pub segments: Vec<ValueRange>,
    /// `--extr` ranges.
    pub register_banks: Vec<Span>,
    /// `--dpp` ranges.
    pub dpp: Vec<DppRange>,
}

impl Overrides {
    /// Writes every override into `store`.
    pub fn apply(&self, store: &ExtensionStore) {
        for r in &self.pages {
            store.apply_page_range(r.span.start, r.span.length, r.value);
        }
        for r in &self.segments {
            store.apply_segment_range(r.span.start, r.span.length, r.value);
        }
        for s in &self.register_banks {
            store.apply_register_bank_range(s.start, s.length);
        }
        for r in &self.dpp {
            store.apply_custom_dpp_range(r.span.start, r.span.length, r.dpp);
        }
    }
}

/// Parses `0x`-prefixed hex or decimal.
pub fn parse_int(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number `{s}`: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_int(s)?;
    u32::try_from(value).map_err(|_| format!("`{s}` does not fit in 32 bits"))
}

/// Parses `START:LEN`.
pub fn parse_span(s: &str) -> Result<Span, String> {
    let (start, length) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:LEN, got `{s}`"))?;
    Ok(Span {
        start: parse_int(start)?,
        length: parse_int(length)?,
    })
}

/// Splits `START:LEN:REST`.
fn split_range(s: &str, shape: &str) -> Result<(Span, String), String> {
    let mut parts = s.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(length), Some(rest)) => Ok((
            Span {
                start: parse_int(start)?,
                length: parse_int(length)?,
            },
            rest.to_owned(),
        )),
        _ => Err(format!("expected {shape}, got `{s}`")),
    }
}

/// Parses a number no larger than `max`.
fn parse_bounded(s: &str, what: &str, max: u32) -> Result<u32, String> {
    let value = parse_u32(s)?;
    if value > max {
        return Err(format!("{what} `{s}` is out of range (max {max:#x})"));
    }
    Ok(value)
}

/// Parses `START:LEN:VALUE` with `VALUE <= max`.
fn parse_value_range(s: &str, what: &str, max: u32) -> Result<ValueRange, String> {
    let (span, value) = split_range(s, "START:LEN:VALUE")?;
    Ok(ValueRange {
        span,
        value: parse_bounded(&value, what, max)?,
    })
}

/// Parses `START:LEN:PAGE`.
pub fn parse_page_range(s: &str) -> Result<ValueRange, String> {
    parse_value_range(s, "page", MAX_PAGE)
}

/// Parses `START:LEN:SEG`.
pub fn parse_segment_range(s: &str) -> Result<ValueRange, String> {
    parse_value_range(s, "segment", MAX_SEGMENT)
}

/// Parses `START:LEN:D0,D1,D2,D3`.
pub fn parse_dpp_range(s: &str) -> Result<DppRange, String> {
    let (span, list) = split_range(s, "START:LEN:D0,D1,D2,D3")?;
    let values = list
        .split(',')
        .map(|v| parse_bounded(v, "DPP page", MAX_PAGE))
        .collect::<Result<Vec<_>, _>>()?;
    let dpp: [u32; 4] = values
        .try_into()
        .map_err(|v: Vec<u32>| format!("expected 4 DPP values, got {}", v.len()))?;
    Ok(DppRange { span, dpp })
}
