//! Glyph group and cell identifiers
//!
//! A glyph group covers 256 consecutive codepoints of the basic plane and is
//! stored as one square atlas subdivided into a 16x16 grid of cells. Both
//! identifiers are rendered as two uppercase hex digits on disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cells per atlas row and per atlas column
pub const GRID_SIZE: u32 = 16;

/// Prefix shared by atlas files, cell directories and archive entries
pub const GLYPH_PREFIX: &str = "glyph_";

/// Extension of every image the pipeline reads or writes
pub const PNG_EXTENSION: &str = "png";

/// Parse one or two hex digits, rejecting signs and other characters
/// that `u8::from_str_radix` would otherwise tolerate.
fn parse_hex_byte(text: &str, max_digits: usize) -> Option<u8> {
    if text.is_empty() || text.len() > max_digits {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(text, 16).ok()
}

/// Strip a case-insensitive ASCII prefix
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Strip a case-insensitive `.png` suffix
fn strip_png_suffix(text: &str) -> Option<&str> {
    let split = text.len().checked_sub(PNG_EXTENSION.len() + 1)?;
    let (stem, ext) = (text.get(..split)?, text.get(split..)?);
    (ext.starts_with('.') && ext[1..].eq_ignore_ascii_case(PNG_EXTENSION)).then_some(stem)
}

/// Identifier of one glyph group (`00`..`FF`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u8);

impl GroupId {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Parse a `glyph_XX.png` atlas file name (exactly two hex digits)
    pub fn from_atlas_file_name(name: &str) -> Option<Self> {
        let rest = strip_prefix_ignore_case(name, GLYPH_PREFIX)?;
        let hex = strip_png_suffix(rest)?;
        (hex.len() == 2).then_some(())?;
        parse_hex_byte(hex, 2).map(Self)
    }

    /// Parse a `glyph_XX` cell directory name (exactly two hex digits)
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let hex = strip_prefix_ignore_case(name, GLYPH_PREFIX)?;
        (hex.len() == 2).then_some(())?;
        parse_hex_byte(hex, 2).map(Self)
    }

    /// `glyph_XX.png`
    pub fn atlas_file_name(self) -> String {
        format!("{GLYPH_PREFIX}{self}.{PNG_EXTENSION}")
    }

    /// `glyph_XX`
    pub fn dir_name(self) -> String {
        format!("{GLYPH_PREFIX}{self}")
    }

    /// `font/glyph_XX.png`
    pub fn archive_entry(self) -> String {
        format!("font/{}", self.atlas_file_name())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.len() {
            2 => parse_hex_byte(s, 2)
                .map(Self)
                .ok_or_else(|| format!("invalid glyph group id: {s:?}")),
            _ => Err(format!("glyph group id must be two hex digits: {s:?}")),
        }
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Position of one cell inside a group's 16x16 grid
///
/// The high nibble is the row and the low nibble the column, so the
/// canonical two-digit form reads `<row><col>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u8);

impl CellId {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Build from grid coordinates; both must be below [`GRID_SIZE`]
    #[inline]
    pub const fn from_row_col(row: u8, col: u8) -> Self {
        debug_assert!(row < 16 && col < 16);
        Self((row << 4) | (col & 0x0F))
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn row(self) -> u32 {
        (self.0 >> 4) as u32
    }

    #[inline]
    pub const fn col(self) -> u32 {
        (self.0 & 0x0F) as u32
    }

    /// Parse a cell file name: one or two hex digits, any case, `.png`
    pub fn from_file_name(name: &str) -> Option<Self> {
        let hex = strip_png_suffix(name)?;
        parse_hex_byte(hex, 2).map(Self)
    }

    /// Canonical `YY.png`
    pub fn file_name(self) -> String {
        format!("{self}.{PNG_EXTENSION}")
    }

    /// Iterate all 256 cells in row-major order
    pub fn all() -> impl Iterator<Item = CellId> {
        (0..=u8::MAX).map(Self)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}
