//! # Addressing Scheme
//!
//! Every member in the grid is named by where it sits:
//!
//! - panels and columns by a [`PositionKey`] such as `"2C"` (1-based row
//!   number followed by a column letter, `A` = column index 0)
//! - beams by a [`BeamKey`]: `"beam{row}A"` for the single beam standing in
//!   for a whole row line, `"beamA{letter}"` for the one standing in for a
//!   whole column line
//!
//! Keys are small `Copy` values with a canonical string encoding. They
//! serialize as that string, so a snapshot's maps come out as plain JSON
//! objects keyed by `"2C"` / `"beam1A"`.
//!
//! ## Example
//!
//! ```rust
//! use grid_core::addressing::{parse_position, position_key, row_beam_key, col_beam_key};
//!
//! let key = position_key(2, 2);
//! assert_eq!(key.to_string(), "2C");
//! assert_eq!(parse_position("2C").unwrap(), (2, 2));
//!
//! assert_eq!(row_beam_key(1).to_string(), "beam1A");
//! assert_eq!(col_beam_key(1).to_string(), "beamAB");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{GridError, GridResult};

/// Highest column count the lettering can express (`A`..=`Z`)
pub const MAX_COLS: u32 = 26;

/// Millimeters of beam length per column-letter step in [`distance_to_column_key`]
pub const MM_PER_LETTER_STEP: f64 = 100.0;

const POSITION_FORMAT: &str = "{row}{LETTER}, e.g. 2C";
const BEAM_FORMAT: &str = "beam{row}A or beamA{LETTER}";

/// Letter for a zero-based column index (`0` -> `'A'`).
///
/// Indices past `Z` have no letter; callers keep `cols <= MAX_COLS`.
pub fn column_letter(col_index: u32) -> char {
    char::from_u32(65 + col_index).unwrap_or('?')
}

fn letter_index(letter: char) -> Option<u32> {
    if letter.is_ascii_uppercase() {
        Some(letter as u32 - 65)
    } else {
        None
    }
}

// ============================================================================
// Position keys
// ============================================================================

/// A grid intersection: 1-based row, 0-based column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionKey {
    pub row: u32,
    pub col: u32,
}

impl PositionKey {
    pub fn new(row: u32, col: u32) -> Self {
        PositionKey { row, col }
    }

    /// Column letter of this position
    pub fn letter(&self) -> char {
        column_letter(self.col)
    }

    /// True if the key addresses a point inside a `rows x cols` grid
    pub fn in_range(&self, rows: u32, cols: u32) -> bool {
        self.row >= 1 && self.row <= rows && self.col < cols
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.letter())
    }
}

impl FromStr for PositionKey {
    type Err = GridError;

    fn from_str(s: &str) -> GridResult<Self> {
        let (row, col) = parse_position(s)?;
        Ok(PositionKey { row, col })
    }
}

/// Canonical key for the intersection at `row` (1-based) and `col_index` (0-based).
pub fn position_key(row: u32, col_index: u32) -> PositionKey {
    PositionKey::new(row, col_index)
}

/// Decode a position key into `(row, col_index)`.
///
/// The key must be one or more ASCII digits followed by exactly one
/// uppercase letter.
pub fn parse_position(key: &str) -> GridResult<(u32, u32)> {
    let malformed = || GridError::malformed_key(key, POSITION_FORMAT);

    let mut chars = key.chars();
    let letter = chars.next_back().ok_or_else(malformed)?;
    let digits = chars.as_str();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let col = letter_index(letter).ok_or_else(malformed)?;
    let row = digits.parse::<u32>().map_err(|_| malformed())?;

    Ok((row, col))
}

/// Position addressed by a slab label.
///
/// Slabs may be labelled by their corner pair (`"1A-2B"`); only the
/// leading component names the panel. A plain position key is accepted
/// as-is.
pub fn parse_slab_label(label: &str) -> GridResult<PositionKey> {
    let leading = label.split('-').next().unwrap_or(label).trim();
    leading.parse()
}

// ============================================================================
// Beam keys
// ============================================================================

/// The single representative beam of a row line or a column line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BeamKey {
    /// Beam spanning row line `row` horizontally (`"beam{row}A"`)
    Row(u32),
    /// Beam spanning column line `col` vertically (`"beamA{letter}"`)
    Column(u32),
}

impl BeamKey {
    /// True if this beam line exists in a `rows x cols` grid.
    ///
    /// There is one fewer beam line than grid lines in each direction:
    /// row beams `1..=rows-1`, column beams `0..=cols-2`.
    pub fn in_range(&self, rows: u32, cols: u32) -> bool {
        match *self {
            BeamKey::Row(row) => row >= 1 && row < rows,
            BeamKey::Column(col) => col + 1 < cols,
        }
    }

    pub fn is_row_beam(&self) -> bool {
        matches!(self, BeamKey::Row(_))
    }

    /// Leading numeric row token of the beam id, if it has one
    pub fn row_token(&self) -> Option<u32> {
        match *self {
            BeamKey::Row(row) => Some(row),
            BeamKey::Column(_) => None,
        }
    }
}

impl fmt::Display for BeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BeamKey::Row(row) => write!(f, "beam{}A", row),
            BeamKey::Column(col) => write!(f, "beamA{}", column_letter(col)),
        }
    }
}

impl FromStr for BeamKey {
    type Err = GridError;

    fn from_str(s: &str) -> GridResult<Self> {
        parse_beam(s)
    }
}

/// Key of the beam standing in for row line `row`.
pub fn row_beam_key(row: u32) -> BeamKey {
    BeamKey::Row(row)
}

/// Key of the beam standing in for column line `col_index`.
pub fn col_beam_key(col_index: u32) -> BeamKey {
    BeamKey::Column(col_index)
}

/// Decode `"beam{row}A"` / `"beamA{letter}"`.
pub fn parse_beam(key: &str) -> GridResult<BeamKey> {
    let malformed = || GridError::malformed_key(key, BEAM_FORMAT);

    let rest = key.strip_prefix("beam").ok_or_else(malformed)?;

    if let Some(digits) = rest.strip_suffix('A') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let row = digits.parse::<u32>().map_err(|_| malformed())?;
            return Ok(BeamKey::Row(row));
        }
    }

    if let Some(letter) = rest.strip_prefix('A') {
        let mut chars = letter.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let col = letter_index(c).ok_or_else(malformed)?;
            return Ok(BeamKey::Column(col));
        }
    }

    Err(malformed())
}

/// Column position reached by walking `distance_mm` along a beam.
///
/// The row comes from the beam id's numeric token (row beams), defaulting
/// to row 1 for column beams. The column is one letter per 100 mm, wrapping
/// after `Z`. The actual span of the beam is not consulted: this is a
/// coarse lettering, not a metric placement.
///
/// ```rust
/// use grid_core::addressing::{distance_to_column_key, row_beam_key, col_beam_key};
///
/// assert_eq!(distance_to_column_key(&row_beam_key(2), 250.0).unwrap().to_string(), "2C");
/// assert_eq!(distance_to_column_key(&col_beam_key(3), 2700.0).unwrap().to_string(), "1B");
/// ```
pub fn distance_to_column_key(beam: &BeamKey, distance_mm: f64) -> GridResult<PositionKey> {
    if !distance_mm.is_finite() || distance_mm < 0.0 {
        return Err(GridError::InvalidDistance {
            value: distance_mm.to_string(),
        });
    }

    let row = beam.row_token().unwrap_or(1);
    let col = ((distance_mm / MM_PER_LETTER_STEP) % f64::from(MAX_COLS)).floor() as u32;

    Ok(position_key(row, col))
}

// ============================================================================
// Serde: keys travel as their canonical strings
// ============================================================================

impl Serialize for PositionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PositionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for BeamKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BeamKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_roundtrip() {
        for row in 0..40 {
            for col in 0..MAX_COLS {
                let key = position_key(row, col).to_string();
                assert_eq!(parse_position(&key).unwrap(), (row, col), "key {}", key);
            }
        }
    }

    #[test]
    fn test_position_encoding() {
        assert_eq!(position_key(1, 0).to_string(), "1A");
        assert_eq!(position_key(12, 25).to_string(), "12Z");
    }

    #[test]
    fn test_malformed_positions() {
        for bad in ["", "A", "2", "B2", "2c", "2AB", "-1A", " 2A", "2 A"] {
            let err = parse_position(bad).unwrap_err();
            assert!(matches!(err, GridError::MalformedKey { .. }), "{:?} parsed", bad);
        }
    }

    #[test]
    fn test_position_in_range() {
        assert!(position_key(3, 2).in_range(3, 3));
        assert!(!position_key(4, 0).in_range(3, 3));
        assert!(!position_key(1, 3).in_range(3, 3));
        assert!(!position_key(0, 0).in_range(3, 3));
    }

    #[test]
    fn test_beam_roundtrip() {
        for key in [row_beam_key(1), row_beam_key(17), col_beam_key(0), col_beam_key(7)] {
            assert_eq!(parse_beam(&key.to_string()).unwrap(), key);
        }
        assert_eq!(parse_beam("beamAA").unwrap(), BeamKey::Column(0));
        assert_eq!(parse_beam("beam2A").unwrap(), BeamKey::Row(2));
    }

    #[test]
    fn test_malformed_beams() {
        for bad in ["beam", "beamA", "beam2B", "beamAb", "beamABC", "2A", "beamX2", "Beam1A"] {
            assert!(parse_beam(bad).is_err(), "{:?} parsed", bad);
        }
    }

    #[test]
    fn test_beam_range_rule() {
        // 3x3 grid: row beams 1..=2, column beams A..=B
        assert!(row_beam_key(1).in_range(3, 3));
        assert!(row_beam_key(2).in_range(3, 3));
        assert!(!row_beam_key(3).in_range(3, 3));
        assert!(!row_beam_key(0).in_range(3, 3));
        assert!(col_beam_key(1).in_range(3, 3));
        assert!(!col_beam_key(2).in_range(3, 3));
        // A single grid line has no beam line
        assert!(!row_beam_key(1).in_range(1, 1));
        assert!(!col_beam_key(0).in_range(1, 1));
    }

    #[test]
    fn test_slab_label() {
        assert_eq!(parse_slab_label("1A-2B").unwrap(), position_key(1, 0));
        assert_eq!(parse_slab_label("3C").unwrap(), position_key(3, 2));
        assert!(parse_slab_label("-2B").is_err());
    }

    // The lettering ignores the beam span: 100 mm per letter, wrapping at 26.
    #[test]
    fn test_distance_to_column_key_is_coarse() {
        let beam = row_beam_key(2);
        assert_eq!(distance_to_column_key(&beam, 0.0).unwrap(), position_key(2, 0));
        assert_eq!(distance_to_column_key(&beam, 99.9).unwrap(), position_key(2, 0));
        assert_eq!(distance_to_column_key(&beam, 100.0).unwrap(), position_key(2, 1));
        assert_eq!(distance_to_column_key(&beam, 2599.0).unwrap(), position_key(2, 25));
        assert_eq!(distance_to_column_key(&beam, 2600.0).unwrap(), position_key(2, 0));
        assert_eq!(distance_to_column_key(&beam, 3650.0).unwrap(), position_key(2, 10));
    }

    #[test]
    fn test_distance_on_column_beam_defaults_to_row_one() {
        let key = distance_to_column_key(&col_beam_key(2), 450.0).unwrap();
        assert_eq!(key, position_key(1, 4));
    }

    #[test]
    fn test_invalid_distance() {
        let beam = row_beam_key(1);
        assert!(matches!(
            distance_to_column_key(&beam, -1.0),
            Err(GridError::InvalidDistance { .. })
        ));
        assert!(distance_to_column_key(&beam, f64::NAN).is_err());
        assert!(distance_to_column_key(&beam, f64::INFINITY).is_err());
    }

    #[test]
    fn test_keys_serialize_as_strings() {
        let json = serde_json::to_string(&(position_key(2, 1), row_beam_key(3))).unwrap();
        assert_eq!(json, "[\"2B\",\"beam3A\"]");

        let (pos, beam): (PositionKey, BeamKey) = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, position_key(2, 1));
        assert_eq!(beam, row_beam_key(3));

        assert!(serde_json::from_str::<PositionKey>("\"B2\"").is_err());
    }
}
