//! Raster cell file names.
//!
//! Every produced image carries its grid position and footprint centre in
//! its name:
//!
//! `{col}_{row}_{lat}_{lon}_{zoom}.jpg`
//!
//! Examples:
//! - `0000_0000_35.1594512_-89.8991377_18.jpg`
//! - `0012_0003_35.1523101_-89.8794420_18.jpg`
//!
//! Indices are written zero-padded to four digits so that lexicographic and
//! numeric order agree; the parser also accepts unpadded indices.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::coord::GeoPoint;

/// Extension of produced cell images.
pub const CELL_EXTENSION: &str = "jpg";

/// Parsed cell file name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellName {
    pub col: u32,
    pub row: u32,
    /// Latitude of the cell centre
    pub lat: f64,
    /// Longitude of the cell centre
    pub lon: f64,
    /// Zoom of the mission grid the cell belongs to
    pub zoom: u8,
}

/// Error parsing a cell file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellNameError {
    #[error("'{0}' does not match <col>_<row>_<lat>_<lon>_<zoom>.jpg")]
    InvalidPattern(String),

    #[error("Invalid {field} '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// Pattern for `<col>_<row>_<lat>_<lon>_<zoom>.jpg`.
///
/// Groups: 1 col, 2 row, 3 lat, 4 lon, 5 zoom.
fn cell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)_(\d+)_(-?\d+(?:\.\d+)?)_(-?\d+(?:\.\d+)?)_(\d{1,2})\.jpg$").unwrap()
    })
}

impl CellName {
    pub fn new(col: u32, row: u32, center: GeoPoint, zoom: u8) -> Self {
        Self {
            col,
            row,
            lat: center.lat,
            lon: center.lon,
            zoom,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Walk order key; the largest key is the most recently completed cell.
    pub fn order_key(&self) -> (u32, u32) {
        (self.row, self.col)
    }

    /// Parses a bare file name (no directory part).
    ///
    /// # Examples
    ///
    /// ```
    /// use terrainav::mission::CellName;
    ///
    /// let name = CellName::parse("0003_0001_35.1500000_-89.8800000_17.jpg").unwrap();
    /// assert_eq!((name.col, name.row, name.zoom), (3, 1, 17));
    /// assert_eq!(name.lon, -89.88);
    /// ```
    pub fn parse(file_name: &str) -> Result<Self, CellNameError> {
        let captures = cell_pattern()
            .captures(file_name)
            .ok_or_else(|| CellNameError::InvalidPattern(file_name.to_string()))?;

        let field = |index: usize| captures.get(index).map_or("", |m| m.as_str());

        let col = parse_field(field(1), "column")?;
        let row = parse_field(field(2), "row")?;
        let lat: f64 = parse_field(field(3), "latitude")?;
        let lon: f64 = parse_field(field(4), "longitude")?;
        let zoom = parse_field(field(5), "zoom")?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(CellNameError::InvalidField {
                field: "latitude",
                value: field(3).to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CellNameError::InvalidField {
                field: "longitude",
                value: field(4).to_string(),
            });
        }

        Ok(Self {
            col,
            row,
            lat,
            lon,
            zoom,
        })
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, CellNameError> {
    value.parse().map_err(|_| CellNameError::InvalidField {
        field,
        value: value.to_string(),
    })
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}_{:04}_{:.7}_{:.7}_{}.{}",
            self.col, self.row, self.lat, self.lon, self.zoom, CELL_EXTENSION
        )
    }
}
