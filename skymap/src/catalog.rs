//! Bright Star Catalog loading.
//!
//! The catalog ships as a JSON array of records with sexagesimal coordinate
//! strings and string-typed magnitudes. Unparseable records surface as
//! errors; the caller decides whether to skip or abort.

use crate::Star;
use serde::Deserialize;
use thiserror::Error;

/// A raw Bright Star Catalog record, as found in the JSON source.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Harvard Revised reference number.
    #[serde(rename = "harvard_ref_#")]
    pub harvard_ref: u32,
    /// Right ascension, `HH:MM:SS.S`.
    #[serde(rename = "RA")]
    pub ra: String,
    /// Declination, `±DD:MM:SS`.
    #[serde(rename = "DEC")]
    pub dec: String,
    /// Visual magnitude; the source stores it as a string.
    #[serde(rename = "MAG")]
    pub mag: String,
}

/// Failure to load or convert catalog records.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad coordinate string: {0}")]
    Coordinate(#[from] almanac::ParseError),

    #[error("star {hr}: magnitude {value:?} is not a number")]
    BadMagnitude { hr: u32, value: String },
}

/// Load a JSON catalog into stars, preserving catalog order.
pub fn load_catalog(reader: impl std::io::Read) -> Result<Vec<Star>, CatalogError> {
    let entries: Vec<CatalogEntry> = serde_json::from_reader(reader)?;
    log::debug!("parsed {} catalog entries", entries.len());
    entries.iter().map(Star::from_entry).collect()
}
