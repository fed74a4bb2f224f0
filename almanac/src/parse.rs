//! Sexagesimal catalog-string parsing.
//!
//! Bright Star Catalog records carry right ascension as `HH:MM:SS.S` and
//! declination as `+DD:MM:SS`. Bad fields are reported as errors rather than
//! coerced to zero; the catalog loader decides whether to skip or abort.

use thiserror::Error;

/// Failure to parse a sexagesimal catalog string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string did not split into exactly three fields.
    #[error("expected three `{separator}`-separated fields in {input:?}")]
    FieldCount { input: String, separator: char },

    /// One of the fields was not a number.
    #[error("non-numeric field {field:?} in {input:?}")]
    InvalidNumber { input: String, field: String },
}

fn parse_fields(input: &str, separator: char) -> Result<[f64; 3], ParseError> {
    let mut fields = [0.0; 3];
    let mut count = 0;
    for part in input.trim().split(separator) {
        if count == 3 {
            count += 1;
            break;
        }
        fields[count] = part.parse().map_err(|_| ParseError::InvalidNumber {
            input: input.to_string(),
            field: part.to_string(),
        })?;
        count += 1;
    }
    if count != 3 {
        return Err(ParseError::FieldCount {
            input: input.to_string(),
            separator,
        });
    }
    Ok(fields)
}

/// Parse a right ascension string of the form `HH:MM:SS.S` into radians.
pub fn parse_right_ascension(hms: &str, separator: char) -> Result<f64, ParseError> {
    let [h, m, s] = parse_fields(hms, separator)?;
    let hours = h + m / 60.0 + s / 3600.0;
    Ok(hours * std::f64::consts::PI / 12.0)
}

/// Parse a declination string of the form `±DD:MM:SS.SS` into radians.
///
/// A leading `-` negates the minutes and seconds fields along with the
/// degrees, so `-00:30:00` parses to a negative half degree.
pub fn parse_declination(dms: &str, separator: char) -> Result<f64, ParseError> {
    let [d, mut m, mut s] = parse_fields(dms, separator)?;
    if dms.trim_start().starts_with('-') {
        m = -m;
        s = -s;
    }
    let degrees = d + m / 60.0 + s / 3600.0;
    Ok(degrees.to_radians())
}
