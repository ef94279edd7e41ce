//! Decoder for encoded polyline geometries.
//!
//! The directions provider returns route geometry in the standard encoded
//! polyline format (5 decimal digits of precision). Referral responses decode
//! it into coordinates for map rendering.

use triage_types::{Coordinate, CoordinateError};

/// Errors that can occur while decoding an encoded polyline.
#[derive(Debug, thiserror::Error)]
pub enum PolylineError {
    /// The string ended in the middle of a value
    #[error("encoded polyline is truncated")]
    UnexpectedEnd,
    /// A byte outside the valid encoding alphabet
    #[error("invalid character {0:?} in encoded polyline")]
    InvalidCharacter(char),
    /// A decoded position fell outside the WGS84 range
    #[error("decoded position is not a valid coordinate: {0}")]
    OutOfRange(#[from] CoordinateError),
}

const PRECISION: f64 = 1e5;

/// Decodes an encoded polyline into an ordered list of coordinates.
///
/// An empty input decodes to an empty path.
///
/// # Errors
///
/// Returns a `PolylineError` if the input is truncated, contains bytes
/// outside the encoding alphabet, or decodes to an out-of-range position.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut path = Vec::new();
    let mut index = 0usize;
    let mut latitude = 0i64;
    let mut longitude = 0i64;

    while index < bytes.len() {
        let (delta_lat, next) = decode_value(bytes, index)?;
        let (delta_lon, next) = decode_value(bytes, next)?;
        index = next;

        latitude += delta_lat;
        longitude += delta_lon;

        path.push(Coordinate::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        )?);
    }

    Ok(path)
}

fn decode_value(bytes: &[u8], mut index: usize) -> Result<(i64, usize), PolylineError> {
    let mut accumulator = 0i64;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(index).ok_or(PolylineError::UnexpectedEnd)?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter(byte as char));
        }

        let chunk = i64::from(byte - 63);
        accumulator |= (chunk & 0x1f) << shift;
        index += 1;

        if chunk & 0x20 == 0 {
            break;
        }

        shift += 5;
        // A well-formed value never needs more than 7 chunks; anything longer
        // would overflow the accumulator.
        if shift > 35 {
            return Err(PolylineError::InvalidCharacter(byte as char));
        }
    }

    let value = if accumulator & 1 == 1 {
        !(accumulator >> 1)
    } else {
        accumulator >> 1
    };

    Ok((value, index))
}
