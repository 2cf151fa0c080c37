//! Text format for part connectivity.
//!
//! ```text
//! # 1x1 plate top
//! field connector 2 2 0 0.32 0 0
//! 1 1 Knob 15 0
//! ```
//!
//! A `field` header opens a field: kind, width and height in cells,
//! translation, and yaw about +Y in degrees. Each following line places one
//! connection: lattice coordinate, type name, quadrant mask and flag bits.
//! Bad connection lines are logged and skipped; a bad header is an error.

use std::str::FromStr;

use brick_spatial::GridCoord;
use nalgebra::{Isometry3, Vector3};
use tracing::error;

use crate::connection::{Connection, ConnectionFlags, Quadrants};
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::field::{ConnectionField, FieldKind};
use crate::types::ConnectionType;

/// Parses every field of a description.
///
/// # Errors
///
/// Returns [`ConnectivityError::MalformedField`] for a header that does not
/// parse, and [`ConnectivityError::InvalidGridSize`] for an oversized field.
///
/// # Example
///
/// ```
/// use brick_connectivity::{ConnectionType, FieldKind, parse_description};
///
/// let fields = parse_description("field receptor 2 2 0 0 0 90\n1 1 AntiKnob 15 0\n").unwrap();
/// assert_eq!(fields.len(), 1);
/// assert_eq!(fields[0].kind(), FieldKind::Receptor);
/// assert_eq!(fields[0].connections().next().unwrap().connection_type, ConnectionType::AntiKnob);
/// ```
pub fn parse_description(text: &str) -> ConnectivityResult<Vec<ConnectionField>> {
    let mut fields: Vec<ConnectionField> = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = content.split_whitespace().collect();

        if tokens[0] == "field" {
            fields.push(parse_header(line, &tokens)?);
            continue;
        }
        let Some(field) = fields.last_mut() else {
            error!(line, "connection before any field header, skipped");
            continue;
        };
        match parse_connection(&tokens) {
            Ok((coord, connection)) => {
                if let Err(err) = field.set_connection(coord, connection) {
                    error!(line, %err, "connection skipped");
                }
            }
            Err(reason) => error!(line, %reason, "malformed connection skipped"),
        }
    }
    Ok(fields)
}

fn parse_header(line: usize, tokens: &[&str]) -> ConnectivityResult<ConnectionField> {
    let malformed = |reason: String| ConnectivityError::MalformedField { line, reason };
    if tokens.len() != 8 {
        return Err(malformed(format!("expected 8 tokens, found {}", tokens.len())));
    }
    let kind = match tokens[1] {
        "connector" => FieldKind::Connector,
        "receptor" => FieldKind::Receptor,
        other => return Err(malformed(format!("unknown field kind '{other}'"))),
    };
    let width: u32 = parse_token(tokens[2], "width").map_err(&malformed)?;
    let height: u32 = parse_token(tokens[3], "height").map_err(&malformed)?;
    let mut numbers = [0.0_f64; 4];
    for (slot, (token, name)) in numbers
        .iter_mut()
        .zip(tokens[4..].iter().zip(["tx", "ty", "tz", "yaw"]))
    {
        *slot = parse_token(token, name).map_err(&malformed)?;
    }
    let [tx, ty, tz, yaw] = numbers;
    let local = Isometry3::new(Vector3::new(tx, ty, tz), Vector3::y() * yaw.to_radians());
    ConnectionField::new(kind, width, height, local)
}

fn parse_connection(tokens: &[&str]) -> Result<(GridCoord, Connection), String> {
    if tokens.len() != 5 {
        return Err(format!("expected 5 tokens, found {}", tokens.len()));
    }
    let x: i32 = parse_token(tokens[0], "x")?;
    let z: i32 = parse_token(tokens[1], "z")?;
    let connection_type = ConnectionType::from_str(tokens[2]).map_err(|err| err.to_string())?;

    let bits: u8 = parse_token(tokens[3], "quadrants")?;
    let quadrants = Quadrants::from_bits(bits).ok_or_else(|| format!("invalid quadrant mask {bits}"))?;
    let bits: u32 = parse_token(tokens[4], "flags")?;
    let flags = ConnectionFlags::from_bits(bits).ok_or_else(|| format!("invalid flags {bits:#x}"))?;

    let connection = Connection::new(connection_type)
        .with_quadrants(quadrants)
        .with_flags(flags);
    Ok((GridCoord::new(x, z), connection))
}

fn parse_token<T: FromStr>(token: &str, name: &str) -> Result<T, String> {
    token.parse().map_err(|_| format!("invalid {name} '{token}'"))
}
