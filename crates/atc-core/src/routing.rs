//! Route string parsing.
//!
//! Routes are whitespace-separated coordinate tokens such as
//! `45.0N/75.0W 46.0N/74.0W`.

use crate::models::Waypoint;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteParseError {
    #[error("empty coordinate token")]
    EmptyToken,
    #[error("invalid waypoint token: {0}")]
    InvalidToken(String),
    #[error("invalid coordinate components: {0}")]
    InvalidComponents(String),
    #[error("failed to parse numeric coordinate values: {0}")]
    InvalidNumber(String),
}

/// Parse a single `<lat><N|S>/<lon><E|W>` token.
pub fn parse_coord_token(token: &str) -> Result<Waypoint, RouteParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(RouteParseError::EmptyToken);
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    let [lat_raw, lon_raw] = parts.as_slice() else {
        return Err(RouteParseError::InvalidToken(token.to_string()));
    };

    let (Some(lat_part), Some(lon_part)) = (
        split_component(lat_raw, 'N', 'S'),
        split_component(lon_raw, 'E', 'W'),
    ) else {
        return Err(RouteParseError::InvalidComponents(token.to_string()));
    };

    let (Ok(lat_value), Ok(lon_value)) = (lat_part.0.parse::<f64>(), lon_part.0.parse::<f64>())
    else {
        return Err(RouteParseError::InvalidNumber(token.to_string()));
    };

    Ok(Waypoint::new(lat_value * lat_part.1, lon_value * lon_part.1))
}

/// Parse a full route string into ordered waypoints.
///
/// A blank route yields no waypoints; the first bad token fails the route.
pub fn parse_route(route: &str) -> Result<Vec<Waypoint>, RouteParseError> {
    route.split_whitespace().map(parse_coord_token).collect()
}

/// Split `12.5N` into its numeric text and sign.
///
/// The numeric text must be digits with an optional fractional part.
fn split_component(raw: &str, positive: char, negative: char) -> Option<(&str, f64)> {
    let suffix = raw.chars().last()?;
    let number = &raw[..raw.len() - suffix.len_utf8()];

    let sign = if suffix.eq_ignore_ascii_case(&positive) {
        1.0
    } else if suffix.eq_ignore_ascii_case(&negative) {
        -1.0
    } else {
        return None;
    };

    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (number, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return None;
    }

    Some((number, sign))
}
