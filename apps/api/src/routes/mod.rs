//! HTTP routes, one module per resource.

pub mod health;
pub mod products;
pub mod sales;

use crate::error::ApiError;

/// Parses an `{id}` path segment.
///
/// Anything that is not an integer cannot name a row, so it is reported
/// the same way as a missing one.
pub(crate) fn parse_id(entity: &str, raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::not_found(entity, raw))
}
