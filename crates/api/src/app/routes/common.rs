use core::str::FromStr;

use crate::app::errors::ApiError;

/// Parse a numeric path segment; anything unparseable cannot name a record.
pub fn parse_id<T: FromStr>(raw: &str, kind: &'static str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(kind))
}
