//! Format checks registered with the schema validator.
//!
//! Both replace the validator's built-in behaviour for their format name.

use crate::iso8601::parse_isodatetime;

/// `date-time`: any timestamp the lenient ISO 8601 parser accepts, either
/// as written or with `Z` spelled out as `+00:00`.
pub fn is_date_time(value: &str) -> bool {
    if parse_isodatetime(value).is_ok() {
        return true;
    }
    value.contains('Z') && parse_isodatetime(&value.replace('Z', "+00:00")).is_ok()
}

/// `year`: a base-10 integer with an optional sign. The range is unbounded.
pub fn is_year(value: &str) -> bool {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
