//! Time related utils.

use chrono::Utc;

/// The datetime used by this crate, always in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a datetime into an HTTP date (RFC 1123) like
/// `Mon, 15 Aug 2022 16:50:12 GMT`.
///
/// This is the value carried in the `date` header, and the exact byte
/// sequence the signature is computed over.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
