use chrono::Utc;

// ============== Timestamp Helpers ==============

/// Seconds since the Unix epoch (activity capture time).
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// RFC3339 timestamp in UTC (for logs).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}
