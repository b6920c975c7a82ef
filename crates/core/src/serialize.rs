#![forbid(unsafe_code)]

//! Serde helpers for the response boundary. Timestamps cross the boundary as
//! decimal-digit strings so callers never lose precision to a float decode.

pub mod ts_string {
    use serde::Serializer;

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }
}

pub mod opt_ts_string {
    use serde::Serializer;

    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

/// Calendar date (`YYYY-MM-DD`, UTC) for a millisecond timestamp. Falls back
/// to the epoch date on out-of-range input instead of failing a response.
pub fn ms_to_date(ts_ms: i64) -> String {
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    let nanos = (ts_ms as i128) * 1_000_000i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let rfc3339 = dt
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());
    rfc3339.chars().take(10).collect()
}
