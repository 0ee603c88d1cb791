use time::OffsetDateTime;

/// Milliseconds since the Unix epoch, the unit every on-disk timestamp in this
/// system uses (`expiresAt`, `lastFailureEpoch`, usage history entries).
pub fn now_ms() -> i64 {
    let now = OffsetDateTime::now_utc();
    now.unix_timestamp() * 1000 + i64::from(now.millisecond())
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
