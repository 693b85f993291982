use chrono::{DateTime, Duration, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    now() + Duration::hours(hours)
}

pub fn minutes_from_now(minutes: i64) -> DateTime<Utc> {
    now() + Duration::minutes(minutes)
}

pub fn unix_seconds(dt: DateTime<Utc>) -> usize {
    dt.timestamp().max(0) as usize
}
