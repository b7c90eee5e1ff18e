use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Rounds to two decimals, ties away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Snaps a datetime to the provider's 3-hour grid.
///
/// The hour is rounded to the nearest multiple of 3 (mod 24); minutes and seconds
/// are dropped and the date is kept as-is, so 23:10 becomes 00:00 of the *same* day.
pub fn snap_to_three_hours(datetime: NaiveDateTime) -> NaiveDateTime {
    let hour = ((datetime.hour() as f64 / 3.0).round() as u32 * 3) % 24;
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    datetime.date().and_time(time)
}
