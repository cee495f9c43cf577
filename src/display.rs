//! Display formatting for turn timestamps and record dates

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// `Today · 3:05 PM` on the same calendar day as `now`, otherwise
/// `14 Oct · 3:05 PM`.
pub fn format_turn_time<Tz>(at: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let hour = match at.hour() % 12 {
        0 => 12,
        h => h,
    };
    let meridiem = if at.hour() >= 12 { "PM" } else { "AM" };
    let clock = format!("{hour}:{:02} {meridiem}", at.minute());

    if at.date_naive() == now.date_naive() {
        format!("Today · {clock}")
    } else {
        format!("{} · {clock}", at.format("%-d %b"))
    }
}

/// Label for a record date: `Today`, `Yesterday` or `14 Oct 2026`.
///
/// Whole elapsed days are counted from the instant the record carries, so a
/// date-only value reads as midnight UTC. Missing dates render empty and
/// unparseable ones are echoed back untouched.
pub fn format_record_date<Tz>(raw: Option<&str>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return String::new();
    };
    let Some(date) = parse_record_date(raw, &now.timezone()) else {
        return raw.to_string();
    };

    let elapsed_days = (now.clone() - date.clone())
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY);
    match elapsed_days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => date.format("%-d %b %Y").to_string(),
    }
}

fn parse_record_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }
    // Timestamps without an offset are local wall-clock times
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return tz.from_local_datetime(&naive).earliest();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = day.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).with_timezone(tz));
    }
    None
}
