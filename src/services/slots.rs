use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::opening_hours::parse_time;
use crate::models::OpeningHours;

pub const SLOT_INTERVAL_MINUTES: u32 = 60;

/// Discretizes `[open, close)` into `HH:MM` start times `interval_minutes`
/// apart, starting at `open`. Never wraps past midnight.
pub fn generate_slots(open: &str, close: &str, interval_minutes: u32) -> Vec<String> {
    if interval_minutes == 0 {
        return Vec::new();
    }
    let (open, close) = match (parse_time(open), parse_time(close)) {
        (Ok(o), Ok(c)) => (o, c),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "cannot generate slots from malformed hours");
            return Vec::new();
        }
    };
    slots_between(open, close, interval_minutes)
}

fn slots_between(open: NaiveTime, close: NaiveTime, interval_minutes: u32) -> Vec<String> {
    let step = Duration::minutes(i64::from(interval_minutes));
    let mut slots = Vec::new();
    let mut cursor = open;

    while cursor < close {
        slots.push(cursor.format("%H:%M").to_string());
        let (next, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        cursor = next;
    }

    slots
}

/// Slots for `date` according to a backend schedule (JSON object or
/// JSON-encoded string). An empty list means no availability; malformed
/// schedules and closed days both end up here.
pub fn slots_for_date(
    schedule: &serde_json::Value,
    date: NaiveDate,
    interval_minutes: u32,
) -> Vec<String> {
    let hours = match OpeningHours::from_value(schedule) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse opening hours");
            return Vec::new();
        }
    };
    slots_for_schedule(&hours, date, interval_minutes)
}

pub fn slots_for_schedule(hours: &OpeningHours, date: NaiveDate, interval_minutes: u32) -> Vec<String> {
    let Some(day) = hours.for_date(date) else {
        tracing::debug!(%date, "no opening hours for weekday");
        return Vec::new();
    };
    if !day.active || interval_minutes == 0 {
        return Vec::new();
    }
    match day.window() {
        Ok((open, close)) => slots_between(open, close, interval_minutes),
        Err(e) => {
            tracing::warn!(%date, error = %e, "invalid opening hours for day");
            Vec::new()
        }
    }
}

/// Drops slots that have already started when `date` is today. Past dates
/// have nothing bookable left.
pub fn upcoming_slots(slots: &[String], date: NaiveDate, now: NaiveDateTime) -> Vec<String> {
    let today = now.date();
    if date < today {
        return Vec::new();
    }
    if date > today {
        return slots.to_vec();
    }
    slots
        .iter()
        .filter(|s| parse_time(s).map(|t| t > now.time()).unwrap_or(false))
        .cloned()
        .collect()
}
