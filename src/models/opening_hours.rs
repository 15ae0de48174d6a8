use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;

const DAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Closed days often carry no hours at all, so `open`/`close` are optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHours {
    #[serde(rename = "aktif", alias = "active", default)]
    pub active: bool,
    #[serde(rename = "buka", alias = "open", default)]
    pub open: Option<String>,
    #[serde(rename = "tutup", alias = "close", default)]
    pub close: Option<String>,
}

impl DayHours {
    pub fn is_open(&self) -> bool {
        self.active && self.open.is_some() && self.close.is_some()
    }

    /// Parsed `[open, close)` window.
    pub fn window(&self) -> Result<(NaiveTime, NaiveTime), ScheduleError> {
        match (self.open.as_deref(), self.close.as_deref()) {
            (Some(open), Some(close)) => Ok((parse_time(open)?, parse_time(close)?)),
            _ => Err(ScheduleError::Malformed("day has no opening hours".into())),
        }
    }
}

/// Weekly schedule keyed by day name, as stored by the backend.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct OpeningHours {
    pub days: BTreeMap<String, DayHours>,
}

impl OpeningHours {
    pub fn from_json(s: &str) -> Result<Self, ScheduleError> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(s)?;
        Ok(Self::from_days(raw))
    }

    /// Accepts the schedule either as a JSON object or as a string holding
    /// JSON-encoded text.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ScheduleError> {
        match value {
            serde_json::Value::String(s) => Self::from_json(s),
            serde_json::Value::Object(map) => Ok(Self::from_days(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            serde_json::Value::Null => Err(ScheduleError::Malformed("missing schedule".into())),
            other => Err(ScheduleError::Malformed(format!(
                "expected object or string, got {other}"
            ))),
        }
    }

    /// A day that does not parse is dropped on its own; the rest of the week
    /// stays bookable.
    fn from_days(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let days = raw
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value::<DayHours>(value) {
                Ok(hours) => Some((name, hours)),
                Err(e) => {
                    tracing::warn!(day = %name, error = %e, "skipping malformed opening hours");
                    None
                }
            })
            .collect();
        Self { days }
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        let local = indonesian_day_name(weekday);
        let english = english_day_name(weekday);
        self.days
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(local))
            .or_else(|| {
                self.days
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(english))
            })
            .map(|(_, hours)| hours)
    }

    pub fn for_date(&self, date: NaiveDate) -> Option<&DayHours> {
        self.for_weekday(date.weekday())
    }

    pub fn to_human_readable(&self) -> String {
        DAY_ORDER
            .iter()
            .filter_map(|day| {
                let hours = self.for_weekday(*day).filter(|h| h.is_open())?;
                Some(format!(
                    "{}: {}-{}",
                    indonesian_day_name(*day),
                    hours.open.as_deref().unwrap_or_default(),
                    hours.close.as_deref().unwrap_or_default()
                ))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn indonesian_day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

fn english_day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_time(s: &str) -> Result<NaiveTime, ScheduleError> {
    let (hour, minute) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| ScheduleError::InvalidTime(s.to_string()))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| ScheduleError::InvalidTime(format!("invalid hour in: {s}")))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| ScheduleError::InvalidTime(format!("invalid minute in: {s}")))?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ScheduleError::InvalidTime(format!("time out of range: {s}")))
}
