pub mod booking;
pub mod opening_hours;
pub mod payment;
pub mod shop;

pub use booking::{BookingDraft, BookingRecord, BookingStatus, CreatedBooking};
pub use opening_hours::{DayHours, OpeningHours};
pub use payment::{
    Navigation, PaymentOutcome, PaymentSession, ReconciliationState, Resolution, Route,
    SignalChannel,
};
pub use shop::Barbershop;

use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Backend ids arrive as JSON strings or numbers; both become a `String`.
pub(crate) fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    optional_id_string(d)?.ok_or_else(|| D::Error::custom("id is null"))
}

pub(crate) fn optional_id_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
