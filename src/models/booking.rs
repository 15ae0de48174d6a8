use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::opening_hours::parse_time;
use super::PaymentSession;
use crate::errors::BookingError;

/// Client-side booking request. Built from the screen's selections, sent
/// once, then dropped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingDraft {
    pub barbershop_id: String,
    pub service_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(serialize_with = "serialize_local_datetime")]
    pub booking_time: NaiveDateTime,
    #[serde(skip)]
    pub idempotency_key: Uuid,
}

impl BookingDraft {
    pub fn new(
        barbershop_id: &str,
        service_id: &str,
        staff_id: Option<&str>,
        date: NaiveDate,
        slot: &str,
    ) -> Result<Self, BookingError> {
        if barbershop_id.trim().is_empty() {
            return Err(BookingError::Validation("Please choose a barbershop.".into()));
        }
        if service_id.trim().is_empty() {
            return Err(BookingError::Validation("Please choose a service.".into()));
        }
        let time = parse_time(slot)
            .map_err(|_| BookingError::Validation("Please choose a valid time slot.".into()))?;

        Ok(Self {
            barbershop_id: barbershop_id.trim().to_string(),
            service_id: service_id.trim().to_string(),
            staff_id: staff_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            booking_time: date.and_time(time),
            idempotency_key: Uuid::new_v4(),
        })
    }

    /// Rejects a slot that is not among the slots currently offered for the date.
    pub fn ensure_slot_offered(&self, offered: &[String]) -> Result<(), BookingError> {
        let slot = self.booking_time.format("%H:%M").to_string();
        if offered.iter().any(|s| *s == slot) {
            Ok(())
        } else {
            Err(BookingError::Validation(format!(
                "{slot} is not available on {}.",
                self.booking_time.format("%Y-%m-%d")
            )))
        }
    }
}

fn serialize_local_datetime<S: serde::Serializer>(
    dt: &NaiveDateTime,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Paid,
    Confirmed,
    Cancelled,
    Completed,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => BookingStatus::Paid,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            "expired" => BookingStatus::Expired,
            _ => BookingStatus::Pending,
        }
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(BookingStatus::parse(&s.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(alias = "id", deserialize_with = "super::id_string")]
    pub booking_id: String,
    #[serde(default = "default_status")]
    pub status: BookingStatus,
    #[serde(default)]
    pub booking_time: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id_string")]
    pub barbershop_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id_string")]
    pub service_id: Option<String>,
}

fn default_status() -> BookingStatus {
    BookingStatus::Pending
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRedirect {
    pub redirect_url: String,
}

/// Response of `POST /bookings`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedBooking {
    pub booking: BookingRecord,
    pub payment: PaymentRedirect,
}

impl CreatedBooking {
    pub fn into_payment_session(self) -> PaymentSession {
        PaymentSession {
            booking_id: self.booking.booking_id,
            redirect_url: self.payment.redirect_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_draft_serializes_local_iso_time() {
        let draft = BookingDraft::new("12", "3", Some("5"), date("2025-06-16"), "10:00").unwrap();
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["booking_time"], "2025-06-16T10:00:00");
        assert_eq!(json["staff_id"], "5");
        assert!(json.get("idempotency_key").is_none());
    }

    #[test]
    fn test_draft_without_staff() {
        let draft = BookingDraft::new("12", "3", Some("  "), date("2025-06-16"), "10:00").unwrap();
        assert!(draft.staff_id.is_none());
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("staff_id").is_none());
    }

    #[test]
    fn test_draft_validation() {
        let d = date("2025-06-16");
        assert!(matches!(
            BookingDraft::new("", "3", None, d, "10:00"),
            Err(BookingError::Validation(_))
        ));
        assert!(matches!(
            BookingDraft::new("12", " ", None, d, "10:00"),
            Err(BookingError::Validation(_))
        ));
        assert!(matches!(
            BookingDraft::new("12", "3", None, d, "10"),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_ensure_slot_offered() {
        let draft = BookingDraft::new("12", "3", None, date("2025-06-16"), "10:00").unwrap();
        let offered = vec!["09:00".to_string(), "10:00".to_string()];
        assert!(draft.ensure_slot_offered(&offered).is_ok());
        assert!(draft.ensure_slot_offered(&["09:00".to_string()]).is_err());
    }

    #[test]
    fn test_created_booking_response() {
        let json = r#"{"booking":{"id":"b-1","status":"PENDING"},"payment":{"redirect_url":"https://app.sandbox.midtrans.com/snap/v2/vtweb/abc"}}"#;
        let created: CreatedBooking = serde_json::from_str(json).unwrap();
        assert_eq!(created.booking.status, BookingStatus::Pending);
        let session = created.into_payment_session();
        assert_eq!(session.booking_id, "b-1");
        assert!(session.redirect_url.ends_with("/abc"));
    }

    #[test]
    fn test_created_booking_with_numeric_ids() {
        let json = r#"{"booking":{"booking_id":42,"status":"pending","barbershop_id":1,"service_id":null},"payment":{"redirect_url":"https://app.sandbox.midtrans.com/snap/v2/vtweb/abc"}}"#;
        let created: CreatedBooking = serde_json::from_str(json).unwrap();
        assert_eq!(created.booking.barbershop_id.as_deref(), Some("1"));
        assert!(created.booking.service_id.is_none());
        assert_eq!(created.into_payment_session().booking_id, "42");
    }

    #[test]
    fn test_booking_id_rejects_other_types() {
        let json = r#"{"booking_id":{"nested":true}}"#;
        assert!(serde_json::from_str::<BookingRecord>(json).is_err());
        assert!(serde_json::from_str::<BookingRecord>(r#"{"booking_id":null}"#).is_err());
    }

    #[test]
    fn test_unknown_status_is_pending() {
        assert_eq!(BookingStatus::parse("weird"), BookingStatus::Pending);
        assert_eq!(BookingStatus::parse("paid").as_str(), "paid");
    }
}
