pub mod rest;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::models::{Barbershop, BookingDraft, BookingRecord, CreatedBooking};

/// Remote backend. Availability, pricing and payment settlement all live
/// behind it.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;

    async fn barbershop(&self, id: &str) -> Result<Barbershop, ApiError>;

    async fn create_booking(&self, draft: &BookingDraft) -> Result<CreatedBooking, ApiError>;

    async fn booking_history(&self) -> Result<Vec<BookingRecord>, ApiError>;
}
