use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::BookingError;
use crate::models::{BookingDraft, PaymentSession};
use crate::services::api::BookingApi;

/// Sends booking drafts to the backend, at most one at a time.
pub struct BookingSubmitter {
    api: Arc<dyn BookingApi>,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BookingSubmitter {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits the draft and hands back the payment session to reconcile.
    /// Nothing is assumed to exist server-side unless this returns `Ok`.
    pub async fn submit(&self, draft: BookingDraft) -> Result<PaymentSession, BookingError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("booking submission already in progress");
            return Err(BookingError::AlreadySubmitting);
        }
        let _guard = InFlight(&self.in_flight);

        tracing::info!(
            barbershop_id = %draft.barbershop_id,
            service_id = %draft.service_id,
            booking_time = %draft.booking_time,
            "submitting booking"
        );

        match self.api.create_booking(&draft).await {
            Ok(created) => {
                let session = created.into_payment_session();
                tracing::info!(booking_id = %session.booking_id, "booking created");
                Ok(session)
            }
            Err(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "booking creation failed");
                Err(e.into())
            }
        }
    }
}
