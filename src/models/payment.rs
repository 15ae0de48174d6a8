use serde::{Deserialize, Serialize};

/// The hosted payment page for one booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSession {
    pub booking_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Pending,
    Failed,
}

impl PaymentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "success",
            PaymentOutcome::Pending => "pending",
            PaymentOutcome::Failed => "failed",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "Payment successful",
            PaymentOutcome::Pending => "Payment pending",
            PaymentOutcome::Failed => "Payment failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "Your booking is confirmed. See you at the shop!",
            PaymentOutcome::Pending => {
                "We are waiting for the payment to complete. Check your booking history for updates."
            }
            PaymentOutcome::Failed => {
                "The payment did not go through. You can retry it from your booking history."
            }
        }
    }

    /// Success and pending replace the navigation stack with the history
    /// screen; a failure pushes it so the user can go back and retry.
    pub fn navigation(&self) -> Navigation {
        match self {
            PaymentOutcome::Success | PaymentOutcome::Pending => {
                Navigation::Reset(Route::BookingHistory)
            }
            PaymentOutcome::Failed => Navigation::Push(Route::BookingHistory),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    BookingHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Reset(Route),
    Push(Route),
    Back,
}

/// Where a reconciler signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalChannel {
    Navigation,
    DeepLink,
    PageInspection,
    LoadError,
    LoadInterceptor,
    BackNavigation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationState {
    Active,
    /// Outcome decided; presentation is scheduled.
    Resolving(PaymentOutcome),
    Resolved(PaymentOutcome),
    Cancelled,
}

/// Outcome classification as seen from outside the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Success,
    Pending,
    Failed,
    Unresolved,
}

impl From<PaymentOutcome> for Resolution {
    fn from(outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Success => Resolution::Success,
            PaymentOutcome::Pending => Resolution::Pending,
            PaymentOutcome::Failed => Resolution::Failed,
        }
    }
}

impl ReconciliationState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ReconciliationState::Active)
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            ReconciliationState::Resolving(o) | ReconciliationState::Resolved(o) => (*o).into(),
            ReconciliationState::Active | ReconciliationState::Cancelled => Resolution::Unresolved,
        }
    }
}
