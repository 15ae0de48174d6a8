pub mod inspection;
pub mod patterns;
pub mod reconciler;
pub mod screen;

use async_trait::async_trait;

use crate::models::{Navigation, PaymentOutcome};

pub use inspection::{PageReport, INSPECTION_SCRIPT};
pub use patterns::OutcomePatterns;
pub use reconciler::{PaymentReconciler, ReconcilerConfig};
pub use screen::PaymentScreen;

/// Android WebView's `ERROR_UNSUPPORTED_SCHEME`.
const UNSUPPORTED_SCHEME_CODE: i32 = -10;

/// The embedded payment page and the app chrome around it.
#[async_trait]
pub trait PaymentSurface: Send + Sync {
    fn set_loading(&self, loading: bool);

    fn show_outcome(&self, outcome: PaymentOutcome, booking_id: &str);

    fn navigate(&self, navigation: Navigation);

    fn reload(&self);

    /// Asks whether the user really wants to leave an unfinished payment.
    async fn confirm_exit(&self) -> bool;

    /// Shows a connectivity error and waits for the user's choice.
    async fn offer_retry(&self, message: &str) -> ErrorChoice;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorChoice {
    Retry,
    Close,
}

/// A failed page load reported by the embedded surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    pub url: String,
    pub code: i32,
    pub description: String,
}

impl LoadError {
    pub fn new(url: &str, code: i32, description: &str) -> Self {
        Self {
            url: url.to_string(),
            code,
            description: description.to_string(),
        }
    }

    pub fn is_unknown_scheme(&self) -> bool {
        self.code == UNSUPPORTED_SCHEME_CODE
            || self.description.contains("ERR_UNKNOWN_URL_SCHEME")
            || self.description.to_lowercase().contains("unsupported url")
    }
}
