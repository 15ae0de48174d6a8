use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::inspection::PageReport;
use super::patterns::OutcomePatterns;
use super::{ErrorChoice, LoadError, PaymentSurface};
use crate::config::AppConfig;
use crate::models::{
    Navigation, PaymentOutcome, PaymentSession, ReconciliationState, Resolution, SignalChannel,
};

const CONNECTION_ERROR_MESSAGE: &str =
    "The payment page could not be loaded. Check your connection and try again.";

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub scheme: String,
    /// Pause between deciding the outcome and presenting it, so the
    /// embedded page can finish its own transition.
    pub settle_delay: Duration,
}

impl ReconcilerConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            scheme: config.deep_link_scheme.clone(),
            settle_delay: Duration::from_millis(config.payment_settle_delay_ms),
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            scheme: "pangkas".to_string(),
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Resolves one hosted payment session to a single outcome.
///
/// Every signal channel funnels into a single guarded `transition`, which
/// only moves out of `Active` once. Signals arriving after that are ignored,
/// so the outcome alert and navigation happen at most once no matter how
/// many channels report the same (or a conflicting) result.
///
/// Handlers must run inside a tokio runtime: presentation is deferred with
/// `tokio::spawn`.
pub struct PaymentReconciler {
    id: Uuid,
    session: PaymentSession,
    patterns: OutcomePatterns,
    surface: Arc<dyn PaymentSurface>,
    settle_delay: Duration,
    state: Arc<Mutex<ReconciliationState>>,
    presentation: Mutex<Option<JoinHandle<()>>>,
    exit_prompt_open: AtomicBool,
}

/// Clears the open-prompt flag however `handle_back` returns.
struct ExitPrompt<'a>(&'a AtomicBool);

impl Drop for ExitPrompt<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PaymentReconciler {
    pub fn new(
        session: PaymentSession,
        surface: Arc<dyn PaymentSurface>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session,
            patterns: OutcomePatterns::new(&config.scheme),
            surface,
            settle_delay: config.settle_delay,
            state: Arc::new(Mutex::new(ReconciliationState::Active)),
            presentation: Mutex::new(None),
            exit_prompt_open: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session(&self) -> &PaymentSession {
        &self.session
    }

    pub fn state(&self) -> ReconciliationState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(_) => {
                tracing::error!(reconciler = %self.id, "reconciliation state lock poisoned");
                ReconciliationState::Cancelled
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.state().is_resolved()
    }

    pub fn resolution(&self) -> Resolution {
        self.state().resolution()
    }

    /// The embedded page navigated (or started/finished loading).
    pub fn handle_navigation(&self, url: &str, loading: bool) {
        if self.ignored(SignalChannel::Navigation) {
            return;
        }
        self.surface.set_loading(loading);
        if let Some(outcome) = self.patterns.classify_url(url) {
            self.resolve(outcome, SignalChannel::Navigation);
        }
    }

    /// The OS delivered an app-scheme link while the payment screen is open.
    pub fn handle_deep_link(&self, url: &str) {
        if self.ignored(SignalChannel::DeepLink) {
            return;
        }
        match self.patterns.classify_url(url) {
            Some(outcome) => {
                self.resolve(outcome, SignalChannel::DeepLink);
            }
            None => tracing::debug!(reconciler = %self.id, url, "deep link carries no payment outcome"),
        }
    }

    /// A message posted by the inspection script.
    pub fn handle_page_message(&self, raw: &str) {
        if self.ignored(SignalChannel::PageInspection) {
            return;
        }
        let Some(report) = PageReport::parse(raw) else {
            return;
        };
        if let Some(outcome) = report.classify(&self.patterns) {
            self.resolve(outcome, SignalChannel::PageInspection);
        }
    }

    /// Decides whether the embedded surface may load `url`. App-scheme URLs
    /// are never loaded; they are reconciled here instead.
    pub fn should_start_load(&self, url: &str) -> bool {
        if !self.patterns.is_app_scheme(url) {
            return true;
        }
        if self.ignored(SignalChannel::LoadInterceptor) {
            return false;
        }
        match self.patterns.classify_url(url) {
            Some(outcome) => {
                self.resolve(outcome, SignalChannel::LoadInterceptor);
            }
            None => tracing::debug!(reconciler = %self.id, url, "blocked app-scheme load without outcome"),
        }
        false
    }

    /// A page failed to load. App-scheme failures are expected on surfaces
    /// that cannot veto the load and are handled silently; anything else is
    /// shown as a connectivity error.
    pub async fn handle_load_error(&self, error: &LoadError) {
        if self.ignored(SignalChannel::LoadError) {
            return;
        }
        if let Some(outcome) = self.patterns.classify_url(&error.url) {
            self.resolve(outcome, SignalChannel::LoadError);
            return;
        }
        if error.is_unknown_scheme() || self.patterns.is_app_scheme(&error.url) {
            tracing::debug!(
                reconciler = %self.id,
                url = %error.url,
                "ignoring load error for non-web scheme"
            );
            return;
        }

        tracing::warn!(
            reconciler = %self.id,
            booking_id = %self.session.booking_id,
            url = %error.url,
            code = error.code,
            description = %error.description,
            "payment page failed to load"
        );
        self.surface.set_loading(false);

        match self.surface.offer_retry(CONNECTION_ERROR_MESSAGE).await {
            ErrorChoice::Retry => {
                if !self.is_resolved() {
                    self.surface.reload();
                }
            }
            ErrorChoice::Close => self.leave(SignalChannel::LoadError),
        }
    }

    /// Hardware back or back gesture. Leaving is confirmed first; the booking
    /// stays unpaid on the backend and can be paid later from history.
    pub async fn handle_back(&self) {
        if self.ignored(SignalChannel::BackNavigation) {
            return;
        }
        if self.exit_prompt_open.swap(true, Ordering::AcqRel) {
            tracing::debug!(reconciler = %self.id, "exit prompt already open");
            return;
        }
        let _prompt = ExitPrompt(&self.exit_prompt_open);
        if !self.surface.confirm_exit().await {
            return;
        }
        self.leave(SignalChannel::BackNavigation);
    }

    /// Waits until a scheduled outcome presentation has run.
    pub async fn settled(&self) {
        let handle = self.presentation.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(reconciler = %self.id, "outcome presentation cancelled");
                }
                Err(e) => {
                    tracing::error!(reconciler = %self.id, error = %e, "outcome presentation failed");
                }
            }
        }
    }

    /// Cancels a presentation that has not run yet. Called when the payment
    /// screen goes away; the outcome is already final on the backend and is
    /// visible in booking history.
    pub fn dispose(&self) {
        let Ok(slot) = self.presentation.lock() else {
            return;
        };
        if let Some(handle) = slot.as_ref().filter(|h| !h.is_finished()) {
            tracing::debug!(reconciler = %self.id, state = ?self.state(), "dropping pending outcome presentation");
            handle.abort();
        }
    }

    fn ignored(&self, channel: SignalChannel) -> bool {
        let resolved = self.is_resolved();
        if resolved {
            tracing::debug!(reconciler = %self.id, ?channel, "signal after resolution ignored");
        }
        resolved
    }

    /// The only way out of `Active`. Returns false when another signal got
    /// there first.
    fn transition(&self, next: ReconciliationState, channel: SignalChannel) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.is_resolved() {
            tracing::debug!(reconciler = %self.id, ?channel, current = ?*state, "transition rejected");
            return false;
        }
        *state = next;
        true
    }

    fn resolve(&self, outcome: PaymentOutcome, channel: SignalChannel) -> bool {
        if !self.transition(ReconciliationState::Resolving(outcome), channel) {
            return false;
        }
        tracing::info!(
            reconciler = %self.id,
            booking_id = %self.session.booking_id,
            ?channel,
            outcome = outcome.as_str(),
            "payment outcome resolved"
        );
        self.surface.set_loading(false);

        let surface = Arc::clone(&self.surface);
        let state = Arc::clone(&self.state);
        let booking_id = self.session.booking_id.clone();
        let delay = self.settle_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            surface.show_outcome(outcome, &booking_id);
            surface.navigate(outcome.navigation());
            if let Ok(mut state) = state.lock() {
                *state = ReconciliationState::Resolved(outcome);
            }
        });
        if let Ok(mut slot) = self.presentation.lock() {
            *slot = Some(handle);
        }
        true
    }

    fn leave(&self, channel: SignalChannel) {
        if self.transition(ReconciliationState::Cancelled, channel) {
            tracing::info!(
                reconciler = %self.id,
                booking_id = %self.session.booking_id,
                ?channel,
                "payment left before completion"
            );
            self.surface.navigate(Navigation::Back);
        }
    }
}
