use std::sync::Arc;

use super::inspection::INSPECTION_SCRIPT;
use super::reconciler::{PaymentReconciler, ReconcilerConfig};
use super::PaymentSurface;
use crate::models::PaymentSession;
use crate::services::events::{HostEvents, Subscription};

/// The payment screen's lifetime: owns the reconciler and its host
/// subscriptions. Dropping the screen unsubscribes from deep links and back
/// presses and cancels an outcome presentation that has not run yet.
pub struct PaymentScreen {
    reconciler: Arc<PaymentReconciler>,
    _deep_links: Subscription,
    _back_presses: Subscription,
}

impl PaymentScreen {
    /// Must be called from within a tokio runtime.
    pub fn mount(
        session: PaymentSession,
        surface: Arc<dyn PaymentSurface>,
        events: &HostEvents,
        config: ReconcilerConfig,
    ) -> Self {
        let reconciler = Arc::new(PaymentReconciler::new(session, surface, config));
        tracing::debug!(
            reconciler = %reconciler.id(),
            booking_id = %reconciler.session().booking_id,
            "payment screen mounted"
        );

        let weak = Arc::downgrade(&reconciler);
        let deep_links = events.deep_links.subscribe(move |url: String| {
            if let Some(reconciler) = weak.upgrade() {
                reconciler.handle_deep_link(&url);
            }
        });

        let weak = Arc::downgrade(&reconciler);
        let back_presses = events.back_presses.subscribe(move |()| {
            if let Some(reconciler) = weak.upgrade() {
                tokio::spawn(async move { reconciler.handle_back().await });
            }
        });

        Self {
            reconciler,
            _deep_links: deep_links,
            _back_presses: back_presses,
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.reconciler.session().redirect_url
    }

    pub fn injected_script(&self) -> &'static str {
        INSPECTION_SCRIPT
    }

    pub fn reconciler(&self) -> &Arc<PaymentReconciler> {
        &self.reconciler
    }
}

impl Drop for PaymentScreen {
    fn drop(&mut self) {
        self.reconciler.dispose();
        tracing::debug!(reconciler = %self.reconciler.id(), "payment screen unmounted");
    }
}
