use reqwest::Url;

use crate::models::PaymentOutcome;

const SANDBOX_SIMULATOR_HOST: &str = "simulator.sandbox.midtrans.com";

const SUCCESS_STATUSES: &[&str] = &["settlement", "capture", "success"];
const PENDING_STATUSES: &[&str] = &["pending"];
const FAILED_STATUSES: &[&str] = &["deny", "cancel", "expire", "failure", "failed"];

const SUCCESS_SEGMENTS: &[&str] = &["success"];
const PENDING_SEGMENTS: &[&str] = &["pending"];
const FAILED_SEGMENTS: &[&str] = &["failed", "failure"];

const SIMULATOR_SUCCESS: &[&str] = &["success"];
const SIMULATOR_FAILED: &[&str] = &["fail", "error"];

const SUCCESS_TEXT: &[&str] = &[
    "payment successful",
    "payment success",
    "transaction successful",
    "pembayaran berhasil",
    "transaksi berhasil",
];
const PENDING_TEXT: &[&str] = &[
    "waiting for payment",
    "payment pending",
    "menunggu pembayaran",
    "transaksi tertunda",
];
const FAILED_TEXT: &[&str] = &[
    "payment failed",
    "transaction failed",
    "transaction denied",
    "payment expired",
    "pembayaran gagal",
    "transaksi gagal",
    "transaksi ditolak",
    "pembayaran kedaluwarsa",
];

/// Keyword sets that map URLs and page text on the hosted payment flow to a
/// terminal outcome. Sets are tried success, then pending, then failed.
#[derive(Debug, Clone)]
pub struct OutcomePatterns {
    scheme: String,
}

impl OutcomePatterns {
    pub fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.trim_end_matches("://").to_lowercase(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// True for URLs in the app's own scheme, which the embedded surface
    /// cannot load by itself.
    pub fn is_app_scheme(&self, url: &str) -> bool {
        url.trim()
            .to_lowercase()
            .starts_with(&format!("{}:", self.scheme))
    }

    pub fn classify_url(&self, url: &str) -> Option<PaymentOutcome> {
        let lower = url.trim().to_lowercase();
        let parsed = Url::parse(&lower).ok();

        [
            PaymentOutcome::Success,
            PaymentOutcome::Pending,
            PaymentOutcome::Failed,
        ]
        .into_iter()
        .find(|outcome| self.url_matches(&lower, parsed.as_ref(), *outcome))
    }

    fn url_matches(&self, lower: &str, parsed: Option<&Url>, outcome: PaymentOutcome) -> bool {
        let (segment, statuses, simulator_words) = match outcome {
            PaymentOutcome::Success => (SUCCESS_SEGMENTS, SUCCESS_STATUSES, SIMULATOR_SUCCESS),
            PaymentOutcome::Pending => (PENDING_SEGMENTS, PENDING_STATUSES, &[][..]),
            PaymentOutcome::Failed => (FAILED_SEGMENTS, FAILED_STATUSES, SIMULATOR_FAILED),
        };

        // pangkas://payment/success
        if segment
            .iter()
            .any(|s| lower.starts_with(&format!("{}://payment/{s}", self.scheme)))
        {
            return true;
        }

        // generic .../payment/success path segment
        if segment.iter().any(|s| {
            let needle = format!("/payment/{s}");
            lower
                .find(&needle)
                .map(|i| {
                    matches!(
                        lower[i + needle.len()..].chars().next(),
                        None | Some('/' | '?' | '#')
                    )
                })
                .unwrap_or(false)
        }) {
            return true;
        }

        let Some(url) = parsed else {
            return statuses
                .iter()
                .any(|s| lower.contains(&format!("transaction_status={s}")));
        };

        if url
            .query_pairs()
            .any(|(k, v)| k == "transaction_status" && statuses.iter().any(|s| *s == v))
        {
            return true;
        }

        url.host_str() == Some(SANDBOX_SIMULATOR_HOST)
            && simulator_words.iter().any(|w| url.path().contains(w))
    }

    /// Classifies visible text scraped from the payment page.
    pub fn classify_text(&self, text: &str) -> Option<PaymentOutcome> {
        let lower = text.to_lowercase();
        if SUCCESS_TEXT.iter().any(|p| lower.contains(p)) {
            Some(PaymentOutcome::Success)
        } else if PENDING_TEXT.iter().any(|p| lower.contains(p)) {
            Some(PaymentOutcome::Pending)
        } else if FAILED_TEXT.iter().any(|p| lower.contains(p)) {
            Some(PaymentOutcome::Failed)
        } else {
            None
        }
    }

    /// Maps a bare status word reported by the page script.
    pub fn classify_status(&self, status: &str) -> Option<PaymentOutcome> {
        let lower = status.trim().to_lowercase();
        if SUCCESS_STATUSES.contains(&lower.as_str()) {
            Some(PaymentOutcome::Success)
        } else if PENDING_STATUSES.contains(&lower.as_str()) {
            Some(PaymentOutcome::Pending)
        } else if FAILED_STATUSES.contains(&lower.as_str()) {
            Some(PaymentOutcome::Failed)
        } else {
            None
        }
    }
}
