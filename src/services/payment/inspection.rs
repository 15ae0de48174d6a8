use serde::Deserialize;

use super::patterns::OutcomePatterns;
use crate::models::PaymentOutcome;

/// Injected into the payment page. Posts the page's visible text (and its
/// URL) back to the host every second until the page goes away.
pub const INSPECTION_SCRIPT: &str = r#"(function () {
  if (window.__pangkasInspector) { return; }
  window.__pangkasInspector = true;
  var post = function (msg) {
    try { window.ipc.postMessage(JSON.stringify(msg)); } catch (e) {}
  };
  var last = "";
  var report = function () {
    var text = document.body ? document.body.innerText : "";
    if (text && text !== last) {
      last = text;
      post({ type: "page_text", text: text.slice(0, 4000) });
    }
    post({ type: "url", url: window.location.href });
  };
  report();
  setInterval(report, 1000);
})();"#;

/// Message posted by the page script.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageReport {
    Status { status: String },
    PageText { text: String },
    Url { url: String },
}

impl PageReport {
    /// Malformed payloads yield `None` and are dropped by the caller.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognized page message");
                None
            }
        }
    }

    pub fn classify(&self, patterns: &OutcomePatterns) -> Option<PaymentOutcome> {
        match self {
            PageReport::Status { status } => patterns.classify_status(status),
            PageReport::PageText { text } => patterns.classify_text(text),
            PageReport::Url { url } => patterns.classify_url(url),
        }
    }
}
