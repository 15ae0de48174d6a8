use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::BookingApi;
use crate::errors::ApiError;
use crate::models::{Barbershop, BookingDraft, BookingRecord, CreatedBooking};
use crate::services::session::Session;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    token: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryResponse {
    Wrapped { bookings: Vec<BookingRecord> },
    Bare(Vec<BookingRecord>),
}

pub struct RestBookingApi {
    base_url: String,
    session: Arc<Session>,
    client: reqwest::Client,
}

impl RestBookingApi {
    pub fn new(base_url: &str, session: Arc<Session>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(text);
            return Err(ApiError::from_status(status, message));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl BookingApi for RestBookingApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url("auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = Self::handle_response(resp).await?;
        Ok(login.token)
    }

    async fn barbershop(&self, id: &str) -> Result<Barbershop, ApiError> {
        let resp = self
            .authorize(self.client.get(self.url(&format!("barbershops/{id}"))))
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn create_booking(&self, draft: &BookingDraft) -> Result<CreatedBooking, ApiError> {
        let resp = self
            .authorize(self.client.post(self.url("bookings")))
            .header("Idempotency-Key", draft.idempotency_key.to_string())
            .json(draft)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn booking_history(&self) -> Result<Vec<BookingRecord>, ApiError> {
        let resp = self.authorize(self.client.get(self.url("bookings"))).send().await?;
        let history: HistoryResponse = Self::handle_response(resp).await?;
        Ok(match history {
            HistoryResponse::Wrapped { bookings } => bookings,
            HistoryResponse::Bare(bookings) => bookings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = RestBookingApi::new(
            "http://localhost:8000/api/",
            Arc::new(Session::in_memory()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert_eq!(api.url("/bookings"), "http://localhost:8000/api/bookings");
        assert_eq!(api.url("barbershops/3"), "http://localhost:8000/api/barbershops/3");
    }

    #[test]
    fn test_history_shapes() {
        let wrapped: HistoryResponse =
            serde_json::from_str(r#"{"bookings":[{"booking_id":"1","status":"paid"}]}"#).unwrap();
        assert!(matches!(wrapped, HistoryResponse::Wrapped { bookings } if bookings.len() == 1));
        let bare: HistoryResponse = serde_json::from_str(r#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        assert!(matches!(bare, HistoryResponse::Bare(b) if b.len() == 2));
    }
}
