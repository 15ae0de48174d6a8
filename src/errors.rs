use reqwest::StatusCode;

/// Failures talking to the remote backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 from the backend. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("slot no longer available: {0}")]
    SlotUnavailable(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(message),
            StatusCode::CONFLICT => ApiError::SlotUnavailable(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Server { status, message },
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("a booking request is already in progress")]
    AlreadySubmitting,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl BookingError {
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Api(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Text for the alert shown after a failed submission.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(msg) => msg.clone(),
            BookingError::AlreadySubmitting => "Your booking is still being processed.".to_string(),
            BookingError::Api(ApiError::Validation(msg)) => msg.clone(),
            BookingError::Api(ApiError::SlotUnavailable(_)) => {
                "Sorry, that time slot was just taken. Please pick another time.".to_string()
            }
            BookingError::Api(ApiError::Unauthorized) => "Please log in again to continue.".to_string(),
            BookingError::Api(e) if e.is_retryable() => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            BookingError::Api(e) => e.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("malformed opening hours: {0}")]
    Malformed(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::Malformed(e.to_string())
    }
}
