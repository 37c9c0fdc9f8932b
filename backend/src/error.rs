use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeatError {
    #[error("{0}")]
    Validation(String),
    #[error("Could not geocode: {0}")]
    NotFound(String),
    #[error("No route found")]
    NoRouteFound,
    #[error("upstream provider error: {0}")]
    Upstream(String),
}

impl SeatError {
    /// Lookup and input failures are the caller's problem, provider failures are ours.
    pub fn status(&self) -> StatusCode {
        match self {
            SeatError::Validation(_) | SeatError::NotFound(_) | SeatError::NoRouteFound => {
                StatusCode::BAD_REQUEST
            }
            SeatError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<reqwest::Error> for SeatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SeatError::Upstream(format!("request timed out: {err}"))
        } else if err.is_decode() {
            SeatError::Upstream(format!("malformed response: {err}"))
        } else {
            SeatError::Upstream(err.to_string())
        }
    }
}
