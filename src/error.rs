//! Failure taxonomy for a single submission.

use std::time::Duration;
use thiserror::Error;

/// Everything that can end a submission without a rendered report.
///
/// Section-level gaps are not errors; they are rendered as error cards.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("recognition service returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("malformed response payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("recognition failed: {message}")]
    Rejected { message: String },
}

impl SubmitError {
    /// Short, user-facing line for the failure notice.
    pub fn notice(&self) -> String {
        match self {
            Self::Rejected { message } => format!("Ooops! {}", message),
            Self::Timeout(_) => "Ooops! The recognition service took too long to respond.".to_string(),
            Self::Server { .. } | Self::Transport(_) => {
                "Ooops! Could not reach the recognition service.".to_string()
            }
            Self::InvalidPayload(_) => {
                "Ooops! The recognition service sent an unreadable response.".to_string()
            }
        }
    }
}
