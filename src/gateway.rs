//! Contract for the remote generative-language service.
//!
//! A gateway answers two kinds of query. Each answer is either the payload or
//! an explicit [`Reply::Rejected`](crate::Reply) from the service; an `Err`
//! is reserved for transport-level trouble (network unreachable, response
//! not decodable). Gateways do not retry, time out or cancel.

use crate::selection::Selection;
use crate::{PrimaryData, QueryKind, Reply, TrackGuide};
use futures::future::LocalBoxFuture;
use std::fmt;

/// Parameters for a setup or strategy query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryRequest {
    pub query_kind: QueryKind,
    pub track_id: String,
    pub weather: String,
    pub race_length: String,
    pub free_text: String,
}

impl From<&Selection> for PrimaryRequest {
    fn from(selection: &Selection) -> Self {
        Self {
            query_kind: selection.query_kind,
            track_id: selection.track_id.clone(),
            weather: selection.weather.clone(),
            race_length: selection.race_length.clone(),
            free_text: selection.free_text.clone(),
        }
    }
}

/// Transport-level failure while talking to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a usable HTTP response.
    Transport(String),
    /// A response arrived but could not be decoded into the expected shape.
    Malformed(String),
    /// No API key was available at build time.
    NotConfigured,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => f.write_str(msg),
            GatewayError::Malformed(msg) => write!(f, "Malformed response from the AI service: {}", msg),
            GatewayError::NotConfigured => write!(
                f,
                "The AI service API key is not configured (set GEMINI_API_KEY when building)"
            ),
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// User-facing text, falling back to `default` when the failure carried
    /// no message of its own.
    pub fn user_message(&self, default: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            default.to_string()
        } else {
            message
        }
    }
}

pub type GatewayResult<T> = Result<Reply<T>, GatewayError>;

/// The two remote queries the orchestrator depends on.
///
/// Futures are `'static` and not `Send`: everything runs on the single
/// browser thread, and the orchestrator may hold on to an in-flight guide
/// request after the call that started it returns.
pub trait Gateway {
    fn fetch_primary_data(&self, request: PrimaryRequest)
        -> LocalBoxFuture<'static, GatewayResult<PrimaryData>>;

    fn fetch_track_guide(&self, track_id: String) -> LocalBoxFuture<'static, GatewayResult<TrackGuide>>;
}
