//! Error taxonomy for running chat turns.

use thiserror::Error;

use crate::genai::EndpointError;

/// Why a turn failed. Endpoint failures are split by phase: `Connect`
/// covers failures before the response stream produced anything,
/// `Stream` covers failures after the connection was established.
/// Either way nothing beyond the user's own message is committed.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("a turn is already in flight for this session")]
    TurnInFlight,

    #[error("could not reach the model endpoint: {0}")]
    Connect(#[source] EndpointError),

    #[error("the response stream failed: {0}")]
    Stream(#[source] EndpointError),

    #[error("the model returned an empty reply")]
    EmptyReply,
}

impl From<EndpointError> for TurnError {
    fn from(err: EndpointError) -> Self {
        if err.is_connect() {
            Self::Connect(err)
        } else {
            Self::Stream(err)
        }
    }
}
