//! Error taxonomy for the synchronization engine
//!
//! Network and decode failures are caught at the fetch boundary and turned
//! into local state by whichever component issued the request. They never
//! escalate past the coordinator. A zero-trip response is not an error at all
//! (see `TripSummary::is_empty`).

use crate::data_client::Endpoint;
use crate::model::ZoneId;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// Non-success status or transport failure on any fetch
    #[error("{endpoint} request failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Network {
        endpoint: Endpoint,
        status: Option<u16>,
        message: String,
    },

    /// Response body did not match the expected contract
    #[error("{endpoint} response could not be decoded: {message}")]
    Decode { endpoint: Endpoint, message: String },

    #[error("zone {0} is not in the catalog")]
    UnknownZone(ZoneId),

    /// Underserved toggle needs a loaded borough panel with at least one underserved zone
    #[error("underserved highlight is not available for the current borough panel")]
    HighlightUnavailable,

    #[error("a report request is already outstanding")]
    ReportInFlight,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn network(endpoint: Endpoint, status: Option<u16>, message: impl Into<String>) -> Self {
        DashboardError::Network {
            endpoint,
            status,
            message: message.into(),
        }
    }

    /// Endpoint the failure belongs to, when it came from a fetch
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            DashboardError::Network { endpoint, .. } | DashboardError::Decode { endpoint, .. } => {
                Some(*endpoint)
            }
            _ => None,
        }
    }
}
