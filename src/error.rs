// Boundary errors: anything a user or client can type that is not one of the
// closed categorical values is rejected here, never deep in aggregation.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    /// Chart type label is not one of the four known modes
    #[error("unknown chart type: {0:?}")]
    UnknownChartMode(String),

    /// Month label is not a calendar abbreviation (Jan..Dec)
    #[error("unknown month: {0:?}")]
    UnknownMonth(String),

    #[error("unknown region: {0:?}")]
    UnknownRegion(String),

    /// Query parameter present but not parseable, e.g. `show_data=maybe`
    #[error("invalid value for {name}: {value:?}")]
    InvalidParameter { name: String, value: String },

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
}
