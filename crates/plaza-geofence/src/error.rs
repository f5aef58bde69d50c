use plaza_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeofenceError {
    /// The point lies outside coverage. Correctable by the user.
    #[error("{message}")]
    OutOfCoverage {
        region_name: Option<String>,
        message: String,
    },

    /// No active region exists or the region schema is missing.
    /// Correctable by an operator.
    #[error("{message}")]
    RegionsNotConfigured { message: String },

    #[error("store unavailable while trying to {context}: {source}")]
    StoreUnavailable {
        context: &'static str,
        #[source]
        source: DbError,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{message}")]
    Conflict { message: String },
}

impl GeofenceError {
    pub(crate) fn store(context: &'static str, source: DbError) -> Self {
        GeofenceError::StoreUnavailable { context, source }
    }
}
