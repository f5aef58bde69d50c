pub mod address;
pub mod app_config;
pub mod config;
pub mod geo;
pub mod regions;

pub use address::{split_street_number, StreetParts};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{normalize, normalize_text, Coordinate, CoordinateError};
pub use regions::{LocationValidationResult, ResolvedRegion, ServiceRegion, ValidationStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
