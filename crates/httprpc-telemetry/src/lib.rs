//! Observability for httprpc services.
//!
//! - **Logging**: [`init_logging`] installs a `tracing-subscriber` registry
//!   with an `EnvFilter` and JSON or human-readable output.
//! - **Metrics**: [`record_dispatch`] counts requests by dispatch outcome
//!   through the `metrics` facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use httprpc_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::default())?;
//!     tracing::info!("service starting");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use metrics::{describe_metrics, record_dispatch, DispatchOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
