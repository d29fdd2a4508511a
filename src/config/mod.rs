//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PING_INTERVAL, RETRY_EXP, ...)
//!     → validation.rs (semantic checks)
//!     → HarnessConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the binaries run with no config at all
//! - Environment wins over the file, CLI flags win over both
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CollectorConfig;
pub use schema::DeliveryConfig;
pub use schema::HarnessConfig;
pub use schema::MedianMode;
pub use schema::ObservabilityConfig;
pub use schema::ProbeConfig;
