//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ReachabilityConfig (validated, immutable)
//!     → ProbeConfig + ScheduleConfig handed to the engine
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → engine.reconfigure() disarms and re-arms with the new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once armed; changes require a full reconfigure
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, ProbeConfig, ReachabilityConfig, ScheduleConfig};
pub use validation::{validate_config, ValidationError};
