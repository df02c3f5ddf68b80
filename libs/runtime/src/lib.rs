//! Process-level plumbing shared by apikit binaries: layered configuration
//! and `tracing` setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, ErrorsConfig, LoggingConfig, PaginationConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
