//! Environment-driven configuration and tracing setup shared by the
//! api and ingest services.

pub mod env;
pub mod tracing_init;

pub use env::AppConfig;
pub use tracing_init::init_tracing;
