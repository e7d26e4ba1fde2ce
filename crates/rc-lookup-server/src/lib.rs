//! rc-lookup server: HTTP access to vehicle registration lookups.

pub mod api;
pub mod config;
pub mod error;
pub mod lookup;

pub use api::router;
pub use config::{ConfigOverrides, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use lookup::{LookupOutcome, LookupService};
