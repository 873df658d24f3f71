//! Schema module - Input records and movie configuration.

mod config;
mod record;

pub use config::*;
pub use record::*;
