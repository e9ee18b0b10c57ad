//! Utility modules

pub mod logger;

pub use logger::{init_logging, resolve_level};
