//! CLI command implementations

pub mod analyze;
pub mod device;
pub mod history;
pub mod saved;
