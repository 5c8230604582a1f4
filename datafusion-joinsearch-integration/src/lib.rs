//! Contains code to integrate with datafusion.
pub mod conversion;
