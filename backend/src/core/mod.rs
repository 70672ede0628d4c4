//! Shared building blocks: configuration, numeric coercion, lenient decoding

pub mod config;
pub mod lenient;
pub mod numeric;

pub use config::{ConfigError, PayrollConfig};
pub use numeric::{finite_or_zero, numeric, round_dp, round_to_cents};
