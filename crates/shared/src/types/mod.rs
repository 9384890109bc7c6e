//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{is_quantized_2dp, quantize_2dp, MONEY_DECIMAL_PLACES};
