//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the coroutine runtime.
//!
//! ## `DROVER_STACK_SIZE`
//!
//! Stack size for handler coroutines, decimal (`16384`) or hex (`0x4000`).
//! Default: `0x4000` (16 KB). Larger stacks support deeper handler call
//! chains; smaller stacks keep memory usage down under high concurrency.

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes (default: 0x4000)
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = match env::var("DROVER_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(0x4000)
                } else {
                    val.parse().unwrap_or(0x4000)
                }
            }
            Err(_) => 0x4000,
        };
        RuntimeConfig { stack_size }
    }
}
