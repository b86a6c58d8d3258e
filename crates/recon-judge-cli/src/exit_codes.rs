//! Exit codes for `recon-judge`. Part of the public contract.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 1; // every document failed, or nothing to aggregate
pub const EXIT_CONFIG_ERROR: i32 = 2; // bad configuration, usage, or output I/O
