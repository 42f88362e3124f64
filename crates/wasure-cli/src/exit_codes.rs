//! Process exit codes of the `wasure` binary.

pub const SUCCESS: i32 = 0;
pub const CHECK_FAILED: i32 = 1; // A checked pair failed or was skipped
pub const CONFIG_ERROR: i32 = 2; // Unreadable catalog, results file or bad arguments
pub const NOTHING_TO_RUN: i32 = 3; // No runtime or no benchmark resolved
