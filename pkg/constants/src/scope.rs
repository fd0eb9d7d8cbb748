//! Resource-scope cache defaults.

/// Steady-state period between discovery refreshes, in seconds.
pub const SCOPE_REFRESH_INTERVAL_SECS: u64 = 300;

/// Refresh period while the cache has never produced data, in seconds.
pub const SCOPE_BOOTSTRAP_INTERVAL_SECS: u64 = 10;
