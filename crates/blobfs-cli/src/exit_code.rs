//! Exit codes for the CLI.
//!
//! Code 2 is left to clap, which uses it for usage errors.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error
pub const GENERAL_ERROR: u8 = 1;

/// File or directory not found (within the container)
pub const NOT_FOUND: u8 = 3;

/// The operation is not permitted on the entry
pub const PERMISSION_DENIED: u8 = 4;

/// The entry already exists
pub const ALREADY_EXISTS: u8 = 5;

/// The store could not be reached or failed the request
pub const STORE_UNAVAILABLE: u8 = 6;

/// The configuration file could not be parsed
pub const CONFIG_INVALID: u8 = 7;
