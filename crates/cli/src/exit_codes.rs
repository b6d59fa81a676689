//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `msgcheck` exit codes.
//! Exit codes are part of the shell contract. Test pipelines rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success: every expectation satisfied                 |
//! | 1    | Check failed: at least one expectation not satisfied |
//! | 2    | CLI usage error (bad args, reported by clap)         |
//! | 3    | Input parse / entity construction error              |
//! | 4    | Invalid `.check.toml` config                         |
//! | 5    | I/O error (read inputs, write reports)               |

/// Success - verdict pass.
pub const EXIT_SUCCESS: u8 = 0;

/// Verdict fail: a required expectation has no message, or a matched
/// message differs on a checked field.
pub const EXIT_CHECK_FAILED: u8 = 1;

/// Expectations or record document is malformed.
pub const EXIT_INPUT: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Reading inputs or writing reports failed.
pub const EXIT_IO: u8 = 5;
