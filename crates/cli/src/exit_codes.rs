//! CLI exit code registry.
//!
//! Single source of truth for exit codes. They are part of the shell
//! contract — scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unspecified)                    |
//! | 2    | Usage error (bad args, no input files)         |
//! | 3    | Schema error (missing/misconfigured column)    |
//! | 4    | Parse error reading an input file              |
//! | 5    | IO error writing output                        |
//! | 6    | Conflicts found (with `--fail-on-conflict`)    |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A key or special column is missing or misconfigured.
pub const EXIT_SCHEMA: u8 = 3;

/// An input file could not be read or parsed.
pub const EXIT_PARSE: u8 = 4;

/// The output file could not be written.
pub const EXIT_IO: u8 = 5;

/// Groups with conflicting special values exist and `--fail-on-conflict`
/// was set. Like `diff(1)`, "differences found" is its own code.
pub const EXIT_CONFLICTS: u8 = 6;
