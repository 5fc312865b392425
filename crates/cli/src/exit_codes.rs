//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad args, invalid account id)               |
//! | 3    | Not found (unknown account, index out of range)          |
//! | 4    | Duplicate sample number, rerun with `--on-duplicate`     |
//! | 5    | Import finished but some rows failed                     |
//! | 6    | Import aborted before any row (bad file or headers)      |
//! | 7    | IO error (read/write/serialize)                          |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid ids.
pub const EXIT_USAGE: u8 = 2;

/// Account or record index does not exist.
pub const EXIT_NOT_FOUND: u8 = 3;

/// Sample number already present, clones allowed, no choice given.
pub const EXIT_CHOICE_REQUIRED: u8 = 4;

/// Import committed what it could; diagnostics list the failed rows.
pub const EXIT_IMPORT_ROWS: u8 = 5;

/// Import rejected the file as a whole; nothing was committed.
pub const EXIT_IMPORT_ABORTED: u8 = 6;

/// Filesystem or serialization failure.
pub const EXIT_IO: u8 = 7;
