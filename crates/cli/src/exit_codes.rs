//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 2    | Usage error (bad args, no inputs found)                   |
//! | 3    | Class list workbook missing, unreadable, or without sheets |
//! | 4    | Invalid run config                                        |
//! | 5    | PDF/Word extraction failed under `--strict`               |
//! | 6    | Output could not be written                               |
//! | 7    | `--strict` and missing students or row issues present     |
//! | 8    | Batch finished with at least one failed combination       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The class list workbook is absent, unreadable, or has no classroom sheet.
/// Nothing is written.
pub const EXIT_MISSING_ROSTER: u8 = 3;

/// Config file could not be read, parsed, or validated.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// An optional source failed to extract and `--strict` was given.
/// Without `--strict` the source is skipped with a warning.
pub const EXIT_EXTRACTION: u8 = 5;

/// Staging or committing an output file failed. No partial output set is
/// left behind.
pub const EXIT_OUTPUT: u8 = 6;

/// Outputs were written, but `--strict` was given and the run found
/// students missing from the class lists or skipped rows.
pub const EXIT_STRICT_ISSUES: u8 = 7;

/// `batch` ran every combination but at least one failed.
pub const EXIT_BATCH_FAILED: u8 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_USAGE,
            EXIT_MISSING_ROSTER,
            EXIT_INVALID_CONFIG,
            EXIT_EXTRACTION,
            EXIT_OUTPUT,
            EXIT_STRICT_ISSUES,
            EXIT_BATCH_FAILED,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
