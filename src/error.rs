//! Error types for the on-disk session and score files.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted state.
///
/// The rules engine itself never fails; only file handling does.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The save file does not have the expected size
    #[error("corrupt save file: expected {expected} bytes, found {found}")]
    Corrupt { expected: usize, found: usize },

    /// A saved cell holds an exponent the board cannot contain
    #[error("corrupt save file: cell {index} holds exponent {value}")]
    InvalidTile { index: usize, value: u8 },
}
