//! Save file and score log.
//!
//! The save file is a fixed 28-byte record:
//! - 16 bytes of cell exponents, column by column (`cells[x][y]`, `x` outer)
//! - the score as a little-endian `u32`
//! - the seed as a little-endian `i64`
//!
//! It is read once and then deleted, so a saved game cannot be resumed twice.
use crate::engine::{Board, Seed, BOARD_SIZE, MAX_EXPONENT};
use crate::error::PersistError;
use crate::session::Snapshot;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

const CELL_BYTES: usize = BOARD_SIZE * BOARD_SIZE;

/// Size of an encoded save file in bytes.
pub const SAVE_LEN: usize = CELL_BYTES + 4 + 8;

/// Encodes a session into the save-file layout.
pub fn encode_session(saved: &Snapshot) -> [u8; SAVE_LEN] {
    let mut out = [0u8; SAVE_LEN];
    for (i, &cell) in saved.board.cells().iter().flatten().enumerate() {
        out[i] = cell;
    }
    out[CELL_BYTES..CELL_BYTES + 4].copy_from_slice(&saved.score.to_le_bytes());
    out[CELL_BYTES + 4..].copy_from_slice(&saved.seed.0.to_le_bytes());
    out
}

/// Decodes the save-file layout.
///
/// # Errors
/// `PersistError::Corrupt` if `bytes` is not exactly `SAVE_LEN` long, and
/// `PersistError::InvalidTile` if a cell exceeds `MAX_EXPONENT`.
pub fn decode_session(bytes: &[u8]) -> Result<Snapshot, PersistError> {
    if bytes.len() != SAVE_LEN {
        return Err(PersistError::Corrupt {
            expected: SAVE_LEN,
            found: bytes.len(),
        });
    }

    let mut cells = [[0u8; BOARD_SIZE]; BOARD_SIZE];
    for (index, &value) in bytes[..CELL_BYTES].iter().enumerate() {
        if value > MAX_EXPONENT {
            return Err(PersistError::InvalidTile { index, value });
        }
        cells[index / BOARD_SIZE][index % BOARD_SIZE] = value;
    }

    let mut score = [0u8; 4];
    score.copy_from_slice(&bytes[CELL_BYTES..CELL_BYTES + 4]);
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&bytes[CELL_BYTES + 4..]);

    Ok(Snapshot {
        board: Board::from_cells(cells),
        score: u32::from_le_bytes(score),
        seed: Seed(i64::from_le_bytes(seed)),
    })
}

/// Writes `saved` to `path`, replacing any previous save.
pub fn save_session<P: AsRef<Path>>(path: P, saved: &Snapshot) -> Result<(), PersistError> {
    fs::write(path.as_ref(), encode_session(saved))?;
    info!("saved session to {}", path.as_ref().display());
    Ok(())
}

/// Reads and deletes the save file at `path`.
///
/// # Returns
/// `Ok(None)` if there is no save file. A corrupt file is still deleted before its
/// error is returned.
pub fn take_save<P: AsRef<Path>>(path: P) -> Result<Option<Snapshot>, PersistError> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no save file at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    fs::remove_file(path)?;
    decode_session(&bytes).map(Some)
}

/// Appends one `"<timestamp> <score>"` line to the score log at `path`.
pub fn append_score<P: AsRef<Path>>(
    path: P,
    timestamp: u64,
    score: u32,
) -> Result<(), PersistError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} {}", timestamp, score)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;
    use tempfile::tempdir;

    fn sample() -> Snapshot {
        Snapshot {
            board: board_from_str_array(&["12..", "...b", "....", "3..."]).unwrap(),
            score: 70_000,
            seed: Seed(-123_456_789),
        }
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_session(&sample());
        assert_eq!(bytes.len(), 28);
        // column 0 top to bottom, then column 1
        assert_eq!(&bytes[0..4], &[1, 0, 0, 3]);
        assert_eq!(&bytes[4..8], &[2, 0, 0, 0]);
        assert_eq!(bytes[13], 11);
        assert_eq!(&bytes[16..20], &70_000u32.to_le_bytes());
        assert_eq!(&bytes[20..28], &(-123_456_789i64).to_le_bytes());
        assert_eq!(decode_session(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_decode_wrong_size() {
        let err = decode_session(&[0u8; 27]).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Corrupt {
                expected: 28,
                found: 27
            }
        ));
    }

    #[test]
    fn test_decode_invalid_tile() {
        let mut bytes = encode_session(&sample());
        bytes[5] = MAX_EXPONENT + 1;
        let err = decode_session(&bytes).unwrap_err();
        assert!(matches!(err, PersistError::InvalidTile { index: 5, .. }));
    }

    #[test]
    fn test_take_save_consumes_file() {
        let td = tempdir().unwrap();
        let path = td.path().join("2048.sav");

        assert!(take_save(&path).unwrap().is_none());

        save_session(&path, &sample()).unwrap();
        assert_eq!(take_save(&path).unwrap(), Some(sample()));
        assert!(!path.exists());
        assert!(take_save(&path).unwrap().is_none());
    }

    #[test]
    fn test_take_save_corrupt_file_is_discarded() {
        let td = tempdir().unwrap();
        let path = td.path().join("2048.sav");
        fs::write(&path, b"short").unwrap();

        assert!(take_save(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_append_score() {
        let td = tempdir().unwrap();
        let path = td.path().join("2048.scores");
        append_score(&path, 1_700_000_000, 1024).unwrap();
        append_score(&path, 1_700_000_100, 20).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1700000000 1024\n1700000100 20\n");
    }
}
