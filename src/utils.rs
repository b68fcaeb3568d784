use crate::engine::{Board, BOARD_SIZE, MAX_EXPONENT};

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from the top row (`y = 0`); each character is
/// one column, starting from the left (`x = 0`). Missing rows and short rows are filled
/// with empty cells.
///
/// Valid characters are:
/// - `'.'` or `'0'`: an empty cell
/// - `'1'`..=`'9'` and `'a'`..=`'h'`: the exponent in base 36 (`'b'` is 2048)
///
/// Any other character, or an exponent above `MAX_EXPONENT`, is an error.
///
/// # Examples
/// ```
/// use game2048::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["1.2", "..b"]).unwrap();
/// assert_eq!(board.get_tile(0, 0), 1);
/// assert_eq!(board.get_tile(2, 0), 2);
/// assert_eq!(board.get_tile(2, 1), 11);
/// assert_eq!(board.get_tile(3, 3), 0);
///
/// assert!(board_from_str_array(&["1x"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, String> {
    if s.len() > BOARD_SIZE {
        return Err(format!(
            "Invalid number of rows. Expected at most {}, found {}",
            BOARD_SIZE,
            s.len()
        ));
    }

    let mut board = Board::new_empty();

    for (y, row_str) in s.iter().enumerate() {
        if row_str.chars().count() > BOARD_SIZE {
            return Err(format!(
                "Row {} is too long. Expected at most {} characters, found {}",
                y,
                BOARD_SIZE,
                row_str.chars().count()
            ));
        }

        for (x, ch) in row_str.chars().enumerate() {
            let exponent = match ch {
                '.' => 0,
                _ => match ch.to_digit(36) {
                    Some(d) if d <= MAX_EXPONENT as u32 => d as u8,
                    _ => {
                        return Err(format!(
                            "Unrecognized character '{}' in row {} col {}",
                            ch, y, x
                        ))
                    }
                },
            };
            board.set_tile(x, y, exponent);
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["1234", "....", "5678", "9abh"]).unwrap();
        assert_eq!(board.get_tile(0, 0), 1);
        assert_eq!(board.get_tile(3, 0), 4);
        assert_eq!(board.get_tile(0, 1), 0);
        assert_eq!(board.get_tile(1, 3), 10);
        assert_eq!(board.get_tile(3, 3), MAX_EXPONENT);
    }

    #[test]
    fn test_board_from_str_array_zero_is_empty() {
        let board = board_from_str_array(&["0.0."]).unwrap();
        assert_eq!(board, Board::new_empty());
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["12x"]);
        assert!(result.unwrap_err().contains("Unrecognized character 'x'"));

        // 'i' would be exponent 18, beyond what the board can hold
        let result = board_from_str_array(&["i"]);
        assert!(result.unwrap_err().contains("Unrecognized character 'i'"));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let too_long_row = "1".repeat(BOARD_SIZE + 1);
        let result = board_from_str_array(&[too_long_row.as_str()]);
        assert!(result.unwrap_err().contains("Row 0 is too long"));
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["1"; BOARD_SIZE + 1];
        let result = board_from_str_array(&rows);
        assert!(result.unwrap_err().contains("Invalid number of rows"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board = board_from_str_array(&[]).unwrap();
        assert_eq!(board.count_empty(), BOARD_SIZE * BOARD_SIZE);
    }
}
