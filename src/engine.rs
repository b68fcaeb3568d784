//! Rules engine for the 2048 sliding-tile puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Board`: the 4x4 grid of tile exponents, with rotation, moves, terminal detection
//!   and tile spawning.
//! - `slide_array`: the single collapse primitive every move is built from.
//! - `Direction`: the four move directions and their rotation table.
//! - `Seed`: the explicit generator state threaded through every spawn.
//!
//! Cells are addressed as `(x, y)`, column first. A stored value `e` is an exponent;
//! the displayed tile is `2^e` and `0` means empty.
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Width and height of the (square) board.
pub const BOARD_SIZE: usize = 4;

/// Largest exponent a 4x4 board can reach (`2^17 = 131072`).
pub const MAX_EXPONENT: u8 = 17;

/// One of the four move directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Quarter turns applied before collapsing and after it. Each pair sums to 0 mod 4.
    fn rotations(self) -> (u8, u8) {
        match self {
            Direction::Up => (0, 0),
            Direction::Left => (1, 3),
            Direction::Down => (2, 2),
            Direction::Right => (3, 1),
        }
    }
}

/// Explicit generator state for tile spawning.
///
/// A `Seed` is a plain value: the generator is rebuilt from it right before every draw,
/// so the same seed always spawns the same tile in the same place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Seed(pub i64);

impl Seed {
    /// Builds the generator for this seed.
    pub fn rng(self) -> SmallRng {
        SmallRng::seed_from_u64(self.0 as u64)
    }

    /// Returns the next seed. This is a pure function of `self`.
    ///
    /// # Examples
    /// ```
    /// use game2048::engine::Seed;
    /// assert_eq!(Seed(7).advance(), Seed(7).advance());
    /// assert_ne!(Seed(7).advance(), Seed(7));
    /// ```
    pub fn advance(self) -> Seed {
        Seed(self.rng().gen())
    }
}

/// Scans backward from `x - 1` for the cell the tile at `x` should land on.
///
/// Never scans past `stop`, the cell right after the last merge of this pass.
fn find_target(array: &[u8; BOARD_SIZE], x: usize, stop: usize) -> usize {
    if x == 0 {
        return x;
    }
    let mut t = x - 1;
    loop {
        if array[t] != 0 {
            if array[t] != array[x] {
                // merge is not possible, take next position
                return t + 1;
            }
            return t;
        }
        if t == stop {
            return t;
        }
        t -= 1;
    }
}

/// Slides every tile of `array` toward index 0, merging equal neighbours once.
///
/// Each merge producing exponent `e` adds `2^e` to `score`. A cell created by a merge
/// cannot absorb another tile during the same call.
///
/// # Returns
/// `true` if any cell changed.
///
/// # Examples
/// ```
/// use game2048::engine::slide_array;
/// let mut row = [1, 1, 1, 1];
/// let mut score = 0;
/// assert!(slide_array(&mut row, &mut score));
/// assert_eq!(row, [2, 2, 0, 0]);
/// assert_eq!(score, 8);
/// ```
pub fn slide_array(array: &mut [u8; BOARD_SIZE], score: &mut u32) -> bool {
    let mut changed = false;
    let mut stop = 0;

    for x in 1..BOARD_SIZE {
        if array[x] == 0 {
            continue;
        }
        let t = find_target(array, x, stop);
        if t == x {
            continue;
        }
        if array[t] == 0 {
            array[t] = array[x];
        } else if array[t] == array[x] {
            array[t] += 1;
            *score = score.saturating_add(1u32 << array[t]);
            stop = t + 1;
        }
        array[x] = 0;
        changed = true;
    }
    changed
}

/// The game grid: `BOARD_SIZE` columns of `BOARD_SIZE` tile exponents.
///
/// `cells[x]` is column `x`, ordered from the top row (`y = 0`) down. Sliding a column
/// toward index 0 is therefore a move up, and every other direction is expressed through
/// rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates a board with every cell empty.
    pub fn new_empty() -> Self {
        Board::default()
    }

    /// Creates a board from column-major cells (`cells[x][y]`).
    pub fn from_cells(cells: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Board { cells }
    }

    /// Returns the exponent at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `x` or `y` is outside the board.
    pub fn get_tile(&self, x: usize, y: usize) -> u8 {
        self.cells[x][y]
    }

    /// Sets the exponent at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `x` or `y` is outside the board.
    pub fn set_tile(&mut self, x: usize, y: usize, exponent: u8) {
        self.cells[x][y] = exponent;
    }

    /// Returns the raw column-major cells.
    pub fn cells(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Rotates the board a quarter turn in place, layer by layer from the outside in.
    ///
    /// The tile at `(x, y)` ends up at `(BOARD_SIZE - 1 - y, x)`. Four rotations restore
    /// the original board.
    pub fn rotate(&mut self) {
        let n = BOARD_SIZE;
        let b = &mut self.cells;
        for i in 0..n / 2 {
            for j in i..n - i - 1 {
                let tmp = b[i][j];
                b[i][j] = b[j][n - i - 1];
                b[j][n - i - 1] = b[n - i - 1][n - j - 1];
                b[n - i - 1][n - j - 1] = b[n - j - 1][i];
                b[n - j - 1][i] = tmp;
            }
        }
    }

    /// Calls [`Board::rotate`] `times` times.
    pub fn rotate_n(&mut self, times: u8) {
        for _ in 0..times {
            self.rotate();
        }
    }

    /// Moves every tile in `direction`, merging equal neighbours.
    ///
    /// Merge points are added to `score`. When this returns `false` neither the board nor
    /// `score` has been touched, and the caller must not treat the attempt as a turn.
    ///
    /// # Examples
    /// ```
    /// use game2048::engine::Direction;
    /// use game2048::utils::board_from_str_array;
    ///
    /// let mut board = board_from_str_array(&["11..", "....", "....", "...."]).unwrap();
    /// let mut score = 0;
    /// assert!(board.apply_move(Direction::Left, &mut score));
    /// assert_eq!(board.get_tile(0, 0), 2);
    /// assert_eq!(score, 4);
    /// assert!(!board.apply_move(Direction::Up, &mut score));
    /// ```
    pub fn apply_move(&mut self, direction: Direction, score: &mut u32) -> bool {
        let (before, after) = direction.rotations();
        self.rotate_n(before);
        let mut changed = false;
        for column in self.cells.iter_mut() {
            changed |= slide_array(column, score);
        }
        self.rotate_n(after);
        changed
    }

    /// Returns `true` if two vertically adjacent cells hold the same value.
    fn has_pair_down(&self) -> bool {
        self.cells
            .iter()
            .any(|column| column.windows(2).any(|pair| pair[0] == pair[1]))
    }

    /// Counts the empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|&&e| e == 0).count()
    }

    /// Returns the largest exponent on the board, `0` if it is empty.
    pub fn max_tile(&self) -> u8 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Returns `true` when no move can change the board.
    ///
    /// That is the case when every cell is filled and no two orthogonal neighbours are
    /// equal. Horizontal neighbours are checked by testing a rotated copy.
    pub fn is_terminal(&self) -> bool {
        if self.count_empty() > 0 {
            return false;
        }
        if self.has_pair_down() {
            return false;
        }
        let mut rotated = *self;
        rotated.rotate();
        !rotated.has_pair_down()
    }

    /// Lists the empty cells, column by column.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut list = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for x in 0..BOARD_SIZE {
            for y in 0..BOARD_SIZE {
                if self.cells[x][y] == 0 {
                    list.push((x, y));
                }
            }
        }
        list
    }

    /// Places a new tile on a random empty cell, drawn from a generator rebuilt from `seed`.
    ///
    /// The tile is exponent 1 (a "2") nine times out of ten and exponent 2 (a "4") otherwise,
    /// decided by a single draw from `0..10`.
    ///
    /// # Returns
    /// The `(x, y)` of the new tile, or `None` if the board was already full.
    pub fn add_random(&mut self, seed: Seed) -> Option<(usize, usize)> {
        let list = self.empty_cells();
        if list.is_empty() {
            return None;
        }
        let mut rng = seed.rng();
        let (x, y) = list[rng.gen_range(0..list.len())];
        let exponent = rng.gen_range(0..10u8) / 9 + 1;
        self.cells[x][y] = exponent;
        debug!("spawned exponent {} at ({}, {}) from seed {}", exponent, x, y, seed.0);
        Some((x, y))
    }
}

impl fmt::Display for Board {
    /// One text line per row. Each cell is `2^e`, centred in seven columns, or `·` if empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                match self.cells[x][y] {
                    0 => write!(f, "{:^7}", "·")?,
                    e => write!(f, "{:^7}", 1u32 << e)?,
                }
            }
            if y < BOARD_SIZE - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
