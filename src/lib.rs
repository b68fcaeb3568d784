//! # 2048 Library
//!
//! This library provides the rules engine for the 2048 sliding-tile puzzle: how a move
//! transforms the board, how the score grows, when no move is left, and where new tiles
//! appear. Tile placement is fully determined by an explicit seed, so games can be
//! replayed and undone exactly.
//!
//! It is used by the `play` binary, a line-oriented console front end.
//!
//! ## Modules
//! - `engine`: the board (`Board`), the collapse primitive (`slide_array`), rotation,
//!   moves, terminal detection and tile spawning.
//! - `session`: one game (`Session`) with its score, seed, single-level undo and lifecycle.
//! - `persist`: the save file and the score log.
//! - `error`: errors from persistence (`PersistError`).
//! - `utils`: parsing boards from text, mostly for tests.

pub mod engine;
pub mod error;
pub mod persist;
pub mod session;
pub mod utils;
