//! Minesweeper played by propositional inference.
//!
//! Knowledge is kept as sentences of the form "exactly N of these cells are
//! mines". Each revealed cell adds a sentence; certain mines and safe cells are
//! propagated to a fixed point, and new sentences are derived by subtracting
//! one sentence from another whose cells contain it.

pub mod audit;
pub mod board;
pub mod config;
pub mod game;
pub mod knowledge;
pub mod sentence;

pub use board::{Board, Cell, neighbors};
pub use config::GameConfig;
pub use game::{Game, GameState, Move, Tile};
pub use knowledge::MinesweeperAi;
pub use sentence::Sentence;
