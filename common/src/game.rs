use crate::board::{Board, Cell, write_grid};
use crate::config::GameConfig;
use crate::knowledge::MinesweeperAi;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// A move chosen by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The cell is known to be safe.
    Safe(Cell),
    /// No safe cell was known, so this one was picked at random.
    Guess(Cell),
}

impl Move {
    pub fn cell(&self) -> Cell {
        match *self {
            Move::Safe(cell) | Move::Guess(cell) => cell,
        }
    }
}

/// What a player can see of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Hidden,
    /// Hidden, but the AI knows it is a mine.
    Flagged,
    Revealed(u8), // The u8 is the number of adjacent mines.
    Detonated,
}

/// A single game: the hidden board, the AI playing it, and what has been revealed so far.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    board: Board,
    ai: MinesweeperAi,
    /// Adjacent-mine counts of revealed cells.
    revealed: Vec<Vec<Option<u8>>>,
    detonated: Option<Cell>,
    game_state: GameState,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> anyhow::Result<Self> {
        let board = Board::generate(config.height, config.width, config.mines, rng)?;
        Ok(Self::with_board(board))
    }

    pub fn with_board(board: Board) -> Self {
        let (height, width) = (board.height(), board.width());
        Game {
            board,
            ai: MinesweeperAi::new(height, width),
            revealed: vec![vec![None; width]; height],
            detonated: None,
            game_state: GameState::Playing,
        }
    }

    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        let game: Game = bcs::from_bytes(bts)?;
        anyhow::ensure!(
            game.revealed.len() == game.board.height()
                && game.revealed.iter().all(|row| row.len() == game.board.width())
                && game.ai.height() == game.board.height()
                && game.ai.width() == game.board.width(),
            "malformed_game"
        );
        Ok(game)
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ai(&self) -> &MinesweeperAi {
        &self.ai
    }

    pub fn state(&self) -> GameState {
        self.game_state
    }

    /// Cells the AI has flagged as mines.
    pub fn flags(&self) -> &HashSet<Cell> {
        self.ai.known_mines()
    }

    /// Lets the AI pick its next move and plays it.
    ///
    /// Prefers a known safe cell and falls back to a random guess. Returns
    /// `None` when every cell is either already revealed or a known mine.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Move>> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let next = match self.ai.make_safe_move() {
            Some(cell) => Some(Move::Safe(cell)),
            None => self.ai.make_random_move(rng).map(Move::Guess),
        };

        if let Some(mv) = next {
            self.reveal(mv.cell())?;
        }
        Ok(next)
    }

    /// Reveals a cell. Returns `false` if it was a mine.
    pub fn reveal(&mut self, at: Cell) -> anyhow::Result<bool> {
        anyhow::ensure!(self.board.contains(at), "out_of_bounds");
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        if self.revealed[at.row][at.col].is_some() {
            return Ok(true);
        }

        if self.board.is_mine(at)? {
            self.detonated = Some(at);
            self.game_state = GameState::Lost;
            return Ok(false);
        }

        let count = self.board.nearby_mines(at)?;
        self.revealed[at.row][at.col] = Some(count);
        self.ai.add_knowledge(at, count as usize)?;

        if self.check_win_condition() {
            self.game_state = GameState::Won;
        }
        Ok(true)
    }

    /// Won once the flags match the mines exactly, or once every safe cell is revealed.
    pub fn check_win_condition(&self) -> bool {
        let safe_cells = self.board.height() * self.board.width() - self.board.mines().len();
        let revealed = self.revealed.iter().flatten().filter(|c| c.is_some()).count();
        self.board.has_won(self.flags()) || revealed == safe_cells
    }

    /// The board as the player sees it.
    pub fn tiles(&self) -> Vec<Vec<Tile>> {
        self.revealed
            .iter()
            .enumerate()
            .map(|(row, counts)| {
                counts
                    .iter()
                    .enumerate()
                    .map(|(col, count)| {
                        let cell = Cell::new(row, col);
                        match count {
                            Some(n) => Tile::Revealed(*n),
                            None if self.detonated == Some(cell) => Tile::Detonated,
                            None if self.flags().contains(&cell) => Tile::Flagged,
                            None => Tile::Hidden,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Tile {
    fn symbol(&self) -> char {
        match *self {
            Tile::Hidden => '#',
            Tile::Flagged => 'F',
            Tile::Detonated => '*',
            Tile::Revealed(0) => ' ',
            Tile::Revealed(n) => char::from(b'0' + n),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .tiles()
            .into_iter()
            .map(|row| row.into_iter().map(|tile| tile.symbol()));
        write_grid(f, self.board.width(), rows)
    }
}
