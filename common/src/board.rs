use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// A (row, column) coordinate on the board, 0-indexed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All in-bounds cells within one row and column of `cell`, not including the cell itself.
pub fn neighbors(cell: Cell, height: usize, width: usize) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dr: isize| {
        (-1..=1).filter_map(move |dc: isize| {
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;

            if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                Some(Cell::new(row as usize, col as usize))
            } else {
                None
            }
        })
    })
}

/// Ground truth for a game: where the mines are.
///
/// The AI never looks inside; it only learns revealed neighbor counts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    mines: HashSet<Cell>,
    grid: Vec<Vec<bool>>,
}

impl Board {
    /// Places `mines` distinct mines uniformly at random over a `height` x `width` grid.
    pub fn generate<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(height > 0 && width > 0, "empty_board");
        anyhow::ensure!(mines <= height * width, "too_many_mines");

        let cells = rand::seq::index::sample(rng, height * width, mines)
            .into_iter()
            .map(|idx| Cell::new(idx / width, idx % width));

        Self::with_mines(height, width, cells)
    }

    /// Builds a board with mines at exactly the given cells.
    pub fn with_mines(
        height: usize,
        width: usize,
        cells: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(height > 0 && width > 0, "empty_board");

        let mut grid = vec![vec![false; width]; height];
        let mut mines = HashSet::new();
        for cell in cells {
            anyhow::ensure!(cell.row < height && cell.col < width, "out_of_bounds");
            anyhow::ensure!(mines.insert(cell), "duplicate_mine");
            grid[cell.row][cell.col] = true;
        }

        Ok(Board {
            height,
            width,
            mines,
            grid,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    pub fn is_mine(&self, cell: Cell) -> anyhow::Result<bool> {
        anyhow::ensure!(self.contains(cell), "out_of_bounds");
        Ok(self.grid[cell.row][cell.col])
    }

    /// Number of mines adjacent to `cell`, clipped to the board edges.
    pub fn nearby_mines(&self, cell: Cell) -> anyhow::Result<u8> {
        anyhow::ensure!(self.contains(cell), "out_of_bounds");
        let count = neighbors(cell, self.height, self.width)
            .filter(|n| self.grid[n.row][n.col])
            .count();
        Ok(count as u8)
    }

    /// True iff the flagged cells are exactly the mines: none missing, none extra.
    pub fn has_won(&self, flags: &HashSet<Cell>) -> bool {
        *flags == self.mines
    }
}

/// Writes one symbol per cell, each row boxed by `--` rules and `|` separators.
pub(crate) fn write_grid<R, S>(f: &mut fmt::Formatter<'_>, width: usize, rows: R) -> fmt::Result
where
    R: IntoIterator<Item = S>,
    S: IntoIterator<Item = char>,
{
    let rule = format!("{}-", "--".repeat(width));
    for row in rows {
        writeln!(f, "{}", rule)?;
        for symbol in row {
            write!(f, "|{}", symbol)?;
        }
        writeln!(f, "|")?;
    }
    writeln!(f, "{}", rule)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .grid
            .iter()
            .map(|row| row.iter().map(|&mine| if mine { 'X' } else { ' ' }));
        write_grid(f, self.width, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_places_exact_mine_count() {
        // Every generated board must have exactly the requested number of mines
        let mut rng = StdRng::seed_from_u64(7);
        for mines in [0, 1, 8, 40, 64] {
            let board = Board::generate(8, 8, mines, &mut rng).unwrap();
            assert_eq!(board.mines().len(), mines);

            let flagged = (0..8)
                .flat_map(|row| (0..8).map(move |col| Cell::new(row, col)))
                .filter(|&cell| board.is_mine(cell).unwrap())
                .count();
            assert_eq!(flagged, mines);
        }
    }

    #[test]
    fn test_generate_rejects_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = Board::generate(4, 3, 13, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "too_many_mines");
    }

    #[test]
    fn test_generate_is_deterministic_for_a_seed() {
        let a = Board::generate(10, 10, 15, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Board::generate(10, 10, 15, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.mines(), b.mines());
    }

    #[test]
    fn test_with_mines_rejects_bad_cells() {
        assert!(Board::with_mines(2, 2, [Cell::new(2, 0)]).is_err());
        assert!(Board::with_mines(2, 2, [Cell::new(0, 0), Cell::new(0, 0)]).is_err());
    }

    #[test]
    fn test_out_of_bounds_queries_fail() {
        let board = Board::with_mines(3, 3, [Cell::new(1, 1)]).unwrap();
        assert!(board.is_mine(Cell::new(3, 0)).is_err());
        assert!(board.nearby_mines(Cell::new(0, 3)).is_err());
    }

    #[test]
    fn test_nearby_mines() {
        // x . .
        // x x .
        // . . .
        let board =
            Board::with_mines(3, 3, [Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)]).unwrap();

        assert_eq!(board.nearby_mines(Cell::new(0, 1)).unwrap(), 3);
        assert_eq!(board.nearby_mines(Cell::new(2, 2)).unwrap(), 1);
        // A mine never counts itself
        assert_eq!(board.nearby_mines(Cell::new(1, 1)).unwrap(), 2);
        assert_eq!(board.nearby_mines(Cell::new(0, 2)).unwrap(), 1);
    }

    #[test]
    fn test_neighbors() {
        // Corner, edge and center cells on a 3x3 board
        assert_eq!(neighbors(Cell::new(0, 0), 3, 3).count(), 3);
        assert_eq!(neighbors(Cell::new(0, 1), 3, 3).count(), 5);
        assert_eq!(neighbors(Cell::new(1, 1), 3, 3).count(), 8);
        assert!(neighbors(Cell::new(1, 1), 3, 3).all(|n| n != Cell::new(1, 1)));
        assert_eq!(neighbors(Cell::new(0, 0), 1, 1).count(), 0);
    }

    #[test]
    fn test_has_won_requires_exact_match() {
        let board = Board::with_mines(3, 3, [Cell::new(0, 0), Cell::new(2, 2)]).unwrap();

        let subset = HashSet::from([Cell::new(0, 0)]);
        let exact = HashSet::from([Cell::new(0, 0), Cell::new(2, 2)]);
        let superset = HashSet::from([Cell::new(0, 0), Cell::new(2, 2), Cell::new(1, 1)]);

        assert!(!board.has_won(&subset));
        assert!(board.has_won(&exact));
        assert!(!board.has_won(&superset));
    }

    #[test]
    fn test_display() {
        let board = Board::with_mines(1, 2, [Cell::new(0, 1)]).unwrap();
        assert_eq!(board.to_string(), "-----\n| |X|\n-----\n");
    }
}
