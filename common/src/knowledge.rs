use crate::board::{Cell, neighbors};
use crate::sentence::Sentence;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{BTreeSet, HashSet};

/// Minesweeper player that deduces mines and safe cells from revealed counts.
///
/// Knowledge only ever grows: known mines and known safes are never removed,
/// and sentences are never dropped (they may shrink to empty, after which
/// they are ignored by inference).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MinesweeperAi {
    height: usize,
    width: usize,
    /// Cells that have already been chosen.
    moves_made: HashSet<Cell>,
    mines: HashSet<Cell>,
    safes: HashSet<Cell>,
    /// Sentences about the game known to be true.
    knowledge: Vec<Sentence>,
}

impl MinesweeperAi {
    pub fn new(height: usize, width: usize) -> Self {
        MinesweeperAi {
            height,
            width,
            moves_made: HashSet::new(),
            mines: HashSet::new(),
            safes: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn known_mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn known_safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.knowledge
    }

    /// Marks a cell as a mine and removes it from every sentence.
    pub fn mark_mine(&mut self, cell: Cell) -> anyhow::Result<()> {
        anyhow::ensure!(!self.safes.contains(&cell), "mine_marked_safe");
        // Check every sentence first so a contradiction leaves no partial update.
        anyhow::ensure!(
            self.knowledge
                .iter()
                .all(|s| s.count() > 0 || !s.cells().contains(&cell)),
            "count_underflow"
        );

        self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell)?;
        }
        Ok(())
    }

    /// Marks a cell as safe and removes it from every sentence.
    pub fn mark_safe(&mut self, cell: Cell) -> anyhow::Result<()> {
        anyhow::ensure!(!self.mines.contains(&cell), "safe_marked_mine");
        anyhow::ensure!(
            self.knowledge
                .iter()
                .all(|s| s.count() < s.len() || !s.cells().contains(&cell)),
            "sentence_overflow"
        );

        self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell)?;
        }
        Ok(())
    }

    /// Called when the board tells us, for a safe `cell`, how many
    /// neighboring cells have mines in them.
    ///
    /// Records the move, adds a sentence over the still-unknown neighbors,
    /// propagates every certain mine and safe to a fixed point, then runs one
    /// pass of subset inference and propagates whatever it derived.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> anyhow::Result<()> {
        anyhow::ensure!(
            cell.row < self.height && cell.col < self.width,
            "out_of_bounds"
        );

        // Built before any state changes; a cell is never its own neighbor.
        let sentence = self.neighbor_sentence(cell, count)?;

        self.mark_safe(cell)?;
        self.moves_made.insert(cell);

        if !self.knowledge.contains(&sentence) {
            self.knowledge.push(sentence);
        }

        self.propagate()?;
        if self.infer_subsets()? > 0 {
            self.propagate()?;
        }
        Ok(())
    }

    /// The sentence over `cell`'s neighbors whose status is still unknown.
    ///
    /// Known mines already account for part of the count; known safes and
    /// revealed cells contribute nothing.
    fn neighbor_sentence(&self, cell: Cell, count: usize) -> anyhow::Result<Sentence> {
        let mut count = count;
        let mut unknown = Vec::new();
        for neighbor in neighbors(cell, self.height, self.width) {
            if self.mines.contains(&neighbor) {
                count = count
                    .checked_sub(1)
                    .ok_or_else(|| anyhow::anyhow!("count_underflow"))?;
            } else if !self.safes.contains(&neighbor) && !self.moves_made.contains(&neighbor) {
                unknown.push(neighbor);
            }
        }
        Sentence::new(unknown, count)
    }

    /// Repeatedly collects every cell some sentence proves to be a mine or
    /// safe, then marks them, until no sentence proves anything new.
    fn propagate(&mut self) -> anyhow::Result<()> {
        loop {
            let mut mines = BTreeSet::new();
            let mut safes = BTreeSet::new();
            for sentence in self.knowledge.iter().filter(|s| !s.is_empty()) {
                mines.extend(sentence.known_mines());
                safes.extend(sentence.known_safes());
            }

            if mines.is_empty() && safes.is_empty() {
                return Ok(());
            }

            for cell in mines {
                self.mark_mine(cell)?;
            }
            for cell in safes {
                self.mark_safe(cell)?;
            }
        }
    }

    /// For every pair of live sentences where one's cells are a subset of
    /// the other's, adds the difference as a new sentence.
    ///
    /// Returns the number of sentences added.
    fn infer_subsets(&mut self) -> anyhow::Result<usize> {
        let live: Vec<&Sentence> = self.knowledge.iter().filter(|s| !s.is_empty()).collect();
        let existing: HashSet<&Sentence> = self.knowledge.iter().collect();

        let mut inferred: Vec<Sentence> = Vec::new();
        for &subset in &live {
            for &superset in &live {
                if subset == superset || !subset.is_subset(superset) {
                    continue;
                }
                let derived = subset.difference_from(superset)?;
                if !existing.contains(&derived) && !inferred.contains(&derived) {
                    inferred.push(derived);
                }
            }
        }

        let added = inferred.len();
        self.knowledge.extend(inferred);
        Ok(added)
    }

    /// The first cell, in row-major order, that is known safe and not yet chosen.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.cells()
            .find(|cell| self.safes.contains(cell) && !self.moves_made.contains(cell))
    }

    /// A uniformly random cell that has not been chosen and is not a known mine.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let options: Vec<Cell> = self
            .cells()
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        options.choose(rng).copied()
    }

    fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
    }
}
