use crate::board::Cell;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Cells are kept sorted, so two sentences are equal (and hash equally)
/// exactly when they have the same cells and the same count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> anyhow::Result<Self> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        anyhow::ensure!(count <= cells.len(), "sentence_overflow");
        Ok(Sentence { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// An empty sentence carries no information and is skipped by inference.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Every cell is a mine when there are as many mines as cells.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    pub fn is_subset(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// `other` minus `self`, valid when `self` is a subset of `other`.
    pub(crate) fn difference_from(&self, other: &Sentence) -> anyhow::Result<Sentence> {
        let count = other
            .count
            .checked_sub(self.count)
            .ok_or_else(|| anyhow::anyhow!("count_underflow"))?;
        Sentence::new(other.cells.difference(&self.cells).copied(), count)
    }

    pub(crate) fn mark_mine(&mut self, cell: Cell) -> anyhow::Result<()> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("count_underflow"))?;
        self.cells.remove(&cell);
        Ok(())
    }

    pub(crate) fn mark_safe(&mut self, cell: Cell) -> anyhow::Result<()> {
        if !self.cells.contains(&cell) {
            return Ok(());
        }
        // The remaining cells could no longer hold `count` mines.
        anyhow::ensure!(self.count < self.cells.len(), "sentence_overflow");
        self.cells.remove(&cell);
        Ok(())
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
