//! Consistency check for accumulated knowledge.
//!
//! Every live sentence, known mine and known safe is encoded as CNF and handed
//! to the SAT solver. If no assignment of mines satisfies them all at once, a
//! count was wrong somewhere and the AI's deductions cannot be trusted.

use crate::board::Cell;
use crate::knowledge::MinesweeperAi;
use crate::sentence::Sentence;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// Checks that everything the AI currently knows can hold at the same time.
pub fn check_consistency(ai: &MinesweeperAi) -> anyhow::Result<()> {
    check_knowledge(ai.sentences(), ai.known_mines(), ai.known_safes())
}

/// Fails with `knowledge_unsat` if the sentences, mines and safes contradict each other.
pub fn check_knowledge<'a>(
    sentences: impl IntoIterator<Item = &'a Sentence>,
    mines: &HashSet<Cell>,
    safes: &HashSet<Cell>,
) -> anyhow::Result<()> {
    let mut formula = CnfFormula::new();
    let mut var_map: HashMap<Cell, Var> = HashMap::new();

    for sentence in sentences.into_iter().filter(|s| !s.is_empty()) {
        let lits: Vec<Lit> = sentence
            .cells()
            .iter()
            .map(|&cell| mine_lit(&mut formula, &mut var_map, cell))
            .collect();
        encode_exactly_k_to_formula(&mut formula, &lits, sentence.count());
    }

    for &cell in mines {
        let lit = mine_lit(&mut formula, &mut var_map, cell);
        formula.add_clause(&[lit]);
    }
    for &cell in safes {
        let lit = mine_lit(&mut formula, &mut var_map, cell);
        formula.add_clause(&[!lit]);
    }

    let mut solver = Solver::new();
    solver.add_formula(&formula);
    if !solver.solve()? {
        anyhow::bail!("knowledge_unsat");
    }
    Ok(())
}

/// The literal that is true when `cell` is a mine, allocating a variable on first use.
fn mine_lit(formula: &mut CnfFormula, var_map: &mut HashMap<Cell, Var>, cell: Cell) -> Lit {
    let var = *var_map.entry(cell).or_insert_with(|| formula.new_var());
    Lit::from_var(var, true)
}

/// Encodes an "exactly k" constraint into the CNF formula.
fn encode_exactly_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    encode_at_most_k_to_formula(formula, vars, k);
    encode_at_least_k_to_formula(formula, vars, k);
}

/// Encodes an "at most k" constraint into the CNF formula.
///
/// Sentences never cover more than the eight neighbors of a cell, so the
/// naive encoding (every k + 1 subset has a safe cell) stays small.
fn encode_at_most_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k >= vars.len() {
        return; // Always satisfiable.
    }
    for combo in vars.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
}

/// Encodes an "at least k" constraint into the CNF formula.
fn encode_at_least_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k == 0 {
        return; // Always satisfied.
    }
    if k > vars.len() {
        // Unsatisfiable - add empty clause.
        formula.add_clause(&[]);
        return;
    }
    for combo in vars.iter().copied().combinations(vars.len() - k + 1) {
        formula.add_clause(&combo);
    }
}
