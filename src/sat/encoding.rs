#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Clause-level encodings of the constraints the puzzle models need.
//!
//! Cardinality constraints over a handful of literals (a Sudoku row, a queen
//! region) use the pairwise encoding. Larger sums (balanced Tango lines)
//! use the sequential counter of Sinz (2005), which needs `(n - 1) * k`
//! auxiliary variables and `O(n * k)` clauses.

use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use itertools::Itertools;

/// `l1 ∨ l2 ∨ … ∨ ln`.
pub fn at_least_one(cnf: &mut Cnf, lits: &[Literal]) {
    cnf.add_clause(lits.iter().copied());
}

/// Pairwise `¬li ∨ ¬lj` for every pair.
pub fn at_most_one(cnf: &mut Cnf, lits: &[Literal]) {
    for (&a, &b) in lits.iter().tuple_combinations() {
        cnf.add_clause([!a, !b]);
    }
}

/// Exactly one of `lits` is true.
pub fn exactly_one(cnf: &mut Cnf, lits: &[Literal]) {
    at_least_one(cnf, lits);
    at_most_one(cnf, lits);
}

/// At most `k` of `lits` are true.
pub fn at_most_k(cnf: &mut Cnf, lits: &[Literal], k: usize) {
    let n = lits.len();
    if k >= n {
        return;
    }
    if k == 0 {
        for &lit in lits {
            cnf.add_clause([!lit]);
        }
        return;
    }
    if k == 1 {
        at_most_one(cnf, lits);
        return;
    }

    // s[i][j] holds when at least j + 1 of lits[0..=i] are true.
    let s: Vec<Vec<Literal>> = (0..n - 1).map(|_| cnf.new_vars(k)).collect();

    cnf.add_clause([!lits[0], s[0][0]]);
    for &counter in &s[0][1..] {
        cnf.add_clause([!counter]);
    }

    for i in 1..n - 1 {
        cnf.add_clause([!lits[i], s[i][0]]);
        cnf.add_clause([!s[i - 1][0], s[i][0]]);
        for j in 1..k {
            cnf.add_clause([!lits[i], !s[i - 1][j - 1], s[i][j]]);
            cnf.add_clause([!s[i - 1][j], s[i][j]]);
        }
        cnf.add_clause([!lits[i], !s[i - 1][k - 1]]);
    }

    cnf.add_clause([!lits[n - 1], !s[n - 2][k - 1]]);
}

/// At least `k` of `lits` are true, encoded as "at most `n - k` are false".
pub fn at_least_k(cnf: &mut Cnf, lits: &[Literal], k: usize) {
    if k == 0 {
        return;
    }
    if k > lits.len() {
        cnf.add_clause(std::iter::empty());
        return;
    }
    if k == 1 {
        at_least_one(cnf, lits);
        return;
    }
    let negated = lits.iter().map(|&lit| !lit).collect_vec();
    at_most_k(cnf, &negated, lits.len() - k);
}

/// Exactly `k` of `lits` are true.
pub fn exactly_k(cnf: &mut Cnf, lits: &[Literal], k: usize) {
    at_most_k(cnf, lits, k);
    at_least_k(cnf, lits, k);
}

/// `a ↔ b`.
pub fn equal(cnf: &mut Cnf, a: Literal, b: Literal) {
    cnf.add_clause([!a, b]);
    cnf.add_clause([a, !b]);
}

/// `a ⊕ b`.
pub fn not_equal(cnf: &mut Cnf, a: Literal, b: Literal) {
    cnf.add_clause([a, b]);
    cnf.add_clause([!a, !b]);
}

/// `condition → (l1 ∨ … ∨ ln)`.
pub fn implies(cnf: &mut Cnf, condition: Literal, clause: &[Literal]) {
    cnf.add_clause(std::iter::once(!condition).chain(clause.iter().copied()));
}

/// Tseitin definition `out ↔ (l1 ∨ … ∨ ln)`.
pub fn or_equals(cnf: &mut Cnf, out: Literal, inputs: &[Literal]) {
    implies(cnf, out, inputs);
    for &input in inputs {
        cnf.add_clause([!input, out]);
    }
}
