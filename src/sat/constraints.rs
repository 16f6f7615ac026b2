//! Clauses, the append-only clause set and cardinality helpers

use super::variables::{Lit, Var};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<Lit>,
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<Lit>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: Lit) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: Lit, lit2: Lit) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// Whether the clause holds under `value`
    pub fn is_satisfied_by<F: Fn(Var) -> bool>(&self, value: F) -> bool {
        self.literals.iter().any(|lit| value(lit.var()) == lit.is_positive())
    }
}

/// How at-most-one constraints are expanded into clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtMostOneEncoding {
    /// One binary clause per pair, no auxiliary variables
    #[default]
    Pairwise,
    /// Sinz ladder: `k - 1` auxiliaries and `3k - 4` clauses per group of `k`
    Sequential,
}

/// Append-only conjunction of clauses.
///
/// Builders take it by value or `&mut` and only ever push; concatenating sets
/// preserves the order of their clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
    max_var: i32,
}

impl ClauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, clause: Clause) {
        for lit in &clause.literals {
            self.max_var = self.max_var.max(lit.var().id());
        }
        self.clauses.push(clause);
    }

    pub fn add_unit(&mut self, lit: Lit) {
        self.add(Clause::unit(lit));
    }

    pub fn add_binary(&mut self, a: Lit, b: Lit) {
        self.add(Clause::binary(a, b));
    }

    /// Add the clause built from `lits`
    pub fn add_lits<I: IntoIterator<Item = Lit>>(&mut self, lits: I) {
        self.add(Clause::new(lits.into_iter().collect()));
    }

    /// Move every clause of `other` to the end of this set
    pub fn append(&mut self, other: ClauseSet) {
        self.max_var = self.max_var.max(other.max_var);
        self.clauses.extend(other.clauses);
    }

    /// At least one of `vars` is true. An empty group yields the empty clause.
    pub fn at_least_one(&mut self, vars: &[Var]) {
        self.add_lits(vars.iter().map(|v| v.positive()));
    }

    /// Pairwise at-most-one over `vars`
    pub fn at_most_one_pairwise(&mut self, vars: &[Var]) {
        for (a, b) in vars.iter().tuple_combinations() {
            self.add_binary(a.negative(), b.negative());
        }
    }

    /// Sequential (ladder) at-most-one over `vars` using `aux[i]` as
    /// "some of `vars[..=i]` is true". Needs `vars.len() - 1` auxiliaries.
    pub fn at_most_one_sequential(&mut self, vars: &[Var], aux: &[Var]) {
        let k = vars.len();
        if k <= 1 {
            return;
        }
        debug_assert!(aux.len() >= k - 1, "ladder needs {} auxiliaries, got {}", k - 1, aux.len());

        self.add_binary(vars[0].negative(), aux[0].positive());
        for i in 1..k - 1 {
            self.add_binary(vars[i].negative(), aux[i].positive());
            self.add_binary(aux[i - 1].negative(), aux[i].positive());
            self.add_binary(vars[i].negative(), aux[i - 1].negative());
        }
        self.add_binary(vars[k - 1].negative(), aux[k - 2].negative());
    }

    /// Exactly one of `vars`, expanded with `encoding`
    pub fn exactly_one(&mut self, vars: &[Var], encoding: AtMostOneEncoding, aux: &[Var]) {
        self.at_least_one(vars);
        match encoding {
            AtMostOneEncoding::Pairwise => self.at_most_one_pairwise(vars),
            AtMostOneEncoding::Sequential => self.at_most_one_sequential(vars, aux),
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Highest variable id mentioned by any clause
    pub fn max_var(&self) -> usize {
        self.max_var as usize
    }

    /// Whether the set contains the empty clause
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Write the set in DIMACS CNF format
    pub fn write_dimacs<W: Write>(&self, writer: &mut W, variable_count: usize) -> io::Result<()> {
        writeln!(writer, "p cnf {} {}", variable_count.max(self.max_var()), self.clauses.len())?;
        for clause in &self.clauses {
            for lit in &clause.literals {
                write!(writer, "{} ", lit.to_dimacs())?;
            }
            writeln!(writer, "0")?;
        }
        Ok(())
    }
}

impl IntoIterator for ClauseSet {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl FromIterator<ClauseSet> for ClauseSet {
    fn from_iter<I: IntoIterator<Item = ClauseSet>>(iter: I) -> Self {
        let mut set = ClauseSet::new();
        for part in iter {
            set.append(part);
        }
        set
    }
}
