//! Symbolic constraints over a sentence's comma labels.
//!
//! One expression tree serves both consumers: [`Constraint::eval`] checks a
//! concrete label assignment, [`Constraint::clauses`] compiles the same tree
//! to CNF over (comma, label) literals for the ILP encoder. Keeping a single
//! representation means the checked semantics and the solved semantics
//! cannot drift apart.

pub mod predicates;

use std::fmt;
use std::str::FromStr;

use crate::sentence::{Label, Sentence};

/// A literal: comma `comma` is (or is not) labeled `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lit {
    pub comma: usize,
    pub label: Label,
    pub positive: bool,
}

impl Lit {
    fn negated(self) -> Lit {
        Lit {
            positive: !self.positive,
            ..self
        }
    }
}

/// Disjunction of literals.
pub type Clause = Vec<Lit>;

/// Immutable first-order constraint tree.
///
/// `ForAll` holds one instantiated body per quantified comma; quantifiers
/// are grounded at build time since the comma set of a sentence is fixed.
#[derive(Debug, Clone)]
pub enum Constraint {
    Constant(bool),
    /// Leaf binding a comma's classifier variable to a candidate label.
    Is {
        comma: usize,
        label: Label,
    },
    Not(Box<Constraint>),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
    Implies(Box<Constraint>, Box<Constraint>),
    ForAll(Vec<Constraint>),
}

impl Constraint {
    pub fn is(comma: usize, label: Label) -> Constraint {
        Constraint::Is { comma, label }
    }

    pub fn constant(value: bool) -> Constraint {
        Constraint::Constant(value)
    }

    pub fn not(inner: Constraint) -> Constraint {
        Constraint::Not(Box::new(inner))
    }

    pub fn and(parts: Vec<Constraint>) -> Constraint {
        Constraint::And(parts)
    }

    pub fn or(parts: Vec<Constraint>) -> Constraint {
        Constraint::Or(parts)
    }

    pub fn implies(antecedent: Constraint, consequent: Constraint) -> Constraint {
        Constraint::Implies(Box::new(antecedent), Box::new(consequent))
    }

    pub fn for_all<I: IntoIterator<Item = Constraint>>(bodies: I) -> Constraint {
        Constraint::ForAll(bodies.into_iter().collect())
    }

    /// Evaluate against concrete labels (indexed by comma index),
    /// short-circuiting on the first decided subterm.
    pub fn eval(&self, labels: &[Label]) -> bool {
        match self {
            Constraint::Constant(v) => *v,
            Constraint::Is { comma, label } => labels.get(*comma) == Some(label),
            Constraint::Not(inner) => !inner.eval(labels),
            Constraint::And(parts) | Constraint::ForAll(parts) => {
                parts.iter().all(|p| p.eval(labels))
            }
            Constraint::Or(parts) => parts.iter().any(|p| p.eval(labels)),
            Constraint::Implies(a, b) => !a.eval(labels) || b.eval(labels),
        }
    }

    /// Compile to CNF clauses over (comma, label) literals.
    ///
    /// An empty clause list means the constraint is trivially true; a list
    /// containing an empty clause is unsatisfiable. Trees here are small
    /// (a handful of commas per sentence), so plain distribution suffices.
    pub fn clauses(&self) -> Vec<Clause> {
        self.cnf(false)
    }

    fn cnf(&self, negate: bool) -> Vec<Clause> {
        match self {
            Constraint::Constant(v) => {
                if *v != negate {
                    Vec::new()
                } else {
                    vec![Vec::new()]
                }
            }
            Constraint::Is { comma, label } => vec![vec![Lit {
                comma: *comma,
                label: *label,
                positive: !negate,
            }]],
            Constraint::Not(inner) => inner.cnf(!negate),
            Constraint::And(parts) | Constraint::ForAll(parts) => {
                if !negate {
                    parts.iter().flat_map(|p| p.cnf(false)).collect()
                } else {
                    distribute(parts.iter().map(|p| p.cnf(true)))
                }
            }
            Constraint::Or(parts) => {
                if !negate {
                    distribute(parts.iter().map(|p| p.cnf(false)))
                } else {
                    parts.iter().flat_map(|p| p.cnf(true)).collect()
                }
            }
            Constraint::Implies(a, b) => {
                if !negate {
                    distribute([a.cnf(true), b.cnf(false)])
                } else {
                    // ¬(A ⇒ B) = A ∧ ¬B
                    let mut out = a.cnf(false);
                    out.extend(b.cnf(true));
                    out
                }
            }
        }
    }
}

/// CNF of a disjunction: cross-product of the children's clause sets.
/// Tautological clauses (a literal and its negation) are dropped and
/// duplicate literals within a clause are merged.
fn distribute<I: IntoIterator<Item = Vec<Clause>>>(children: I) -> Vec<Clause> {
    let mut acc: Vec<Clause> = vec![Vec::new()];
    for child in children {
        // A trivially-true disjunct makes the whole disjunction true.
        if child.is_empty() {
            return Vec::new();
        }
        let mut next = Vec::with_capacity(acc.len() * child.len());
        for base in &acc {
            for clause in &child {
                if let Some(merged) = merge_clause(base, clause) {
                    next.push(merged);
                }
            }
        }
        acc = next;
    }
    acc
}

fn merge_clause(a: &Clause, b: &Clause) -> Option<Clause> {
    let mut out = a.clone();
    for &lit in b {
        if out.contains(&lit.negated()) {
            return None; // tautology
        }
        if !out.contains(&lit) {
            out.push(lit);
        }
    }
    Some(out)
}

/// Which constraint family an inference run enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintSet {
    ListCommas,
    OxfordComma,
    LocativePair,
    SubstitutePair,
}

impl ConstraintSet {
    pub const ALL: [ConstraintSet; 4] = [
        ConstraintSet::ListCommas,
        ConstraintSet::OxfordComma,
        ConstraintSet::LocativePair,
        ConstraintSet::SubstitutePair,
    ];

    /// Build the grounded constraint tree for one sentence.
    pub fn build(self, sentence: &Sentence) -> Constraint {
        match self {
            ConstraintSet::ListCommas => predicates::list_commas(sentence),
            ConstraintSet::OxfordComma => predicates::oxford_comma(sentence),
            ConstraintSet::LocativePair => predicates::locative_pair(sentence),
            ConstraintSet::SubstitutePair => predicates::substitute_pair(sentence),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintSet::ListCommas => "list-commas",
            ConstraintSet::OxfordComma => "oxford-comma",
            ConstraintSet::LocativePair => "locative-pair",
            ConstraintSet::SubstitutePair => "substitute-pair",
        }
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintSet::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown constraint set: {s}"))
    }
}
