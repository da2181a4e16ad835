//! Per-sentence constrained inference with a bounded, session-scoped cache.
//!
//! An `InferenceSession` owns the classifier and solver it was constructed
//! with and caches one solved label assignment per (constraint set,
//! sentence). Cache cells are `OnceLock`s, so concurrent requests for the
//! same uncached sentence block on a single solve.

mod constrained;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, debug_span};

use crate::classifier::LocalClassifier;
use crate::constraints::{Clause, ConstraintSet};
use crate::ilp::{IlpError, IlpProblem, IlpSolution, IlpSolver};
use crate::sentence::{Comma, Label, Sentence, LABELS};
use crate::settings::settings;

pub use constrained::ConstrainedCommaClassifier;

#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    /// The queried comma's owning sentence has been dropped.
    #[error("comma has no owning sentence")]
    MissingContext,

    /// The constraint set admits no label assignment for the sentence.
    #[error("constraints are infeasible for sentence {sentence_id}")]
    Infeasible { sentence_id: u64 },

    #[error("ILP solver failed: {0}")]
    Solver(IlpError),
}

/// Solved per-comma labels for one sentence under one constraint set.
#[derive(Debug)]
pub struct LabelAssignment {
    sentence_id: u64,
    labels: Vec<Label>,
}

impl LabelAssignment {
    pub fn sentence_id(&self) -> u64 {
        self.sentence_id
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, comma_index: usize) -> Option<Label> {
        self.labels.get(comma_index).copied()
    }

    /// Label of a comma belonging to the solved sentence.
    ///
    /// Panics if the comma belongs to a different sentence; passing a
    /// foreign comma is a caller bug, not a runtime condition.
    pub fn label_of(&self, comma: &Comma) -> Label {
        let owner = comma.sentence().map(|s| s.id());
        assert_eq!(
            owner,
            Some(self.sentence_id),
            "comma does not belong to the solved sentence"
        );
        self.labels[comma.index()]
    }
}

type SolveResult = Result<Arc<LabelAssignment>, InferenceError>;
type CacheKey = (ConstraintSet, u64);

struct CacheEntry {
    cell: Arc<OnceLock<SolveResult>>,
    last_used: u64,
}

/// Caller-owned inference engine.
///
/// Classifier and solver are injected at construction; the solved-sentence
/// cache is bounded with least-recently-used eviction and can be cleared
/// between documents.
pub struct InferenceSession {
    classifier: Arc<dyn LocalClassifier>,
    solver: Arc<dyn IlpSolver>,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
    capacity: usize,
    tick: AtomicU64,
}

impl InferenceSession {
    /// Session with the cache capacity from global settings.
    pub fn new(classifier: Arc<dyn LocalClassifier>, solver: Arc<dyn IlpSolver>) -> Self {
        Self::with_capacity(classifier, solver, settings().inference.cache_capacity)
    }

    pub fn with_capacity(
        classifier: Arc<dyn LocalClassifier>,
        solver: Arc<dyn IlpSolver>,
        capacity: usize,
    ) -> Self {
        assert!(capacity >= 1, "cache capacity must be at least 1");
        Self {
            classifier,
            solver,
            cache: Mutex::new(HashMap::new()),
            capacity,
            tick: AtomicU64::new(0),
        }
    }

    pub fn classifier(&self) -> &Arc<dyn LocalClassifier> {
        &self.classifier
    }

    /// Drop all cached assignments (e.g. between documents).
    pub fn clear(&self) {
        self.cache.lock().expect("cache lock poisoned").clear();
    }

    pub fn cached_sentences(&self) -> usize {
        self.cache.lock().expect("cache lock poisoned").len()
    }

    /// The solved assignment for a sentence under `set`, computed at most
    /// once per cache residency.
    pub fn labels(
        &self,
        set: ConstraintSet,
        sentence: &Arc<Sentence>,
    ) -> Result<Arc<LabelAssignment>, InferenceError> {
        let key = (set, sentence.id());
        let cell = {
            let mut cache = self.cache.lock().expect("cache lock poisoned");
            let tick = self.tick.fetch_add(1, Ordering::Relaxed);
            let entry = cache.entry(key).or_insert_with(|| CacheEntry {
                cell: Arc::new(OnceLock::new()),
                last_used: tick,
            });
            entry.last_used = tick;
            let cell = Arc::clone(&entry.cell);
            if cache.len() > self.capacity {
                evict_lru(&mut cache, key);
            }
            cell
        };
        // Initialization runs outside the map lock; concurrent callers for
        // the same key block here on the one in-flight solve.
        cell.get_or_init(|| self.solve_sentence(set, sentence)).clone()
    }

    /// Solved label for one comma under `set`.
    pub fn label(&self, set: ConstraintSet, comma: &Comma) -> Result<Label, InferenceError> {
        let sentence = comma.sentence().ok_or(InferenceError::MissingContext)?;
        let assignment = self.labels(set, &sentence)?;
        Ok(assignment.labels[comma.index()])
    }

    fn solve_sentence(&self, set: ConstraintSet, sentence: &Sentence) -> SolveResult {
        let _span =
            debug_span!("solve_sentence", set = %set, sentence = sentence.id()).entered();

        let constraint = set.build(sentence);
        let problem = compile(sentence, self.classifier.as_ref(), &constraint.clauses());
        let solution = self.solver.solve(&problem).map_err(|e| match e {
            IlpError::Infeasible => InferenceError::Infeasible {
                sentence_id: sentence.id(),
            },
            other => InferenceError::Solver(other),
        })?;
        let assignment = decode(sentence, &solution);
        debug!(labels = ?assignment.labels);
        Ok(Arc::new(assignment))
    }
}

fn evict_lru(cache: &mut HashMap<CacheKey, CacheEntry>, keep: CacheKey) {
    let victim = cache
        .iter()
        .filter(|(k, _)| **k != keep)
        .min_by_key(|(_, e)| e.last_used)
        .map(|(k, _)| *k);
    if let Some(k) = victim {
        cache.remove(&k);
    }
}

fn var(comma_index: usize, label: Label) -> usize {
    comma_index * Label::COUNT + label.index()
}

/// Map each (comma, label) pair to a boolean variable with the classifier
/// score as objective coefficient, one exactly-one constraint per comma,
/// and one ≥-constraint per CNF clause.
fn compile(sentence: &Sentence, classifier: &dyn LocalClassifier, clauses: &[Clause]) -> IlpProblem {
    let mut problem = IlpProblem::new();
    for comma in sentence.commas() {
        for &label in &LABELS {
            problem.add_boolean_variable(classifier.score(comma, label));
        }
        let indices: Vec<usize> = LABELS.iter().map(|&l| var(comma.index(), l)).collect();
        problem.add_equality_constraint(indices, vec![1.0; Label::COUNT], 1.0);
    }
    for clause in clauses {
        // sum(pos) + sum(1 - neg) >= 1
        let indices: Vec<usize> = clause.iter().map(|l| var(l.comma, l.label)).collect();
        let coeffs: Vec<f64> = clause
            .iter()
            .map(|l| if l.positive { 1.0 } else { -1.0 })
            .collect();
        let negatives = clause.iter().filter(|l| !l.positive).count() as f64;
        problem.add_greater_than_constraint(indices, coeffs, 1.0 - negatives);
    }
    problem
}

fn decode(sentence: &Sentence, solution: &IlpSolution) -> LabelAssignment {
    let labels = sentence
        .commas()
        .iter()
        .map(|comma| {
            LABELS
                .iter()
                .copied()
                .find(|&l| solution.value(var(comma.index(), l)))
                .expect("exactly-one constraint guarantees a label per comma")
        })
        .collect();
    LabelAssignment {
        sentence_id: sentence.id(),
        labels,
    }
}
