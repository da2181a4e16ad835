//! Local (per-comma) classification.
//!
//! `LinearModel` stores sparse feature → per-label weight rows; scoring is a
//! dot product over the features extracted for a comma. Training happens
//! offline; at inference time the model is a pure lookup.

mod model_io;

use std::collections::HashMap;
use std::sync::Arc;

use crate::features;
use crate::sentence::{Comma, Label, LABELS};

pub use model_io::ModelError;

/// Per-comma scorer feeding the ILP objective.
///
/// Implementations must be deterministic for a fixed model: `predict` is
/// the score argmax with ties broken by canonical label order.
pub trait LocalClassifier: Send + Sync {
    /// Raw score of assigning `label` to `comma`.
    fn score(&self, comma: &Comma, label: Label) -> f64;

    /// Unconstrained prediction: highest-scoring label, earliest label in
    /// canonical order on ties.
    fn predict(&self, comma: &Comma) -> Label {
        let mut best = LABELS[0];
        let mut best_score = self.score(comma, best);
        for &label in &LABELS[1..] {
            let s = self.score(comma, label);
            if s > best_score {
                best = label;
                best_score = s;
            }
        }
        best
    }
}

impl<T: LocalClassifier + ?Sized> LocalClassifier for Arc<T> {
    fn score(&self, comma: &Comma, label: Label) -> f64 {
        (**self).score(comma, label)
    }

    fn predict(&self, comma: &Comma) -> Label {
        (**self).predict(comma)
    }
}

/// Sparse linear multi-class model: feature string → one weight per label.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinearModel {
    weights: HashMap<String, [f64; Label::COUNT]>,
    bias: [f64; Label::COUNT],
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from explicit feature weights. Used by tests and by
    /// offline training pipelines that export per-feature rows.
    pub fn from_weights<I, S>(weights: I, bias: [f64; Label::COUNT]) -> Self
    where
        I: IntoIterator<Item = (S, [f64; Label::COUNT])>,
        S: Into<String>,
    {
        Self {
            weights: weights.into_iter().map(|(f, w)| (f.into(), w)).collect(),
            bias,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn score_features(&self, features: &[String], label: Label) -> f64 {
        let li = label.index();
        let mut total = self.bias[li];
        for f in features {
            if let Some(row) = self.weights.get(f) {
                total += row[li];
            }
        }
        total
    }
}

impl LocalClassifier for LinearModel {
    fn score(&self, comma: &Comma, label: Label) -> f64 {
        let feats = features::extract(comma);
        self.score_features(&feats, label)
    }
}
