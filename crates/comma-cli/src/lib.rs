//! Evaluation helpers for the `commatool` binary.
//!
//! Runs the local and constrained classifiers over a loaded pretty corpus
//! and reports per-classifier accuracy against gold labels. Sentences whose
//! inference fails are skipped and logged, not fatal.

use serde::Serialize;
use tracing::warn;

use comma_core::classifier::LocalClassifier;
use comma_core::corpus::PrettyCorpus;
use comma_core::inference::ConstrainedCommaClassifier;

/// Running correct/total tally.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// One labeled comma, for JSON output.
#[derive(Debug, Serialize)]
pub struct LabeledComma {
    pub sentence_id: String,
    pub comma_index: usize,
    pub position: usize,
    pub label: String,
    pub gold: Option<String>,
}

/// Accuracy of the unconstrained local classifier against gold labels.
pub fn evaluate_local(corpus: &PrettyCorpus, classifier: &dyn LocalClassifier) -> Accuracy {
    let mut acc = Accuracy::default();
    for record in &corpus.records {
        for comma in record.sentence.commas() {
            if let Some(gold) = comma.gold_label() {
                acc.record(classifier.predict(comma) == gold);
            }
        }
    }
    acc
}

/// Accuracy of a constrained classifier; failed sentences are skipped.
pub fn evaluate_constrained(
    corpus: &PrettyCorpus,
    facade: &ConstrainedCommaClassifier,
) -> Accuracy {
    let mut acc = Accuracy::default();
    for record in &corpus.records {
        for comma in record.sentence.commas() {
            let Some(gold) = comma.gold_label() else {
                continue;
            };
            match facade.label(comma) {
                Ok(label) => acc.record(label == gold),
                Err(e) => {
                    warn!(
                        id = %record.id,
                        error = %e,
                        "skipping sentence with failed inference"
                    );
                    break;
                }
            }
        }
    }
    acc
}

/// Constrained labels for every comma in the corpus, for the `label`
/// subcommand. Failed sentences are skipped and logged.
pub fn label_corpus(
    corpus: &PrettyCorpus,
    facade: &ConstrainedCommaClassifier,
) -> Vec<LabeledComma> {
    let mut out = Vec::new();
    for record in &corpus.records {
        for comma in record.sentence.commas() {
            match facade.label(comma) {
                Ok(label) => out.push(LabeledComma {
                    sentence_id: record.id.clone(),
                    comma_index: comma.index(),
                    position: comma.position(),
                    label: label.to_string(),
                    gold: comma.gold_label().map(|l| l.to_string()),
                }),
                Err(e) => {
                    warn!(id = %record.id, error = %e, "skipping failed sentence");
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use comma_core::classifier::LinearModel;
    use comma_core::constraints::ConstraintSet;
    use comma_core::corpus;
    use comma_core::ilp::BranchBoundSolver;
    use comma_core::inference::InferenceSession;
    use std::sync::Arc;
    use std::time::Duration;

    fn facade(set: ConstraintSet) -> ConstrainedCommaClassifier {
        let session = Arc::new(InferenceSession::with_capacity(
            Arc::new(LinearModel::new()),
            Arc::new(BranchBoundSolver::with_limits(
                1_000_000,
                Duration::from_secs(5),
            )),
            16,
        ));
        ConstrainedCommaClassifier::new(session, set)
    }

    #[test]
    fn test_accuracy_tally() {
        let mut acc = Accuracy::default();
        acc.record(true);
        acc.record(false);
        acc.record(true);
        assert_eq!(acc.correct, 2);
        assert_eq!(acc.total, 3);
        assert!((acc.value() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(Accuracy::default().value(), 0.0);
    }

    #[test]
    fn test_oxford_labeling_over_corpus() {
        let corpus = corpus::read_str(
            "s1\nI bought apples ,[List] oranges ,[List] and pears .\n",
        );
        let labeled = label_corpus(&corpus, &facade(ConstraintSet::OxfordComma));
        assert_eq!(labeled.len(), 2);
        // The comma before "and" is pinned to List by the constraint.
        assert_eq!(labeled[1].label, "List");
        assert_eq!(labeled[1].gold.as_deref(), Some("List"));
    }

    #[test]
    fn test_evaluate_constrained_counts_gold_commas() {
        let corpus = corpus::read_str("s1\na ,[Other] b , c\n");
        let acc = evaluate_constrained(&corpus, &facade(ConstraintSet::ListCommas));
        // Both commas have gold labels (bare comma defaults to Other).
        assert_eq!(acc.total, 2);
    }

    #[test]
    fn test_evaluate_local_with_zero_model() {
        let corpus = corpus::read_str("s1\na ,[List] b\n");
        let model = LinearModel::new();
        let acc = evaluate_local(&corpus, &model);
        assert_eq!(acc.total, 1);
        // Zero model predicts List (first in canonical order).
        assert_eq!(acc.correct, 1);
    }
}
