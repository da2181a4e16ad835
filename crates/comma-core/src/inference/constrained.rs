//! Constrained-classifier façades.
//!
//! Each façade is a read-through client of an [`InferenceSession`]: it
//! locates a comma's sentence, fetches or builds the cached joint solve for
//! its constraint set, and returns that comma's corrected label.

use std::sync::Arc;

use crate::constraints::ConstraintSet;
use crate::sentence::{Comma, Label};

use super::{InferenceError, InferenceSession};

pub struct ConstrainedCommaClassifier {
    session: Arc<InferenceSession>,
    set: ConstraintSet,
}

impl ConstrainedCommaClassifier {
    pub fn new(session: Arc<InferenceSession>, set: ConstraintSet) -> Self {
        Self { session, set }
    }

    pub fn list_commas(session: Arc<InferenceSession>) -> Self {
        Self::new(session, ConstraintSet::ListCommas)
    }

    pub fn oxford_comma(session: Arc<InferenceSession>) -> Self {
        Self::new(session, ConstraintSet::OxfordComma)
    }

    pub fn locative_pair(session: Arc<InferenceSession>) -> Self {
        Self::new(session, ConstraintSet::LocativePair)
    }

    pub fn substitute_pair(session: Arc<InferenceSession>) -> Self {
        Self::new(session, ConstraintSet::SubstitutePair)
    }

    pub fn constraint_set(&self) -> ConstraintSet {
        self.set
    }

    /// The comma's label under the jointly solved sentence assignment.
    pub fn label(&self, comma: &Comma) -> Result<Label, InferenceError> {
        self.session.label(self.set, comma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LinearModel;
    use crate::ilp::BranchBoundSolver;
    use crate::sentence::Sentence;
    use std::time::Duration;

    fn session() -> Arc<InferenceSession> {
        Arc::new(InferenceSession::with_capacity(
            Arc::new(LinearModel::new()),
            Arc::new(BranchBoundSolver::with_limits(
                1_000_000,
                Duration::from_secs(5),
            )),
            8,
        ))
    }

    #[test]
    fn test_facade_routes_through_session() {
        let s = Sentence::new(&["apples", ",", "oranges", ",", "and", "pears"]);
        let oxford = ConstrainedCommaClassifier::oxford_comma(session());
        assert_eq!(oxford.constraint_set(), ConstraintSet::OxfordComma);
        // Zero model scores everything equally; the Oxford constraint still
        // pins the comma before "and" to List.
        assert_eq!(oxford.label(&s.commas()[1]).unwrap(), Label::List);
    }

    #[test]
    fn test_facades_share_one_session_cache() {
        let s = Sentence::new(&["a", ",", "b"]);
        let shared = session();
        let list = ConstrainedCommaClassifier::list_commas(Arc::clone(&shared));
        let locative = ConstrainedCommaClassifier::locative_pair(Arc::clone(&shared));
        list.label(&s.commas()[0]).unwrap();
        locative.label(&s.commas()[0]).unwrap();
        assert_eq!(shared.cached_sentences(), 2);
    }

    #[test]
    fn test_missing_context_surfaces() {
        let facade = ConstrainedCommaClassifier::substitute_pair(session());
        let orphan = Comma::orphaned(0, 1);
        assert!(matches!(
            facade.label(&orphan),
            Err(InferenceError::MissingContext)
        ));
    }
}
