//! Sentence and comma data model.
//!
//! A `Sentence` groups all the commas of one parsed sentence; commas are then
//! accessed by positional relations to each other (next/previous sibling,
//! middle, first-not-last). Sentences are immutable after construction and
//! carry a process-unique id used as the inference cache key.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Comma role label. Declaration order is the canonical order used for
/// argmax tie-breaking and for the solver's deterministic preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    List,
    Locative,
    Substitute,
    Attribute,
    Other,
}

/// All labels in canonical order.
pub const LABELS: [Label; 5] = [
    Label::List,
    Label::Locative,
    Label::Substitute,
    Label::Attribute,
    Label::Other,
];

impl Label {
    pub const COUNT: usize = 5;

    /// Position in the canonical ordering.
    pub fn index(self) -> usize {
        LABELS.iter().position(|&l| l == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Label> {
        LABELS.get(i).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::List => "List",
            Label::Locative => "Locative",
            Label::Substitute => "Substitute",
            Label::Attribute => "Attribute",
            Label::Other => "Other",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LABELS
            .iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown comma label: {0}")]
pub struct UnknownLabel(pub String);

#[derive(Debug, thiserror::Error)]
pub enum SentenceError {
    #[error("POS sequence has {pos} tags for {tokens} tokens")]
    PosLengthMismatch { pos: usize, tokens: usize },

    #[error("expected {expected} comma annotations, got {got}")]
    CommaCountMismatch { expected: usize, got: usize },
}

static NEXT_SENTENCE_ID: AtomicU64 = AtomicU64::new(1);

/// One comma token plus its positional context within the owning sentence.
///
/// Identity is positional: `index` is the rank among the sentence's commas,
/// `position` the token offset. The back-reference to the sentence is weak;
/// a comma outliving its sentence yields `None` from [`Comma::sentence`],
/// which the inference layer surfaces as a missing-context error.
#[derive(Debug)]
pub struct Comma {
    index: usize,
    position: usize,
    sibling_group: usize,
    gold: Option<Label>,
    sentence: Weak<Sentence>,
}

impl Comma {
    /// Rank among the sentence's commas, in token order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Token offset of the comma within the sentence.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parse-sibling group id. Commas sharing a group are siblings.
    pub fn sibling_group(&self) -> usize {
        self.sibling_group
    }

    /// Gold-standard label, if the corpus provided one.
    pub fn gold_label(&self) -> Option<Label> {
        self.gold
    }

    /// The owning sentence, or `None` if it has been dropped.
    pub fn sentence(&self) -> Option<Arc<Sentence>> {
        self.sentence.upgrade()
    }

    /// Token `distance` positions to the right of the comma.
    /// Distance 0 is the comma itself.
    pub fn word_to_right(&self, distance: usize) -> Option<String> {
        let s = self.sentence()?;
        s.tokens.get(self.position + distance).cloned()
    }

    /// Token `distance` positions to the left of the comma.
    pub fn word_to_left(&self, distance: usize) -> Option<String> {
        let s = self.sentence()?;
        let idx = self.position.checked_sub(distance)?;
        s.tokens.get(idx).cloned()
    }

    /// POS tag `distance` positions to the right, if POS tags are attached.
    pub fn pos_to_right(&self, distance: usize) -> Option<String> {
        let s = self.sentence()?;
        s.pos.get(self.position + distance).cloned()
    }

    /// POS tag `distance` positions to the left, if POS tags are attached.
    pub fn pos_to_left(&self, distance: usize) -> Option<String> {
        let s = self.sentence()?;
        let idx = self.position.checked_sub(distance)?;
        s.pos.get(idx).cloned()
    }

    /// A comma whose owning sentence has been dropped.
    #[cfg(test)]
    pub(crate) fn orphaned(index: usize, position: usize) -> Comma {
        Comma {
            index,
            position,
            sibling_group: 0,
            gold: None,
            sentence: Weak::new(),
        }
    }
}

/// An ordered group of commas belonging to one sentence.
#[derive(Debug)]
pub struct Sentence {
    id: u64,
    tokens: Vec<String>,
    pos: Vec<String>,
    commas: Vec<Comma>,
}

impl Sentence {
    /// Build a sentence from raw tokens. Every `,` token becomes a comma;
    /// all commas land in a single sibling group and carry no gold label.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Arc<Sentence> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let positions = comma_positions(&tokens);
        let n = positions.len();
        Self::build(tokens, Vec::new(), positions, vec![0; n], vec![None; n])
    }

    /// Build a sentence with per-comma annotations.
    ///
    /// `gold` and `groups` are indexed per comma in token order and must
    /// match the number of `,` tokens. `pos`, when given, must cover every
    /// token. Pass `None` for `groups` to treat all commas as siblings.
    pub fn annotated<S: AsRef<str>>(
        tokens: &[S],
        pos: Option<&[S]>,
        gold: &[Option<Label>],
        groups: Option<&[usize]>,
    ) -> Result<Arc<Sentence>, SentenceError> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let pos: Vec<String> = match pos {
            Some(p) => {
                if p.len() != tokens.len() {
                    return Err(SentenceError::PosLengthMismatch {
                        pos: p.len(),
                        tokens: tokens.len(),
                    });
                }
                p.iter().map(|t| t.as_ref().to_string()).collect()
            }
            None => Vec::new(),
        };
        let positions = comma_positions(&tokens);
        if gold.len() != positions.len() {
            return Err(SentenceError::CommaCountMismatch {
                expected: positions.len(),
                got: gold.len(),
            });
        }
        let groups = match groups {
            Some(g) => {
                if g.len() != positions.len() {
                    return Err(SentenceError::CommaCountMismatch {
                        expected: positions.len(),
                        got: g.len(),
                    });
                }
                g.to_vec()
            }
            None => vec![0; positions.len()],
        };
        Ok(Self::build(tokens, pos, positions, groups, gold.to_vec()))
    }

    fn build(
        tokens: Vec<String>,
        pos: Vec<String>,
        positions: Vec<usize>,
        groups: Vec<usize>,
        gold: Vec<Option<Label>>,
    ) -> Arc<Sentence> {
        let id = NEXT_SENTENCE_ID.fetch_add(1, Ordering::Relaxed);
        Arc::new_cyclic(|weak: &Weak<Sentence>| {
            let commas = positions
                .into_iter()
                .zip(groups)
                .zip(gold)
                .enumerate()
                .map(|(index, ((position, sibling_group), gold))| Comma {
                    index,
                    position,
                    sibling_group,
                    gold,
                    sentence: weak.clone(),
                })
                .collect();
            Sentence {
                id,
                tokens,
                pos,
                commas,
            }
        })
    }

    /// Process-unique identity, used as the inference cache key.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Commas in the sentence, ordered by token position.
    pub fn commas(&self) -> &[Comma] {
        &self.commas
    }

    pub fn comma(&self, index: usize) -> Option<&Comma> {
        self.commas.get(index)
    }

    /// Closest following comma within the same sibling group.
    pub fn next_sibling_comma(&self, comma: &Comma) -> Option<&Comma> {
        self.commas
            .iter()
            .filter(|c| c.sibling_group == comma.sibling_group && c.position > comma.position)
            .min_by_key(|c| c.position)
    }

    /// Closest preceding comma within the same sibling group.
    pub fn previous_sibling_comma(&self, comma: &Comma) -> Option<&Comma> {
        self.commas
            .iter()
            .filter(|c| c.sibling_group == comma.sibling_group && c.position < comma.position)
            .max_by_key(|c| c.position)
    }

    /// Sibling commas with both a preceding and a following sibling.
    pub fn middle_sibling_commas(&self) -> Vec<&Comma> {
        self.commas
            .iter()
            .filter(|c| {
                self.next_sibling_comma(c).is_some() && self.previous_sibling_comma(c).is_some()
            })
            .collect()
    }

    /// Sibling commas that open a group of two or more: a following sibling
    /// exists but no preceding one.
    pub fn first_sibling_commas_not_last(&self) -> Vec<&Comma> {
        self.commas
            .iter()
            .filter(|c| {
                self.next_sibling_comma(c).is_some() && self.previous_sibling_comma(c).is_none()
            })
            .collect()
    }

    /// The sentence text with gold labels embedded after each comma.
    pub fn annotated_text(&self) -> String {
        let mut out = String::new();
        let mut comma_iter = self.commas.iter().peekable();
        for (idx, token) in self.tokens.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            out.push_str(token);
            while let Some(c) = comma_iter.peek() {
                if c.position != idx {
                    break;
                }
                if let Some(label) = c.gold {
                    out.push('[');
                    out.push_str(label.as_str());
                    out.push(']');
                }
                comma_iter.next();
            }
        }
        out
    }
}

fn comma_positions(tokens: &[String]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() == ",")
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Arc<Sentence> {
        // "I bought apples , oranges , and pears ."
        Sentence::new(&["I", "bought", "apples", ",", "oranges", ",", "and", "pears", "."])
    }

    #[test]
    fn test_comma_positions_and_ids() {
        let s = sample();
        assert_eq!(s.commas().len(), 2);
        assert_eq!(s.commas()[0].position(), 3);
        assert_eq!(s.commas()[1].position(), 5);
        assert_eq!(s.commas()[0].index(), 0);
        let s2 = sample();
        assert_ne!(s.id(), s2.id());
    }

    #[test]
    fn test_lexical_accessors() {
        let s = sample();
        let c = &s.commas()[1];
        assert_eq!(c.word_to_right(1).as_deref(), Some("and"));
        assert_eq!(c.word_to_left(1).as_deref(), Some("oranges"));
        assert_eq!(c.word_to_right(0).as_deref(), Some(","));
        assert_eq!(c.word_to_right(10), None);
        assert_eq!(c.word_to_left(10), None);
        // No POS attached
        assert_eq!(c.pos_to_right(1), None);
    }

    #[test]
    fn test_sibling_relations() {
        let s = Sentence::new(&["a", ",", "b", ",", "c", ",", "d"]);
        let commas = s.commas();
        assert_eq!(commas.len(), 3);
        assert_eq!(
            s.next_sibling_comma(&commas[0]).map(|c| c.index()),
            Some(1)
        );
        assert_eq!(
            s.previous_sibling_comma(&commas[2]).map(|c| c.index()),
            Some(1)
        );
        assert_eq!(s.previous_sibling_comma(&commas[0]).map(|c| c.index()), None);

        let middle: Vec<usize> = s.middle_sibling_commas().iter().map(|c| c.index()).collect();
        assert_eq!(middle, vec![1]);
        let first: Vec<usize> = s
            .first_sibling_commas_not_last()
            .iter()
            .map(|c| c.index())
            .collect();
        assert_eq!(first, vec![0]);
    }

    #[test]
    fn test_sibling_groups_partition() {
        // Two groups: {0, 2} and {1}
        let s = Sentence::annotated(
            &["a", ",", "b", ",", "c", ",", "d"],
            None,
            &[None, None, None],
            Some(&[0, 1, 0]),
        )
        .unwrap();
        let commas = s.commas();
        assert_eq!(
            s.next_sibling_comma(&commas[0]).map(|c| c.index()),
            Some(2)
        );
        assert_eq!(s.next_sibling_comma(&commas[1]).map(|c| c.index()), None);
        assert!(s.middle_sibling_commas().is_empty());
    }

    #[test]
    fn test_annotated_validation() {
        let err = Sentence::annotated(&["a", ",", "b"], None, &[], None).unwrap_err();
        assert!(matches!(
            err,
            SentenceError::CommaCountMismatch { expected: 1, got: 0 }
        ));
        let err =
            Sentence::annotated(&["a", ",", "b"], Some(&["DT"]), &[Some(Label::Other)], None)
                .unwrap_err();
        assert!(matches!(err, SentenceError::PosLengthMismatch { .. }));
    }

    #[test]
    fn test_annotated_text() {
        let s = Sentence::annotated(
            &["apples", ",", "oranges", ",", "and", "pears"],
            None,
            &[Some(Label::List), Some(Label::List)],
            None,
        )
        .unwrap();
        assert_eq!(
            s.annotated_text(),
            "apples ,[List] oranges ,[List] and pears"
        );
    }

    #[test]
    fn test_missing_sentence_context() {
        let comma = Comma::orphaned(0, 3);
        assert!(comma.sentence().is_none());
        assert_eq!(comma.word_to_right(1), None);
        assert_eq!(comma.pos_to_left(1), None);
    }

    #[test]
    fn test_label_parse_and_order() {
        assert_eq!("list".parse::<Label>().unwrap(), Label::List);
        assert_eq!("Locative".parse::<Label>().unwrap(), Label::Locative);
        assert!("Quotation".parse::<Label>().is_err());
        assert_eq!(Label::List.index(), 0);
        assert_eq!(Label::from_index(4), Some(Label::Other));
        assert_eq!(Label::from_index(5), None);
    }
}
