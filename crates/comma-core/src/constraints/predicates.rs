//! Hand-written linguistic constraints over a sentence's commas.
//!
//! Each predicate grounds a universally quantified rule against the comma
//! subsets of one sentence and returns a [`Constraint`] tree. The rules
//! encode label-agreement knowledge ("commas in a coordinated list agree")
//! as hard constraints rather than soft features, trading recall for
//! within-sentence consistency.

use crate::sentence::{Label, Sentence};

use super::Constraint;

/// For every middle sibling comma, if both its previous and next sibling
/// commas are labeled List, the comma itself must be labeled List.
pub fn list_commas(sentence: &Sentence) -> Constraint {
    Constraint::for_all(sentence.middle_sibling_commas().into_iter().filter_map(|c| {
        let prev = sentence.previous_sibling_comma(c)?;
        let next = sentence.next_sibling_comma(c)?;
        Some(Constraint::implies(
            Constraint::and(vec![
                Constraint::is(prev.index(), Label::List),
                Constraint::is(next.index(), Label::List),
            ]),
            Constraint::is(c.index(), Label::List),
        ))
    }))
}

/// For every comma directly followed by the word "and", the comma must be
/// labeled List. The lexical test is data, not a decision variable, so it
/// grounds to a constant at build time.
pub fn oxford_comma(sentence: &Sentence) -> Constraint {
    Constraint::for_all(sentence.commas().iter().map(|c| {
        let followed_by_and = c.word_to_right(1).as_deref() == Some("and");
        Constraint::implies(
            Constraint::constant(followed_by_and),
            Constraint::is(c.index(), Label::List),
        )
    }))
}

/// First sibling comma of a group labeled `label` forces the next sibling
/// to agree.
fn pair_first_comma(sentence: &Sentence, label: Label) -> Constraint {
    Constraint::for_all(
        sentence
            .first_sibling_commas_not_last()
            .into_iter()
            .filter_map(|c| {
                let next = sentence.next_sibling_comma(c)?;
                Some(Constraint::implies(
                    Constraint::is(c.index(), label),
                    Constraint::is(next.index(), label),
                ))
            }),
    )
}

/// Middle sibling comma labeled `label` must have at least one adjacent
/// sibling agreeing.
fn pair_middle_commas(sentence: &Sentence, label: Label) -> Constraint {
    Constraint::for_all(sentence.middle_sibling_commas().into_iter().filter_map(|c| {
        let prev = sentence.previous_sibling_comma(c)?;
        let next = sentence.next_sibling_comma(c)?;
        Some(Constraint::implies(
            Constraint::is(c.index(), label),
            Constraint::or(vec![
                Constraint::is(next.index(), label),
                Constraint::is(prev.index(), label),
            ]),
        ))
    }))
}

pub fn locative_pair_first_comma(sentence: &Sentence) -> Constraint {
    pair_first_comma(sentence, Label::Locative)
}

pub fn locative_pair_middle_commas(sentence: &Sentence) -> Constraint {
    pair_middle_commas(sentence, Label::Locative)
}

/// Locative commas come in agreeing adjacent pairs.
pub fn locative_pair(sentence: &Sentence) -> Constraint {
    Constraint::and(vec![
        locative_pair_first_comma(sentence),
        locative_pair_middle_commas(sentence),
    ])
}

pub fn substitute_pair_first_comma(sentence: &Sentence) -> Constraint {
    pair_first_comma(sentence, Label::Substitute)
}

pub fn substitute_pair_middle_commas(sentence: &Sentence) -> Constraint {
    pair_middle_commas(sentence, Label::Substitute)
}

/// Substitute commas come in agreeing adjacent pairs.
pub fn substitute_pair(sentence: &Sentence) -> Constraint {
    Constraint::and(vec![
        substitute_pair_first_comma(sentence),
        substitute_pair_middle_commas(sentence),
    ])
}
