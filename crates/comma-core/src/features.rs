//! Feature extraction for the local comma classifier.
//!
//! Pure functions mapping a comma context to string-valued features: word
//! and POS n-grams in a window around the comma, plus sibling-shape
//! features. Out-of-range positions use the `$$$` sentinel so that boundary
//! proximity is itself a feature.

use crate::sentence::Comma;

/// Sentinel for positions outside the sentence.
pub const BOUNDARY: &str = "$$$";

/// Window radius for word and POS n-grams.
const WINDOW: usize = 2;

fn word_at(comma: &Comma, offset: isize) -> String {
    let w = if offset >= 0 {
        comma.word_to_right(offset as usize)
    } else {
        comma.word_to_left((-offset) as usize)
    };
    w.unwrap_or_else(|| BOUNDARY.to_string())
}

fn pos_at(comma: &Comma, offset: isize) -> String {
    let p = if offset >= 0 {
        comma.pos_to_right(offset as usize)
    } else {
        comma.pos_to_left((-offset) as usize)
    };
    p.unwrap_or_else(|| BOUNDARY.to_string())
}

/// Word unigrams in `[-WINDOW, WINDOW]` around the comma.
pub fn word_unigrams(comma: &Comma) -> Vec<String> {
    (-(WINDOW as isize)..=WINDOW as isize)
        .filter(|&o| o != 0)
        .map(|o| format!("w[{o}]={}", word_at(comma, o)))
        .collect()
}

/// Adjacent word bigrams spanning the comma.
pub fn word_bigrams(comma: &Comma) -> Vec<String> {
    vec![
        format!("w[-2..-1]={}|{}", word_at(comma, -2), word_at(comma, -1)),
        format!("w[-1..1]={}|{}", word_at(comma, -1), word_at(comma, 1)),
        format!("w[1..2]={}|{}", word_at(comma, 1), word_at(comma, 2)),
    ]
}

/// POS unigrams and the spanning POS bigram, when POS tags are attached.
pub fn pos_ngrams(comma: &Comma) -> Vec<String> {
    let mut out: Vec<String> = (-(WINDOW as isize)..=WINDOW as isize)
        .filter(|&o| o != 0)
        .map(|o| format!("p[{o}]={}", pos_at(comma, o)))
        .collect();
    out.push(format!(
        "p[-1..1]={}|{}",
        pos_at(comma, -1),
        pos_at(comma, 1)
    ));
    out
}

/// Position of the comma within its sibling group.
pub fn sibling_shape(comma: &Comma) -> Vec<String> {
    let Some(sentence) = comma.sentence() else {
        return Vec::new();
    };
    let group_size = sentence
        .commas()
        .iter()
        .filter(|c| c.sibling_group() == comma.sibling_group())
        .count();
    let has_prev = sentence.previous_sibling_comma(comma).is_some();
    let has_next = sentence.next_sibling_comma(comma).is_some();
    let role = match (has_prev, has_next) {
        (false, false) => "lone",
        (false, true) => "first",
        (true, true) => "middle",
        (true, false) => "last",
    };
    vec![
        format!("sib-size={group_size}"),
        format!("sib-role={role}"),
    ]
}

/// The full feature set for one comma, produced fresh per call.
pub fn extract(comma: &Comma) -> Vec<String> {
    let mut features = word_unigrams(comma);
    features.extend(word_bigrams(comma));
    features.extend(pos_ngrams(comma));
    features.extend(sibling_shape(comma));
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Sentence;

    #[test]
    fn test_word_window_with_sentinel() {
        let s = Sentence::new(&["apples", ",", "oranges"]);
        let c = &s.commas()[0];
        let unigrams = word_unigrams(c);
        assert!(unigrams.contains(&"w[-1]=apples".to_string()));
        assert!(unigrams.contains(&"w[1]=oranges".to_string()));
        assert!(unigrams.contains(&"w[-2]=$$$".to_string()));
        assert!(unigrams.contains(&"w[2]=$$$".to_string()));
    }

    #[test]
    fn test_pos_ngrams() {
        let s = Sentence::annotated(
            &["apples", ",", "oranges"],
            Some(&["NNS", ",", "NNS"]),
            &[None],
            None,
        )
        .unwrap();
        let c = &s.commas()[0];
        let pos = pos_ngrams(c);
        assert!(pos.contains(&"p[-1]=NNS".to_string()));
        assert!(pos.contains(&"p[-1..1]=NNS|NNS".to_string()));
    }

    #[test]
    fn test_sibling_shape_roles() {
        let s = Sentence::new(&["a", ",", "b", ",", "c", ",", "d"]);
        let shapes: Vec<Vec<String>> =
            s.commas().iter().map(sibling_shape).collect();
        assert!(shapes[0].contains(&"sib-role=first".to_string()));
        assert!(shapes[1].contains(&"sib-role=middle".to_string()));
        assert!(shapes[2].contains(&"sib-role=last".to_string()));
        assert!(shapes[0].contains(&"sib-size=3".to_string()));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let s = Sentence::new(&["I", "ate", ",", "then", "slept"]);
        let c = &s.commas()[0];
        assert_eq!(extract(c), extract(c));
    }
}
