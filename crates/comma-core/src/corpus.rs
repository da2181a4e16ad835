//! Reader for the "pretty" annotated-text corpus format.
//!
//! Blocks of three lines: a sentence id, the token line, and a blank
//! separator. Comma tokens carry their label inline: `,[List]`, or
//! `,[Substitute,Quotation]` for multi-label annotations (the first label
//! wins); a bare `,` is an unannotated comma and defaults to Other.
//! Malformed blocks are skipped and logged; one bad sentence must not abort
//! a corpus run.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::sentence::{Label, Sentence};

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One corpus sentence with its source id.
#[derive(Debug)]
pub struct CorpusRecord {
    pub id: String,
    pub sentence: Arc<Sentence>,
}

/// A loaded pretty corpus.
#[derive(Debug, Default)]
pub struct PrettyCorpus {
    pub records: Vec<CorpusRecord>,
    /// Blocks dropped because they were malformed.
    pub skipped: usize,
}

pub fn read_file(path: &Path) -> Result<PrettyCorpus, CorpusError> {
    Ok(read_str(&fs::read_to_string(path)?))
}

pub fn read_str(content: &str) -> PrettyCorpus {
    let mut corpus = PrettyCorpus::default();
    let mut lines = content.lines().peekable();

    loop {
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }
        let Some(id_line) = lines.next() else {
            break;
        };
        let id = id_line.trim().to_string();
        let Some(token_line) = lines.next() else {
            warn!(id = %id, "corpus block truncated before token line");
            corpus.skipped += 1;
            break;
        };
        match parse_token_line(token_line) {
            Some((tokens, gold)) => {
                match Sentence::annotated(&tokens, None, &gold, None) {
                    Ok(sentence) => corpus.records.push(CorpusRecord { id, sentence }),
                    Err(e) => {
                        warn!(id = %id, error = %e, "skipping malformed corpus block");
                        corpus.skipped += 1;
                    }
                }
            }
            None => {
                warn!(id = %id, "skipping corpus block with empty token line");
                corpus.skipped += 1;
            }
        }
    }

    debug!(
        sentences = corpus.records.len(),
        skipped = corpus.skipped,
        "pretty corpus loaded"
    );
    corpus
}

/// Split an annotated token line into clean tokens plus per-comma gold
/// labels. Returns `None` for an empty line.
fn parse_token_line(line: &str) -> Option<(Vec<String>, Vec<Option<Label>>)> {
    let raw: Vec<&str> = line.split_whitespace().collect();
    if raw.is_empty() {
        return None;
    }
    let mut tokens = Vec::with_capacity(raw.len());
    let mut gold = Vec::new();
    for t in raw {
        if let Some(labels) = t.strip_prefix(",[").and_then(|r| r.strip_suffix(']')) {
            tokens.push(",".to_string());
            gold.push(Some(parse_first_label(labels)));
        } else if t == "," {
            tokens.push(",".to_string());
            gold.push(Some(Label::Other));
        } else {
            tokens.push(t.to_string());
        }
    }
    Some((tokens, gold))
}

/// First label of a (possibly multi-label) annotation; labels outside the
/// closed tag set collapse to Other.
fn parse_first_label(labels: &str) -> Label {
    labels
        .split(',')
        .next()
        .and_then(|l| l.trim().parse::<Label>().ok())
        .unwrap_or(Label::Other)
}
