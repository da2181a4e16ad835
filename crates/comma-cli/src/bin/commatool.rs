use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use comma_cli::{evaluate_constrained, evaluate_local, label_corpus};
use comma_core::classifier::LinearModel;
use comma_core::constraints::ConstraintSet;
use comma_core::corpus;
use comma_core::ilp::BranchBoundSolver;
use comma_core::inference::{ConstrainedCommaClassifier, InferenceSession};

#[derive(Parser)]
#[command(name = "commatool", about = "Comma disambiguation diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print constrained labels for every comma in a pretty corpus
    Label {
        /// Path to the pretty-format corpus file
        corpus_file: PathBuf,
        /// Path to the compiled linear model file
        model_file: PathBuf,
        /// Constraint set to enforce
        #[arg(long, default_value = "oxford-comma")]
        constraint: ConstraintSet,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compare local and constrained classifier accuracy on gold labels
    Compare {
        /// Path to the pretty-format corpus file
        corpus_file: PathBuf,
        /// Path to the compiled linear model file
        model_file: PathBuf,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Label {
            corpus_file,
            model_file,
            constraint,
            json,
        } => cmd_label(&corpus_file, &model_file, constraint, json),
        Command::Compare {
            corpus_file,
            model_file,
            json,
        } => cmd_compare(&corpus_file, &model_file, json),
    }
}

fn load_session(model_file: &PathBuf) -> Arc<InferenceSession> {
    let model = LinearModel::load(model_file).unwrap_or_else(|e| {
        eprintln!("failed to load model {}: {e}", model_file.display());
        process::exit(1);
    });
    Arc::new(InferenceSession::new(
        Arc::new(model),
        Arc::new(BranchBoundSolver::new()),
    ))
}

fn load_corpus(corpus_file: &PathBuf) -> corpus::PrettyCorpus {
    let loaded = corpus::read_file(corpus_file).unwrap_or_else(|e| {
        eprintln!("failed to read corpus {}: {e}", corpus_file.display());
        process::exit(1);
    });
    if loaded.skipped > 0 {
        eprintln!("warning: {} malformed corpus blocks skipped", loaded.skipped);
    }
    loaded
}

fn cmd_label(corpus_file: &PathBuf, model_file: &PathBuf, set: ConstraintSet, json: bool) {
    let corpus = load_corpus(corpus_file);
    let facade = ConstrainedCommaClassifier::new(load_session(model_file), set);
    let labeled = label_corpus(&corpus, &facade);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&labeled).expect("labels serialize")
        );
    } else {
        for l in &labeled {
            let gold = l.gold.as_deref().unwrap_or("-");
            println!(
                "{}\tcomma {} @ {}\t{}\tgold: {}",
                l.sentence_id, l.comma_index, l.position, l.label, gold
            );
        }
    }
}

fn cmd_compare(corpus_file: &PathBuf, model_file: &PathBuf, json: bool) {
    let corpus = load_corpus(corpus_file);
    let session = load_session(model_file);

    let local = evaluate_local(&corpus, session.classifier().as_ref());
    let mut rows: Vec<(String, comma_cli::Accuracy)> =
        vec![("local".to_string(), local)];
    for set in ConstraintSet::ALL {
        let facade = ConstrainedCommaClassifier::new(Arc::clone(&session), set);
        rows.push((set.to_string(), evaluate_constrained(&corpus, &facade)));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(name, acc)| {
                (
                    name.clone(),
                    serde_json::json!({
                        "correct": acc.correct,
                        "total": acc.total,
                        "accuracy": acc.value(),
                    }),
                )
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&map).expect("report serializes")
        );
    } else {
        for (name, acc) in &rows {
            println!(
                "{name:<16} {:>5}/{:<5} {:.4}",
                acc.correct,
                acc.total,
                acc.value()
            );
        }
    }
}
