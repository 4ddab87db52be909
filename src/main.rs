//! jatzingueni - corpus tree validation and extraction

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use jatzingueni::extract::{extract, ExtractionPolicy, UnitFlags};
use jatzingueni::ingest;
use jatzingueni::tokenize::WhitespaceTokenizer;
use jatzingueni::validate::certify;
use jatzingueni::{CertifiedTree, NodeId, Result};

#[derive(Parser)]
#[command(name = "jatzingueni")]
#[command(version, about = "Corpus tree validation and extraction", long_about = None)]
#[command(after_help = "EXAMPLES:
    jatzingueni info article.json                 Show document structure
    jatzingueni validate article.json             Check structural invariants
    jatzingueni extract article.json --min-tokens 100 --max-tokens 1000
    jatzingueni extract article.json --level chapter --boundary chapter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show document metadata and tree shape
    Info {
        /// Document JSON file
        #[arg(value_name = "INPUT")]
        input: String,
    },
    /// Run the structural invariants
    Validate {
        #[arg(value_name = "INPUT")]
        input: String,
    },
    /// Extract units as JSON lines
    Extract {
        #[arg(value_name = "INPUT")]
        input: String,

        /// Emit every node with this level label, regardless of size
        #[arg(long, conflicts_with_all = ["min_tokens", "max_tokens"])]
        level: Option<String>,

        /// Lower token bound for budgeted extraction
        #[arg(long, default_value_t = 0)]
        min_tokens: u64,

        /// Upper token bound for budgeted extraction
        #[arg(long)]
        max_tokens: Option<u64>,

        /// Level label units must never straddle (repeatable)
        #[arg(long = "boundary")]
        boundaries: Vec<String>,

        /// Include sentence text in the output
        #[arg(long)]
        text: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Info { input } => show_info(&input),
        Command::Validate { input } => run_validate(&input),
        Command::Extract {
            input,
            level,
            min_tokens,
            max_tokens,
            boundaries,
            text,
        } => run_extract(&input, level, min_tokens, max_tokens, boundaries, text),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_tree(path: &str) -> Result<jatzingueni::DocumentTree> {
    ingest::load_raw(path)?.into_tree(&WhitespaceTokenizer)
}

fn show_info(path: &str) -> Result<()> {
    let tree = load_tree(path)?;
    let meta = tree.meta();

    println!("File: {path}");
    println!("Title: {}", meta.title);
    println!("Language: {}", meta.language);
    if !meta.genre.is_empty() {
        println!("Genre: {}", meta.genre);
    }
    if let Some(ref dialect) = meta.dialect {
        println!("Dialect: {dialect}");
    }
    if let Some(ref url) = meta.source_url {
        println!("Source: {url}");
    }
    println!("Nodes: {}", tree.node_count());
    println!("Tokens: {}", tree.token_count(tree.root()));

    let mut levels: BTreeMap<&str, usize> = BTreeMap::new();
    for id in tree.iter_dfs(tree.root()) {
        if let Some(node) = tree.node(id) {
            *levels.entry(node.label.as_str()).or_default() += 1;
        }
    }
    for (label, count) in levels {
        println!("  {label}: {count}");
    }
    Ok(())
}

fn run_validate(path: &str) -> Result<()> {
    let tree = load_tree(path)?;
    jatzingueni::validate(&tree)?;
    println!("ok: {} nodes, all invariants hold", tree.node_count());
    Ok(())
}

#[derive(Serialize)]
struct UnitRow {
    index: usize,
    token_count: u64,
    flags: UnitFlags,
    leaf_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

fn run_extract(
    path: &str,
    level: Option<String>,
    min_tokens: u64,
    max_tokens: Option<u64>,
    boundaries: Vec<String>,
    with_text: bool,
) -> Result<()> {
    let tree = load_tree(path)?;
    let certified: CertifiedTree = certify(Arc::new(tree))?;

    let mut policy = match (level, max_tokens) {
        (Some(label), _) => ExtractionPolicy::fixed_label(label),
        (None, Some(max)) if min_tokens <= max => ExtractionPolicy::budgeted(min_tokens, max),
        (None, Some(max)) => {
            return Err(jatzingueni::Error::InvalidDocument(format!(
                "--min-tokens {min_tokens} exceeds --max-tokens {max}"
            )));
        }
        (None, None) => {
            return Err(jatzingueni::Error::InvalidDocument(
                "pass either --level or --max-tokens".to_string(),
            ));
        }
    };
    for label in boundaries {
        policy = policy.with_boundary(label);
    }

    for (index, unit) in extract(&certified, &policy).enumerate() {
        let row = UnitRow {
            index,
            token_count: unit.token_count,
            flags: unit.flags,
            text: with_text.then(|| unit.text(certified.tree())),
            leaf_ids: unit.leaf_ids,
        };
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
