//! Termlight CLI: term search and highlighting over markdown documents.
//!
//! Usage:
//!   termlight pattern --term T [--variant V]...
//!   termlight search <file.md> --term T [--variant V]... [--next N | --prev N] [--html]
//!   termlight serve <file.md>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use termlight::{Direction, Document, EngineConfig, Pattern, SearchEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "termlight",
    version,
    about = "Term search, highlighting and navigation over documents"
)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pattern built from a term and its variants
    Pattern {
        /// Canonical term
        #[arg(long)]
        term: String,
        /// Alternative spelling (repeatable)
        #[arg(long = "variant")]
        variants: Vec<String>,
    },
    /// Search a markdown file and report matches
    Search {
        /// Markdown file to search
        file: PathBuf,
        /// Canonical term
        #[arg(long)]
        term: String,
        /// Alternative spelling (repeatable)
        #[arg(long = "variant")]
        variants: Vec<String>,
        /// Move to the next match this many times
        #[arg(long, conflicts_with = "prev")]
        next: Option<usize>,
        /// Move to the previous match this many times
        #[arg(long)]
        prev: Option<usize>,
        /// Print the highlighted document as HTML
        #[arg(long)]
        html: bool,
    },
    /// Serve JSON-lines requests over stdio for a markdown file
    Serve {
        /// Markdown file to serve
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_engine(file: &Path, config: Option<&Path>) -> Result<SearchEngine, String> {
    let config = EngineConfig::load_or_default(config).map_err(|e| e.to_string())?;
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    Ok(SearchEngine::with_config(Document::from_markdown(&text), config))
}

fn cmd_pattern(term: &str, variants: &[String]) -> i32 {
    match Pattern::from_terms(term, variants) {
        Ok(pattern) => {
            println!("pattern: {}", pattern.source);
            println!("flags:   {}", pattern.flags);
            println!("terms:   {}", pattern.terms.join(", "));
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_search(
    engine: &mut SearchEngine,
    term: &str,
    variants: &[String],
    steps: Option<(Direction, usize)>,
    html: bool,
) -> i32 {
    let mut result = match engine.search_terms(term, variants) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some((direction, count)) = steps {
        for _ in 0..count {
            result = engine.navigate(direction);
        }
    }

    println!("{} of {} matches", result.current_match, result.match_count);
    if result.match_count > 0 {
        let current = engine
            .navigation()
            .matches()
            .get(engine.navigation().current_index());
        if let Some(m) = current {
            println!("current: \"{}\"", m.text);
        }
    }
    if html {
        let doc = engine.document();
        println!("{}", doc.to_html(doc.root()));
    }
    0
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let code = match cli.command {
        Commands::Pattern { term, variants } => cmd_pattern(&term, &variants),
        Commands::Search {
            file,
            term,
            variants,
            next,
            prev,
            html,
        } => match open_engine(&file, config) {
            Ok(mut engine) => {
                let steps = match (next, prev) {
                    (Some(n), _) => Some((Direction::Next, n)),
                    (None, Some(n)) => Some((Direction::Prev, n)),
                    (None, None) => None,
                };
                cmd_search(&mut engine, &term, &variants, steps, html)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Serve { file } => match open_engine(&file, config) {
            Ok(engine) => termlight::service::run_stdio_server(engine),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
