//! `polyglot` - build and query per-domain phrase indexes.

mod error;

use crate::error::CliError;
use crate::error::Result;
use clap::Parser;
use clap::Subcommand;
use polyglot_core::BuildOutcome;
use polyglot_core::Catalog;
use polyglot_core::Domain;
use polyglot_core::Language;
use polyglot_core::PolyglotConfig;
use polyglot_core::RetrievalEngine;
use polyglot_core::RetrievalError;
use polyglot_core::catalog::seed_samples;
use std::path::PathBuf;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Retrieve in-domain translation examples from multilingual phrase corpora
#[derive(Parser, Debug)]
#[command(name = "polyglot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.polyglot/config.toml)
    #[arg(long, global = true, env = "POLYGLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the corpus directory from the config file
    #[arg(long, global = true)]
    corpus_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the bundled sample corpora and build every catalog index
    Init {
        /// Replace corpus files that already exist
        #[arg(long)]
        force: bool,
    },

    /// Import a JSON array of entries as a corpus and index it
    Import {
        name: String,
        path: PathBuf,
        #[arg(long)]
        domain: Option<Domain>,
    },

    /// Rebuild indexes (all corpora in the store when no name is given)
    Build { names: Vec<String> },

    /// Show the entries most similar to a query
    Search {
        query: String,
        /// Search only this corpus
        #[arg(long)]
        corpus: Option<String>,
        /// Number of results (default from config)
        #[arg(short)]
        k: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Print a few-shot example block for translating a query
    Context {
        query: String,
        /// Target language code, e.g. es
        #[arg(long, short)]
        target: Language,
        /// Maximum examples (default from config)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Report which corpus domain a query belongs to
    Classify { query: String },

    /// Entry and index counts for every catalog corpus
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = PolyglotConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.corpus_dir {
        config.corpus_dir = dir;
    }
    info!("Using corpus directory {}", config.corpus_dir.display());

    let engine = RetrievalEngine::from_config(&config)?;
    run(cli.command, &engine, &config).await?;
    Ok(())
}

async fn run(command: Command, engine: &RetrievalEngine, config: &PolyglotConfig) -> Result<()> {
    let catalog = Catalog::default_sources();
    match command {
        Command::Init { force } => {
            let existing = engine.store().list().map_err(RetrievalError::from)?;
            if existing.is_empty() || force {
                let written = seed_samples(engine.store(), &catalog).map_err(RetrievalError::from)?;
                // Old artifacts describe the replaced files.
                for source in catalog.iter() {
                    engine.artifacts().remove(&source.name)?;
                    engine.unload(&source.name);
                }
                println!("Created {written} sample corpora");
            } else {
                warn!(
                    "{} corpora already present, keeping them (use --force to overwrite)",
                    existing.len()
                );
            }
            let report = engine.initialize(&catalog).await?;
            println!(
                "Indexes: {} loaded, {} built, {} without data",
                report.loaded.len(),
                report.built.len(),
                report.skipped.len()
            );
        }
        Command::Import { name, path, domain } => {
            let count = engine
                .store()
                .import(&name, &path, domain)
                .map_err(RetrievalError::from)?;
            println!("Imported {count} entries into {name}");
            print_outcome(&name, engine.build_index(&name).await?);
        }
        Command::Build { names } => {
            let names = if names.is_empty() {
                engine.store().list().map_err(RetrievalError::from)?
            } else {
                names
            };
            if names.is_empty() {
                return Err(CliError::EmptyStore(config.corpus_dir.display().to_string()));
            }
            for name in names {
                print_outcome(&name, engine.build_index(&name).await?);
            }
        }
        Command::Search {
            query,
            corpus,
            k,
            json,
        } => {
            let missing = corpus
                .as_deref()
                .filter(|name| !engine.artifacts().exists(name) && !engine.registry().is_loaded(name));
            if let Some(name) = missing {
                return Err(CliError::NotIndexed(name.to_string()));
            }
            let k = k.unwrap_or(config.default_k);
            let results = engine.search_similar(&query, corpus.as_deref(), k).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results");
            } else {
                for (rank, result) in results.iter().enumerate() {
                    let source = result
                        .record
                        .translation(engine.source_language())
                        .unwrap_or_default();
                    println!(
                        "{:>2}. [{:.4}] {:<22} {}",
                        rank + 1,
                        result.score,
                        result.corpus,
                        source
                    );
                }
            }
        }
        Command::Context { query, target, max } => {
            let max = max.unwrap_or(config.max_examples);
            print!(
                "{}",
                engine.get_context_examples(&query, &target, max).await
            );
        }
        Command::Classify { query } => match engine.classify_domain(&query, &catalog).await? {
            Some(found) => println!(
                "{} ({}) score {:.4}",
                found
                    .domain
                    .map_or_else(|| "unknown".to_string(), |d| d.to_string()),
                found.corpus,
                found.score
            ),
            None => println!("No indexed corpora"),
        },
        Command::Stats { json } => {
            let stats = engine.stats(&catalog)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                for s in &stats {
                    println!(
                        "{:<22} {:<15} {:>4} entries  {}",
                        s.name,
                        s.domain,
                        s.entries,
                        if s.indexed {
                            format!("{} vectors", s.vectors)
                        } else {
                            "not indexed".to_string()
                        }
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_outcome(name: &str, outcome: BuildOutcome) {
    match outcome {
        BuildOutcome::Built {
            vectors,
            dimensions,
        } => println!("{name}: indexed {vectors} entries ({dimensions} dimensions)"),
        BuildOutcome::NoData => println!("{name}: no data"),
        BuildOutcome::NoUsableEntries => println!("{name}: no entries in the source language"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parsing() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_arguments() {
        let cli = Cli::try_parse_from([
            "polyglot",
            "search",
            "court hearing",
            "--corpus",
            "legal_formal",
            "-k",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::Search { query, corpus, k, json } => {
                assert_eq!(query, "court hearing");
                assert_eq!(corpus.as_deref(), Some("legal_formal"));
                assert_eq!(k, Some(3));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_typed_arguments() {
        let cli = Cli::try_parse_from(["polyglot", "-vv", "context", "hello", "--target", "ur"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Context { target: Language::Urdu, .. }
        ));

        let cli = Cli::try_parse_from([
            "polyglot", "import", "contracts", "c.json", "--domain", "legal",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Import {
                domain: Some(Domain::Legal),
                ..
            }
        ));
        assert!(
            Cli::try_parse_from(["polyglot", "import", "x", "y", "--domain", "aerospace"])
                .is_err()
        );
    }
}
