//! `pbctl` — thin CLI driver over the pair-bond engine facade.

use clap::{Parser, Subcommand};
use pairbond::config::Config;
use pairbond::engine::Engine;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pbctl")]
#[command(author = "Demetrios Chiuratto Agourakis, Dionisio Chiuratto Agourakis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pair-bond text codec & storage engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print vocabulary counters
    Health,

    /// Tokenize a file without persisting it
    Tokenize {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Ingest a file and allocate a document id
    Ingest {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        century: Option<String>,

        /// Repeatable `key=value` metadata pair
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Enumerate stored documents
    List,

    /// Print a document's detail
    Info {
        #[arg(value_name = "DOC_ID")]
        doc_id: String,
    },

    /// Print a document's reconstructed text
    Retrieve {
        #[arg(value_name = "DOC_ID")]
        doc_id: String,
    },

    /// Print a document's starters, or drill down from one
    Bonds {
        #[arg(value_name = "DOC_ID")]
        doc_id: String,

        #[arg(long)]
        token: Option<String>,
    },

    /// Set and/or remove document metadata fields
    UpdateMeta {
        #[arg(value_name = "DOC_ID")]
        doc_id: String,

        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        #[arg(long = "remove", value_name = "KEY")]
        remove: Vec<String>,
    },
}

fn parse_kv_pairs(pairs: &[String]) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        if let Some((k, v)) = pair.split_once('=') {
            map.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        } else {
            tracing::warn!(pair, "ignoring malformed key=value metadata argument");
        }
    }
    map
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let engine = match Engine::open(&config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to open engine: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&engine, cli.command);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &Engine, command: Commands) -> pairbond::Result<()> {
    match command {
        Commands::Health => {
            let report = engine.health()?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }

        Commands::Tokenize { input } => {
            let text = std::fs::read_to_string(&input).map_err(|e| {
                pairbond::EngineError::MalformedRequest(format!("reading {input:?}: {e}"))
            })?;
            let report = engine.tokenize(&text)?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }

        Commands::Ingest {
            input,
            name,
            century,
            meta,
        } => {
            let text = std::fs::read_to_string(&input).map_err(|e| {
                pairbond::EngineError::MalformedRequest(format!("reading {input:?}: {e}"))
            })?;
            let century = century.unwrap_or_else(|| {
                pairbond::structure::guess_century(&input.to_string_lossy()).to_string()
            });
            let metadata = if meta.is_empty() {
                None
            } else {
                Some(serde_json::Value::Object(parse_kv_pairs(&meta)))
            };
            let report = engine.ingest(&text, &name, &century, metadata, None)?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }

        Commands::List => {
            let docs = engine.list()?;
            println!("{}", serde_json::to_string_pretty(&docs).unwrap());
        }

        Commands::Info { doc_id } => {
            let info = engine.info(&doc_id)?;
            println!("{}", serde_json::to_string_pretty(&info).unwrap());
        }

        Commands::Retrieve { doc_id } => {
            let report = engine.retrieve(&doc_id)?;
            println!("{}", report.text);
        }

        Commands::Bonds { doc_id, token } => {
            let token_id = token.map(|s| s.parse()).transpose()?;
            let bonds = engine.bonds(&doc_id, token_id)?;
            println!("{}", serde_json::to_string_pretty(&bonds).unwrap());
        }

        Commands::UpdateMeta {
            doc_id,
            set,
            remove,
        } => {
            let set = parse_kv_pairs(&set);
            let report = engine.update_meta(
                &doc_id,
                if set.is_empty() { None } else { Some(set) },
                if remove.is_empty() { None } else { Some(remove) },
            )?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
    }
    Ok(())
}
