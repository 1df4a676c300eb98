//! ConceptDB CLI - Command-line interface for the concept catalog

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use conceptdb::config::{self, ConceptDbConfig};
use conceptdb::definition::DefinitionFile;
use conceptdb::storage;
use conceptdb::ui;
use conceptdb::{Concept, SyncEngine};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "conceptdb")]
#[command(version)]
#[command(about = "Concept catalog - keeps a concept model and its relational schema in sync")]
#[command(long_about = r#"
ConceptDB stores concepts (named types with attributes, links and parents)
as tables in an SQLite catalog, and reconstructs concepts from those tables.

Example usage:
  conceptdb init
  conceptdb apply --file concepts.toml
  conceptdb show --name Person
  conceptdb list
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the catalog database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Namespace (schema) holding the managed tables
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog tables
    Init {
        /// Also write a config file with the resolved settings
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create tables and link registrations for a definition file
    Apply {
        /// Concept definition file (TOML)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show one concept as reconstructed from the catalog
    Show {
        /// Concept name
        #[arg(long)]
        name: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List all concepts in the catalog
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let database = settings.resolve_database(cli.database.as_deref());
    let namespace = settings.resolve_namespace(cli.namespace.as_deref());

    match cli.command {
        Commands::Init { write_config, force } => {
            config::ensure_db_dir(&database)?;
            let engine = open_engine(&database, &namespace)?;

            ui::header("Catalog ready");
            ui::info("Database", &database.display().to_string());
            ui::info("Namespace", &namespace);
            ui::info("Concepts", &engine.concept_names().count().to_string());

            if write_config {
                let path = cli.config.unwrap_or_else(config::default_config_path);
                let resolved = ConceptDbConfig {
                    database: Some(database.display().to_string()),
                    namespace: Some(namespace),
                };
                config::write_config(&path, &resolved, force)?;
                ui::success(&format!("Wrote {}", path.display()));
            }
        }

        Commands::Apply { file } => {
            let concepts = DefinitionFile::load(&file)?.into_concepts();
            config::ensure_db_dir(&database)?;
            let mut engine = open_engine(&database, &namespace)?;

            let (existing, new): (Vec<&Concept>, Vec<&Concept>) =
                concepts.iter().partition(|c| engine.contains(&c.name));

            if let Err(e) = engine.synchronize_batch(&concepts) {
                ui::error(&e.to_string());
                return Err(e.into());
            }

            ui::header(&format!("Applied {}", file.display()));
            ui::summary_row("Created:", &new.len().to_string());
            ui::summary_row("Already present:", &existing.len().to_string());
            for concept in new {
                ui::success(&concept.name);
            }
        }

        Commands::Show { name, format } => {
            let engine = open_engine(&database, &namespace)?;
            let concept = engine.load(&name)?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&concept_json(&concept))?);
            } else {
                ui::concept_details(&concept);
            }
        }

        Commands::List { format } => {
            let engine = open_engine(&database, &namespace)?;
            let mut concepts = Vec::new();
            for loaded in engine.iter() {
                match loaded {
                    Ok(concept) => concepts.push(concept),
                    Err(e) => ui::warn(&e.to_string()),
                }
            }

            if format == "json" {
                let values: Vec<_> = concepts.iter().map(concept_json).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if concepts.is_empty() {
                ui::info("Concepts", "none");
            } else {
                println!("{}", ui::concepts_table(&concepts));
            }
        }
    }

    Ok(())
}

fn open_engine(database: &std::path::Path, namespace: &str) -> anyhow::Result<SyncEngine> {
    tracing::debug!("Opening {} as namespace {}", database.display(), namespace);
    let conn = storage::open(database, namespace)?;
    Ok(SyncEngine::new(conn, namespace)?)
}

fn concept_json(concept: &Concept) -> serde_json::Value {
    serde_json::json!({
        "name": concept.name,
        "parents": concept.parents,
        "attributes": concept.attributes,
        "inherited_attributes": concept
            .all_attributes()
            .into_iter()
            .filter(|(name, _)| !concept.attributes.contains_key(name))
            .collect::<std::collections::BTreeMap<_, _>>(),
        "links": concept.links.values().collect::<Vec<_>>(),
        "rlinks": concept.rlinks.values().collect::<Vec<_>>(),
    })
}
