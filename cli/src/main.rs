use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;

use scriptorium_backend::catalog::{get_catalog, init_catalog, Catalog};
use scriptorium_backend::chains::{FEATURED_CHAINS_LIMIT, RELATED_CHAINS_LIMIT};
use scriptorium_backend::export::write_outputs;
use scriptorium_backend::logger::{self, info};
use scriptorium_backend::parse_reference;
use scriptorium_backend::types::Dataset;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scriptorium CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the directory holding the raw datasets.
    /// If not provided, the SCRIPTORIUM_DATA_DIR environment variable will be used.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "SCRIPTORIUM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Silent, error, warn, info or debug. Overrides LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a scripture reference, e.g. "Genesis 12:1-3" or "EXO 20:2"
    #[command(arg_required_else_help = true)]
    ParseRef {
        reference: String,
    },

    /// Show one entry of a dataset by slug
    #[command(arg_required_else_help = true)]
    Lookup {
        /// commandments, topics, naves, strongs-hebrew or strongs-greek
        dataset: Dataset,
        slug: String,
    },

    /// List the slugs of a dataset, optionally only under one index letter
    #[command(arg_required_else_help = true)]
    List {
        dataset: Dataset,

        #[arg(long)]
        letter: Option<String>,

        /// Print the entry count only
        #[arg(long, default_value_t = false)]
        count: bool,
    },

    /// Commandments linked to a topic. Without a topic, prints bridge statistics.
    Bridge {
        topic_slug: Option<String>,
    },

    /// Topics linked to a commandment number
    #[command(arg_required_else_help = true)]
    TopicsFor {
        number: u32,
    },

    /// Show a chain study. Without a slug, lists the featured chains.
    Chain {
        slug: Option<String>,

        /// Print related chains instead of the chain itself
        #[arg(long, default_value_t = false)]
        related: bool,
    },

    /// Aggregate chain study statistics
    ChainStats,

    /// Write all derived JSON files
    #[command(arg_required_else_help = true)]
    Generate {
        #[arg(long, value_name = "DIRECTORY_PATH")]
        out_dir: PathBuf,
    },
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_ref(reference: &str) -> Result<()> {
    let parsed = parse_reference(reference)
        .ok_or_else(|| anyhow!("Not a scripture reference: {}", reference))?;
    println!("{}", parsed);
    print_json(&parsed)
}

fn catalog() -> Result<&'static Catalog> {
    get_catalog().ok_or_else(|| anyhow!("Catalog is not initialized"))
}

fn lookup(dataset: Dataset, slug: &str) -> Result<()> {
    let entry = catalog()?.entry_by_slug(dataset, slug)?
        .ok_or_else(|| anyhow!("No {} entry with slug: {}", dataset, slug))?;
    print_json(&entry)
}

fn list(dataset: Dataset, letter: Option<&str>, count: bool) -> Result<()> {
    let table = catalog()?.all_entries(dataset)?;

    let slugs: Vec<&str> = match letter {
        Some(l) => table.letter_index().slugs_for(l).iter().map(|s| s.as_str()).collect(),
        None => table.all().iter().map(|e| e.slug.as_str()).collect(),
    };

    if count {
        println!("{}", slugs.len());
    } else {
        for s in slugs {
            println!("{}", s);
        }
    }
    Ok(())
}

fn bridge(topic_slug: Option<&str>) -> Result<()> {
    let catalog = catalog()?;
    match topic_slug {
        Some(slug) => {
            for r in catalog.bridge_for(slug)? {
                println!("{}\t{}\t{}\t{}", r.score, r.commandment.number, r.commandment.display_reference(), r.commandment.concept);
            }
            Ok(())
        }
        None => print_json(&catalog.bridge_stats()?),
    }
}

fn topics_for(number: u32) -> Result<()> {
    for t in catalog()?.topics_for_commandment(number)? {
        println!("{}\t{}\t{}", t.score, t.slug, t.name);
    }
    Ok(())
}

fn chain(slug: Option<&str>, related: bool) -> Result<()> {
    let catalog = catalog()?;
    match slug {
        Some(slug) if related => {
            for c in catalog.related_chains(slug, RELATED_CHAINS_LIMIT)? {
                println!("{}\t{}", c.slug, c.subject);
            }
            Ok(())
        }
        Some(slug) => {
            let study = catalog.chain_by_slug(slug)?
                .ok_or_else(|| anyhow!("No chain study with slug: {}", slug))?;
            print_json(&study)
        }
        None => {
            for c in catalog.featured_chains(FEATURED_CHAINS_LIMIT)? {
                println!("{}\t{} books\t{} verses\t{}", c.slug, c.book_count, c.total_verses, c.subject);
            }
            Ok(())
        }
    }
}

fn chain_stats() -> Result<()> {
    print_json(&catalog()?.chain_stats()?)
}

fn generate(out_dir: &Path) -> Result<()> {
    let written = write_outputs(catalog()?, out_dir)?;
    info(&format!("Generated {} files in {}", written.len(), out_dir.display()));
    for p in written {
        println!("{}", p.display());
    }
    Ok(())
}

fn main() {
    // Attempt to load .env file. This might define SCRIPTORIUM_DATA_DIR if it's not
    // already in the environment. Clap will pick it up via `env = "SCRIPTORIUM_DATA_DIR"`.
    if dotenv().is_err() {
        eprintln!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level
        && !logger::set_log_level_str(level)
    {
        eprintln!("Error: Unknown log level: {}", level);
        exit(1);
    }

    // parse-ref needs no datasets
    if let Commands::ParseRef { reference } = &cli.command {
        if let Err(e) = parse_ref(reference) {
            eprintln!("Error executing command: {:#}", e);
            exit(1);
        }
        return;
    }

    if !cli.data_dir.is_dir() {
        eprintln!("Error: Data directory does not exist or is not a directory: {:?}", cli.data_dir);
        eprintln!("Use the --data-dir option or set the SCRIPTORIUM_DATA_DIR environment variable.");
        exit(1);
    }

    let opened = Catalog::open(&cli.data_dir)
        .with_context(|| format!("Failed to open catalog in {}", cli.data_dir.display()));
    match opened {
        Ok(catalog) => {
            init_catalog(catalog);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::ParseRef { .. } => Ok(()),
        Commands::Lookup { dataset, slug } => lookup(dataset, &slug),
        Commands::List { dataset, letter, count } => list(dataset, letter.as_deref(), count),
        Commands::Bridge { topic_slug } => bridge(topic_slug.as_deref()),
        Commands::TopicsFor { number } => topics_for(number),
        Commands::Chain { slug, related } => chain(slug.as_deref(), related),
        Commands::ChainStats => chain_stats(),
        Commands::Generate { out_dir } => generate(&out_dir),
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
