use anyhow::Context;
use clap::{Parser, Subcommand};
use rowgraph::io::jsonl;
use rowgraph::pipelines::{self, Input, InvertedIndexColumns, PmiConfig, RoadSpeedConfig, WordCountColumns};
use rowgraph::{Bindings, Graph, SortConfig};
use std::io::{BufWriter, stdout};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Run a ready-made rowgraph pipeline over JSON-lines input
#[derive(Parser)]
#[command(name = "rowgraph")]
#[command(about = "Run row-oriented analytics pipelines over JSON-lines files", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write result rows here instead of stdout (.gz / .zst compress)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Rows held in memory per sort chunk before spilling to disk
    #[arg(long, global = true)]
    sort_chunk_capacity: Option<usize>,

    /// Directory for sort spill files (default: system temp dir)
    #[arg(long, global = true)]
    spill_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count word occurrences in the `text` column
    WordCount {
        #[arg(long)]
        input: PathBuf,
    },
    /// Top-3 documents per word by TF-IDF
    InvertedIndex {
        #[arg(long)]
        input: PathBuf,
    },
    /// Top words per document by pointwise mutual information
    Pmi {
        #[arg(long)]
        input: PathBuf,

        /// Words kept per document
        #[arg(long, default_value = "10")]
        top_words: usize,

        /// Words must be longer than this many characters
        #[arg(long, default_value = "4")]
        min_len: usize,

        /// Words must occur at least this many times in a document
        #[arg(long, default_value = "2")]
        min_occur: i64,
    },
    /// Average road speed (km/h) per weekday and hour
    RoadSpeed {
        /// Trips: edge_id, enter_time, leave_time
        #[arg(long)]
        input_time: PathBuf,

        /// Edges: edge_id, start, end
        #[arg(long)]
        input_length: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("rowgraph started with verbosity level: {}", cli.verbose);

    if let Err(e) = run(cli) {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut sort = SortConfig::default();
    if let Some(capacity) = cli.sort_chunk_capacity {
        sort = sort.chunk_capacity(capacity)?;
    }
    if let Some(dir) = cli.spill_dir {
        sort = sort.spill_dir(dir);
    }

    let graph = build(cli.command)?;
    debug!("plan:\n{}", graph.explain());

    let rows = graph
        .run(&Bindings::new().with_sort_config(sort))
        .context("start pipeline")?;
    let written = match &cli.output {
        Some(path) => jsonl::write_file(path, rows)
            .with_context(|| format!("write results to {}", path.display()))?,
        None => jsonl::write_rows(BufWriter::new(stdout().lock()), rows, Path::new("<stdout>"))
            .context("write results to stdout")?,
    };
    info!(rows = written, "done");
    Ok(())
}

fn build(command: Commands) -> anyhow::Result<Graph> {
    Ok(match command {
        Commands::WordCount { input } => {
            pipelines::word_count(&Input::Jsonl(input), &WordCountColumns::default())
        }
        Commands::InvertedIndex { input } => {
            pipelines::inverted_index(&Input::Jsonl(input), &InvertedIndexColumns::default())?
        }
        Commands::Pmi {
            input,
            top_words,
            min_len,
            min_occur,
        } => pipelines::pmi(
            &Input::Jsonl(input),
            &PmiConfig {
                top_words,
                min_len,
                min_occur,
                ..PmiConfig::default()
            },
        )?,
        Commands::RoadSpeed {
            input_time,
            input_length,
        } => pipelines::road_speed(
            &Input::Jsonl(input_time),
            &Input::Jsonl(input_length),
            &RoadSpeedConfig::default(),
        )?,
    })
}
