use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ingredient-graph",
    version,
    about = "Ingredient co-occurrence graph explorer",
    long_about = "Build an undirected graph of ingredients from a JSON recipe corpus, where edge weight is the number of recipes two ingredients share, and query it. Ingredient names are compared trimmed and lowercased."
)]
pub struct Cli {
    /// Suppress non-essential output (totals, notes)
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    /// Log build and query details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the corpus and settings come from.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Recipe corpus: a JSON array of objects with an `ingredients` list
    #[arg(short, long, env = "INGREDIENT_GRAPH_CORPUS")]
    pub corpus: Option<PathBuf>,
    /// Path to a TOML configuration file (default: ./ingredient-graph.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print node, edge and weight totals for the graph
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// List ingredients matching a pattern ('%' matches any run of characters)
    Search {
        #[command(flatten)]
        source: SourceArgs,
        /// Pattern such as garlic, g%, %pepper%
        pattern: String,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Ingredients that most often co-occur with the given one
    Similar {
        #[command(flatten)]
        source: SourceArgs,
        ingredient: String,
        /// Number of results (default from config, else 5)
        #[arg(long, value_parser = parse_top)]
        top: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Fewest-hops path between two ingredients
    Path {
        #[command(flatten)]
        source: SourceArgs,
        from: String,
        to: String,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Ingredients most connected to a set of seed ingredients
    Connected {
        #[command(flatten)]
        source: SourceArgs,
        /// One or more seed ingredients
        #[arg(required = true, num_args = 1..)]
        seeds: Vec<String>,
        /// Number of results (default from config, else 5)
        #[arg(long, value_parser = parse_top)]
        top: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Recipe count, neighbour count and mean co-occurrence for an ingredient
    Stats {
        #[command(flatten)]
        source: SourceArgs,
        ingredient: String,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Menu-driven prompt on stdin
    Interactive {
        #[command(flatten)]
        source: SourceArgs,
        /// Number of results for ranked queries (default from config, else 5)
        #[arg(long, value_parser = parse_top)]
        top: Option<usize>,
    },
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_top(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
