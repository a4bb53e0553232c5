use crate::cli::{Cli, Commands, OutputFormat, SourceArgs};
use crate::errors::IngredientGraphError;
use crate::graph::{CooccurrenceGraph, GraphSummary};
use crate::parser::Corpus;
use crate::query::{
    ConnectivityOutcome, ConnectivityQuery, NearestNeighborsQuery, NeighborsOutcome,
    PathOutcome, Query, RankedIngredient, SearchQuery, ShortestPathQuery, StatsOutcome,
    StatsQuery, DEFAULT_TOP,
};
use crate::utils::{config, table};
use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// A loaded corpus together with the graph built from it.
///
/// Both halves are read-only once constructed; queries borrow them.
pub struct Session {
    pub corpus: Corpus,
    pub graph: CooccurrenceGraph,
}

impl Session {
    #[must_use]
    pub fn from_corpus(corpus: Corpus) -> Self {
        let graph = CooccurrenceGraph::build(&corpus.recipes);
        Self { corpus, graph }
    }

    /// Load a corpus file and build its graph.
    ///
    /// # Errors
    /// Propagates `Corpus::load` failures; a malformed recipe aborts the build.
    pub fn load(path: &Path) -> Result<Self, IngredientGraphError> {
        let corpus = Corpus::load(path)?;
        Ok(Self::from_corpus(corpus))
    }

    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        self.graph.summary(self.corpus.len())
    }
}

/// Output settings after merging flags, config file and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub format: OutputFormat,
    pub top: usize,
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { format: OutputFormat::Text, top: DEFAULT_TOP, quiet: false }
    }
}

impl Settings {
    /// Flags win over config values, config values over built-in defaults.
    #[must_use]
    pub fn resolve(
        cfg: &config::Config,
        format: Option<OutputFormat>,
        top: Option<usize>,
        quiet: bool,
    ) -> Self {
        let query = cfg.query.clone().unwrap_or_default();
        let cfg_format = match query.default_format.as_deref() {
            Some("json") => Some(OutputFormat::Json),
            Some("text") => Some(OutputFormat::Text),
            Some(other) => {
                tracing::warn!("unknown default_format '{other}' in config, using text");
                None
            }
            None => None,
        };
        Self {
            format: format.or(cfg_format).unwrap_or(OutputFormat::Text),
            top: top.or(query.default_top.filter(|&n| n > 0)).unwrap_or(DEFAULT_TOP),
            quiet,
        }
    }
}

// Load config and corpus; on failure the error is already reported and the exit code returned.
fn open(
    source: &SourceArgs,
    format: Option<OutputFormat>,
    top: Option<usize>,
    quiet: bool,
) -> Result<(Session, Settings), i32> {
    let cfg = match source.config.as_ref() {
        Some(p) => match config::load_config_at(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {e}", p.display());
                return Err(2);
            }
        },
        // Beside the corpus first, then the working directory.
        None => source
            .corpus
            .as_deref()
            .and_then(Path::parent)
            .and_then(config::load_config_near)
            .or_else(|| {
                std::env::current_dir().ok().and_then(|d| config::load_config_near(&d))
            })
            .unwrap_or_default(),
    };
    let settings = Settings::resolve(&cfg, format, top, quiet);

    let Some(path) = source.corpus.clone().or_else(|| cfg.corpus.clone()) else {
        eprintln!(
            "Missing corpus. Provide --corpus <file> or set `corpus` in {}.",
            config::DEFAULT_CONFIG_NAME
        );
        return Err(2);
    };
    match Session::load(&path) {
        Ok(session) => {
            tracing::info!(
                nodes = session.graph.node_count(),
                edges = session.graph.edge_count(),
                "graph ready"
            );
            Ok((session, settings))
        }
        Err(e) => {
            eprintln!("Load corpus failed: {e}");
            Err(1)
        }
    }
}

fn finish(res: io::Result<()>) -> i32 {
    match res {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Output error: {e}");
            1
        }
    }
}

/// Run the CLI logic in-process.
///
/// Returns an exit code: 0 on success (including "not found" style answers),
/// 1 when the corpus cannot be loaded or output fails, 2 for usage errors.
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    let quiet = cli.quiet;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Summary { source, format } => {
            let (session, settings) = match open(&source, format, None, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            finish(render_summary(&mut out, &session.summary(), &settings))
        }
        Commands::Search { source, pattern, format } => {
            let q = match SearchQuery::new(&pattern) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("{e}");
                    return 2;
                }
            };
            let (session, settings) = match open(&source, format, None, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let matches = q.run(&session.graph);
            finish(render_search(&mut out, &q.pattern, &matches, &settings))
        }
        Commands::Similar { source, ingredient, top, format } => {
            let (session, settings) = match open(&source, format, top, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let outcome = NearestNeighborsQuery::new(&ingredient, settings.top).run(&session.graph);
            finish(render_neighbors(&mut out, &outcome, &settings))
        }
        Commands::Path { source, from, to, format } => {
            let (session, settings) = match open(&source, format, None, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let outcome = ShortestPathQuery::new(&from, &to).run(&session.graph);
            finish(render_path(&mut out, &outcome, &settings))
        }
        Commands::Connected { source, seeds, top, format } => {
            let (session, settings) = match open(&source, format, top, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let outcome = ConnectivityQuery::new(&seeds, settings.top).run(&session.graph);
            finish(render_connectivity(&mut out, &outcome, &settings))
        }
        Commands::Stats { source, ingredient, format } => {
            let (session, settings) = match open(&source, format, None, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let outcome = StatsQuery::new(&ingredient, &session.corpus.recipes).run(&session.graph);
            finish(render_stats(&mut out, &outcome, &settings))
        }
        Commands::Interactive { source, top } => {
            let (session, settings) = match open(&source, Some(OutputFormat::Text), top, quiet) {
                Ok(v) => v,
                Err(code) => return code,
            };
            let stdin = io::stdin();
            let mut input = stdin.lock();
            finish(run_interactive(&session, &settings, &mut input, &mut out))
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, msg: &str) -> io::Result<Option<String>> {
    write!(out, "{msg}")?;
    out.flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// Menu-driven session: numbered options 1-6, where 6 (or end of input) exits.
///
/// Results are always rendered as text regardless of `settings.format`.
///
/// # Errors
/// Returns any I/O error from reading `input` or writing `out`.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &Session,
    settings: &Settings,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let settings = Settings { format: OutputFormat::Text, ..*settings };
    let graph = &session.graph;
    loop {
        writeln!(out, "\nChoose a query option:")?;
        writeln!(out, "1. Search ingredients (use '%' as a wildcard)")?;
        writeln!(out, "2. Find shortest path between two ingredients")?;
        writeln!(out, "3. Find ingredients most connected to your input ingredients")?;
        writeln!(out, "4. Get statistics for an ingredient")?;
        writeln!(out, "5. Find most closely related ingredients")?;
        writeln!(out, "6. Exit")?;
        let Some(option) = prompt(input, out, "Enter option number: ")? else {
            break;
        };
        match option.as_str() {
            "1" => {
                let Some(pattern) =
                    prompt(input, out, "Enter ingredient search pattern (e.g., garlic, g%, %a%): ")?
                else {
                    break;
                };
                match SearchQuery::new(&pattern) {
                    Ok(q) => render_search(out, &q.pattern, &q.run(graph), &settings)?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            "2" => {
                let Some(from) = prompt(input, out, "Enter the first ingredient: ")? else {
                    break;
                };
                let Some(to) = prompt(input, out, "Enter the second ingredient: ")? else {
                    break;
                };
                render_path(out, &ShortestPathQuery::new(&from, &to).run(graph), &settings)?;
            }
            "3" => {
                writeln!(out, "\nEnter ingredients one at a time. Type 'done' when finished:")?;
                let mut seeds: Vec<String> = Vec::new();
                while let Some(seed) = prompt(input, out, "Ingredient (or 'done'): ")? {
                    if seed.eq_ignore_ascii_case("done") {
                        break;
                    }
                    if !seed.is_empty() {
                        seeds.push(seed);
                    }
                }
                let outcome = ConnectivityQuery::new(&seeds, settings.top).run(graph);
                render_connectivity(out, &outcome, &settings)?;
            }
            "4" => {
                let Some(ing) = prompt(input, out, "Enter an ingredient: ")? else {
                    break;
                };
                let outcome = StatsQuery::new(&ing, &session.corpus.recipes).run(graph);
                render_stats(out, &outcome, &settings)?;
            }
            "5" => {
                let Some(ing) = prompt(input, out, "Enter an ingredient: ")? else {
                    break;
                };
                let outcome = NearestNeighborsQuery::new(&ing, settings.top).run(graph);
                render_neighbors(out, &outcome, &settings)?;
            }
            "6" => {
                writeln!(out, "Exiting...")?;
                break;
            }
            _ => writeln!(out, "Invalid option. Please try again.")?,
        }
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{s}")
}

fn ranked_table(rows: &[RankedIngredient], weight_header: &str) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| vec![(i + 1).to_string(), r.name.clone(), r.weight.to_string()])
        .collect();
    table::render(&["#", "Ingredient", weight_header], &body)
}

fn render_summary<W: Write>(out: &mut W, s: &GraphSummary, settings: &Settings) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, s);
    }
    let rows = vec![
        vec!["Recipes".to_string(), s.recipes.to_string()],
        vec!["Ingredients".to_string(), s.nodes.to_string()],
        vec!["Edges".to_string(), s.edges.to_string()],
        vec!["Isolated ingredients".to_string(), s.isolated_nodes.to_string()],
        vec!["Total co-occurrence weight".to_string(), s.total_weight.to_string()],
    ];
    writeln!(out, "{}", table::render(&["Metric", "Value"], &rows))
}

fn render_search<W: Write>(
    out: &mut W,
    pattern: &str,
    matches: &[String],
    settings: &Settings,
) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, &matches);
    }
    if matches.is_empty() {
        return writeln!(out, "No ingredients found matching pattern '{pattern}'.");
    }
    let rows: Vec<Vec<String>> =
        matches.iter().enumerate().map(|(i, m)| vec![(i + 1).to_string(), m.clone()]).collect();
    writeln!(out, "{}", table::render(&["#", "Ingredient"], &rows))?;
    if !settings.quiet {
        writeln!(out, "Total matching ingredients: {}", matches.len())?;
    }
    Ok(())
}

fn render_neighbors<W: Write>(
    out: &mut W,
    outcome: &NeighborsOutcome,
    settings: &Settings,
) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, outcome);
    }
    match outcome {
        NeighborsOutcome::NotFound { ingredient } => {
            writeln!(out, "Ingredient '{ingredient}' not found.")
        }
        NeighborsOutcome::Ranked { ingredient, neighbors } if neighbors.is_empty() => {
            writeln!(out, "'{ingredient}' has no co-occurring ingredients.")
        }
        NeighborsOutcome::Ranked { neighbors, .. } => {
            writeln!(out, "{}", ranked_table(neighbors, "Co-occurrences"))
        }
    }
}

fn render_path<W: Write>(out: &mut W, outcome: &PathOutcome, settings: &Settings) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, outcome);
    }
    match outcome {
        PathOutcome::Found { path } => {
            writeln!(out, "{}", path.join(" -> "))?;
            if !settings.quiet {
                writeln!(out, "Hops: {}", path.len().saturating_sub(1))?;
            }
            Ok(())
        }
        PathOutcome::NotFound { missing } => {
            writeln!(out, "Not found in the network: {}", missing.join(", "))
        }
        PathOutcome::NoPath { from, to } => {
            writeln!(out, "No path exists between '{from}' and '{to}'.")
        }
    }
}

fn render_connectivity<W: Write>(
    out: &mut W,
    outcome: &ConnectivityOutcome,
    settings: &Settings,
) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, outcome);
    }
    match outcome {
        ConnectivityOutcome::Ranked { ignored, candidates, .. } => {
            if !ignored.is_empty() && !settings.quiet {
                writeln!(out, "Ignored (not in the network): {}", ignored.join(", "))?;
            }
            writeln!(out, "{}", ranked_table(candidates, "Cumulative weight"))
        }
        ConnectivityOutcome::NoValidSeeds { .. } => {
            writeln!(out, "None of the entered ingredients are in the network.")
        }
        ConnectivityOutcome::NoCandidates { .. } => writeln!(
            out,
            "No candidate ingredients found that are connected to the provided inputs."
        ),
    }
}

fn render_stats<W: Write>(out: &mut W, outcome: &StatsOutcome, settings: &Settings) -> io::Result<()> {
    if settings.format == OutputFormat::Json {
        return write_json(out, outcome);
    }
    match outcome {
        StatsOutcome::NotFound { ingredient } => writeln!(out, "Ingredient '{ingredient}' not found."),
        StatsOutcome::Found(s) => {
            let rows = vec![
                vec!["Recipes".to_string(), s.recipe_count.to_string()],
                vec!["Connected ingredients".to_string(), s.neighbor_count.to_string()],
                vec!["Average co-occurrence".to_string(), format!("{:.2}", s.avg_neighbor_weight)],
            ];
            writeln!(out, "Stats for '{}':", s.ingredient)?;
            writeln!(out, "{}", table::render(&["Metric", "Value"], &rows))
        }
    }
}
