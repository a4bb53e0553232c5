//! ingredient-graph: recipe ingredient co-occurrence graph
//!
//! Build an undirected, weighted graph of ingredients from a recipe corpus and
//! query it. Two ingredients are joined by an edge whose weight counts how often
//! they were listed together in a recipe.
//!
//! # Queries
//! - Pattern search over ingredient names (`%` wildcard)
//! - Nearest neighbours by co-occurrence weight
//! - Fewest-hops path between two ingredients
//! - Connectivity ranking against a seed set
//! - Per-ingredient statistics
//!
//! # Quickstart (Library)
//! ```no_run
//! use ingredient_graph::graph::CooccurrenceGraph;
//! use ingredient_graph::parser::Corpus;
//! use ingredient_graph::query::{NearestNeighborsQuery, Query};
//!
//! let corpus = Corpus::load(std::path::Path::new("train.json")).expect("load corpus");
//! let graph = CooccurrenceGraph::build(&corpus.recipes);
//! let outcome = NearestNeighborsQuery::new("garlic", 5).run(&graph);
//! println!("{outcome:?}");
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! ingredient-graph similar garlic --corpus train.json --top 5
//! ingredient-graph path "soy sauce" parmesan --corpus train.json --format json
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod graph;
pub mod parser;
pub mod query;
pub mod utils;
