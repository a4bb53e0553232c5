use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::errors::IngredientGraphError;
use crate::graph::CooccurrenceGraph;
use crate::parser::{normalize, Recipe};

/// Number of ranked rows returned when the caller does not choose one.
pub const DEFAULT_TOP: usize = 5;

/// Query trait implemented by all query types.
///
/// Given an immutable reference to a `CooccurrenceGraph`, returns a result of type `R`.
/// Queries never mutate the graph, so repeated runs return identical results.
pub trait Query<R> {
    fn run(&self, graph: &CooccurrenceGraph) -> R;
}

/// An ingredient paired with a co-occurrence score.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RankedIngredient {
    pub name: String,
    pub weight: u64,
}

// Weight descending, then name ascending for ties.
fn rank(mut rows: Vec<RankedIngredient>, top: usize) -> Vec<RankedIngredient> {
    rows.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(top);
    rows
}

/// Wildcard search over ingredient names.
///
/// `%` stands for any run of characters (including none); consecutive `%` act as one.
/// The pattern is lowercased and has surrounding whitespace trimmed, since no
/// normalized ingredient name starts or ends with whitespace. It is then compiled as
/// a glob, so `?` matches exactly one character and `[...]` is a character class.
/// Results are in ascending order.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub pattern: String,
    matcher: Pattern,
}

impl SearchQuery {
    /// Compile a search pattern such as `g%` or `%pepper%`.
    ///
    /// # Errors
    /// Returns `IngredientGraphError::InvalidPattern` if the translated glob does not
    /// compile (for example an unterminated `[`).
    pub fn new(pattern: &str) -> Result<Self, IngredientGraphError> {
        let translated = translate_wildcards(&pattern.trim().to_lowercase());
        let matcher = Pattern::new(&translated).map_err(|e| {
            IngredientGraphError::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() }
        })?;
        Ok(Self { pattern: translated, matcher })
    }
}

// `%` becomes `*`. Runs of `%`/`*` collapse to one `*`: the glob crate reserves `**`
// for whole path components.
fn translate_wildcards(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '*') {
            if !out.ends_with('*') {
                out.push('*');
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Query<Vec<String>> for SearchQuery {
    fn run(&self, graph: &CooccurrenceGraph) -> Vec<String> {
        let out: Vec<String> =
            graph.nodes().filter(|n| self.matcher.matches(n)).map(str::to_string).collect();
        tracing::debug!(pattern = %self.pattern, matches = out.len(), "search");
        out
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NeighborsOutcome {
    Ranked { ingredient: String, neighbors: Vec<RankedIngredient> },
    NotFound { ingredient: String },
}

/// Ingredients that most often co-occur with a given ingredient.
pub struct NearestNeighborsQuery {
    pub ingredient: String,
    pub top: usize,
}

impl NearestNeighborsQuery {
    #[must_use]
    pub fn new(ingredient: &str, top: usize) -> Self {
        Self { ingredient: normalize(ingredient), top }
    }
}

impl Query<NeighborsOutcome> for NearestNeighborsQuery {
    fn run(&self, graph: &CooccurrenceGraph) -> NeighborsOutcome {
        if !graph.contains(&self.ingredient) {
            return NeighborsOutcome::NotFound { ingredient: self.ingredient.clone() };
        }
        let rows = graph
            .neighbors(&self.ingredient)
            .map(|(name, weight)| RankedIngredient { name: name.to_string(), weight })
            .collect();
        NeighborsOutcome::Ranked { ingredient: self.ingredient.clone(), neighbors: rank(rows, self.top) }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    /// Source to target inclusive.
    Found { path: Vec<String> },
    /// One or both endpoints are not in the graph.
    NotFound { missing: Vec<String> },
    NoPath { from: String, to: String },
}

impl PathOutcome {
    /// Number of edges on a found path.
    #[must_use]
    pub fn hops(&self) -> Option<usize> {
        match self {
            PathOutcome::Found { path } => Some(path.len().saturating_sub(1)),
            _ => None,
        }
    }
}

/// Fewest-hops path between two ingredients.
///
/// Edge weights are ignored. Neighbours are expanded in ascending name order and
/// the first predecessor to reach a node is kept, which fixes the path returned
/// when several minimum-hop paths exist.
pub struct ShortestPathQuery {
    pub from: String,
    pub to: String,
}

impl ShortestPathQuery {
    #[must_use]
    pub fn new(from: &str, to: &str) -> Self {
        Self { from: normalize(from), to: normalize(to) }
    }
}

impl Query<PathOutcome> for ShortestPathQuery {
    fn run(&self, graph: &CooccurrenceGraph) -> PathOutcome {
        let mut missing: Vec<String> =
            [&self.from, &self.to].into_iter().filter(|n| !graph.contains(n)).cloned().collect();
        missing.dedup();
        if !missing.is_empty() {
            return PathOutcome::NotFound { missing };
        }
        let (src, dst) = (self.from.as_str(), self.to.as_str());
        if src == dst {
            return PathOutcome::Found { path: vec![self.from.clone()] };
        }

        // BFS
        let mut prev: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut q: VecDeque<&str> = VecDeque::new();
        visited.insert(src);
        q.push_back(src);
        'search: while let Some(u) = q.pop_front() {
            for (v, _) in graph.neighbors(u) {
                if visited.insert(v) {
                    prev.insert(v, u);
                    if v == dst {
                        break 'search;
                    }
                    q.push_back(v);
                }
            }
        }

        if !visited.contains(dst) {
            return PathOutcome::NoPath { from: self.from.clone(), to: self.to.clone() };
        }

        let mut path: Vec<String> = vec![dst.to_string()];
        let mut cur = dst;
        while let Some(&p) = prev.get(cur) {
            path.push(p.to_string());
            cur = p;
        }
        path.reverse();
        PathOutcome::Found { path }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectivityOutcome {
    Ranked { seeds: Vec<String>, ignored: Vec<String>, candidates: Vec<RankedIngredient> },
    /// None of the seeds is an ingredient of the graph.
    NoValidSeeds { ignored: Vec<String> },
    /// Valid seeds exist but have no neighbour outside the seed set.
    NoCandidates { seeds: Vec<String>, ignored: Vec<String> },
}

/// Rank non-seed ingredients by their summed edge weight to a set of seeds.
pub struct ConnectivityQuery {
    /// Normalized, deduplicated seeds in ascending order.
    pub seeds: Vec<String>,
    pub top: usize,
}

impl ConnectivityQuery {
    #[must_use]
    pub fn new<I, S>(seeds: I, top: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let seeds: BTreeSet<String> = seeds.into_iter().map(|s| normalize(s.as_ref())).collect();
        Self { seeds: seeds.into_iter().collect(), top }
    }
}

impl Query<ConnectivityOutcome> for ConnectivityQuery {
    fn run(&self, graph: &CooccurrenceGraph) -> ConnectivityOutcome {
        let (seeds, ignored): (Vec<String>, Vec<String>) =
            self.seeds.iter().cloned().partition(|s| graph.contains(s));
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "seeds not in graph");
        }
        if seeds.is_empty() {
            return ConnectivityOutcome::NoValidSeeds { ignored };
        }

        let seed_set: HashSet<&str> = seeds.iter().map(String::as_str).collect();
        let mut scores: BTreeMap<&str, u64> = BTreeMap::new();
        for seed in &seeds {
            for (neighbor, weight) in graph.neighbors(seed) {
                if seed_set.contains(neighbor) {
                    continue;
                }
                *scores.entry(neighbor).or_insert(0) += weight;
            }
        }
        if scores.is_empty() {
            return ConnectivityOutcome::NoCandidates { seeds, ignored };
        }

        let rows = scores
            .into_iter()
            .map(|(name, weight)| RankedIngredient { name: name.to_string(), weight })
            .collect();
        ConnectivityOutcome::Ranked { seeds, ignored, candidates: rank(rows, self.top) }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngredientStats {
    pub ingredient: String,
    /// Recipes in the corpus that list the ingredient at least once.
    pub recipe_count: usize,
    pub neighbor_count: usize,
    /// Mean edge weight over all neighbours; `0.0` for an isolated ingredient.
    pub avg_neighbor_weight: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsOutcome {
    Found(IngredientStats),
    NotFound { ingredient: String },
}

/// Descriptive statistics for one ingredient.
///
/// The recipe count is taken from the corpus itself since the graph only keeps
/// aggregated pair weights.
pub struct StatsQuery<'r> {
    pub ingredient: String,
    pub recipes: &'r [Recipe],
}

impl<'r> StatsQuery<'r> {
    #[must_use]
    pub fn new(ingredient: &str, recipes: &'r [Recipe]) -> Self {
        Self { ingredient: normalize(ingredient), recipes }
    }
}

impl Query<StatsOutcome> for StatsQuery<'_> {
    fn run(&self, graph: &CooccurrenceGraph) -> StatsOutcome {
        if !graph.contains(&self.ingredient) {
            return StatsOutcome::NotFound { ingredient: self.ingredient.clone() };
        }
        let recipe_count = self.recipes.par_iter().filter(|r| r.contains(&self.ingredient)).count();
        let (neighbor_count, total) = graph
            .neighbors(&self.ingredient)
            .fold((0usize, 0u64), |(n, sum), (_, w)| (n + 1, sum + w));
        #[allow(clippy::cast_precision_loss)]
        let avg_neighbor_weight =
            if neighbor_count == 0 { 0.0 } else { total as f64 / neighbor_count as f64 };
        StatsOutcome::Found(IngredientStats {
            ingredient: self.ingredient.clone(),
            recipe_count,
            neighbor_count,
            avg_neighbor_weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(recipes: &[&[&str]]) -> Vec<Recipe> {
        recipes.iter().map(|r| Recipe::new(r.iter().copied())).collect()
    }

    fn repeat(recipe: &[&str], times: usize) -> Vec<Recipe> {
        (0..times).map(|_| Recipe::new(recipe.iter().copied())).collect()
    }

    fn ranked(rows: &[(&str, u64)]) -> Vec<RankedIngredient> {
        rows.iter().map(|&(n, w)| RankedIngredient { name: n.to_string(), weight: w }).collect()
    }

    #[test]
    fn search_prefix_pattern_is_sorted() {
        let g = CooccurrenceGraph::build(&corpus(&[
            &["Garlic", "ginger", "salt"],
            &["green onions", "egg"],
        ]));
        let q = SearchQuery::new("G%").unwrap();
        let first = q.run(&g);
        assert_eq!(first, vec!["garlic", "ginger", "green onions"]);
        assert_eq!(q.run(&g), first);
    }

    #[test]
    fn search_infix_and_single_char_wildcards() {
        let g = CooccurrenceGraph::build(&corpus(&[&["salt", "malt", "sea salt", "egg"]]));
        assert_eq!(SearchQuery::new("%alt").unwrap().run(&g), vec!["malt", "salt", "sea salt"]);
        assert_eq!(SearchQuery::new("?alt").unwrap().run(&g), vec!["malt", "salt"]);
        assert!(SearchQuery::new("zz%").unwrap().run(&g).is_empty());
    }

    #[test]
    fn search_collapses_repeated_wildcards() {
        let g = CooccurrenceGraph::build(&corpus(&[&["garlic", "ginger", "salt"]]));
        assert_eq!(SearchQuery::new("g%%").unwrap().run(&g), vec!["garlic", "ginger"]);
        assert_eq!(SearchQuery::new("%a%%").unwrap().run(&g), vec!["garlic", "salt"]);
        assert_eq!(SearchQuery::new("g%%c").unwrap().run(&g), vec!["garlic"]);
        assert_eq!(SearchQuery::new("%*%").unwrap().pattern, "*");
    }

    #[test]
    fn search_trims_surrounding_whitespace() {
        let g = CooccurrenceGraph::build(&corpus(&[&["garlic", "ginger", "salt"]]));
        let q = SearchQuery::new("  G% ").unwrap();
        assert_eq!(q.pattern, "g*");
        assert_eq!(q.run(&g), vec!["garlic", "ginger"]);
    }

    #[test]
    fn search_rejects_broken_glob() {
        let err = SearchQuery::new("[abc").unwrap_err();
        assert!(matches!(err, IngredientGraphError::InvalidPattern { .. }));
    }

    #[test]
    fn neighbors_rank_by_weight_then_name() {
        let mut recipes = repeat(&["x", "b"], 5);
        recipes.extend(repeat(&["x", "a"], 5));
        recipes.extend(repeat(&["x", "c"], 2));
        let g = CooccurrenceGraph::build(&recipes);
        let out = NearestNeighborsQuery::new("X", 2).run(&g);
        assert_eq!(
            out,
            NeighborsOutcome::Ranked { ingredient: "x".into(), neighbors: ranked(&[("a", 5), ("b", 5)]) }
        );
    }

    #[test]
    fn neighbors_top_larger_than_degree_returns_all() {
        let g = CooccurrenceGraph::build(&corpus(&[&["egg", "flour", "sugar"]]));
        match NearestNeighborsQuery::new("egg", 10).run(&g) {
            NeighborsOutcome::Ranked { neighbors, .. } => assert_eq!(neighbors.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn neighbors_unknown_ingredient() {
        let g = CooccurrenceGraph::build(&corpus(&[&["egg", "flour"]]));
        assert_eq!(
            NearestNeighborsQuery::new(" Tofu ", 3).run(&g),
            NeighborsOutcome::NotFound { ingredient: "tofu".into() }
        );
    }

    // Distances from `src` by plain BFS, independent of the query implementation.
    fn bfs_distances(g: &CooccurrenceGraph, src: &str) -> HashMap<String, usize> {
        let mut dist = HashMap::from([(src.to_string(), 0usize)]);
        let mut q = VecDeque::from([src.to_string()]);
        while let Some(u) = q.pop_front() {
            let d = dist[&u];
            for (v, _) in g.neighbors(&u) {
                if !dist.contains_key(v) {
                    dist.insert(v.to_string(), d + 1);
                    q.push_back(v.to_string());
                }
            }
        }
        dist
    }

    #[test]
    fn shortest_path_ignores_weights_and_is_minimal() {
        let mut recipes = repeat(&["a", "b"], 10);
        recipes.extend(repeat(&["b", "c"], 10));
        recipes.extend(repeat(&["c", "d"], 10));
        recipes.push(Recipe::new(["a", "e"]));
        recipes.push(Recipe::new(["e", "d"]));
        let g = CooccurrenceGraph::build(&recipes);

        let out = ShortestPathQuery::new("A", "d").run(&g);
        assert_eq!(out, PathOutcome::Found { path: vec!["a".into(), "e".into(), "d".into()] });
        assert_eq!(out.hops(), Some(bfs_distances(&g, "a")["d"]));
    }

    #[test]
    fn shortest_path_tie_prefers_smaller_names() {
        let g = CooccurrenceGraph::build(&corpus(&[
            &["start", "zeta"],
            &["zeta", "end"],
            &["start", "alpha"],
            &["alpha", "end"],
        ]));
        assert_eq!(
            ShortestPathQuery::new("start", "end").run(&g),
            PathOutcome::Found { path: vec!["start".into(), "alpha".into(), "end".into()] }
        );
    }

    #[test]
    fn shortest_path_outcomes() {
        let g = CooccurrenceGraph::build(&corpus(&[&["egg", "flour"], &["rice", "beans"]]));
        let no_path = ShortestPathQuery::new("egg", "rice").run(&g);
        assert_eq!(no_path, PathOutcome::NoPath { from: "egg".into(), to: "rice".into() });
        assert_eq!(no_path.hops(), None);

        assert_eq!(
            ShortestPathQuery::new("egg", "tofu").run(&g),
            PathOutcome::NotFound { missing: vec!["tofu".into()] }
        );
        assert_eq!(
            ShortestPathQuery::new("egg", "EGG").run(&g),
            PathOutcome::Found { path: vec!["egg".into()] }
        );
    }

    #[test]
    fn connectivity_sums_weights_across_seeds() {
        let mut recipes = repeat(&["egg", "flour"], 3);
        recipes.extend(repeat(&["milk", "flour"], 4));
        recipes.push(Recipe::new(["milk", "butter"]));
        recipes.push(Recipe::new(["egg", "milk"]));
        let g = CooccurrenceGraph::build(&recipes);

        let out = ConnectivityQuery::new(["Egg", "milk", "saffron"], 5).run(&g);
        assert_eq!(
            out,
            ConnectivityOutcome::Ranked {
                seeds: vec!["egg".into(), "milk".into()],
                ignored: vec!["saffron".into()],
                candidates: ranked(&[("flour", 7), ("butter", 1)]),
            }
        );
    }

    #[test]
    fn connectivity_dedupes_seeds() {
        let g = CooccurrenceGraph::build(&corpus(&[&["egg", "flour"]]));
        let out = ConnectivityQuery::new(["egg", " EGG"], 5).run(&g);
        match out {
            ConnectivityOutcome::Ranked { candidates, .. } => {
                assert_eq!(candidates, ranked(&[("flour", 1)]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connectivity_empty_outcomes() {
        let g = CooccurrenceGraph::build(&corpus(&[&["egg", "flour"], &["salt"]]));
        assert_eq!(
            ConnectivityQuery::new(["tofu"], 5).run(&g),
            ConnectivityOutcome::NoValidSeeds { ignored: vec!["tofu".into()] }
        );
        assert_eq!(
            ConnectivityQuery::new(["egg", "flour", "salt"], 5).run(&g),
            ConnectivityOutcome::NoCandidates {
                seeds: vec!["egg".into(), "flour".into(), "salt".into()],
                ignored: vec![],
            }
        );
    }

    #[test]
    fn stats_end_to_end() {
        let recipes = corpus(&[&["Egg", "Flour"], &["egg", "sugar"]]);
        let g = CooccurrenceGraph::build(&recipes);
        assert_eq!(
            StatsQuery::new("egg", &recipes).run(&g),
            StatsOutcome::Found(IngredientStats {
                ingredient: "egg".into(),
                recipe_count: 2,
                neighbor_count: 2,
                avg_neighbor_weight: 1.0,
            })
        );
    }

    #[test]
    fn stats_isolated_and_missing() {
        let recipes = corpus(&[&["salt"], &["salt", "salt"]]);
        let g = CooccurrenceGraph::build(&recipes);
        match StatsQuery::new("salt", &recipes).run(&g) {
            StatsOutcome::Found(s) => {
                assert_eq!(s.recipe_count, 2);
                assert_eq!(s.neighbor_count, 0);
                assert!(s.avg_neighbor_weight.abs() < f64::EPSILON);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            StatsQuery::new("pepper", &recipes).run(&g),
            StatsOutcome::NotFound { ingredient: "pepper".into() }
        );
    }
}
