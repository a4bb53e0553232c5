pub mod table {
    // Display width of a cell; ingredient names are not always ASCII.
    fn width(cell: &str) -> usize {
        cell.chars().count()
    }

    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (cell, &w) in cells.iter().zip(widths) {
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(w.saturating_sub(width(cell))));
            s.push_str(" |");
        }
        s
    }

    /// Render a simple ASCII table given headers and rows.
    ///
    /// Missing trailing cells render empty; cells beyond the header count are dropped.
    #[must_use]
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate() {
                *w = (*w).max(row.get(c).map_or(0, |cell| width(cell)));
            }
        }

        let border = sep(&widths);
        let header_cells: Vec<String> = headers.iter().map(|s| (*s).to_string()).collect();
        let mut out = vec![border.clone(), line(&header_cells, &widths), border.clone()];
        for row in rows {
            let cells: Vec<String> = (0..cols).map(|i| row.get(i).cloned().unwrap_or_default()).collect();
            out.push(line(&cells, &widths));
        }
        out.push(border);
        out.join("\n")
    }

}

pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::errors::IngredientGraphError;

    pub const DEFAULT_CONFIG_NAME: &str = "ingredient-graph.toml";

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct QueryConfig {
        pub default_format: Option<String>, // "text" | "json"
        pub default_top: Option<usize>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        /// Corpus file; relative paths resolve against the config file's directory.
        pub corpus: Option<PathBuf>,
        pub query: Option<QueryConfig>,
    }

    /// Load a config file, resolving a relative `corpus` path against its directory.
    ///
    /// # Errors
    /// Returns `IngredientGraphError::Io` if the file cannot be read and
    /// `IngredientGraphError::Config` if it is not valid TOML for `Config`.
    pub fn load_config_at(path: &Path) -> Result<Config, IngredientGraphError> {
        let data = fs::read_to_string(path)?;
        let mut cfg = toml::from_str::<Config>(&data).map_err(|e| IngredientGraphError::Config {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if let (Some(corpus), Some(dir)) = (cfg.corpus.as_ref(), path.parent()) {
            if corpus.is_relative() {
                cfg.corpus = Some(dir.join(corpus));
            }
        }
        Ok(cfg)
    }

    /// Look for `ingredient-graph.toml` in `dir`. A malformed file is logged and skipped.
    #[must_use]
    pub fn load_config_near(dir: &Path) -> Option<Config> {
        let p = dir.join(DEFAULT_CONFIG_NAME);
        if !p.exists() {
            return None;
        }
        match load_config_at(&p) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("ignoring {}: {e}", p.display());
                None
            }
        }
    }
}

pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn init(verbose: bool) {
        let default = if verbose { "ingredient_graph=debug" } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
