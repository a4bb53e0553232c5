//! Recipe corpus loading.
//!
//! A corpus is a JSON array of recipe objects, each carrying an `ingredients`
//! array of strings. `id` and `cuisine` are kept when present; every other key
//! is ignored. Shape violations abort the load with the index of the offending
//! recipe instead of skipping it.
use serde_json::{Map, Value};
use std::path::Path;

use crate::errors::{CorpusError, IngredientGraphError};

/// Canonical form of an ingredient name: trimmed and lowercased.
///
/// Every graph key and every lookup goes through this function.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recipe {
    pub id: Option<u64>,
    pub cuisine: Option<String>,
    /// Raw ingredient names in corpus order.
    pub ingredients: Vec<String>,
}

impl Recipe {
    /// Build an anonymous recipe from raw ingredient names.
    #[must_use]
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { id: None, cuisine: None, ingredients: ingredients.into_iter().map(Into::into).collect() }
    }

    /// Normalized names in position order. Duplicates are kept.
    #[must_use]
    pub fn normalized_ingredients(&self) -> Vec<String> {
        self.ingredients.iter().map(|i| normalize(i)).collect()
    }

    /// Whether an already-normalized name appears in this recipe.
    #[must_use]
    pub fn contains(&self, normalized: &str) -> bool {
        self.ingredients.iter().any(|i| normalize(i) == normalized)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub recipes: Vec<Recipe>,
}

impl Corpus {
    #[must_use]
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Parse a corpus from JSON text.
    ///
    /// # Errors
    /// Returns `CorpusError::Json` for invalid JSON, `CorpusError::NotAnArray` when the
    /// top-level value is not an array, and `CorpusError::MalformedRecipe` for the first
    /// recipe whose `ingredients` field is missing or not an array of strings.
    pub fn from_json_str(data: &str) -> Result<Self, CorpusError> {
        let value: Value = serde_json::from_str(data)?;
        let Value::Array(items) = value else {
            return Err(CorpusError::NotAnArray);
        };
        let recipes = items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_recipe(index, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { recipes })
    }

    /// Read and parse a corpus file.
    ///
    /// # Errors
    /// Returns `IngredientGraphError::Io` if the file cannot be read and
    /// `IngredientGraphError::Corpus` if its contents are not a valid corpus.
    pub fn load(path: &Path) -> Result<Self, IngredientGraphError> {
        let data = std::fs::read_to_string(path)?;
        let corpus = Self::from_json_str(&data).map_err(|source| IngredientGraphError::Corpus {
            file: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), recipes = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> CorpusError {
    CorpusError::MalformedRecipe { index, reason: reason.into() }
}

fn parse_recipe(index: usize, item: &Value) -> Result<Recipe, CorpusError> {
    let Some(obj) = item.as_object() else {
        return Err(malformed(index, "expected a JSON object"));
    };
    let ingredients = parse_ingredients(index, obj)?;
    Ok(Recipe {
        id: obj.get("id").and_then(Value::as_u64),
        cuisine: obj.get("cuisine").and_then(Value::as_str).map(str::to_string),
        ingredients,
    })
}

fn parse_ingredients(index: usize, obj: &Map<String, Value>) -> Result<Vec<String>, CorpusError> {
    let Some(field) = obj.get("ingredients") else {
        return Err(malformed(index, "missing `ingredients` field"));
    };
    let Some(list) = field.as_array() else {
        return Err(malformed(index, "`ingredients` must be an array"));
    };
    list.iter()
        .enumerate()
        .map(|(pos, v)| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                malformed(index, format!("ingredient at position {pos} is not a string"))
            })
        })
        .collect()
}
