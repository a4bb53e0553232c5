use ingredient_graph::parser::Recipe;

/// Deterministic synthetic corpus: `recipes` recipes drawing 4-12 ingredients
/// from a vocabulary of `vocab` names, skewed towards low ids like a real pantry.
pub fn synthetic_corpus(recipes: usize, vocab: usize) -> Vec<Recipe> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        state >> 33
    };
    (0..recipes)
        .map(|_| {
            let len = 4 + (next() % 9) as usize;
            Recipe::new((0..len).map(|_| {
                let a = next() as usize % vocab;
                let b = next() as usize % vocab;
                format!("ingredient {}", a.min(b))
            }))
        })
        .collect()
}
