//! Catalog helpers: the bootstrap catalog and fallback lookup.

use crate::defaults::BOOTSTRAP_FALLBACK_CATEGORY;
use crate::models::{Category, NewCategory};

/// The household catalog inserted into an empty store.
///
/// Keywords include transliterated spellings (`kaese`, `broetchen`) since
/// shopping lists are often typed without umlauts.
pub fn default_catalog() -> Vec<NewCategory> {
    vec![
        NewCategory::new(
            "Obst & Gemüse",
            [
                "apfel", "banane", "birne", "tomate", "gurke", "salat", "zwiebel", "kartoffel",
                "paprika", "zitrone",
            ],
        ),
        NewCategory::new(
            "Milchprodukte",
            ["milch", "käse", "quark", "joghurt", "butter", "sahne", "kaese"],
        ),
        NewCategory::new(
            "Getränke",
            ["wasser", "saft", "bier", "wein", "cola", "limo", "kaffee", "tee", "sprudel"],
        ),
        NewCategory::new(
            "Backwaren",
            ["brot", "brötchen", "baguette", "toast", "croissant", "broetchen"],
        ),
        NewCategory::new(
            "Fleisch & Fisch",
            [
                "hähnchen",
                "hackfleisch",
                "lachs",
                "wurst",
                "fleisch",
                "schinken",
                "haehnchen",
            ],
        ),
        NewCategory::new(
            "Vorrat",
            ["nudeln", "reis", "mehl", "zucker", "salz", "öl", "konserve", "oel"],
        ),
        NewCategory::new(
            "Hygiene",
            ["seife", "shampoo", "zahnpasta", "klopapier", "duschgel", "wc"],
        ),
        NewCategory::new(BOOTSTRAP_FALLBACK_CATEGORY, Vec::<String>::new()),
    ]
}

/// Find a category by name (case-insensitive) in a catalog snapshot.
pub fn find_by_name<'a>(catalog: &'a [Category], name: &str) -> Option<&'a Category> {
    catalog.iter().find(|c| c.has_name(name))
}

/// Find the first designated fallback category present in the snapshot.
///
/// `names` are tried in order, so configuration decides precedence when a
/// catalog carries more than one catch-all.
pub fn find_fallback<'a, S: AsRef<str>>(
    catalog: &'a [Category],
    names: &[S],
) -> Option<&'a Category> {
    names
        .iter()
        .find_map(|name| find_by_name(catalog, name.as_ref()))
}
