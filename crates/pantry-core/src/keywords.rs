//! Deterministic keyword matching against the category catalog.
//!
//! The first category (in catalog order) owning a keyword that occurs as a
//! substring of the normalized item text wins. There is no scoring: two
//! categories matching the same text are resolved purely by catalog order.

use crate::models::Category;

/// Match normalized item text against the catalog.
///
/// `item` is expected to be normalized already (see
/// [`normalize_item_text`](crate::text::normalize_item_text)); keywords are
/// compared as stored. Empty text, an empty catalog, or empty keywords never
/// match.
pub fn match_keywords<'a>(item: &str, catalog: &'a [Category]) -> Option<&'a Category> {
    if item.is_empty() {
        return None;
    }
    catalog.iter().find(|category| {
        category
            .keywords
            .iter()
            .any(|kw| !kw.is_empty() && item.contains(kw.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;

    fn category(id: i64, name: &str, keywords: &[&str]) -> Category {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn catalog() -> Vec<Category> {
        vec![
            category(1, "Produce", &["apple", "tomato"]),
            category(2, "Drinks", &["apple juice", "water"]),
            category(3, "Other", &[]),
        ]
    }

    #[test]
    fn test_match_substring() {
        let cat = catalog();
        let hit = match_keywords("fresh apple", &cat).unwrap();
        assert_eq!(hit.name, "Produce");
    }

    #[test]
    fn test_first_match_wins_in_catalog_order() {
        let cat = catalog();
        // "apple juice" contains both "apple" (Produce) and "apple juice" (Drinks).
        let hit = match_keywords("apple juice", &cat).unwrap();
        assert_eq!(hit.id, CategoryId(1));
    }

    #[test]
    fn test_no_match() {
        let cat = catalog();
        assert!(match_keywords("quantum widget", &cat).is_none());
    }

    #[test]
    fn test_empty_text_never_matches() {
        let cat = catalog();
        assert!(match_keywords("", &cat).is_none());
    }

    #[test]
    fn test_empty_catalog_never_matches() {
        assert!(match_keywords("apple", &[]).is_none());
    }

    #[test]
    fn test_empty_keyword_ignored() {
        let cat = vec![category(1, "Broken", &[""])];
        assert!(match_keywords("anything", &cat).is_none());
    }

    #[test]
    fn test_match_inside_compound_word() {
        let cat = vec![category(4, "Milchprodukte", &["milch"])];
        let hit = match_keywords("vollmilch 3,5%", &cat).unwrap();
        assert_eq!(hit.name, "Milchprodukte");
    }
}
