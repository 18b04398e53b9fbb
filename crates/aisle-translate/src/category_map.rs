/// Canonical categories a "food" request stands for.
pub const FOOD_CATEGORIES: [&str; 4] = ["sandwich", "bagel", "snack", "salad"];
pub const DRINK_CATEGORY: &str = "drink";

/// Maps loose category words onto the catalog's canonical categories.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    canonical: Vec<String>,
    synonyms: Vec<(String, Vec<String>)>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let food: Vec<String> = FOOD_CATEGORIES.iter().map(|c| c.to_string()).collect();
        let drink = vec![DRINK_CATEGORY.to_string()];
        let mut canonical = food.clone();
        canonical.push(DRINK_CATEGORY.to_string());
        Self {
            canonical,
            synonyms: vec![
                ("food items".to_string(), food.clone()),
                ("food".to_string(), food),
                ("drinks".to_string(), drink.clone()),
                ("beverages".to_string(), drink.clone()),
                ("beverage".to_string(), drink),
            ],
        }
    }
}

impl CategoryMap {
    /// Default synonyms plus the catalog's own categories.
    ///
    /// Catalog spelling is kept as the canonical value, so a catalog `"Drink"`
    /// also replaces the built-in `"drink"` everywhere synonyms point to it.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for category in categories {
            let category = category.as_ref().trim();
            if category.is_empty() {
                continue;
            }
            match map.canonical.iter_mut().find(|c| c.eq_ignore_ascii_case(category)) {
                Some(existing) => {
                    let builtin = std::mem::replace(existing, category.to_string());
                    for target in map.synonyms.iter_mut().flat_map(|(_, mapped)| mapped.iter_mut()) {
                        if *target == builtin {
                            *target = category.to_string();
                        }
                    }
                }
                None => map.canonical.push(category.to_string()),
            }
        }
        map
    }

    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }

    /// Synonym phrases, longest first so "food items" wins over "food".
    pub fn synonym_phrases(&self) -> impl Iterator<Item = &str> {
        self.synonyms.iter().map(|(phrase, _)| phrase.as_str())
    }

    /// The canonical categories `term` names: a synonym, a canonical name, or its plural.
    pub fn resolve(&self, term: &str) -> Option<Vec<String>> {
        let term = term.trim().to_lowercase();
        if let Some((_, mapped)) = self.synonyms.iter().find(|(phrase, _)| *phrase == term) {
            return Some(mapped.clone());
        }
        let singular = [term.as_str(), term.strip_suffix("es").unwrap_or(""), term.strip_suffix('s').unwrap_or("")];
        let found = singular
            .into_iter()
            .filter(|s| !s.is_empty())
            .find_map(|s| self.canonical.iter().find(|c| c.to_lowercase() == s))
            .map(|c| vec![c.clone()]);
        found
    }

    /// Resolve each term (unknown terms pass through) and drop duplicates, keeping first-seen order.
    pub fn expand(&self, terms: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for term in terms {
            let mapped = self.resolve(term).unwrap_or_else(|| vec![term.clone()]);
            for category in mapped {
                if !out.contains(&category) {
                    out.push(category);
                }
            }
        }
        out
    }
}
