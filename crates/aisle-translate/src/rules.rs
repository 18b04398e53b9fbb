//! Phrase-rule translator.
//!
//! Reads an instruction with fixed cue phrases and the catalog's own
//! vocabulary (vendor names, categories, tags), produces a [`QueryIntent`]
//! and merges it into the previous query. Deterministic and offline, so it
//! backs the CLI and the conformance suite when no language model is wired in.
use aisle_core::catalog::Catalog;
use aisle_core::error::Result;
use aisle_core::traits::Translator;
use aisle_core::types::{PriceFilter, PriceOperator, SortBy, StructuredQuery};

use crate::category_map::CategoryMap;
use crate::merge::{merge, CategoryIntent, Change, QueryIntent};

pub const DEFAULT_TAGS: [&str; 5] = ["vegan", "vegetarian", "gluten-free", "low-fat", "low-calorie"];

const ANY_VENDOR_PHRASES: &[&[&str]] = &[
    &["any", "shop"],
    &["any", "shops"],
    &["all", "shops"],
    &["every", "shop"],
    &["any", "store"],
    &["all", "stores"],
    &["any", "vendor"],
    &["all", "vendors"],
];

const NEGATION_CUES: &[&str] = &["not", "except", "excluding", "exclude", "without"];
const SCOPE_CUES: &[&str] = &["from", "at", "only"];

// Longer phrases first: "no more than" must win over "more than".
const PRICE_CUES: &[(&[&str], PriceOperator)] = &[
    (&["no", "more", "than"], PriceOperator::Le),
    (&["less", "than"], PriceOperator::Lt),
    (&["cheaper", "than"], PriceOperator::Lt),
    (&["at", "most"], PriceOperator::Le),
    (&["up", "to"], PriceOperator::Le),
    (&["more", "than"], PriceOperator::Gt),
    (&["at", "least"], PriceOperator::Ge),
    (&["under"], PriceOperator::Lt),
    (&["below"], PriceOperator::Lt),
    (&["max"], PriceOperator::Le),
    (&["maximum"], PriceOperator::Le),
    (&["over"], PriceOperator::Gt),
    (&["above"], PriceOperator::Gt),
    (&["min"], PriceOperator::Ge),
    (&["minimum"], PriceOperator::Ge),
    (&["exactly"], PriceOperator::Eq),
];

const SORT_CUES: &[(&[&str], SortBy)] = &[
    (&["most", "expensive"], SortBy::PriceDesc),
    (&["highest", "price"], SortBy::PriceDesc),
    (&["lowest", "price"], SortBy::PriceAsc),
    (&["by", "name"], SortBy::Name),
    (&["priciest"], SortBy::PriceDesc),
    (&["expensive"], SortBy::PriceDesc),
    (&["premium"], SortBy::PriceDesc),
    (&["cheapest"], SortBy::PriceAsc),
    (&["cheaper"], SortBy::PriceAsc),
    (&["cheap"], SortBy::PriceAsc),
    (&["budget"], SortBy::PriceAsc),
    (&["alphabetical"], SortBy::Name),
    (&["alphabetically"], SortBy::Name),
    (&["a-z"], SortBy::Name),
];

const STOPWORDS: &[&str] = &[
    "a", "also", "an", "and", "any", "anything", "are", "at", "but", "can", "do", "else", "everything", "except",
    "excluding", "find", "for", "from", "get", "give", "got", "have", "i", "instead", "is", "it", "just", "like",
    "looking", "me", "need", "no", "not", "now", "ok", "okay", "only", "or", "options", "please", "products",
    "show", "some", "something", "stuff", "the", "then", "what", "with", "without", "yes", "you",
];

#[derive(Debug, Clone)]
struct Token {
    text: String,
    lower: String,
}

fn tokenize(input: &str) -> Vec<Token> {
    input
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '£')))
        .filter(|word| !word.is_empty())
        .map(|word| Token { text: word.to_string(), lower: word.to_lowercase() })
        .collect()
}

fn phrase_tokens(phrase: &str) -> Vec<String> {
    tokenize(phrase).into_iter().map(|t| t.lower).collect()
}

/// `£3`, `2.50`, `50p`.
fn parse_amount(word: &str) -> Option<f64> {
    let word = word.trim_start_matches('£');
    if let Some(pence) = word.strip_suffix('p') {
        return pence.parse::<f64>().ok().map(|p| p / 100.0);
    }
    word.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Tokens of one instruction plus which of them a rule has already claimed.
struct Reading {
    tokens: Vec<Token>,
    consumed: Vec<bool>,
}

impl Reading {
    fn new(instruction: &str) -> Self {
        let tokens = tokenize(instruction);
        let consumed = vec![false; tokens.len()];
        Self { tokens, consumed }
    }

    fn matches_at<S: AsRef<str>>(&self, at: usize, phrase: &[S]) -> bool {
        !phrase.is_empty()
            && at + phrase.len() <= self.tokens.len()
            && phrase
                .iter()
                .enumerate()
                .all(|(k, word)| !self.consumed[at + k] && self.tokens[at + k].lower == word.as_ref())
    }

    fn find<S: AsRef<str>>(&self, phrase: &[S]) -> Option<usize> {
        (0..self.tokens.len()).find(|&at| self.matches_at(at, phrase))
    }

    fn consume(&mut self, at: usize, len: usize) {
        for flag in &mut self.consumed[at..at + len] {
            *flag = true;
        }
    }

    /// Find and claim a phrase; true when it was present.
    fn take<S: AsRef<str>>(&mut self, phrase: &[S]) -> bool {
        match self.find(phrase) {
            Some(at) => {
                self.consume(at, phrase.len());
                true
            }
            None => false,
        }
    }
}

/// Translator driven by cue phrases and the catalog vocabulary.
#[derive(Debug, Clone)]
pub struct RuleTranslator {
    vendors: Vec<(String, Vec<String>)>,
    categories: CategoryMap,
    tags: Vec<(String, Vec<Vec<String>>)>,
    brands: Vec<String>,
}

impl RuleTranslator {
    /// Known vendors, the default category map and the default tag vocabulary.
    pub fn new<I, S>(vendors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vendors: Vec<(String, Vec<String>)> = vendors
            .into_iter()
            .map(|v| (v.as_ref().to_string(), phrase_tokens(v.as_ref())))
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();
        // Longest name first: "Marks & Spencer" must win over "Marks".
        vendors.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        Self { vendors, categories: CategoryMap::default(), tags: Vec::new(), brands: Vec::new() }
            .with_tags(DEFAULT_TAGS)
    }

    /// Vocabulary taken from what the catalog actually carries.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.vendors())
            .with_categories(CategoryMap::with_categories(catalog.categories()))
            .with_tags(catalog.tags())
            .with_brands(catalog.brands())
    }

    /// Brands accepted after "brand" even when typed in lower case.
    #[must_use]
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brands.extend(brands.into_iter().map(|b| b.as_ref().to_string()).filter(|b| !b.is_empty()));
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    /// Add tags to the vocabulary. Hyphenated tags also match spelled apart ("gluten free").
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref().to_lowercase();
            if tag.is_empty() || self.tags.iter().any(|(known, _)| *known == tag) {
                continue;
            }
            let mut spellings = vec![vec![tag.clone()]];
            if tag.contains('-') {
                spellings.push(tag.split('-').map(str::to_string).collect());
            }
            self.tags.push((tag, spellings));
        }
        self
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Per-field changes the instruction asks for.
    pub fn interpret(&self, instruction: &str) -> QueryIntent {
        let mut reading = Reading::new(instruction);
        let mut intent = QueryIntent::default();

        intent.any_vendor = ANY_VENDOR_PHRASES.iter().any(|phrase| reading.take(*phrase));
        intent.price_filter = read_price(&mut reading);
        intent.sort_by = read_sort(&mut reading);
        intent.brand = self.read_brand(&mut reading);
        self.read_vendors(&mut reading, &mut intent);
        intent.product_types = self.read_categories(&mut reading);
        intent.tags = self.read_tags(&mut reading);
        intent.keywords = read_keywords(&reading);
        intent
    }

    /// `brand X` where X is a known brand (any case) or a capitalised non-stopword.
    fn read_brand(&self, reading: &mut Reading) -> Change<String> {
        if reading.take(&["any", "brand"]) {
            return Change::Clear;
        }
        let Some(at) = reading.find(&["brand"]) else {
            return Change::Inherit;
        };
        let brand = reading.tokens.get(at + 1).filter(|_| !reading.consumed[at + 1]).and_then(|token| {
            if let Some(known) = self.brands.iter().find(|b| b.eq_ignore_ascii_case(&token.text)) {
                return Some(known.clone());
            }
            let capitalised = token.text.chars().next().is_some_and(char::is_uppercase);
            (capitalised && !STOPWORDS.contains(&token.lower.as_str())).then(|| token.text.clone())
        });
        match brand {
            Some(brand) => {
                reading.consume(at, 2);
                Change::Set(brand)
            }
            None => Change::Inherit,
        }
    }

    fn read_vendors(&self, reading: &mut Reading, intent: &mut QueryIntent) {
        let mut included: Vec<String> = Vec::new();
        let mut excluded: Vec<String> = Vec::new();
        let mut negated = false;
        let mut at = 0;

        while at < reading.tokens.len() {
            if reading.consumed[at] {
                at += 1;
                continue;
            }
            let word = reading.tokens[at].lower.as_str();
            if NEGATION_CUES.contains(&word) {
                negated = true;
            } else if SCOPE_CUES.contains(&word) {
                let after_negation = at > 0 && NEGATION_CUES.contains(&reading.tokens[at - 1].lower.as_str());
                negated &= after_negation;
            } else if let Some((name, tokens)) = self.vendors.iter().find(|(_, tokens)| reading.matches_at(at, tokens.as_slice())) {
                let target = if negated { &mut excluded } else { &mut included };
                if !target.contains(name) {
                    target.push(name.clone());
                }
                reading.consume(at, tokens.len());
                at += tokens.len();
                continue;
            }
            at += 1;
        }

        // "from Subway, not ASDA": the inclusion already rules ASDA out.
        if !included.is_empty() {
            intent.vendors = Change::Set(included);
        } else if !excluded.is_empty() {
            intent.exclude_vendors = Change::Set(excluded);
        }
    }

    fn read_categories(&self, reading: &mut Reading) -> CategoryIntent {
        let mut named = Vec::new();
        let synonyms: Vec<Vec<String>> = self.categories.synonym_phrases().map(phrase_tokens).collect();
        for phrase in &synonyms {
            while let Some(at) = reading.find(phrase.as_slice()) {
                reading.consume(at, phrase.len());
                named.push(phrase.join(" "));
            }
        }
        for at in 0..reading.tokens.len() {
            if !reading.consumed[at] && self.categories.resolve(&reading.tokens[at].lower).is_some() {
                reading.consume(at, 1);
                named.push(reading.tokens[at].lower.clone());
            }
        }
        if reading.take(&["any", "type"]) || reading.take(&["any", "category"]) {
            return CategoryIntent::Clear;
        }
        if named.is_empty() {
            CategoryIntent::Inherit
        } else {
            CategoryIntent::Named(named)
        }
    }

    fn read_tags(&self, reading: &mut Reading) -> Change<Vec<String>> {
        let mut found = Vec::new();
        for (tag, spellings) in &self.tags {
            if spellings.iter().any(|spelling| reading.take(spelling.as_slice())) {
                found.push(tag.clone());
            }
        }
        if found.is_empty() {
            Change::Inherit
        } else {
            Change::Set(found)
        }
    }
}

fn read_price(reading: &mut Reading) -> Change<PriceFilter> {
    if reading.take(&["any", "price"]) {
        return Change::Clear;
    }
    for (cue, operator) in PRICE_CUES {
        let mut from = 0;
        while let Some(at) = (from..reading.tokens.len()).find(|&at| reading.matches_at(at, *cue)) {
            let amount_at = at + cue.len();
            let amount = reading
                .tokens
                .get(amount_at)
                .filter(|_| !reading.consumed[amount_at])
                .and_then(|t| parse_amount(&t.lower));
            if let Some(value) = amount {
                reading.consume(at, cue.len() + 1);
                return Change::Set(PriceFilter::new(*operator, value));
            }
            from = at + 1;
        }
    }
    Change::Inherit
}

fn read_sort(reading: &mut Reading) -> Change<SortBy> {
    SORT_CUES
        .iter()
        .find(|(cue, _)| reading.take(*cue))
        .map_or(Change::Inherit, |(_, sort_by)| Change::Set(*sort_by))
}

/// Capitalised words nothing else claimed, e.g. product names like "Coke".
fn read_keywords(reading: &Reading) -> Change<Vec<String>> {
    let keywords: Vec<String> = reading
        .tokens
        .iter()
        .zip(&reading.consumed)
        .filter(|(token, consumed)| {
            !**consumed
                && token.text.chars().next().is_some_and(char::is_uppercase)
                && !STOPWORDS.contains(&token.lower.as_str())
        })
        .map(|(token, _)| token.text.clone())
        .collect();
    if keywords.is_empty() {
        Change::Inherit
    } else {
        Change::Set(keywords)
    }
}

impl Translator for RuleTranslator {
    fn translate(&self, instruction: &str, previous: &StructuredQuery) -> Result<StructuredQuery> {
        let intent = self.interpret(instruction);
        tracing::debug!(instruction, ?intent, "instruction interpreted");
        Ok(merge(previous, &intent, &self.categories))
    }
}
