//! Checks a translator's output against the merge contract.
//!
//! Any [`Translator`] (a language model client included) can be run through
//! [`run_cases`]; each case states the instruction, the context it was given
//! and the per-field intent a correct reading of the instruction implies.
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use aisle_core::traits::Translator;
use aisle_core::types::{PriceFilter, PriceOperator, SortBy, StructuredQuery};

use crate::category_map::CategoryMap;
use crate::merge::{merge, CategoryIntent, Change, QueryIntent};

/// Vendors the [`standard_cases`] mention. A translator under test must know them.
pub const STANDARD_VENDORS: [&str; 3] = ["ASDA", "Subway", "Tesco"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Field { field: &'static str, expected: Value, actual: Value },
    VendorConflict { vendors: Vec<String>, exclude_vendors: Vec<String> },
    TranslatorFailed { message: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Field { field, expected, actual } => {
                write!(f, "{field}: expected {expected}, got {actual}")
            }
            Violation::VendorConflict { vendors, exclude_vendors } => write!(
                f,
                "vendors {vendors:?} and exclude_vendors {exclude_vendors:?} are both set"
            ),
            Violation::TranslatorFailed { message } => write!(f, "translator failed: {message}"),
        }
    }
}

/// Compare `observed` with what merging `intent` into `previous` must produce.
pub fn verify(
    previous: &StructuredQuery,
    intent: &QueryIntent,
    observed: &StructuredQuery,
    categories: &CategoryMap,
) -> Result<(), Vec<Violation>> {
    let expected = merge(previous, intent, categories);
    let observed = observed.clone().normalized();
    let mut violations = Vec::new();

    if observed.has_vendor_conflict() {
        violations.push(Violation::VendorConflict {
            vendors: observed.vendors.clone().unwrap_or_default(),
            exclude_vendors: observed.exclude_vendors.clone().unwrap_or_default(),
        });
    }
    check(&mut violations, "vendors", &expected.vendors, &observed.vendors);
    check(&mut violations, "exclude_vendors", &expected.exclude_vendors, &observed.exclude_vendors);
    check(&mut violations, "product_types", &expected.product_types, &observed.product_types);
    check(&mut violations, "brand", &expected.brand, &observed.brand);
    check(&mut violations, "tags", &expected.tags, &observed.tags);
    check(&mut violations, "price_filter", &expected.price_filter, &observed.price_filter);
    check(&mut violations, "sort_by", &expected.sort_by, &observed.sort_by);
    check(&mut violations, "keywords", &expected.keywords, &observed.keywords);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check<T: Serialize + PartialEq>(out: &mut Vec<Violation>, field: &'static str, expected: &T, actual: &T) {
    if expected != actual {
        out.push(Violation::Field {
            field,
            expected: serde_json::to_value(expected).unwrap_or(Value::Null),
            actual: serde_json::to_value(actual).unwrap_or(Value::Null),
        });
    }
}

#[derive(Debug, Clone)]
pub struct ConformanceCase {
    pub name: String,
    pub instruction: String,
    pub previous: StructuredQuery,
    pub intent: QueryIntent,
}

impl ConformanceCase {
    pub fn new(name: &str, instruction: &str, previous: StructuredQuery, intent: QueryIntent) -> Self {
        Self { name: name.to_string(), instruction: instruction.to_string(), previous, intent }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseFailure {
    pub name: String,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConformanceReport {
    pub passed: usize,
    pub failures: Vec<CaseFailure>,
}

impl ConformanceReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn run_cases<T: Translator + ?Sized>(
    translator: &T,
    cases: &[ConformanceCase],
    categories: &CategoryMap,
) -> ConformanceReport {
    let mut report = ConformanceReport::default();
    for case in cases {
        let outcome = match translator.translate(&case.instruction, &case.previous) {
            Ok(observed) => verify(&case.previous, &case.intent, &observed, categories),
            Err(err) => Err(vec![Violation::TranslatorFailed { message: err.to_string() }]),
        };
        match outcome {
            Ok(()) => report.passed += 1,
            Err(violations) => {
                tracing::warn!(case = %case.name, violations = violations.len(), "conformance case failed");
                report.failures.push(CaseFailure { name: case.name.clone(), violations });
            }
        }
    }
    report
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Canonical multi-turn situations every translator should get right.
pub fn standard_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase::new(
            "fresh keywords",
            "Show me Coke or Pepsi",
            StructuredQuery::default(),
            QueryIntent { keywords: Change::Set(strings(&["Coke", "Pepsi"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "vendor refinement keeps keywords",
            "from Subway",
            StructuredQuery { keywords: Some(strings(&["Coke", "Pepsi"])), ..Default::default() },
            QueryIntent { vendors: Change::Set(strings(&["Subway"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "tag refinement keeps vendor and type",
            "show me vegan items",
            StructuredQuery {
                vendors: Some(strings(&["Subway"])),
                product_types: Some(strings(&["drink"])),
                ..Default::default()
            },
            QueryIntent { tags: Change::Set(strings(&["vegan"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "vendor override",
            "no, from ASDA",
            StructuredQuery {
                vendors: Some(strings(&["Subway"])),
                keywords: Some(strings(&["Coke"])),
                ..Default::default()
            },
            QueryIntent { vendors: Change::Set(strings(&["ASDA"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "named category drifts",
            "show me sandwiches",
            StructuredQuery {
                keywords: Some(strings(&["Coke"])),
                tags: Some(strings(&["vegan"])),
                ..Default::default()
            },
            QueryIntent { product_types: CategoryIntent::Named(strings(&["sandwiches"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "exclusion replaces inclusion",
            "not from ASDA",
            StructuredQuery {
                vendors: Some(strings(&["ASDA", "Subway"])),
                keywords: Some(strings(&["Coke"])),
                ..Default::default()
            },
            QueryIntent { exclude_vendors: Change::Set(strings(&["ASDA"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "inclusion replaces exclusion",
            "from ASDA",
            StructuredQuery { exclude_vendors: Some(strings(&["Tesco"])), ..Default::default() },
            QueryIntent { vendors: Change::Set(strings(&["ASDA"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "food maps to its categories",
            "food items",
            StructuredQuery {
                vendors: Some(strings(&["Subway"])),
                product_types: Some(strings(&["drink"])),
                ..Default::default()
            },
            QueryIntent { product_types: CategoryIntent::Named(strings(&["food items"])), ..Default::default() },
        ),
        ConformanceCase::new(
            "price ceiling",
            "anything under £3",
            StructuredQuery::default(),
            QueryIntent {
                price_filter: Change::Set(PriceFilter::new(PriceOperator::Lt, 3.0)),
                ..Default::default()
            },
        ),
        ConformanceCase::new(
            "sort change keeps tags",
            "most expensive",
            StructuredQuery { tags: Some(strings(&["vegan"])), ..Default::default() },
            QueryIntent { sort_by: Change::Set(SortBy::PriceDesc), ..Default::default() },
        ),
        ConformanceCase::new(
            "any shop resets vendor scope",
            "from any shop",
            StructuredQuery {
                vendors: Some(strings(&["Subway"])),
                tags: Some(strings(&["vegan"])),
                ..Default::default()
            },
            QueryIntent { any_vendor: true, ..Default::default() },
        ),
    ]
}
