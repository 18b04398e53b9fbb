//! The context merge contract as executable code.
//!
//! A translator reads an instruction and decides, per field, whether the
//! user changed it. [`QueryIntent`] records those decisions and [`merge`]
//! folds them into the previous query under the inheritance, mutual
//! exclusion and category drift rules.
use aisle_core::types::{PriceFilter, SortBy, StructuredQuery};

use crate::category_map::CategoryMap;

/// What an instruction did to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Not mentioned; carry the previous value.
    Inherit,
    Set(T),
    Clear,
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Change::Inherit
    }
}

impl<T: Clone> Change<T> {
    pub fn apply(&self, inherited: Option<T>) -> Option<T> {
        match self {
            Change::Inherit => inherited,
            Change::Set(value) => Some(value.clone()),
            Change::Clear => None,
        }
    }

    pub fn is_addressed(&self) -> bool {
        !matches!(self, Change::Inherit)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Change::Set(_))
    }
}

/// What an instruction did to the product categories.
///
/// `Named` means the user said a category out loud, which can start a new
/// topic. `Inferred` means the translator deduced it (e.g. drinks from
/// "Coke or Pepsi") and never causes drift.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CategoryIntent {
    #[default]
    Inherit,
    Named(Vec<String>),
    Inferred(Vec<String>),
    Clear,
}

/// Per-field changes extracted from one instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryIntent {
    pub vendors: Change<Vec<String>>,
    pub exclude_vendors: Change<Vec<String>>,
    /// "any shop" style phrase: both vendor scopes go away.
    pub any_vendor: bool,
    pub product_types: CategoryIntent,
    pub brand: Change<String>,
    pub tags: Change<Vec<String>>,
    pub price_filter: Change<PriceFilter>,
    pub sort_by: Change<SortBy>,
    pub keywords: Change<Vec<String>>,
}

/// Fold `intent` into `previous`.
///
/// - Unaddressed fields inherit.
/// - Setting one vendor scope clears the other; if an intent sets both,
///   the exclusion wins.
/// - A named category that is not already in effect drops inherited tags
///   and keywords.
/// - Category words are mapped onto canonical categories.
pub fn merge(previous: &StructuredQuery, intent: &QueryIntent, categories: &CategoryMap) -> StructuredQuery {
    let previous = previous.clone().normalized();

    let (product_types, drift) = match &intent.product_types {
        CategoryIntent::Inherit => (previous.product_types.clone(), false),
        CategoryIntent::Clear => (None, false),
        CategoryIntent::Inferred(named) => (Some(categories.expand(named)), false),
        CategoryIntent::Named(named) => {
            let expanded = categories.expand(named);
            let in_effect = previous.active_product_types().unwrap_or_default();
            let drift = expanded.iter().any(|c| !in_effect.contains(c));
            (Some(expanded), drift)
        }
    };

    let (tags, keywords) = if drift {
        (intent.tags.apply(None), intent.keywords.apply(None))
    } else {
        (intent.tags.apply(previous.tags.clone()), intent.keywords.apply(previous.keywords.clone()))
    };

    let mut vendors = intent.vendors.apply(previous.vendors.clone());
    let mut exclude_vendors = intent.exclude_vendors.apply(previous.exclude_vendors.clone());
    if intent.vendors.is_set() && !intent.exclude_vendors.is_set() {
        exclude_vendors = None;
    }
    if intent.exclude_vendors.is_set() {
        vendors = None;
    }
    if intent.any_vendor {
        vendors = None;
        exclude_vendors = None;
    }

    let sort_by = match &intent.sort_by {
        Change::Inherit => previous.sort_by,
        Change::Set(sort_by) => *sort_by,
        Change::Clear => SortBy::default(),
    };

    StructuredQuery {
        vendors,
        exclude_vendors,
        product_types,
        brand: intent.brand.apply(previous.brand.clone()),
        tags,
        price_filter: intent.price_filter.apply(previous.price_filter),
        sort_by,
        keywords,
    }
    .normalized()
}
