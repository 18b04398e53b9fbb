use serde::Serialize;

use aisle_core::types::{PriceFilter, Product, SearchResult, SortBy, StructuredQuery};

const SUMMARY_PREFIX: &str = "📌 Context: ";
const SUMMARY_SEPARATOR: &str = " | ";

/// Which shops the conversation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorScope {
    Only(Vec<String>),
    Except(Vec<String>),
    Any,
}

/// The previous query re-run under a new vendor scope.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRerun {
    pub query: StructuredQuery,
    pub results: Vec<SearchResult>,
}

/// Latest filter state of one conversation.
///
/// Updated only by [`mirror`](Self::mirror) (wholesale copy of a translated
/// query) or [`reset`](Self::reset). The vendor re-run path is the single
/// exception and touches the two vendor fields only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationContext {
    vendors: Option<Vec<String>>,
    exclude_vendors: Option<Vec<String>>,
    product_types: Option<Vec<String>>,
    brand: Option<String>,
    tags: Option<Vec<String>>,
    price_filter: Option<PriceFilter>,
    sort_by: Option<SortBy>,
    keywords: Option<Vec<String>>,
    last_query: Option<StructuredQuery>,
}

fn active(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every tracked field with `query`'s and remember it as the last query.
    pub fn mirror(&mut self, query: &StructuredQuery) {
        self.vendors = query.vendors.clone();
        self.exclude_vendors = query.exclude_vendors.clone();
        self.product_types = query.product_types.clone();
        self.brand = query.brand.clone();
        self.tags = query.tags.clone();
        self.price_filter = query.price_filter;
        self.sort_by = Some(query.sort_by);
        self.keywords = query.keywords.clone();
        self.last_query = Some(query.clone());
        tracing::debug!(active = self.has_active_context(), "context mirrored");
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::debug!("context reset");
    }

    /// The tracked fields as a query, used as the translator's previous state.
    pub fn as_query(&self) -> StructuredQuery {
        StructuredQuery {
            vendors: self.vendors.clone(),
            exclude_vendors: self.exclude_vendors.clone(),
            product_types: self.product_types.clone(),
            brand: self.brand.clone(),
            tags: self.tags.clone(),
            price_filter: self.price_filter,
            sort_by: self.sort_by.unwrap_or_default(),
            keywords: self.keywords.clone(),
        }
    }

    pub fn has_active_context(&self) -> bool {
        active(&self.vendors).is_some()
            || active(&self.exclude_vendors).is_some()
            || active(&self.product_types).is_some()
            || active(&self.tags).is_some()
            || self.price_filter.is_some()
            || self.sort_by == Some(SortBy::PriceDesc)
    }

    /// One line naming the set fields: shop, exclusion, type, tags, then price or budget.
    pub fn summarize(&self) -> String {
        let mut parts = Vec::new();

        if let Some(vendors) = active(&self.vendors) {
            parts.push(format!("Shop: {}", vendors.join(", ")));
        }
        if let Some(excluded) = active(&self.exclude_vendors) {
            parts.push(format!("Excluding: {}", excluded.join(", ")));
        }
        if let Some(types) = active(&self.product_types) {
            parts.push(format!("Type: {}", types.join(", ")));
        }
        if let Some(tags) = active(&self.tags) {
            parts.push(format!("Tags: {}", tags.join(", ")));
        }
        match (&self.price_filter, self.sort_by) {
            (Some(price_filter), _) => parts.push(format!("Price: {}", price_filter.describe())),
            (None, Some(SortBy::PriceDesc)) => parts.push("Budget: expensive".to_string()),
            (None, Some(SortBy::PriceAsc)) => parts.push("Budget: cheap".to_string()),
            (None, Some(SortBy::Name) | None) => {}
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("{SUMMARY_PREFIX}{}", parts.join(SUMMARY_SEPARATOR))
        }
    }

    /// Switch the vendor scope and re-run the previous search under it.
    ///
    /// Only `vendors`/`exclude_vendors` change; `last_query` keeps what the
    /// translator produced. Returns `None` when nothing has been searched yet.
    pub fn rerun_with_vendor_scope(
        &mut self,
        scope: VendorScope,
        products: &[Product],
        limit: usize,
    ) -> Option<VendorRerun> {
        self.apply_vendor_scope(scope);
        let mut query = self.last_query.clone()?;
        query.vendors = self.vendors.clone();
        query.exclude_vendors = self.exclude_vendors.clone();
        let results = aisle_engine::search(products, &query, limit);
        Some(VendorRerun { query, results })
    }

    fn apply_vendor_scope(&mut self, scope: VendorScope) {
        let (vendors, excluded) = match scope {
            VendorScope::Only(v) => (Some(v).filter(|v| !v.is_empty()), None),
            VendorScope::Except(v) => (None, Some(v).filter(|v| !v.is_empty())),
            VendorScope::Any => (None, None),
        };
        self.vendors = vendors;
        self.exclude_vendors = excluded;
    }

    pub fn vendors(&self) -> Option<&[String]> {
        self.vendors.as_deref()
    }

    pub fn exclude_vendors(&self) -> Option<&[String]> {
        self.exclude_vendors.as_deref()
    }

    pub fn product_types(&self) -> Option<&[String]> {
        self.product_types.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn price_filter(&self) -> Option<&PriceFilter> {
        self.price_filter.as_ref()
    }

    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by
    }

    pub fn keywords(&self) -> Option<&[String]> {
        self.keywords.as_deref()
    }

    pub fn last_query(&self) -> Option<&StructuredQuery> {
        self.last_query.as_ref()
    }
}
