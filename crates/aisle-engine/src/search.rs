use aisle_core::types::{Product, SearchResult, SortBy, StructuredQuery};

use crate::reason;

/// Filter, sort, truncate and explain.
///
/// Each active query field narrows the surviving set in a fixed stage order;
/// the sort is stable so ties keep catalog order. Products missing a required
/// field never match. `limit == 0` yields nothing.
pub fn search(products: &[Product], query: &StructuredQuery, limit: usize) -> Vec<SearchResult> {
    if limit == 0 || products.is_empty() {
        return Vec::new();
    }

    let mut survivors: Vec<&Product> = products.iter().filter(|p| p.is_searchable()).collect();

    if let Some(vendors) = query.active_vendors() {
        retain(&mut survivors, "vendors", |p| vendors.contains(&p.vendor));
    }
    // Runs even when `vendors` is also set: a vendor in both lists is excluded.
    if let Some(excluded) = query.active_exclude_vendors() {
        retain(&mut survivors, "exclude_vendors", |p| !excluded.contains(&p.vendor));
    }
    if let Some(types) = query.active_product_types() {
        retain(&mut survivors, "product_types", |p| types.contains(&p.category));
    }
    if let Some(brand) = query.active_brand() {
        let brand = brand.to_lowercase();
        retain(&mut survivors, "brand", |p| p.brand.to_lowercase().contains(&brand));
    }
    if let Some(tags) = query.active_tags() {
        retain(&mut survivors, "tags", |p| tags.iter().all(|t| p.has_tag(t)));
    }
    if let Some(price_filter) = &query.price_filter {
        retain(&mut survivors, "price_filter", |p| price_filter.matches(p.price));
    }
    if let Some(keywords) = query.active_keywords() {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        retain(&mut survivors, "keywords", |p| {
            let name = p.name.to_lowercase();
            let brand = p.brand.to_lowercase();
            keywords.iter().any(|k| name.contains(k.as_str()) || brand.contains(k.as_str()))
        });
    }

    sort(&mut survivors, query.sort_by);
    let matched = survivors.len();
    survivors.truncate(limit);

    tracing::debug!(catalog = products.len(), matched, returned = survivors.len(), sort_by = ?query.sort_by, "search complete");

    survivors
        .into_iter()
        .enumerate()
        .map(|(rank, product)| SearchResult {
            reason: reason::synthesize(query, product, rank),
            product: product.clone(),
        })
        .collect()
}

fn retain<F>(survivors: &mut Vec<&Product>, stage: &'static str, keep: F)
where
    F: Fn(&Product) -> bool,
{
    survivors.retain(|p| keep(*p));
    tracing::trace!(stage, remaining = survivors.len(), "filter stage applied");
}

fn sort(survivors: &mut [&Product], sort_by: SortBy) {
    match sort_by {
        SortBy::PriceAsc => survivors.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortBy::PriceDesc => survivors.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortBy::Name => survivors.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}
