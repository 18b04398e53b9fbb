use aisle_core::types::{Product, SortBy, StructuredQuery};

pub const SEPARATOR: &str = " · ";
pub const FALLBACK: &str = "matches your criteria";

/// Explain why `product` (at position `rank` in the final list) was selected.
///
/// Fragments, in order: vendor, price filter, required tags, and for the
/// first result of an unbounded price sort a cheapest/most-expensive note.
pub fn synthesize(query: &StructuredQuery, product: &Product, rank: usize) -> String {
    let mut fragments = Vec::new();

    if query.active_vendors().is_some() {
        fragments.push(format!("from {}", product.vendor));
    }
    if let Some(price_filter) = &query.price_filter {
        fragments.push(price_filter.describe());
    }
    if let Some(tags) = query.active_tags() {
        fragments.push(tags.join(", "));
    }
    if query.price_filter.is_none() && rank == 0 {
        match query.sort_by {
            SortBy::PriceAsc => fragments.push("cheapest option".to_string()),
            SortBy::PriceDesc => fragments.push("most expensive option".to_string()),
            SortBy::Name => {}
        }
    }

    if fragments.is_empty() {
        FALLBACK.to_string()
    } else {
        fragments.join(SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_core::types::{PriceFilter, PriceOperator};

    fn bagel() -> Product {
        Product::new("Bagel", "ASDA", "bagel", "ASDA", 1.0)
    }

    #[test]
    fn all_fragments_in_fixed_order() {
        let query = StructuredQuery {
            vendors: Some(vec!["ASDA".into()]),
            price_filter: Some(PriceFilter::new(PriceOperator::Le, 2.5)),
            tags: Some(vec!["vegan".into(), "gluten-free".into()]),
            ..Default::default()
        };
        assert_eq!(synthesize(&query, &bagel(), 0), "from ASDA · ≤ £2.5 · vegan, gluten-free");
    }

    #[test]
    fn ordering_note_only_on_first_and_without_price_filter() {
        let asc = StructuredQuery::default();
        assert_eq!(synthesize(&asc, &bagel(), 0), "cheapest option");
        assert_eq!(synthesize(&asc, &bagel(), 1), FALLBACK);

        let desc = StructuredQuery { sort_by: SortBy::PriceDesc, ..Default::default() };
        assert_eq!(synthesize(&desc, &bagel(), 0), "most expensive option");

        let bounded = StructuredQuery {
            price_filter: Some(PriceFilter::new(PriceOperator::Gt, 3.0)),
            ..Default::default()
        };
        assert_eq!(synthesize(&bounded, &bagel(), 0), "over £3.0");
    }

    #[test]
    fn name_sort_without_filters_falls_back() {
        let by_name = StructuredQuery { sort_by: SortBy::Name, ..Default::default() };
        assert_eq!(synthesize(&by_name, &bagel(), 0), FALLBACK);
    }
}
