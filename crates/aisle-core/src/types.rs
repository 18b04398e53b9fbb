//! Domain types shared by the engine, the context store and translators.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single catalog entry.
///
/// Required fields default to empty (and `price` to NaN) when absent so that a
/// partial record still loads; such a product is simply never searchable.
/// Keys the catalog carries beyond the known ones are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default = "missing_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn missing_price() -> f64 {
    f64::NAN
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        vendor: impl Into<String>,
        category: impl Into<String>,
        brand: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            vendor: vendor.into(),
            category: category.into(),
            brand: brand.into(),
            price,
            tags: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// All required fields present and non-empty, price finite and not negative.
    pub fn is_searchable(&self) -> bool {
        !self.name.is_empty()
            && !self.vendor.is_empty()
            && !self.category.is_empty()
            && !self.brand.is_empty()
            && self.price.is_finite()
            && self.price >= 0.0
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
}

impl PriceOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            PriceOperator::Lt => "<",
            PriceOperator::Le => "<=",
            PriceOperator::Gt => ">",
            PriceOperator::Ge => ">=",
            PriceOperator::Eq => "==",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceFilter {
    pub operator: PriceOperator,
    pub value: f64,
}

impl PriceFilter {
    pub fn new(operator: PriceOperator, value: f64) -> Self {
        Self { operator, value }
    }

    /// Plain numeric comparison; `==` is exact, with no tolerance.
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, price: f64) -> bool {
        match self.operator {
            PriceOperator::Lt => price < self.value,
            PriceOperator::Le => price <= self.value,
            PriceOperator::Gt => price > self.value,
            PriceOperator::Ge => price >= self.value,
            PriceOperator::Eq => price == self.value,
        }
    }

    /// Human phrasing used in result reasons and context summaries, e.g. `under £3.0`.
    pub fn describe(&self) -> String {
        let amount = format_amount(self.value);
        match self.operator {
            PriceOperator::Lt => format!("under £{amount}"),
            PriceOperator::Le => format!("≤ £{amount}"),
            PriceOperator::Gt => format!("over £{amount}"),
            PriceOperator::Ge => format!("≥ £{amount}"),
            PriceOperator::Eq => format!("= £{amount}"),
        }
    }
}

/// Whole amounts keep one decimal place (`3.0`); others print as-is (`2.5`).
pub fn format_amount(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    PriceAsc,
    PriceDesc,
    Name,
}

fn sort_or_default<'de, D>(deserializer: D) -> Result<SortBy, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SortBy>::deserialize(deserializer)?.unwrap_or_default())
}

/// The filter state exchanged between translator, context store and engine.
///
/// An empty list (or empty brand) carries no constraint and is treated the
/// same as `None` by every consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredQuery {
    pub vendors: Option<Vec<String>>,
    pub exclude_vendors: Option<Vec<String>>,
    pub product_types: Option<Vec<String>>,
    pub brand: Option<String>,
    pub tags: Option<Vec<String>>,
    pub price_filter: Option<PriceFilter>,
    #[serde(deserialize_with = "sort_or_default")]
    pub sort_by: SortBy,
    pub keywords: Option<Vec<String>>,
}

fn active(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

impl StructuredQuery {
    /// Parse a translator payload; anything malformed becomes the unfiltered default query.
    pub fn from_value_lenient(value: Value) -> Self {
        match serde_json::from_value::<StructuredQuery>(value) {
            Ok(query) => query.normalized(),
            Err(err) => {
                tracing::warn!(error = %err, "malformed structured query, falling back to no filters");
                Self::default()
            }
        }
    }

    /// Collapse empty lists and blank brand to `None`.
    pub fn normalized(self) -> Self {
        fn list(l: Option<Vec<String>>) -> Option<Vec<String>> {
            l.filter(|l| !l.is_empty())
        }
        Self {
            vendors: list(self.vendors),
            exclude_vendors: list(self.exclude_vendors),
            product_types: list(self.product_types),
            brand: self.brand.filter(|b| !b.is_empty()),
            tags: list(self.tags),
            price_filter: self.price_filter,
            sort_by: self.sort_by,
            keywords: list(self.keywords),
        }
    }

    pub fn active_vendors(&self) -> Option<&[String]> {
        active(&self.vendors)
    }

    pub fn active_exclude_vendors(&self) -> Option<&[String]> {
        active(&self.exclude_vendors)
    }

    pub fn active_product_types(&self) -> Option<&[String]> {
        active(&self.product_types)
    }

    pub fn active_brand(&self) -> Option<&str> {
        self.brand.as_deref().filter(|b| !b.is_empty())
    }

    pub fn active_tags(&self) -> Option<&[String]> {
        active(&self.tags)
    }

    pub fn active_keywords(&self) -> Option<&[String]> {
        active(&self.keywords)
    }

    /// Both vendor scopes set at once. The merge step should never produce this.
    pub fn has_vendor_conflict(&self) -> bool {
        self.active_vendors().is_some() && self.active_exclude_vendors().is_some()
    }

    /// Only the constraining fields plus `sort_by`, as handed to a prompt-based translator.
    pub fn context_json(&self) -> Value {
        let mut ctx = Map::new();
        let mut put_list = |key: &str, list: Option<&[String]>| {
            if let Some(list) = list {
                ctx.insert(key.to_string(), Value::from(list.to_vec()));
            }
        };
        put_list("vendors", self.active_vendors());
        put_list("exclude_vendors", self.active_exclude_vendors());
        put_list("product_types", self.active_product_types());
        put_list("tags", self.active_tags());
        put_list("keywords", self.active_keywords());
        if let Some(pf) = &self.price_filter {
            ctx.insert(
                "price_filter".to_string(),
                serde_json::json!({ "operator": pf.operator.symbol(), "value": pf.value }),
            );
        }
        ctx.insert("sort_by".to_string(), serde_json::json!(self.sort_by));
        if let Some(brand) = self.active_brand() {
            ctx.insert("brand".to_string(), Value::from(brand));
        }
        Value::Object(ctx)
    }
}

/// A product selected by a search, with the explanation shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub product: Product,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_sort_and_null_sort_default_to_price_asc() {
        let q: StructuredQuery = serde_json::from_value(json!({ "vendors": ["ASDA"] })).unwrap();
        assert_eq!(q.sort_by, SortBy::PriceAsc);
        let q: StructuredQuery = serde_json::from_value(json!({ "sort_by": null })).unwrap();
        assert_eq!(q.sort_by, SortBy::PriceAsc);
        let q: StructuredQuery = serde_json::from_value(json!({ "sort_by": "price_desc" })).unwrap();
        assert_eq!(q.sort_by, SortBy::PriceDesc);
    }

    #[test]
    fn serializes_field_names_with_nulls() {
        let q = StructuredQuery {
            vendors: Some(vec!["Tesco".into()]),
            price_filter: Some(PriceFilter::new(PriceOperator::Le, 2.5)),
            ..Default::default()
        };
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["vendors"], json!(["Tesco"]));
        assert_eq!(v["exclude_vendors"], Value::Null);
        assert_eq!(v["price_filter"], json!({ "operator": "<=", "value": 2.5 }));
        assert_eq!(v["sort_by"], json!("price_asc"));
        let back: StructuredQuery = serde_json::from_value(v).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn lenient_parse_maps_garbage_to_default() {
        let q = StructuredQuery::from_value_lenient(json!({ "price_filter": { "operator": "~", "value": 1 } }));
        assert_eq!(q, StructuredQuery::default());
        let q = StructuredQuery::from_value_lenient(json!("not an object"));
        assert_eq!(q, StructuredQuery::default());
        let q = StructuredQuery::from_value_lenient(json!({ "tags": [], "brand": "" }));
        assert_eq!(q.tags, None);
        assert_eq!(q.brand, None);
    }

    #[test]
    fn context_json_skips_inactive_fields() {
        let q = StructuredQuery {
            keywords: Some(vec!["Coke".into(), "Pepsi".into()]),
            tags: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            q.context_json(),
            json!({ "keywords": ["Coke", "Pepsi"], "sort_by": "price_asc" })
        );
    }

    #[test]
    fn partial_product_loads_but_is_not_searchable() {
        let p: Product = serde_json::from_value(json!({ "name": "Bagel", "vendor": "ASDA", "price": 1.2 })).unwrap();
        assert!(!p.is_searchable());
        assert!(p.tags.is_empty());
        let p: Product = serde_json::from_value(json!({
            "name": "Bagel", "vendor": "ASDA", "category": "bagel", "brand": "ASDA",
            "tags": null, "calories": 250
        }))
        .unwrap();
        assert!(!p.is_searchable(), "price missing");
        assert_eq!(p.extra.get("calories"), Some(&json!(250)));
    }

    #[test]
    fn price_phrasing_per_operator() {
        assert_eq!(PriceFilter::new(PriceOperator::Lt, 3.0).describe(), "under £3.0");
        assert_eq!(PriceFilter::new(PriceOperator::Le, 2.5).describe(), "≤ £2.5");
        assert_eq!(PriceFilter::new(PriceOperator::Gt, 1.0).describe(), "over £1.0");
        assert_eq!(PriceFilter::new(PriceOperator::Ge, 1.25).describe(), "≥ £1.25");
        assert_eq!(PriceFilter::new(PriceOperator::Eq, 2.5).describe(), "= £2.5");
    }
}
