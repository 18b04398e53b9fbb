use std::sync::Arc;

use aisle_context::VendorScope;
use aisle_core::catalog::Catalog;
use aisle_core::types::{Product, StructuredQuery};
use aisle_session::{reply, Assistant};
use aisle_translate::{RuleTranslator, ScriptedTranslator};
use serde_json::json;

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_products(vec![
        Product::new("Coke", "Subway", "drink", "Coca-Cola", 1.5),
        Product::new("Pepsi", "Subway", "drink", "PepsiCo", 1.4),
        Product::new("Coke Zero", "ASDA", "drink", "Coca-Cola", 0.9),
        Product::new("Pepsi Max", "Tesco", "drink", "PepsiCo", 1.0),
        Product::new("Veggie Delite", "Subway", "sandwich", "Subway", 4.0).with_tags(["vegan"]),
        Product::new("Hummus Salad", "Tesco", "salad", "Tesco", 2.75).with_tags(["vegan", "gluten-free"]),
        Product::new("Ham Bagel", "ASDA", "bagel", "ASDA", 2.2),
    ]))
}

fn rule_assistant() -> Assistant<RuleTranslator> {
    let catalog = catalog();
    let translator = RuleTranslator::from_catalog(&catalog);
    Assistant::new(catalog, translator)
}

fn names(reply: &aisle_session::ChatReply) -> Vec<&str> {
    reply.products.iter().map(|r| r.product.name.as_str()).collect()
}

#[test]
fn first_turn_without_context_has_bare_count() {
    let mut assistant = rule_assistant();
    let reply = assistant.respond("Show me Coke or Pepsi");
    assert_eq!(reply.message, "🎯 Found 3 products matching your search");
    assert_eq!(names(&reply), vec!["Coke Zero", "Pepsi Max", "Pepsi"]);
    assert_eq!(reply.products[0].reason, "cheapest option");
    assert_eq!(assistant.transcript().len(), 2);
}

#[test]
fn refinement_carries_context_and_prefixes_summary() {
    let mut assistant = rule_assistant();
    assistant.respond("Show me Coke or Pepsi");
    let reply = assistant.respond("from Subway");
    assert_eq!(reply.message, "📌 Context: Shop: Subway | Budget: cheap\n\n🎯 Found 2 products matching your search");
    assert_eq!(names(&reply), vec!["Pepsi", "Coke"]);
    let used = reply.filters_used.unwrap();
    assert_eq!(used.keywords, Some(vec!["Coke".to_string(), "Pepsi".to_string()]));
}

#[test]
fn no_results_message() {
    let mut assistant = rule_assistant();
    let reply = assistant.respond("vegan bagels");
    assert!(reply.products.is_empty());
    assert_eq!(reply.message, reply::NO_RESULTS_MESSAGE);
    assert!(reply.filters_used.is_some());
}

#[test]
fn reset_phrase_clears_everything() {
    let mut assistant = rule_assistant();
    assistant.respond("vegan salads from Tesco");
    let reply = assistant.respond("  Start Over ");
    assert_eq!(reply.message, reply::RESET_MESSAGE);
    assert!(reply.products.is_empty());
    assert_eq!(reply.filters_used, None);
    assert!(!assistant.context().has_active_context());
    assert_eq!(assistant.context().last_query(), None);
    assert!(assistant.transcript().is_empty());
}

#[test]
fn translator_failure_leaves_context_untouched() {
    let translator = ScriptedTranslator::new()
        .then_json(json!({"vendors": ["Tesco"], "sort_by": "price_asc"}))
        .then_fail("model unavailable");
    let mut assistant = Assistant::new(catalog(), translator);

    assistant.respond("from tesco");
    let before = assistant.context().clone();
    let turns = assistant.transcript().len();

    let reply = assistant.respond("something vague");
    assert!(reply.message.starts_with("❌"));
    assert!(reply.message.contains("model unavailable"));
    assert!(reply.products.is_empty());
    assert_eq!(reply.filters_used, None);
    assert_eq!(assistant.context(), &before);
    assert_eq!(assistant.transcript().len(), turns);
}

#[test]
fn malformed_model_output_means_no_filters() {
    let translator = ScriptedTranslator::new().then_json(json!(["not", "a", "query"]));
    let mut assistant = Assistant::new(catalog(), translator).with_limit(10);
    let reply = assistant.respond("???");
    assert_eq!(reply.filters_used, Some(StructuredQuery::default()));
    assert_eq!(reply.products.len(), 7);
}

#[test]
fn shop_selection_reruns_last_search() {
    let mut assistant = rule_assistant();
    assistant.respond("Show me Coke or Pepsi");

    let reply = assistant.select_vendors(VendorScope::Only(vec!["Tesco".into()]));
    assert_eq!(reply.message, "📌 Context: Shop: Tesco | Budget: cheap\n\n🎯 Found 1 product matching your search");
    assert_eq!(names(&reply), vec!["Pepsi Max"]);

    let reply = assistant.select_vendors(VendorScope::Except(vec!["ASDA".into(), "Tesco".into(), "Subway".into()]));
    assert_eq!(reply.message, reply::NO_SHOP_RESULTS_MESSAGE);
    let used = reply.filters_used.unwrap();
    assert_eq!(used.vendors, None);
    assert_eq!(used.keywords, Some(vec!["Coke".to_string(), "Pepsi".to_string()]));
}

#[test]
fn shop_selection_before_any_search_only_updates_context() {
    let mut assistant = rule_assistant();
    let reply = assistant.select_vendors(VendorScope::Only(vec!["ASDA".into()]));
    assert_eq!(
        reply.message,
        "✅ Context updated!\n📌 Context: Shop: ASDA\n\nWhat would you like to search for?"
    );
    assert!(reply.products.is_empty());

    let reply = assistant.respond("bagels");
    assert_eq!(names(&reply), vec!["Ham Bagel"]);
}

#[test]
fn reply_serializes_flat_products() {
    let mut assistant = rule_assistant();
    let reply = assistant.respond("gluten free");
    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["products"][0]["name"], "Hummus Salad");
    assert_eq!(value["products"][0]["reason"], "gluten-free · cheapest option");
    assert_eq!(value["filters_used"]["tags"], json!(["gluten-free"]));
}

#[test]
fn mixed_case_catalog_categories_and_vendors_match() {
    let catalog = Arc::new(Catalog::from_products(vec![
        Product::new("Falafel Wrap", "Leon", "Wrap", "Leon", 4.5),
        Product::new("Lemonade", "Leon", "Drink", "Leon", 2.0),
        Product::new("Aioli Chicken Wrap", "Marks & Spencer", "Wrap", "M&S", 3.8),
    ]));
    let translator = RuleTranslator::from_catalog(&catalog);
    let mut assistant = Assistant::new(catalog, translator);

    let reply = assistant.respond("wraps");
    assert_eq!(reply.filters_used.as_ref().unwrap().product_types, Some(vec!["Wrap".to_string()]));
    assert_eq!(names(&reply), vec!["Aioli Chicken Wrap", "Falafel Wrap"]);

    let reply = assistant.respond("beverages from leon");
    assert_eq!(reply.filters_used.as_ref().unwrap().product_types, Some(vec!["Drink".to_string()]));
    assert_eq!(names(&reply), vec!["Lemonade"]);
}
