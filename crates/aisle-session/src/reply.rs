use serde::Serialize;

use aisle_core::types::{SearchResult, StructuredQuery};

pub const RESET_MESSAGE: &str = "🔄 Context cleared! Starting fresh conversation.";
pub const NO_RESULTS_MESSAGE: &str = "😕 No products found matching your criteria. Try adjusting your search!";
pub const NO_SHOP_RESULTS_MESSAGE: &str = "😕 No products found from this shop matching your criteria.";

/// What one turn hands back to whoever renders the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub products: Vec<SearchResult>,
    /// The query the products came from; `None` when no search ran.
    pub filters_used: Option<StructuredQuery>,
}

impl ChatReply {
    pub fn text(message: impl Into<String>) -> Self {
        Self { message: message.into(), products: Vec::new(), filters_used: None }
    }
}

pub fn found_message(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("🎯 Found {count} product{plural} matching your search")
}

pub fn failure_message(reason: &str) -> String {
    format!("❌ Sorry, I couldn't process that request: {reason}")
}

pub fn context_updated_message(summary: &str) -> String {
    format!("✅ Context updated!\n{summary}\n\nWhat would you like to search for?")
}

/// Put the context summary on top of `message`, separated by a blank line.
pub fn with_summary(summary: &str, message: &str) -> String {
    if summary.is_empty() {
        message.to_string()
    } else {
        format!("{summary}\n\n{message}")
    }
}
